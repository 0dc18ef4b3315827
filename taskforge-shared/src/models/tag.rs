/// Tag model and database operations
///
/// Tags are a global vocabulary: they have no owner, every authenticated
/// user reads them, and only administrators may write them. Names are
/// unique across the whole system; colors are `#RRGGBB` strings with a
/// default of `#3B82F6`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::{normalize_page, Page};

/// Default color assigned when a tag is created without one.
pub const DEFAULT_COLOR: &str = "#3B82F6";

/// Global tag
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Tag {
    /// Unique tag ID
    pub id: Uuid,

    /// Globally unique name
    pub name: String,

    /// Hex color, `#RRGGBB`
    pub color: String,

    /// Number of tasks carrying this tag
    pub tasks_count: i64,

    /// When the tag was created
    pub created_at: DateTime<Utc>,

    /// When the tag was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a tag
#[derive(Debug, Clone)]
pub struct CreateTag {
    pub name: String,
    pub color: String,
}

/// Input for a partial tag update
#[derive(Debug, Clone, Default)]
pub struct UpdateTag {
    pub name: Option<String>,
    pub color: Option<String>,
}

const TAG_COLUMNS: &str = "id, name, color, \
     (SELECT COUNT(*) FROM task_tag WHERE task_tag.tag_id = tags.id) AS tasks_count, \
     created_at, updated_at";

impl Tag {
    /// Creates a tag
    pub async fn create(pool: &PgPool, data: CreateTag) -> Result<Self, sqlx::Error> {
        let tag = sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (name, color) VALUES ($1, $2) \
             RETURNING id, name, color, 0::BIGINT AS tasks_count, created_at, updated_at",
        )
        .bind(data.name)
        .bind(data.color)
        .fetch_one(pool)
        .await?;

        Ok(tag)
    }

    /// Finds a tag by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = $1");

        sqlx::query_as::<_, Tag>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Applies a partial update; returns `None` if the tag is gone
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTag,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tags SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.color.is_some() {
            bind_count += 1;
            query.push_str(&format!(", color = ${}", bind_count));
        }

        query.push_str(" WHERE id = $1");

        let mut q = sqlx::query(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(color) = data.color {
            q = q.bind(color);
        }

        let result = q.execute(pool).await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Self::find_by_id(pool, id).await
    }

    /// Deletes a tag; associations in `task_tag` cascade
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists the whole vocabulary, unpaginated, newest-created first
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("SELECT {TAG_COLUMNS} FROM tags ORDER BY created_at DESC");

        sqlx::query_as::<_, Tag>(&query).fetch_all(pool).await
    }

    /// Lists one page of tags, newest-created first, optionally narrowed
    /// by a case-insensitive name substring
    pub async fn search(
        pool: &PgPool,
        search: Option<&str>,
        page: i64,
        per_page: i64,
    ) -> Result<Page<Self>, sqlx::Error> {
        let page = normalize_page(page);

        let pattern = search.map(|s| format!("%{}%", s));
        let condition = if pattern.is_some() {
            "WHERE name ILIKE $1"
        } else {
            ""
        };

        let count_query = format!("SELECT COUNT(*) FROM tags {condition}");
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_query);
        if let Some(ref pattern) = pattern {
            count_q = count_q.bind(pattern);
        }
        let total = count_q.fetch_one(pool).await?;

        let (limit_bind, offset_bind) = if pattern.is_some() { (2, 3) } else { (1, 2) };
        let list_query = format!(
            "SELECT {TAG_COLUMNS} FROM tags {condition} \
             ORDER BY created_at DESC LIMIT ${limit_bind} OFFSET ${offset_bind}"
        );
        let mut list_q = sqlx::query_as::<_, Tag>(&list_query);
        if let Some(ref pattern) = pattern {
            list_q = list_q.bind(pattern);
        }
        let data = list_q
            .bind(per_page)
            .bind((page - 1) * per_page)
            .fetch_all(pool)
            .await?;

        Ok(Page {
            data,
            total,
            current_page: page,
            per_page,
        })
    }

    /// Checks whether a name is already taken, optionally ignoring one tag
    /// (the tag being renamed)
    pub async fn name_exists(
        pool: &PgPool,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let exists = match exclude {
            Some(id) => {
                sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM tags WHERE name = $1 AND id != $2)",
                )
                .bind(name)
                .bind(id)
                .fetch_one(pool)
                .await?
            }
            None => {
                sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM tags WHERE name = $1)")
                    .bind(name)
                    .fetch_one(pool)
                    .await?
            }
        };

        Ok(exists)
    }

    /// Returns the subset of `ids` that do not name an existing tag
    ///
    /// Used to reject task payloads referencing unknown tags before any
    /// write happens.
    pub async fn missing_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Uuid>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let missing = sqlx::query_scalar::<_, Uuid>(
            "SELECT wanted.id FROM UNNEST($1::UUID[]) AS wanted(id) \
             LEFT JOIN tags ON tags.id = wanted.id \
             WHERE tags.id IS NULL",
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(missing)
    }

    /// Total number of tags
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tags")
            .fetch_one(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_color_is_valid_hex() {
        assert_eq!(DEFAULT_COLOR.len(), 7);
        assert!(DEFAULT_COLOR.starts_with('#'));
        assert!(DEFAULT_COLOR[1..].chars().all(|c| c.is_ascii_hexdigit()));
    }
}
