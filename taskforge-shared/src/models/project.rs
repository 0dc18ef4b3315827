/// Project model and database operations
///
/// Projects are owned by exactly one user; only the owner may read or
/// mutate them (enforced by the authorization guard, not here). Every read
/// carries a computed `tasks_count` for the listing views.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_status AS ENUM ('active', 'completed', 'archived');
///
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     status project_status NOT NULL DEFAULT 'active',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{normalize_page, Page};

/// Project lifecycle status
///
/// A plain enum with no transition restrictions: any authorized update may
/// set any value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Completed,
    Archived,
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Active
    }
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Archived => "archived",
        }
    }
}

/// Project owned by a user
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Owning user; the sole authorized actor for this project
    pub user_id: Uuid,

    /// Project name
    pub name: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Current status
    pub status: ProjectStatus,

    /// Number of tasks in this project (computed on read)
    pub tasks_count: i64,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project
///
/// `user_id` is always injected from the acting identity, never from
/// client input.
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
}

/// Input for a partial project update
///
/// Only `Some` fields are written. `description` uses a double `Option`:
/// the outer layer is key presence, the inner layer is nullability.
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<ProjectStatus>,
}

/// Optional, conjunctive listing filters
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    /// Case-insensitive substring match on `name`
    pub search: Option<String>,

    /// Exact status match
    pub status: Option<ProjectStatus>,
}

const PROJECT_COLUMNS: &str = "id, user_id, name, description, status, \
     (SELECT COUNT(*) FROM tasks WHERE tasks.project_id = projects.id) AS tasks_count, \
     created_at, updated_at";

impl Project {
    /// Creates a new project
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (user_id, name, description, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, description, status,
                      0::BIGINT AS tasks_count, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.status)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");

        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(project)
    }

    /// Applies a partial update and returns the fresh row
    ///
    /// Returns `None` if the project no longer exists.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build the SET list from whichever fields are present
        let mut query = String::from("UPDATE projects SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }

        query.push_str(" WHERE id = $1");

        let mut q = sqlx::query(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }

        let result = q.execute(pool).await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Self::find_by_id(pool, id).await
    }

    /// Deletes a project
    ///
    /// Tasks cascade at the store level.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists one page of the caller's projects, newest-created first
    ///
    /// The ownership scope is always applied before the optional filters;
    /// filters are conjunctive.
    pub async fn search(
        pool: &PgPool,
        user_id: Uuid,
        filter: &ProjectFilter,
        page: i64,
        per_page: i64,
    ) -> Result<Page<Self>, sqlx::Error> {
        let page = normalize_page(page);

        let mut conditions = String::from("WHERE user_id = $1");
        let mut bind_count = 1;

        let pattern = filter.search.as_ref().map(|s| format!("%{}%", s));
        if pattern.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(" AND name ILIKE ${}", bind_count));
        }
        if filter.status.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(" AND status = ${}", bind_count));
        }

        let count_query = format!("SELECT COUNT(*) FROM projects {conditions}");
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_query).bind(user_id);
        if let Some(ref pattern) = pattern {
            count_q = count_q.bind(pattern);
        }
        if let Some(status) = filter.status {
            count_q = count_q.bind(status);
        }
        let total = count_q.fetch_one(pool).await?;

        let list_query = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects {conditions} \
             ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            bind_count + 1,
            bind_count + 2,
        );
        let mut list_q = sqlx::query_as::<_, Project>(&list_query).bind(user_id);
        if let Some(ref pattern) = pattern {
            list_q = list_q.bind(pattern);
        }
        if let Some(status) = filter.status {
            list_q = list_q.bind(status);
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

    /// Counts the caller's projects, optionally narrowed to one status
    pub async fn count_by_user(
        pool: &PgPool,
        user_id: Uuid,
        status: Option<ProjectStatus>,
    ) -> Result<i64, sqlx::Error> {
        let count = match status {
            Some(status) => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM projects WHERE user_id = $1 AND status = $2",
                )
                .bind(user_id)
                .bind(status)
                .fetch_one(pool)
                .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects WHERE user_id = $1")
                    .bind(user_id)
                    .fetch_one(pool)
                    .await?
            }
        };

        Ok(count)
    }

    /// Total number of projects across all users
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects")
            .fetch_one(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_default_is_active() {
        assert_eq!(ProjectStatus::default(), ProjectStatus::Active);
    }

    #[test]
    fn test_status_as_str() {
        assert_eq!(ProjectStatus::Active.as_str(), "active");
        assert_eq!(ProjectStatus::Completed.as_str(), "completed");
        assert_eq!(ProjectStatus::Archived.as_str(), "archived");
    }

    #[test]
    fn test_status_serde_roundtrip() {
        let json = serde_json::to_string(&ProjectStatus::Archived).unwrap();
        assert_eq!(json, "\"archived\"");

        let status: ProjectStatus = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(status, ProjectStatus::Active);
    }

    #[test]
    fn test_update_project_default_is_empty_patch() {
        let update = UpdateProject::default();
        assert!(update.name.is_none());
        assert!(update.description.is_none());
        assert!(update.status.is_none());
    }
}
