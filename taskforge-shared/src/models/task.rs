/// Task model and database operations
///
/// Tasks are nested under a project and carry a denormalized creator
/// reference. A task is only ever reachable through its own project: the
/// guard requires both project ownership and `task.project_id` matching
/// the path project.
///
/// Tags are attached many-to-many through `task_tag`; the association set
/// is replaced wholesale (never incrementally) and always inside the same
/// transaction as the task write, so a concurrent reader never observes a
/// half-updated tag set.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('pending', 'in_progress', 'completed');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high', 'urgent');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'pending',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     due_date DATE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

use super::tag::Tag;
use super::{normalize_page, Page};

/// Task workflow status
///
/// Plain enum, no transition restrictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }
}

/// Task belonging to a project
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Parent project; immutable after creation (no reparenting)
    pub project_id: Uuid,

    /// Creator, set from the acting identity at creation
    pub user_id: Uuid,

    /// Task title
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Current status
    pub status: TaskStatus,

    /// Priority level
    pub priority: TaskPriority,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// Attached tags, loaded separately from `task_tag`
    #[sqlx(skip)]
    pub tags: Vec<Tag>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
///
/// `project_id` and `user_id` come from the request path and the acting
/// identity respectively, never from the request body.
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    /// Tags to attach; duplicates collapse, empty means none
    pub tag_ids: Vec<Uuid>,
}

/// Input for a partial task update
///
/// Presence and absence are distinct: a `None` field is untouched, while
/// `Some(...)` is written. For `tag_ids`, `Some(vec![])` clears every
/// association and `None` leaves the set as it was.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<NaiveDate>>,
    pub tag_ids: Option<Vec<Uuid>>,
}

/// Optional, conjunctive listing filters
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Case-insensitive substring match on `title`
    pub search: Option<String>,

    /// Exact status match
    pub status: Option<TaskStatus>,

    /// Exact priority match
    pub priority: Option<TaskPriority>,

    /// Only tasks whose tag set contains this tag (existence join)
    pub tag: Option<Uuid>,
}

const TASK_COLUMNS: &str =
    "id, project_id, user_id, title, description, status, priority, due_date, \
     created_at, updated_at";

impl Task {
    /// Creates a task and attaches its tags in one transaction
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO tasks (project_id, user_id, title, description, status, priority, due_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {TASK_COLUMNS}"
        );
        let mut task = sqlx::query_as::<_, Task>(&query)
            .bind(data.project_id)
            .bind(data.user_id)
            .bind(data.title)
            .bind(data.description)
            .bind(data.status)
            .bind(data.priority)
            .bind(data.due_date)
            .fetch_one(&mut *tx)
            .await?;

        if !data.tag_ids.is_empty() {
            Self::sync_tags(&mut tx, task.id, &data.tag_ids).await?;
        }

        tx.commit().await?;

        task.tags = Self::tags_of(pool, task.id).await?;
        Ok(task)
    }

    /// Finds a task by ID, with its tags loaded
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match task {
            Some(mut task) => {
                task.tags = Self::tags_of(pool, task.id).await?;
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    /// Applies a partial update, syncing tags when the list is present
    ///
    /// The column updates and the tag sync commit atomically. Returns
    /// `None` if the task no longer exists.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }

        query.push_str(" WHERE id = $1");

        let mut q = sqlx::query(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }

        let result = q.execute(&mut *tx).await?;
        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        // Key present (even as an empty list) replaces the set; key absent
        // leaves it untouched.
        if let Some(ref tag_ids) = data.tag_ids {
            Self::sync_tags(&mut tx, id, tag_ids).await?;
        }

        tx.commit().await?;

        Self::find_by_id(pool, id).await
    }

    /// Deletes a task
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replaces the task's tag set with exactly `desired`
    ///
    /// Computes the symmetric difference against the current set, deletes
    /// the removed ids and inserts the added ones. Duplicates in `desired`
    /// collapse. Must run inside the caller's transaction.
    pub async fn sync_tags(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        task_id: Uuid,
        desired: &[Uuid],
    ) -> Result<(), sqlx::Error> {
        let current: Vec<Uuid> =
            sqlx::query_scalar("SELECT tag_id FROM task_tag WHERE task_id = $1")
                .bind(task_id)
                .fetch_all(&mut **tx)
                .await?;

        let current: BTreeSet<Uuid> = current.into_iter().collect();
        let desired: BTreeSet<Uuid> = desired.iter().copied().collect();

        let removed: Vec<Uuid> = current.difference(&desired).copied().collect();
        let added: Vec<Uuid> = desired.difference(&current).copied().collect();

        if !removed.is_empty() {
            sqlx::query("DELETE FROM task_tag WHERE task_id = $1 AND tag_id = ANY($2)")
                .bind(task_id)
                .bind(&removed)
                .execute(&mut **tx)
                .await?;
        }

        if !added.is_empty() {
            sqlx::query(
                "INSERT INTO task_tag (task_id, tag_id) SELECT $1, tag_id FROM UNNEST($2::UUID[]) AS t(tag_id)",
            )
            .bind(task_id)
            .bind(&added)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    /// Lists one page of a project's tasks, newest-created first
    ///
    /// The project scope is always applied before the optional filters;
    /// the caller must already have proven ownership of the project. Tags
    /// are batch-loaded for the returned page.
    pub async fn search(
        pool: &PgPool,
        project_id: Uuid,
        filter: &TaskFilter,
        page: i64,
        per_page: i64,
    ) -> Result<Page<Self>, sqlx::Error> {
        let page = normalize_page(page);

        let mut conditions = String::from("WHERE project_id = $1");
        let mut bind_count = 1;

        let pattern = filter.search.as_ref().map(|s| format!("%{}%", s));
        if pattern.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(" AND title ILIKE ${}", bind_count));
        }
        if filter.status.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(" AND status = ${}", bind_count));
        }
        if filter.priority.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(" AND priority = ${}", bind_count));
        }
        if filter.tag.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM task_tag \
                   WHERE task_tag.task_id = tasks.id AND task_tag.tag_id = ${})",
                bind_count
            ));
        }

        let count_query = format!("SELECT COUNT(*) FROM tasks {conditions}");
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_query).bind(project_id);
        if let Some(ref pattern) = pattern {
            count_q = count_q.bind(pattern);
        }
        if let Some(status) = filter.status {
            count_q = count_q.bind(status);
        }
        if let Some(priority) = filter.priority {
            count_q = count_q.bind(priority);
        }
        if let Some(tag) = filter.tag {
            count_q = count_q.bind(tag);
        }
        let total = count_q.fetch_one(pool).await?;

        let list_query = format!(
            "SELECT {TASK_COLUMNS} FROM tasks {conditions} \
             ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            bind_count + 1,
            bind_count + 2,
        );
        let mut list_q = sqlx::query_as::<_, Task>(&list_query).bind(project_id);
        if let Some(ref pattern) = pattern {
            list_q = list_q.bind(pattern);
        }
        if let Some(status) = filter.status {
            list_q = list_q.bind(status);
        }
        if let Some(priority) = filter.priority {
            list_q = list_q.bind(priority);
        }
        if let Some(tag) = filter.tag {
            list_q = list_q.bind(tag);
        }
        let mut data = list_q
            .bind(per_page)
            .bind((page - 1) * per_page)
            .fetch_all(pool)
            .await?;

        Self::load_tags(pool, &mut data).await?;

        Ok(Page {
            data,
            total,
            current_page: page,
            per_page,
        })
    }

    /// Loads the tag sets for a batch of tasks in one query
    pub async fn load_tags(pool: &PgPool, tasks: &mut [Task]) -> Result<(), sqlx::Error> {
        if tasks.is_empty() {
            return Ok(());
        }

        let ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();

        let rows: Vec<(Uuid, Tag)> = sqlx::query_as::<_, TaskTagRow>(
            r#"
            SELECT tt.task_id, t.id, t.name, t.color, t.created_at, t.updated_at
            FROM task_tag tt
            JOIN tags t ON t.id = tt.tag_id
            WHERE tt.task_id = ANY($1)
            ORDER BY t.name
            "#,
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|row| (row.task_id, row.into_tag()))
        .collect();

        let mut by_task: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for (task_id, tag) in rows {
            by_task.entry(task_id).or_default().push(tag);
        }

        for task in tasks.iter_mut() {
            task.tags = by_task.remove(&task.id).unwrap_or_default();
        }

        Ok(())
    }

    /// Loads the tag set of a single task
    pub async fn tags_of(pool: &PgPool, task_id: Uuid) -> Result<Vec<Tag>, sqlx::Error> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.name, t.color, 0::BIGINT AS tasks_count, t.created_at, t.updated_at
            FROM task_tag tt
            JOIN tags t ON t.id = tt.tag_id
            WHERE tt.task_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(tags)
    }

    /// Counts the caller's tasks, optionally narrowed to one status
    pub async fn count_by_user(
        pool: &PgPool,
        user_id: Uuid,
        status: Option<TaskStatus>,
    ) -> Result<i64, sqlx::Error> {
        let count = match status {
            Some(status) => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM tasks WHERE user_id = $1 AND status = $2",
                )
                .bind(user_id)
                .bind(status)
                .fetch_one(pool)
                .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasks WHERE user_id = $1")
                    .bind(user_id)
                    .fetch_one(pool)
                    .await?
            }
        };

        Ok(count)
    }

    /// Counts the caller's overdue tasks (past due and not completed)
    pub async fn count_overdue(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tasks \
             WHERE user_id = $1 AND due_date < CURRENT_DATE AND status != 'completed'",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Total number of tasks across all users
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasks")
            .fetch_one(pool)
            .await
    }

    /// The caller's most recently created tasks, with tags loaded
    pub async fn recent_by_user(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2"
        );
        let mut tasks = sqlx::query_as::<_, Task>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await?;

        Self::load_tags(pool, &mut tasks).await?;

        Ok(tasks)
    }
}

/// Row shape for the batched tag-loading join
#[derive(sqlx::FromRow)]
struct TaskTagRow {
    task_id: Uuid,
    id: Uuid,
    name: String,
    color: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaskTagRow {
    fn into_tag(self) -> Tag {
        Tag {
            id: self.id,
            name: self.name,
            color: self.color,
            tasks_count: 0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }

    #[test]
    fn test_status_serde_uses_snake_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let status: TaskStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(status, TaskStatus::InProgress);
    }

    #[test]
    fn test_priority_as_str() {
        assert_eq!(TaskPriority::Low.as_str(), "low");
        assert_eq!(TaskPriority::Urgent.as_str(), "urgent");
    }

    #[test]
    fn test_update_task_presence_vs_absence() {
        // Absent key: associations untouched
        let untouched = UpdateTask::default();
        assert!(untouched.tag_ids.is_none());

        // Present but empty: clears the set
        let cleared = UpdateTask {
            tag_ids: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(cleared.tag_ids.as_deref(), Some(&[][..]));
    }
}
