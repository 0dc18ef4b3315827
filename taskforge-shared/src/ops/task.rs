/// Task operations
///
/// Every operation starts from the project in the path: listing and
/// creation prove ownership of that project, while single-task operations
/// additionally prove the task belongs to it. A task reached through the
/// wrong project is rejected even when both resources exist.

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::auth::authorization::{find_owned_project, find_project_task};
use crate::auth::middleware::Identity;
use crate::models::tag::Tag;
use crate::models::task::{
    CreateTask, Task, TaskFilter, TaskPriority, TaskStatus, UpdateTask,
};
use crate::models::Page;

use super::{collect_field_errors, double_option, validation_message, OpError};

/// Payload for creating a task
///
/// `project_id` comes from the path and the creator from the acting
/// identity; neither is accepted in the body.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskInput {
    #[validate(length(
        min = 1,
        max = 255,
        message = "The title must be between 1 and 255 characters."
    ))]
    pub title: String,

    #[validate(length(max = 5000, message = "The description may not be greater than 5000 characters."))]
    pub description: Option<String>,

    /// Defaults to `pending` when absent
    pub status: Option<TaskStatus>,

    /// Defaults to `medium` when absent
    pub priority: Option<TaskPriority>,

    pub due_date: Option<NaiveDate>,

    /// Tags to attach; every id must name an existing tag
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

/// Payload for a partial task update
///
/// Absent fields are untouched. `description` and `due_date` distinguish
/// absent from an explicit `null`. For `tag_ids` the same distinction
/// governs the whole association set: an absent key leaves it alone, a
/// present list (even empty) replaces it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskInput {
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    pub status: Option<TaskStatus>,

    pub priority: Option<TaskPriority>,

    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,

    pub tag_ids: Option<Vec<Uuid>>,
}

impl Validate for UpdateTaskInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(ref title) = self.title {
            let len = title.chars().count();
            if len < 1 || len > 255 {
                errors.add(
                    "title",
                    validation_message(
                        "length",
                        "The title must be between 1 and 255 characters.",
                    ),
                );
            }
        }

        if let Some(Some(ref description)) = self.description {
            if description.chars().count() > 5000 {
                errors.add(
                    "description",
                    validation_message(
                        "length",
                        "The description may not be greater than 5000 characters.",
                    ),
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Rejects tag ids that do not name an existing tag
async fn require_tags_exist(pool: &PgPool, tag_ids: &[Uuid]) -> Result<(), OpError> {
    let missing = Tag::missing_ids(pool, tag_ids).await?;
    if !missing.is_empty() {
        return Err(OpError::field(
            "tag_ids",
            "One or more selected tags do not exist.",
        ));
    }

    Ok(())
}

/// Lists one page of a project's tasks
pub async fn list(
    pool: &PgPool,
    identity: &Identity,
    project_id: Uuid,
    filter: &TaskFilter,
    page: i64,
    per_page: i64,
) -> Result<Page<Task>, OpError> {
    find_owned_project(pool, identity, project_id).await?;

    let tasks = Task::search(pool, project_id, filter, page, per_page).await?;
    Ok(tasks)
}

/// Creates a task in one of the caller's projects
pub async fn create(
    pool: &PgPool,
    identity: &Identity,
    project_id: Uuid,
    input: CreateTaskInput,
) -> Result<Task, OpError> {
    find_owned_project(pool, identity, project_id).await?;

    input
        .validate()
        .map_err(|e| OpError::Validation(collect_field_errors(&e)))?;

    require_tags_exist(pool, &input.tag_ids).await?;

    let task = Task::create(
        pool,
        CreateTask {
            project_id,
            user_id: identity.user_id,
            title: input.title,
            description: input.description,
            status: input.status.unwrap_or_default(),
            priority: input.priority.unwrap_or_default(),
            due_date: input.due_date,
            tag_ids: input.tag_ids,
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, project_id = %project_id, "task created");

    Ok(task)
}

/// Fetches a task through its project path
pub async fn get(
    pool: &PgPool,
    identity: &Identity,
    project_id: Uuid,
    task_id: Uuid,
) -> Result<Task, OpError> {
    let (_, task) = find_project_task(pool, identity, project_id, task_id).await?;
    Ok(task)
}

/// Applies a partial update to a task
///
/// The parent project is immutable; nothing in the payload can move a
/// task between projects.
pub async fn update(
    pool: &PgPool,
    identity: &Identity,
    project_id: Uuid,
    task_id: Uuid,
    input: UpdateTaskInput,
) -> Result<Task, OpError> {
    find_project_task(pool, identity, project_id, task_id).await?;

    input
        .validate()
        .map_err(|e| OpError::Validation(collect_field_errors(&e)))?;

    if let Some(ref tag_ids) = input.tag_ids {
        require_tags_exist(pool, tag_ids).await?;
    }

    let task = Task::update(
        pool,
        task_id,
        UpdateTask {
            title: input.title,
            description: input.description,
            status: input.status,
            priority: input.priority,
            due_date: input.due_date,
            tag_ids: input.tag_ids,
        },
    )
    .await?
    .ok_or(OpError::NotFound)?;

    Ok(task)
}

/// Deletes a task; its tag associations cascade
pub async fn remove(
    pool: &PgPool,
    identity: &Identity,
    project_id: Uuid,
    task_id: Uuid,
) -> Result<(), OpError> {
    find_project_task(pool, identity, project_id, task_id).await?;

    if !Task::delete(pool, task_id).await? {
        return Err(OpError::NotFound);
    }

    tracing::info!(task_id = %task_id, project_id = %project_id, "task deleted");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_input_rejects_empty_title() {
        let input = CreateTaskInput {
            title: String::new(),
            description: None,
            status: None,
            priority: None,
            due_date: None,
            tag_ids: vec![],
        };

        assert!(input.validate().is_err());
    }

    #[test]
    fn test_create_input_reports_all_failures_together() {
        let input = CreateTaskInput {
            title: "t".repeat(256),
            description: Some("d".repeat(5001)),
            status: None,
            priority: None,
            due_date: None,
            tag_ids: vec![],
        };

        let errors = input.validate().unwrap_err();
        assert_eq!(collect_field_errors(&errors).len(), 2);
    }

    #[test]
    fn test_update_input_json_distinguishes_absent_tag_ids() {
        let absent: UpdateTaskInput = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert!(absent.tag_ids.is_none());

        let empty: UpdateTaskInput = serde_json::from_str(r#"{"tag_ids": []}"#).unwrap();
        assert_eq!(empty.tag_ids, Some(vec![]));
    }

    #[test]
    fn test_update_input_json_distinguishes_null_due_date() {
        let absent: UpdateTaskInput = serde_json::from_str("{}").unwrap();
        assert!(absent.due_date.is_none());

        let null: UpdateTaskInput = serde_json::from_str(r#"{"due_date": null}"#).unwrap();
        assert_eq!(null.due_date, Some(None));

        let set: UpdateTaskInput = serde_json::from_str(r#"{"due_date": "2025-06-01"}"#).unwrap();
        assert_eq!(
            set.due_date,
            Some(Some(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()))
        );
    }

    #[test]
    fn test_update_input_empty_patch_is_valid() {
        assert!(UpdateTaskInput::default().validate().is_ok());
    }
}
