/// Session state for a project's task board
///
/// One manager per opened project; the project is fixed at construction
/// and every load or save goes through the guard with it, so the board
/// can never show or touch tasks of another project.

use chrono::NaiveDate;
use sqlx::PgPool;
use taskforge_shared::{
    auth::middleware::Identity,
    models::task::{Task, TaskFilter, TaskPriority, TaskStatus},
    models::Page,
    ops::{self, task::CreateTaskInput, task::UpdateTaskInput, FieldError, OpError},
};
use uuid::Uuid;

use super::error_for;

/// Modal form fields
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,

    /// Checked tags; submitted as the complete new set
    pub tag_ids: Vec<Uuid>,
}

/// Task board view model
#[derive(Debug)]
pub struct TaskManager {
    /// The project this board belongs to; immutable for the session
    pub project_id: Uuid,

    /// Title search, applied as a case-insensitive substring
    pub search: String,

    pub status_filter: Option<TaskStatus>,
    pub priority_filter: Option<TaskPriority>,

    /// Only tasks carrying this tag
    pub tag_filter: Option<Uuid>,

    /// 1-based page of the listing
    pub page: i64,

    /// Whether the create/edit modal is open
    pub show_modal: bool,

    /// The task being edited, or `None` when creating
    pub editing: Option<Uuid>,

    /// Current form contents
    pub form: TaskForm,

    /// Inline validation errors from the last save attempt
    pub errors: Vec<FieldError>,

    /// Task awaiting delete confirmation
    pub confirming_delete: Option<Uuid>,
}

impl TaskManager {
    pub fn new(project_id: Uuid) -> Self {
        Self {
            project_id,
            search: String::new(),
            status_filter: None,
            priority_filter: None,
            tag_filter: None,
            page: 1,
            show_modal: false,
            editing: None,
            form: TaskForm::default(),
            errors: Vec::new(),
            confirming_delete: None,
        }
    }

    /// Opens the modal with a blank form
    pub fn open_create(&mut self) {
        self.form = TaskForm::default();
        self.editing = None;
        self.errors.clear();
        self.show_modal = true;
    }

    /// Opens the modal pre-filled from an existing task
    pub fn open_edit(&mut self, task: &Task) {
        self.form = TaskForm {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            status: Some(task.status),
            priority: Some(task.priority),
            due_date: task.due_date,
            tag_ids: task.tags.iter().map(|t| t.id).collect(),
        };
        self.editing = Some(task.id);
        self.errors.clear();
        self.show_modal = true;
    }

    /// Closes the modal and discards form state
    pub fn close_modal(&mut self) {
        self.show_modal = false;
        self.editing = None;
        self.form = TaskForm::default();
        self.errors.clear();
    }

    /// Updates the search term and resets pagination
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    pub fn set_status_filter(&mut self, status: Option<TaskStatus>) {
        self.status_filter = status;
        self.page = 1;
    }

    pub fn set_priority_filter(&mut self, priority: Option<TaskPriority>) {
        self.priority_filter = priority;
        self.page = 1;
    }

    pub fn set_tag_filter(&mut self, tag: Option<Uuid>) {
        self.tag_filter = tag;
        self.page = 1;
    }

    pub fn goto_page(&mut self, page: i64) {
        self.page = page.max(1);
    }

    /// Toggles a tag checkbox in the form
    pub fn toggle_tag(&mut self, tag_id: Uuid) {
        if let Some(pos) = self.form.tag_ids.iter().position(|&id| id == tag_id) {
            self.form.tag_ids.remove(pos);
        } else {
            self.form.tag_ids.push(tag_id);
        }
    }

    /// Marks a task for deletion, pending confirmation
    pub fn confirm_delete(&mut self, id: Uuid) {
        self.confirming_delete = Some(id);
    }

    pub fn cancel_delete(&mut self) {
        self.confirming_delete = None;
    }

    /// First inline error for a form field, if any
    pub fn error_for(&self, field: &str) -> Option<&str> {
        error_for(&self.errors, field)
    }

    fn filter(&self) -> TaskFilter {
        TaskFilter {
            search: if self.search.is_empty() {
                None
            } else {
                Some(self.search.clone())
            },
            status: self.status_filter,
            priority: self.priority_filter,
            tag: self.tag_filter,
        }
    }

    /// Loads the current page of the board
    pub async fn load_page(
        &self,
        pool: &PgPool,
        identity: &Identity,
    ) -> Result<Page<Task>, OpError> {
        ops::task::list(
            pool,
            identity,
            self.project_id,
            &self.filter(),
            self.page,
            ops::UI_PAGE_SIZE,
        )
        .await
    }

    /// Saves the form, creating or updating depending on mode
    ///
    /// The form submits every field including the full tag set, so edits
    /// always replace the associations. Validation failures land in
    /// `errors` and return `Ok(None)`.
    pub async fn save(
        &mut self,
        pool: &PgPool,
        identity: &Identity,
    ) -> Result<Option<Task>, OpError> {
        self.errors.clear();

        let description = if self.form.description.is_empty() {
            None
        } else {
            Some(self.form.description.clone())
        };

        let result = match self.editing {
            None => {
                ops::task::create(
                    pool,
                    identity,
                    self.project_id,
                    CreateTaskInput {
                        title: self.form.title.clone(),
                        description,
                        status: self.form.status,
                        priority: self.form.priority,
                        due_date: self.form.due_date,
                        tag_ids: self.form.tag_ids.clone(),
                    },
                )
                .await
            }
            Some(id) => {
                ops::task::update(
                    pool,
                    identity,
                    self.project_id,
                    id,
                    UpdateTaskInput {
                        title: Some(self.form.title.clone()),
                        description: Some(description),
                        status: self.form.status,
                        priority: self.form.priority,
                        due_date: Some(self.form.due_date),
                        tag_ids: Some(self.form.tag_ids.clone()),
                    },
                )
                .await
            }
        };

        match result {
            Ok(task) => {
                self.close_modal();
                Ok(Some(task))
            }
            Err(OpError::Validation(errors)) => {
                self.errors = errors;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Deletes the task pending confirmation
    pub async fn delete_confirmed(
        &mut self,
        pool: &PgPool,
        identity: &Identity,
    ) -> Result<(), OpError> {
        if let Some(id) = self.confirming_delete.take() {
            ops::task::remove(pool, identity, self.project_id, id).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_tag() {
        let mut manager = TaskManager::new(Uuid::new_v4());
        let tag = Uuid::new_v4();

        manager.toggle_tag(tag);
        assert_eq!(manager.form.tag_ids, vec![tag]);

        manager.toggle_tag(tag);
        assert!(manager.form.tag_ids.is_empty());
    }

    #[test]
    fn test_open_edit_prefills_form() {
        use chrono::Utc;
        use taskforge_shared::models::tag::Tag;

        let tag = Tag {
            id: Uuid::new_v4(),
            name: "backend".to_string(),
            color: "#3B82F6".to_string(),
            tasks_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let task = Task {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Write docs".to_string(),
            description: None,
            status: TaskStatus::InProgress,
            priority: TaskPriority::High,
            due_date: NaiveDate::from_ymd_opt(2025, 7, 1),
            tags: vec![tag.clone()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let mut manager = TaskManager::new(task.project_id);
        manager.open_edit(&task);

        assert_eq!(manager.editing, Some(task.id));
        assert_eq!(manager.form.title, "Write docs");
        assert_eq!(manager.form.status, Some(TaskStatus::InProgress));
        assert_eq!(manager.form.tag_ids, vec![tag.id]);
        assert!(manager.show_modal);
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut manager = TaskManager::new(Uuid::new_v4());
        manager.goto_page(5);

        manager.set_priority_filter(Some(TaskPriority::Urgent));
        assert_eq!(manager.page, 1);

        manager.goto_page(2);
        manager.set_tag_filter(Some(Uuid::new_v4()));
        assert_eq!(manager.page, 1);
    }
}
