/// Session state for the project management screen
///
/// Listing state (search, status filter, page) and the create/edit modal
/// share one struct because the screen renders both at once. Changing a
/// filter resets pagination to the first page so the visible page always
/// exists under the new filter.

use sqlx::PgPool;
use taskforge_shared::{
    auth::middleware::Identity,
    models::project::{Project, ProjectFilter, ProjectStatus},
    models::Page,
    ops::{self, project::CreateProjectInput, project::UpdateProjectInput, FieldError, OpError},
};
use uuid::Uuid;

use super::error_for;

/// Modal form fields
#[derive(Debug, Clone, Default)]
pub struct ProjectForm {
    pub name: String,
    pub description: String,
    pub status: Option<ProjectStatus>,
}

/// Project screen view model
#[derive(Debug, Default)]
pub struct ProjectManager {
    /// Name search, applied as a case-insensitive substring
    pub search: String,

    /// Optional status filter
    pub status_filter: Option<ProjectStatus>,

    /// 1-based page of the listing
    pub page: i64,

    /// Whether the create/edit modal is open
    pub show_modal: bool,

    /// The project being edited, or `None` when creating
    pub editing: Option<Uuid>,

    /// Current form contents
    pub form: ProjectForm,

    /// Inline validation errors from the last save attempt
    pub errors: Vec<FieldError>,

    /// Project awaiting delete confirmation
    pub confirming_delete: Option<Uuid>,
}

impl ProjectManager {
    pub fn new() -> Self {
        Self {
            page: 1,
            ..Default::default()
        }
    }

    /// Opens the modal with a blank form
    pub fn open_create(&mut self) {
        self.form = ProjectForm::default();
        self.editing = None;
        self.errors.clear();
        self.show_modal = true;
    }

    /// Opens the modal pre-filled from an existing project
    pub fn open_edit(&mut self, project: &Project) {
        self.form = ProjectForm {
            name: project.name.clone(),
            description: project.description.clone().unwrap_or_default(),
            status: Some(project.status),
        };
        self.editing = Some(project.id);
        self.errors.clear();
        self.show_modal = true;
    }

    /// Closes the modal and discards form state
    pub fn close_modal(&mut self) {
        self.show_modal = false;
        self.editing = None;
        self.form = ProjectForm::default();
        self.errors.clear();
    }

    /// Updates the search term and resets pagination
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    /// Updates the status filter and resets pagination
    pub fn set_status_filter(&mut self, status: Option<ProjectStatus>) {
        self.status_filter = status;
        self.page = 1;
    }

    pub fn goto_page(&mut self, page: i64) {
        self.page = page.max(1);
    }

    /// Marks a project for deletion, pending confirmation
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

    fn filter(&self) -> ProjectFilter {
        ProjectFilter {
            search: if self.search.is_empty() {
                None
            } else {
                Some(self.search.clone())
            },
            status: self.status_filter,
        }
    }

    /// Loads the current page of the caller's projects
    pub async fn load_page(
        &self,
        pool: &PgPool,
        identity: &Identity,
    ) -> Result<Page<Project>, OpError> {
        ops::project::list(pool, identity, &self.filter(), self.page, ops::UI_PAGE_SIZE).await
    }

    /// Saves the form, creating or updating depending on mode
    ///
    /// Validation failures are captured into `errors` and leave the modal
    /// open; `Ok(None)` signals the form needs correction. Any other
    /// failure propagates.
    pub async fn save(
        &mut self,
        pool: &PgPool,
        identity: &Identity,
    ) -> Result<Option<Project>, OpError> {
        self.errors.clear();

        let description = if self.form.description.is_empty() {
            None
        } else {
            Some(self.form.description.clone())
        };

        let result = match self.editing {
            None => {
                ops::project::create(
                    pool,
                    identity,
                    CreateProjectInput {
                        name: self.form.name.clone(),
                        description,
                        status: self.form.status,
                    },
                )
                .await
            }
            Some(id) => {
                // The form always submits every field, so the patch sets
                // them all; an emptied description clears the column.
                ops::project::update(
                    pool,
                    identity,
                    id,
                    UpdateProjectInput {
                        name: Some(self.form.name.clone()),
                        description: Some(description),
                        status: self.form.status,
                    },
                )
                .await
            }
        };

        match result {
            Ok(project) => {
                self.close_modal();
                Ok(Some(project))
            }
            Err(OpError::Validation(errors)) => {
                self.errors = errors;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Deletes the project pending confirmation
    pub async fn delete_confirmed(
        &mut self,
        pool: &PgPool,
        identity: &Identity,
    ) -> Result<(), OpError> {
        if let Some(id) = self.confirming_delete.take() {
            ops::project::remove(pool, identity, id).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_create_resets_form() {
        let mut manager = ProjectManager::new();
        manager.form.name = "leftover".to_string();
        manager.editing = Some(Uuid::new_v4());

        manager.open_create();

        assert!(manager.show_modal);
        assert!(manager.editing.is_none());
        assert!(manager.form.name.is_empty());
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut manager = ProjectManager::new();
        manager.goto_page(4);

        manager.set_search("api");
        assert_eq!(manager.page, 1);

        manager.goto_page(3);
        manager.set_status_filter(Some(ProjectStatus::Archived));
        assert_eq!(manager.page, 1);
    }

    #[test]
    fn test_delete_is_two_step() {
        let mut manager = ProjectManager::new();
        let id = Uuid::new_v4();

        manager.confirm_delete(id);
        assert_eq!(manager.confirming_delete, Some(id));

        manager.cancel_delete();
        assert!(manager.confirming_delete.is_none());
    }

    #[test]
    fn test_error_lookup() {
        let mut manager = ProjectManager::new();
        manager.errors = vec![FieldError::new("name", "The name field is required.")];

        assert_eq!(
            manager.error_for("name"),
            Some("The name field is required.")
        );
        assert!(manager.error_for("description").is_none());
    }
}
