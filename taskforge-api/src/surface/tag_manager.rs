/// Session state for the tag administration screen
///
/// The manager itself is role-agnostic; the admin requirement is
/// enforced by the operations it calls, so a non-admin session gets the
/// same refusal the JSON API would give.

use sqlx::PgPool;
use taskforge_shared::{
    auth::middleware::Identity,
    models::tag::{self, Tag},
    models::Page,
    ops::{self, tag::CreateTagInput, tag::UpdateTagInput, FieldError, OpError},
};
use uuid::Uuid;

use super::error_for;

/// Modal form fields
#[derive(Debug, Clone)]
pub struct TagForm {
    pub name: String,
    pub color: String,
}

impl Default for TagForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            color: tag::DEFAULT_COLOR.to_string(),
        }
    }
}

/// Tag screen view model
#[derive(Debug, Default)]
pub struct TagManager {
    /// Name search, applied as a case-insensitive substring
    pub search: String,

    /// 1-based page of the listing
    pub page: i64,

    /// Whether the create/edit modal is open
    pub show_modal: bool,

    /// The tag being edited, or `None` when creating
    pub editing: Option<Uuid>,

    /// Current form contents
    pub form: TagForm,

    /// Inline validation errors from the last save attempt
    pub errors: Vec<FieldError>,

    /// Tag awaiting delete confirmation
    pub confirming_delete: Option<Uuid>,
}

impl TagManager {
    pub fn new() -> Self {
        Self {
            page: 1,
            ..Default::default()
        }
    }

    /// Opens the modal with a blank form and the default color
    pub fn open_create(&mut self) {
        self.form = TagForm::default();
        self.editing = None;
        self.errors.clear();
        self.show_modal = true;
    }

    /// Opens the modal pre-filled from an existing tag
    pub fn open_edit(&mut self, tag: &Tag) {
        self.form = TagForm {
            name: tag.name.clone(),
            color: tag.color.clone(),
        };
        self.editing = Some(tag.id);
        self.errors.clear();
        self.show_modal = true;
    }

    /// Closes the modal and discards form state
    pub fn close_modal(&mut self) {
        self.show_modal = false;
        self.editing = None;
        self.form = TagForm::default();
        self.errors.clear();
    }

    /// Updates the search term and resets pagination
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    pub fn goto_page(&mut self, page: i64) {
        self.page = page.max(1);
    }

    /// Marks a tag for deletion, pending confirmation
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

    /// Loads the current page of tags
    pub async fn load_page(&self, pool: &PgPool) -> Result<Page<Tag>, OpError> {
        let search = if self.search.is_empty() {
            None
        } else {
            Some(self.search.as_str())
        };

        ops::tag::search(pool, search, self.page, ops::UI_PAGE_SIZE).await
    }

    /// Saves the form, creating or updating depending on mode
    ///
    /// Validation failures (including a taken name) land in `errors` and
    /// return `Ok(None)`; a role refusal propagates.
    pub async fn save(
        &mut self,
        pool: &PgPool,
        identity: &Identity,
    ) -> Result<Option<Tag>, OpError> {
        self.errors.clear();

        let result = match self.editing {
            None => {
                ops::tag::create(
                    pool,
                    identity,
                    CreateTagInput {
                        name: self.form.name.clone(),
                        color: Some(self.form.color.clone()),
                    },
                )
                .await
            }
            Some(id) => {
                ops::tag::update(
                    pool,
                    identity,
                    id,
                    UpdateTagInput {
                        name: Some(self.form.name.clone()),
                        color: Some(self.form.color.clone()),
                    },
                )
                .await
            }
        };

        match result {
            Ok(tag) => {
                self.close_modal();
                Ok(Some(tag))
            }
            Err(OpError::Validation(errors)) => {
                self.errors = errors;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Deletes the tag pending confirmation
    pub async fn delete_confirmed(
        &mut self,
        pool: &PgPool,
        identity: &Identity,
    ) -> Result<(), OpError> {
        if let Some(id) = self.confirming_delete.take() {
            ops::tag::remove(pool, identity, id).await?;
        }

        Ok(())
    }
}
