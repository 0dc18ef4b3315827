/// Stateful managers backing the interactive UI
///
/// Each manager is a per-session view model for one resource: it holds
/// the listing state (search, filters, current page) and the modal form
/// state (open/closed, create-vs-edit, field values, inline errors, a
/// pending delete confirmation).
///
/// Managers contain no business logic of their own. Loading and saving
/// go through the same `ops` functions the JSON API uses, with the same
/// explicit identity, so guard decisions and validation cannot drift
/// between the two surfaces. Validation failures never escape as errors;
/// they land in the manager's `errors` list and the modal stays open for
/// another attempt.

pub mod project_manager;
pub mod tag_manager;
pub mod task_manager;

pub use project_manager::ProjectManager;
pub use tag_manager::TagManager;
pub use task_manager::TaskManager;

use taskforge_shared::ops::FieldError;

/// Looks up the first message recorded for a field
pub(crate) fn error_for<'a>(errors: &'a [FieldError], field: &str) -> Option<&'a str> {
    errors
        .iter()
        .find(|e| e.field == field)
        .map(|e| e.message.as_str())
}
