/// Domain operations
///
/// One function per externally visible operation. Both the JSON API and
/// the interactive surface call through here, so the guard checks,
/// validation, and write semantics exist exactly once. Every operation
/// takes the acting [`Identity`](crate::auth::middleware::Identity)
/// explicitly.
///
/// Operations return [`OpError`]; each server surface maps it to its own
/// presentation (HTTP status codes, inline form errors).

use serde::{Deserialize, Deserializer, Serialize};
use validator::ValidationErrors;

use crate::auth::authorization::{AuthzError, ADMIN_REQUIRED_MESSAGE};

pub mod dashboard;
pub mod project;
pub mod tag;
pub mod task;

/// Paginated listings serve this many items per page on the JSON API.
pub const API_PAGE_SIZE: i64 = 15;

/// Paginated listings serve this many items per page on the interactive
/// surface.
pub const UI_PAGE_SIZE: i64 = 10;

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Human-readable message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error type for domain operations
#[derive(Debug, thiserror::Error)]
pub enum OpError {
    /// Resource does not exist
    #[error("Resource not found")]
    NotFound,

    /// Caller does not own the resource
    #[error("Forbidden")]
    Forbidden,

    /// Operation is restricted to administrators
    #[error("{ADMIN_REQUIRED_MESSAGE}")]
    AdminRequired,

    /// One or more fields failed validation; all failures are reported
    /// together
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl OpError {
    /// Builds a validation error for a single field
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        OpError::Validation(vec![FieldError::new(field, message)])
    }
}

impl From<AuthzError> for OpError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotFound => OpError::NotFound,
            AuthzError::Forbidden => OpError::Forbidden,
            AuthzError::AdminRequired => OpError::AdminRequired,
            AuthzError::DatabaseError(e) => OpError::Database(e),
        }
    }
}

/// Flattens `validator` output into field errors
///
/// Every failing field contributes all of its messages, so a payload with
/// three bad fields comes back with three entries in one response.
pub fn collect_field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect()
}

/// Builds a `ValidationError` carrying a fixed message
pub(crate) fn validation_message(
    code: &'static str,
    message: &'static str,
) -> validator::ValidationError {
    let mut error = validator::ValidationError::new(code);
    error.message = Some(std::borrow::Cow::Borrowed(message));
    error
}

/// Deserializes a field that distinguishes "absent" from "null"
///
/// With `#[serde(default, deserialize_with = "double_option")]` an absent
/// key stays `None`, an explicit `null` becomes `Some(None)`, and a value
/// becomes `Some(Some(v))`. Partial updates rely on this to tell "leave
/// the field alone" apart from "clear it".
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        description: Option<Option<String>>,
    }

    #[test]
    fn test_double_option_absent_vs_null_vs_value() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.description, None);

        let null: Patch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(null.description, Some(None));

        let value: Patch = serde_json::from_str(r#"{"description": "hi"}"#).unwrap();
        assert_eq!(value.description, Some(Some("hi".to_string())));
    }

    #[test]
    fn test_op_error_field_helper() {
        let err = OpError::field("name", "The name field is required.");
        match err {
            OpError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "name");
            }
            _ => panic!("expected validation error"),
        }
    }

    #[test]
    fn test_admin_required_message() {
        assert_eq!(
            OpError::AdminRequired.to_string(),
            "Forbidden. Admin access required."
        );
    }
}
