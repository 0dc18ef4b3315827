/// JSON API route handlers
///
/// Organized by resource:
///
/// - `health`: health check endpoint
/// - `auth`: register, login, refresh, current user
/// - `projects`: project CRUD
/// - `tasks`: task CRUD, nested under a project
/// - `tags`: tag vocabulary, admin-gated writes
/// - `dashboard`: per-user stats and recent activity
///
/// # Response envelopes
///
/// - listings: `{ "data": [...], "meta": { ... } }`
/// - show: the bare resource
/// - create/update: `{ "message", "data" }`
/// - delete: `{ "message" }`

use serde::Serialize;
use taskforge_shared::models::Page;

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod projects;
pub mod tags;
pub mod tasks;

/// Envelope for mutations that return the resource
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub message: String,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

/// Envelope for mutations with nothing to return
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Pagination metadata for listings
#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub current_page: i64,
    pub per_page: i64,
    pub last_page: i64,
}

/// Envelope for paginated listings
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> From<Page<T>> for ListResponse<T> {
    fn from(page: Page<T>) -> Self {
        let meta = PageMeta {
            total: page.total,
            current_page: page.current_page,
            per_page: page.per_page,
            last_page: page.last_page(),
        };

        Self {
            data: page.data,
            meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_response_meta() {
        let page = Page {
            data: vec![1, 2, 3],
            total: 31,
            current_page: 2,
            per_page: 15,
        };

        let response = ListResponse::from(page);
        assert_eq!(response.data.len(), 3);
        assert_eq!(response.meta.total, 31);
        assert_eq!(response.meta.last_page, 3);
    }
}
