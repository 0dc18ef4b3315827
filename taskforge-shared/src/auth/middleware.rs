/// Authentication middleware for Axum
///
/// Validates Bearer tokens from the `Authorization` header, looks the
/// user up in the database, and inserts an [`Identity`] into request
/// extensions for handlers to extract.
///
/// The role is read from the database on every request rather than from
/// the token, so promoting or demoting a user takes effect immediately
/// instead of at token expiry.
///
/// # Example
///
/// ```no_run
/// use axum::{Extension, Router, middleware, routing::get};
/// use taskforge_shared::auth::middleware::{create_auth_middleware, Identity};
/// use sqlx::PgPool;
///
/// async fn handler(Extension(identity): Extension<Identity>) -> String {
///     format!("Hello, user {}!", identity.user_id)
/// }
///
/// fn router(pool: PgPool) -> Router {
///     Router::new()
///         .route("/me", get(handler))
///         .layer(middleware::from_fn(create_auth_middleware(pool, "secret")))
/// }
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};
use crate::models::user::{User, UserRole};

/// The acting identity, resolved once per request
///
/// Every ownership and role check downstream takes this explicitly;
/// nothing below the middleware reads ambient request state.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Identity {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Role at the time the request was authenticated
    pub role: UserRole,
}

impl Identity {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role)
    }
}

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),

    /// Token subject no longer exists
    UnknownUser,

    /// Database error
    DatabaseError(String),
}

impl AuthError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials".to_string())
            }
            AuthError::InvalidFormat(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AuthError::UnknownUser => {
                (StatusCode::UNAUTHORIZED, "Unknown user".to_string())
            }
            AuthError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        let error = if status == StatusCode::UNAUTHORIZED {
            "unauthorized"
        } else {
            "internal_server_error"
        };

        (status, Json(json!({ "error": error, "message": message }))).into_response()
    }
}

/// JWT authentication middleware
///
/// Validates the `Authorization: Bearer <token>` header, resolves the
/// subject against the users table, and attaches an [`Identity`] to the
/// request.
///
/// # Errors
///
/// Returns 401 Unauthorized if the header is missing or malformed, the
/// token fails validation, or the user no longer exists.
pub async fn jwt_auth_middleware(
    pool: PgPool,
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_access_token(token, &secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    // Deleted users hold valid tokens until expiry; the lookup also gives
    // us the current role.
    let user = User::find_by_id(&pool, claims.sub)
        .await
        .map_err(|e| AuthError::DatabaseError(format!("Database error: {}", e)))?
        .ok_or(AuthError::UnknownUser)?;

    req.extensions_mut().insert(Identity::from(&user));

    Ok(next.run(req).await)
}

/// Creates a JWT authentication middleware closure
///
/// Captures the pool and secret so the middleware can be handed to
/// `axum::middleware::from_fn`.
pub fn create_auth_middleware(
    pool: PgPool,
    secret: impl Into<String>,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>>
       + Clone {
    let secret = secret.into();
    move |req, next| {
        let pool = pool.clone();
        let secret = secret.clone();
        Box::pin(jwt_auth_middleware(pool, secret, req, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_admin_check() {
        let member = Identity::new(Uuid::new_v4(), UserRole::Member);
        assert!(!member.is_admin());

        let admin = Identity::new(Uuid::new_v4(), UserRole::Admin);
        assert!(admin.is_admin());
    }

    #[test]
    fn test_auth_error_into_response() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidToken("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::DatabaseError("down".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
