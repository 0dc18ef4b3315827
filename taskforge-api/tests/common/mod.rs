/// Common test utilities for integration tests
///
/// Shared infrastructure for the API tests:
/// - test database setup and cleanup
/// - test user creation (member and admin)
/// - JWT token generation
/// - request helpers

use axum::body::Body;
use axum::http::{Request, Response};
use taskforge_api::app::{build_router, AppState};
use taskforge_api::config::Config;
use taskforge_shared::auth::jwt::{create_token, Claims, TokenType};
use taskforge_shared::models::user::{CreateUser, User, UserRole};
use sqlx::PgPool;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub admin: User,
    pub user_token: String,
    pub admin_token: String,
}

impl TestContext {
    /// Creates a new test context against the configured database
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Path relative to Cargo.toml, not this file
        sqlx::migrate!("../migrations").run(&db).await?;

        let user = create_test_user(&db, UserRole::Member).await?;
        let admin = create_test_user(&db, UserRole::Admin).await?;

        let user_token = token_for(&user, &config)?;
        let admin_token = token_for(&admin, &config)?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            admin,
            user_token,
            admin_token,
        })
    }

    /// Authorization header for the member user
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.user_token)
    }

    /// Authorization header for the admin user
    pub fn admin_header(&self) -> String {
        format!("Bearer {}", self.admin_token)
    }

    /// Cleans up test data; projects, tasks, and associations cascade
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE id = ANY($1)")
            .bind(vec![self.user.id, self.admin.id])
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

/// Creates a user with a unique email and the given role
pub async fn create_test_user(db: &PgPool, role: UserRole) -> anyhow::Result<User> {
    let user = User::create(
        db,
        CreateUser {
            name: "Test User".to_string(),
            email: format!("test-{}@example.com", Uuid::new_v4()),
            // Not used by token-based tests
            password_hash: "test_hash".to_string(),
        },
    )
    .await?;

    if role == UserRole::Admin {
        sqlx::query("UPDATE users SET role = 'admin' WHERE id = $1")
            .bind(user.id)
            .execute(db)
            .await?;
    }

    Ok(User::find_by_id(db, user.id).await?.expect("user exists"))
}

/// Mints an access token for a user
pub fn token_for(user: &User, config: &Config) -> anyhow::Result<String> {
    let claims = Claims::new(user.id, TokenType::Access);
    Ok(create_token(&claims, &config.jwt.secret)?)
}

/// Builds a JSON request with an Authorization header
pub fn json_request(
    method: &str,
    uri: &str,
    auth: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", auth)
        .header("content-type", "application/json");

    match body {
        Some(json) => builder.body(Body::from(json.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Reads a response body as JSON
pub async fn response_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
