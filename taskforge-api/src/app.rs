/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use taskforge_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskforge_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskforge_shared::auth::middleware::create_auth_middleware;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned per request via Axum's `State` extractor; the config sits
/// behind an Arc so clones stay cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                               # Health check (public)
/// └── /v1/
///     ├── /auth/
///     │   ├── POST /register                # public
///     │   ├── POST /login                   # public
///     │   ├── POST /refresh                 # public
///     │   └── GET  /me                      # authenticated
///     ├── /dashboard                        # authenticated
///     ├── /projects                         # authenticated, owner-scoped
///     │   └── /:project_id/tasks            # authenticated, owner-scoped
///     └── /tags                             # authenticated; writes admin-only
/// ```
///
/// Authentication runs as a middleware layer over everything except
/// `/health` and the public auth endpoints. Role checks for tag writes
/// happen inside the operations, not in the router, so the 403 message
/// stays identical on every surface.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Everything below requires a valid access token
    let protected_routes = Router::new()
        .route("/auth/me", get(routes::auth::me))
        .route("/dashboard", get(routes::dashboard::show))
        .route(
            "/projects",
            get(routes::projects::index).post(routes::projects::store),
        )
        .route(
            "/projects/:project_id",
            get(routes::projects::show)
                .put(routes::projects::update)
                .patch(routes::projects::update)
                .delete(routes::projects::destroy),
        )
        .route(
            "/projects/:project_id/tasks",
            get(routes::tasks::index).post(routes::tasks::store),
        )
        .route(
            "/projects/:project_id/tasks/:task_id",
            get(routes::tasks::show)
                .put(routes::tasks::update)
                .patch(routes::tasks::update)
                .delete(routes::tasks::destroy),
        )
        .route(
            "/tags",
            get(routes::tags::index).post(routes::tags::store),
        )
        .route(
            "/tags/:tag_id",
            get(routes::tags::show)
                .put(routes::tags::update)
                .patch(routes::tags::update)
                .delete(routes::tags::destroy),
        )
        .layer(axum::middleware::from_fn(create_auth_middleware(
            state.db.clone(),
            state.jwt_secret().to_string(),
        )));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
