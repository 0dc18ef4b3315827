/// Project endpoints
///
/// All routes operate on the caller's own projects; another user's
/// project behaves as if it did not exist for listings and is rejected
/// for direct access.
///
/// # Endpoints
///
/// - `GET    /v1/projects` - paginated listing with filters
/// - `POST   /v1/projects` - create
/// - `GET    /v1/projects/:project_id` - show
/// - `PATCH  /v1/projects/:project_id` - partial update
/// - `DELETE /v1/projects/:project_id` - delete (tasks cascade)

use crate::{
    app::AppState,
    error::ApiResult,
    routes::{DataResponse, ListResponse, MessageResponse},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use taskforge_shared::{
    auth::middleware::Identity,
    models::project::{Project, ProjectFilter, ProjectStatus},
    ops::{self, project::CreateProjectInput, project::UpdateProjectInput},
};
use uuid::Uuid;

/// Listing query parameters; all filters are optional and conjunctive
#[derive(Debug, Default, Deserialize)]
pub struct ListProjectsQuery {
    /// Case-insensitive substring match on the project name
    pub search: Option<String>,

    /// Exact status match
    pub status: Option<ProjectStatus>,

    /// 1-based page number
    pub page: Option<i64>,
}

/// Lists the caller's projects, newest first
pub async fn index(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ListProjectsQuery>,
) -> ApiResult<Json<ListResponse<Project>>> {
    let filter = ProjectFilter {
        search: query.search,
        status: query.status,
    };

    let page = ops::project::list(
        &state.db,
        &identity,
        &filter,
        query.page.unwrap_or(1),
        ops::API_PAGE_SIZE,
    )
    .await?;

    Ok(Json(page.into()))
}

/// Creates a project owned by the caller
pub async fn store(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(input): Json<CreateProjectInput>,
) -> ApiResult<(StatusCode, Json<DataResponse<Project>>)> {
    let project = ops::project::create(&state.db, &identity, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new("Project created successfully", project)),
    ))
}

/// Shows a single project
pub async fn show(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    let project = ops::project::get(&state.db, &identity, project_id).await?;

    Ok(Json(project))
}

/// Applies a partial update to a project
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(project_id): Path<Uuid>,
    Json(input): Json<UpdateProjectInput>,
) -> ApiResult<Json<DataResponse<Project>>> {
    let project = ops::project::update(&state.db, &identity, project_id, input).await?;

    Ok(Json(DataResponse::new(
        "Project updated successfully",
        project,
    )))
}

/// Deletes a project and, by cascade, its tasks
pub async fn destroy(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    ops::project::remove(&state.db, &identity, project_id).await?;

    Ok(Json(MessageResponse::new("Project deleted successfully")))
}
