/// Task endpoints, nested under a project
///
/// Every route requires the caller to own the project in the path, and
/// single-task routes additionally require the task to belong to that
/// project.
///
/// # Endpoints
///
/// - `GET    /v1/projects/:project_id/tasks` - paginated listing with filters
/// - `POST   /v1/projects/:project_id/tasks` - create
/// - `GET    /v1/projects/:project_id/tasks/:task_id` - show
/// - `PATCH  /v1/projects/:project_id/tasks/:task_id` - partial update
/// - `DELETE /v1/projects/:project_id/tasks/:task_id` - delete

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
    models::task::{Task, TaskFilter, TaskPriority, TaskStatus},
    ops::{self, task::CreateTaskInput, task::UpdateTaskInput},
};
use uuid::Uuid;

/// Listing query parameters; all filters are optional and conjunctive
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    /// Case-insensitive substring match on the task title
    pub search: Option<String>,

    /// Exact status match
    pub status: Option<TaskStatus>,

    /// Exact priority match
    pub priority: Option<TaskPriority>,

    /// Only tasks carrying this tag
    pub tag: Option<Uuid>,

    /// 1-based page number
    pub page: Option<i64>,
}

/// Lists a project's tasks, newest first
pub async fn index(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(project_id): Path<Uuid>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<ListResponse<Task>>> {
    let filter = TaskFilter {
        search: query.search,
        status: query.status,
        priority: query.priority,
        tag: query.tag,
    };

    let page = ops::task::list(
        &state.db,
        &identity,
        project_id,
        &filter,
        query.page.unwrap_or(1),
        ops::API_PAGE_SIZE,
    )
    .await?;

    Ok(Json(page.into()))
}

/// Creates a task in the path project, owned by the caller
pub async fn store(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(project_id): Path<Uuid>,
    Json(input): Json<CreateTaskInput>,
) -> ApiResult<(StatusCode, Json<DataResponse<Task>>)> {
    let task = ops::task::create(&state.db, &identity, project_id, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new("Task created successfully", task)),
    ))
}

/// Shows a single task with its tags
pub async fn show(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Task>> {
    let task = ops::task::get(&state.db, &identity, project_id, task_id).await?;

    Ok(Json(task))
}

/// Applies a partial update to a task
///
/// `tag_ids`, when present, replaces the whole tag set; when absent the
/// set is untouched. The parent project can never change.
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<UpdateTaskInput>,
) -> ApiResult<Json<DataResponse<Task>>> {
    let task = ops::task::update(&state.db, &identity, project_id, task_id, input).await?;

    Ok(Json(DataResponse::new("Task updated successfully", task)))
}

/// Deletes a task
pub async fn destroy(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<MessageResponse>> {
    ops::task::remove(&state.db, &identity, project_id, task_id).await?;

    Ok(Json(MessageResponse::new("Task deleted successfully")))
}
