/// Tag endpoints
///
/// Reads are open to any authenticated user. Writes require the admin
/// role and are rejected with 403 and the message
/// `Forbidden. Admin access required.` for everyone else.
///
/// # Endpoints
///
/// - `GET    /v1/tags` - whole vocabulary, unpaginated
/// - `POST   /v1/tags` - create (admin)
/// - `GET    /v1/tags/:tag_id` - show
/// - `PATCH  /v1/tags/:tag_id` - partial update (admin)
/// - `DELETE /v1/tags/:tag_id` - delete (admin)

use crate::{
    app::AppState,
    error::ApiResult,
    routes::{DataResponse, MessageResponse},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use taskforge_shared::{
    auth::middleware::Identity,
    models::tag::Tag,
    ops::{self, tag::CreateTagInput, tag::UpdateTagInput},
};
use uuid::Uuid;

/// Unpaginated listing response
#[derive(Debug, Serialize)]
pub struct TagsResponse {
    pub data: Vec<Tag>,
}

/// Lists the whole tag vocabulary
///
/// Kept unpaginated so pickers can load every option in one request.
pub async fn index(State(state): State<AppState>) -> ApiResult<Json<TagsResponse>> {
    let tags = ops::tag::list_all(&state.db).await?;

    Ok(Json(TagsResponse { data: tags }))
}

/// Creates a tag (admin only)
pub async fn store(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(input): Json<CreateTagInput>,
) -> ApiResult<(StatusCode, Json<DataResponse<Tag>>)> {
    let tag = ops::tag::create(&state.db, &identity, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new("Tag created successfully", tag)),
    ))
}

/// Shows a single tag
pub async fn show(
    State(state): State<AppState>,
    Path(tag_id): Path<Uuid>,
) -> ApiResult<Json<Tag>> {
    let tag = ops::tag::get(&state.db, tag_id).await?;

    Ok(Json(tag))
}

/// Applies a partial update to a tag (admin only)
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(tag_id): Path<Uuid>,
    Json(input): Json<UpdateTagInput>,
) -> ApiResult<Json<DataResponse<Tag>>> {
    let tag = ops::tag::update(&state.db, &identity, tag_id, input).await?;

    Ok(Json(DataResponse::new("Tag updated successfully", tag)))
}

/// Deletes a tag (admin only); tasks that carried it survive
pub async fn destroy(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(tag_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    ops::tag::remove(&state.db, &identity, tag_id).await?;

    Ok(Json(MessageResponse::new("Tag deleted successfully")))
}
