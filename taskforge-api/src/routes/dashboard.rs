/// Dashboard endpoint
///
/// # Endpoint
///
/// ```text
/// GET /v1/dashboard
/// ```
///
/// Returns the caller's project and task counts, overdue count, and the
/// five most recently created tasks. Administrators additionally get an
/// `admin` section with system-wide totals.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use taskforge_shared::{auth::middleware::Identity, ops};

/// Dashboard handler
pub async fn show(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<ops::dashboard::Dashboard>> {
    let dashboard = ops::dashboard::build(&state.db, &identity).await?;

    Ok(Json(dashboard))
}
