use axum::{extract::State, http::StatusCode, Extension};
use std::sync::Arc;

use crate::{error::AppResult, middleware::request_id::RequestId, routes::AppState};

/// Handler for `POST /recommendations/reset`, used by automated test setup
pub async fn reset(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<StatusCode> {
    tracing::info!(request_id = %request_id, "Resetting recommendations");
    state.recommendations.delete_all().await?;
    Ok(StatusCode::OK)
}
