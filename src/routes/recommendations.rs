use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{NewRecommendation, Recommendation},
    routes::AppState,
};

/// Unwraps a path parameter, answering malformed values with 422
fn path_param<T>(param: Result<Path<T>, PathRejection>) -> AppResult<T> {
    param
        .map(|Path(value)| value)
        .map_err(|rejection| AppError::Unprocessable(rejection.body_text()))
}

/// Handler for `POST /recommendations`
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<NewRecommendation>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Recommendation>)> {
    let Json(data) = payload.map_err(|rejection| AppError::Unprocessable(rejection.body_text()))?;
    data.validate()?;

    tracing::info!(
        request_id = %request_id,
        name = %data.name,
        "Creating recommendation"
    );

    let recommendation = state.recommendations.insert(data).await?;
    Ok((StatusCode::CREATED, Json(recommendation)))
}

/// Handler for `POST /recommendations/:id/upvote`
pub async fn upvote(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<StatusCode> {
    let id = path_param(id)?;
    state.recommendations.upvote(id).await?;
    Ok(StatusCode::OK)
}

/// Handler for `POST /recommendations/:id/downvote`
///
/// Answers 200 even when the vote removed the recommendation.
pub async fn downvote(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<StatusCode> {
    let id = path_param(id)?;
    state.recommendations.downvote(id).await?;
    Ok(StatusCode::OK)
}

/// Handler for `GET /recommendations`
pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Recommendation>>> {
    let recommendations = state.recommendations.get().await?;
    Ok(Json(recommendations))
}

/// Handler for `GET /recommendations/:id`
pub async fn get_by_id(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<Recommendation>> {
    let id = path_param(id)?;
    let recommendation = state.recommendations.get_by_id(id).await?;
    Ok(Json(recommendation))
}

/// Handler for `GET /recommendations/random`
pub async fn random(State(state): State<Arc<AppState>>) -> AppResult<Json<Recommendation>> {
    let recommendation = state.recommendations.get_random().await?;
    Ok(Json(recommendation))
}

/// Handler for `GET /recommendations/top/:amount`
pub async fn top(
    State(state): State<Arc<AppState>>,
    amount: Result<Path<u32>, PathRejection>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let amount = path_param(amount)?;
    let recommendations = state.recommendations.get_top(amount).await?;
    Ok(Json(recommendations))
}
