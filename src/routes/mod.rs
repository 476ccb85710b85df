use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::RecommendationRepository,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::RecommendationService,
};

pub mod e2e;
pub mod recommendations;

/// Shared state handed to every handler
pub struct AppState {
    pub recommendations: RecommendationService,
    /// Mounts `POST /recommendations/reset` when set
    pub reset_route_enabled: bool,
}

impl AppState {
    pub fn new(repository: Arc<dyn RecommendationRepository>, reset_route_enabled: bool) -> Self {
        Self {
            recommendations: RecommendationService::new(repository),
            reset_route_enabled,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_check))
        .merge(recommendation_routes());

    if state.reset_route_enabled {
        tracing::warn!("Test reset route enabled at POST /recommendations/reset");
        router = router.route("/recommendations/reset", post(e2e::reset));
    }

    router
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Public recommendation routes
fn recommendation_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/recommendations",
            get(recommendations::list).post(recommendations::create),
        )
        .route("/recommendations/random", get(recommendations::random))
        .route("/recommendations/top/:amount", get(recommendations::top))
        .route("/recommendations/:id", get(recommendations::get_by_id))
        .route("/recommendations/:id/upvote", post(recommendations::upvote))
        .route(
            "/recommendations/:id/downvote",
            post(recommendations::downvote),
        )
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
