use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Preference profile
        .route("/preferences", get(handlers::get_preferences))
        .route("/preferences", put(handlers::update_preferences))
        .route("/preferences/watched", post(handlers::add_watched))
        // Weighted scoring engine
        .route("/recommendations", post(handlers::recommend))
        .route("/recommendations/diverse", post(handlers::diversify))
        // Elicitation rounds
        .route("/rounds/:round/start", post(handlers::start_round))
        .route("/rounds/:round/resolve", post(handlers::resolve_round))
        .route("/rounds/:round/skip", post(handlers::skip_round))
        .route("/rounds/finalize", post(handlers::finalize_rounds))
        // Layers run outside-in, so the request-id extension is attached
        // before the trace span reads it
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
