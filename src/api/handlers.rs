use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::models::{CatalogItem, MediaType, PreferenceProfile, ScoredItem};
use crate::services::rounds::PresentedPair;
use crate::services::DEFAULT_LIMIT;
use crate::storage::keys;

use super::AppState;

// Request types

#[derive(Debug, Default, Deserialize)]
pub struct RecommendRequest {
    pub limit: Option<usize>,
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct DiversifyRequest {
    pub items: Vec<ScoredItem>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRoundRequest {
    pub id: u64,
    pub media_type: MediaType,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Get the current preference profile
pub async fn get_preferences(State(state): State<AppState>) -> Json<PreferenceProfile> {
    let inner = state.inner.read().await;
    Json(inner.preferences.clone())
}

/// Replace the preference profile
pub async fn update_preferences(
    State(state): State<AppState>,
    Json(preferences): Json<PreferenceProfile>,
) -> StatusCode {
    let mut inner = state.inner.write().await;
    inner.preferences = preferences.clone();
    inner.store.set(keys::PREFERENCES, &preferences, None);
    StatusCode::OK
}

/// Record an item as watched
pub async fn add_watched(
    State(state): State<AppState>,
    Json(item): Json<CatalogItem>,
) -> StatusCode {
    let mut inner = state.inner.write().await;
    inner.preferences.add_watched(item);
    let preferences = inner.preferences.clone();
    inner.store.set(keys::PREFERENCES, &preferences, None);
    StatusCode::OK
}

/// Generate recommendations: discover a candidate pool from the catalog
/// provider and run it through the weighted scoring engine
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> AppResult<Json<Vec<ScoredItem>>> {
    let preferences = {
        let inner = state.inner.read().await;
        inner.preferences.clone()
    };

    let pool = state
        .catalog
        .discover(&preferences, request.page.unwrap_or(1))
        .await?;

    let inner = state.inner.read().await;
    let ranked = inner.engine.generate_recommendations(
        &pool,
        &preferences,
        request.limit.unwrap_or(DEFAULT_LIMIT),
    );

    Ok(Json(ranked))
}

/// Build a genre-diverse subsequence of an already-ranked list
pub async fn diversify(
    State(state): State<AppState>,
    Json(request): Json<DiversifyRequest>,
) -> Json<Vec<ScoredItem>> {
    let inner = state.inner.read().await;
    Json(inner.engine.diverse_recommendations(&request.items, request.count))
}

/// Prepare an elicitation round from a freshly discovered pool
pub async fn start_round(
    State(state): State<AppState>,
    Path(round): Path<u8>,
) -> AppResult<Json<PresentedPair>> {
    let preferences = {
        let inner = state.inner.read().await;
        inner.preferences.clone()
    };

    let pool = state.catalog.discover(&preferences, 1).await?;

    let mut inner = state.inner.write().await;
    let pair = inner.rounds.start_round(round, &pool).await?;
    Ok(Json(pair))
}

/// Record the user's pick for a round
pub async fn resolve_round(
    State(state): State<AppState>,
    Path(round): Path<u8>,
    Json(request): Json<ResolveRoundRequest>,
) -> AppResult<StatusCode> {
    let mut inner = state.inner.write().await;
    inner
        .rounds
        .resolve_round(round, request.id, request.media_type)?;
    Ok(StatusCode::OK)
}

/// Skip a round without recording a selection
pub async fn skip_round(State(state): State<AppState>, Path(round): Path<u8>) -> StatusCode {
    let mut inner = state.inner.write().await;
    inner.rounds.skip_round(round);
    StatusCode::OK
}

/// Finalize the elicitation flow into a ranked recommendation list
pub async fn finalize_rounds(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ScoredItem>>> {
    let mut inner = state.inner.write().await;
    let final_list = inner.rounds.finalize().await?;
    Ok(Json(final_list))
}
