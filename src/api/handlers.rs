use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::{RecommendQuery, RecommendationResponse};
use crate::services::get_recommendations;

use super::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub catalog_size: usize,
    pub vocabulary_size: usize,
    pub built_at: DateTime<Utc>,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        catalog_size: state.recommender.catalog().len(),
        vocabulary_size: state.recommender.vocabulary_size(),
        built_at: state.recommender.built_at(),
    })
}

/// Recommend dramas similar to `title`
///
/// A malformed query string is reported through `AppError` like every other
/// failure, so clients always get a JSON `error` body.
pub async fn recommend(
    State(state): State<AppState>,
    query: Result<Query<RecommendQuery>, QueryRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let Query(query) = query.map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;

    let title = query
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::MissingParameter)?;

    let top_n = parse_top_n(query.top_n.as_deref(), state.default_top_n, state.max_top_n)?;

    let recommendations = get_recommendations(
        &state.recommender,
        state.posters.clone(),
        &state.placeholder_image,
        state.poster_timeout,
        title,
        top_n,
    )
    .await
    .inspect_err(|e| {
        if matches!(e, AppError::NotFound) {
            tracing::info!(title = %title, "No catalog match for title");
        }
    })?;

    tracing::info!(
        title = %title,
        top_n,
        results = recommendations.len(),
        "Recommendations served"
    );

    Ok(Json(RecommendationResponse { recommendations }))
}

/// Blank or absent means `default`; anything else must be an integer up to `max`
fn parse_top_n(raw: Option<&str>, default: usize, max: usize) -> AppResult<usize> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(default),
        Some(raw) => raw,
    };

    let top_n: usize = raw.parse().map_err(|_| {
        AppError::InvalidInput(format!("top_n must be a non-negative integer, got '{}'", raw))
    })?;

    if top_n > max {
        return Err(AppError::InvalidInput(format!(
            "top_n must not exceed {}",
            max
        )));
    }

    Ok(top_n)
}
