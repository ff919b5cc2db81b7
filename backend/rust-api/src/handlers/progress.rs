use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Local;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::SourceError, extractors::ValidatedJson, models::RecordAttemptRequest,
    services::AppState,
};

const DEFAULT_CALENDAR_DAYS: u32 = 30;
const MAX_CALENDAR_DAYS: u32 = 366;

#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct MaxQuery {
    pub max: Option<u32>,
}

/// POST /api/v1/attempts
pub async fn record_attempt(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RecordAttemptRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    tracing::info!(
        "Recording attempt: puzzle={}, success={}, time={}s",
        req.puzzle_id,
        req.success,
        req.time_spent_secs
    );

    let puzzle = req.attempted_puzzle();
    let (success, time_spent_secs) = (req.success, req.time_spent_secs);
    // Store writes are blocking file I/O.
    let response = tokio::task::spawn_blocking(move || {
        state
            .training
            .record_attempt(&puzzle, success, time_spent_secs, Local::now())
    })
    .await
    .map_err(|e| {
        tracing::error!("Attempt recording task failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to record attempt".to_string(),
        )
    })?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/progress
pub async fn get_progress(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.training.snapshot(Local::now().date_naive()))
}

/// GET /api/v1/activity?days=N
pub async fn get_activity(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DaysQuery>,
) -> impl IntoResponse {
    let days = query
        .days
        .unwrap_or(DEFAULT_CALENDAR_DAYS)
        .clamp(1, MAX_CALENDAR_DAYS);
    Json(state.training.calendar(Local::now().date_naive(), days))
}

/// GET /api/v1/history
pub async fn get_history(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.training.history())
}

/// GET /api/v1/themes
pub async fn get_themes(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.training.theme_counts())
}

/// GET /api/v1/remote/dashboard?days=N
pub async fn remote_dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DaysQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let days = query.days.unwrap_or(DEFAULT_CALENDAR_DAYS);
    tracing::info!("Forwarding dashboard request: days={}", days);

    state
        .fetcher
        .live_dashboard(days)
        .await
        .map(Json)
        .map_err(remote_error)
}

/// GET /api/v1/remote/activity?max=N
pub async fn remote_activity(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MaxQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let max = query.max.unwrap_or(50);
    tracing::info!("Forwarding activity request: max={}", max);

    state
        .fetcher
        .live_activity(max)
        .await
        .map(Json)
        .map_err(remote_error)
}

fn remote_error(err: SourceError) -> (StatusCode, String) {
    match err {
        SourceError::FallbackRequested => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Live puzzle backend is not available".to_string(),
        ),
        SourceError::Empty => (StatusCode::NOT_FOUND, err.to_string()),
        other => {
            tracing::warn!("Remote request failed: {}", other);
            (StatusCode::BAD_GATEWAY, other.to_string())
        }
    }
}
