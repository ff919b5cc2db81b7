use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    models::{PuzzleOrigin, PuzzlePayload, PuzzleRequest},
    services::{
        slots::{is_valid_slot_name, SlotState, DEFAULT_SLOT, MAX_SLOT_NAME_LEN},
        AppState,
    },
};

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub slot: Option<String>,
}

impl SlotQuery {
    fn slot(&self) -> Result<&str, (StatusCode, Json<Value>)> {
        let slot = self
            .slot
            .as_deref()
            .filter(|slot| !slot.trim().is_empty())
            .unwrap_or(DEFAULT_SLOT);
        validate_slot(slot)?;
        Ok(slot)
    }
}

fn validate_slot(slot: &str) -> Result<(), (StatusCode, Json<Value>)> {
    if is_valid_slot_name(slot) {
        return Ok(());
    }
    tracing::warn!("Rejected slot name of {} bytes", slot.len());
    Err((
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "error": format!(
                "slot must be 1-{} characters of letters, digits, '-' or '_'",
                MAX_SLOT_NAME_LEN
            ),
        })),
    ))
}

#[derive(Debug, Serialize)]
pub struct PuzzleResponse {
    pub puzzle: PuzzlePayload,
    pub origin: PuzzleOrigin,
    pub slot: String,
    /// False when a newer request for the slot superseded this one.
    pub applied: bool,
    pub slot_state: SlotState,
}

type PuzzleResult = Result<Json<PuzzleResponse>, (StatusCode, Json<Value>)>;

async fn load(state: &AppState, slot: &str, request: PuzzleRequest) -> PuzzleResult {
    let outcome = state.fetcher.load_into_slot(slot, request).await;

    match outcome.result {
        Ok(fetched) => Ok(Json(PuzzleResponse {
            puzzle: fetched.puzzle.to_payload(),
            origin: fetched.origin,
            slot: slot.to_string(),
            applied: outcome.applied,
            slot_state: outcome.state,
        })),
        Err(e) => {
            tracing::warn!("No puzzle for slot {}: {}", slot, e);
            Err((
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": e.to_string(),
                    "slot": slot,
                    "applied": outcome.applied,
                    "slot_state": outcome.state,
                })),
            ))
        }
    }
}

/// GET /api/v1/puzzles/daily
pub async fn daily_puzzle(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SlotQuery>,
) -> PuzzleResult {
    let slot = query.slot()?;
    tracing::info!("Fetching daily puzzle into slot {}", slot);
    load(&state, slot, PuzzleRequest::Daily).await
}

/// GET /api/v1/puzzles/next
pub async fn next_puzzle(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SlotQuery>,
) -> PuzzleResult {
    let slot = query.slot()?;
    tracing::info!("Fetching next puzzle into slot {}", slot);
    load(&state, slot, PuzzleRequest::Next).await
}

/// GET /api/v1/puzzles/theme/{theme}
pub async fn puzzle_by_theme(
    State(state): State<Arc<AppState>>,
    Path(theme): Path<String>,
    Query(query): Query<SlotQuery>,
) -> PuzzleResult {
    let slot = query.slot()?;
    tracing::info!("Fetching {} puzzle into slot {}", theme, slot);
    load(&state, slot, PuzzleRequest::ByTheme(theme)).await
}

/// GET /api/v1/puzzles/rating/{rating}
pub async fn puzzle_by_rating(
    State(state): State<Arc<AppState>>,
    Path(rating): Path<u32>,
    Query(query): Query<SlotQuery>,
) -> PuzzleResult {
    let slot = query.slot()?;
    tracing::info!("Fetching puzzle near {} into slot {}", rating, slot);
    load(&state, slot, PuzzleRequest::ByRating(rating)).await
}

/// GET /api/v1/puzzles/{id}
pub async fn puzzle_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<SlotQuery>,
) -> PuzzleResult {
    let slot = query.slot()?;
    tracing::info!("Fetching puzzle {} into slot {}", id, slot);
    load(&state, slot, PuzzleRequest::ById(id)).await
}

/// GET /api/v1/slots/{slot}
pub async fn get_slot(
    State(state): State<Arc<AppState>>,
    Path(slot): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    validate_slot(&slot)?;
    Ok(Json(state.fetcher.slot(&slot)))
}
