use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;

use crate::error::FetchError;
use crate::metrics::STALE_RESULTS_DISCARDED_TOTAL;
use crate::models::{FetchedPuzzle, PuzzleOrigin, PuzzlePayload};

pub const DEFAULT_SLOT: &str = "current";
pub const MAX_SLOT_NAME_LEN: usize = 32;
/// Registry size; beyond it the least recently requested slot is evicted.
pub const MAX_SLOTS: usize = 16;

/// Slot names are short identifiers: ASCII letters, digits, `-` and `_`.
pub fn is_valid_slot_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_SLOT_NAME_LEN
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// What the UI shows for one slot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SlotState {
    pub puzzle: Option<PuzzlePayload>,
    pub origin: Option<PuzzleOrigin>,
    pub loading: bool,
    pub error: Option<String>,
    pub generation: u64,
    #[serde(skip)]
    issued_at: u64,
}

/// Handed out by [`PuzzleSlots::begin`]; only the newest ticket of a slot may write it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTicket {
    slot: String,
    generation: u64,
    issued_at: u64,
}

#[derive(Debug, Default)]
struct SlotTable {
    entries: HashMap<String, SlotState>,
    /// Monotonic across slots, so a slot recreated after eviction never matches an old ticket.
    clock: u64,
}

impl SlotTable {
    fn evict_one(&mut self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, state)| (state.loading, state.issued_at))
            .map(|(name, _)| name.clone());
        if let Some(name) = victim {
            tracing::debug!("Evicting puzzle slot '{}'", name);
            self.entries.remove(&name);
        }
    }
}

/// Last-write-wins registry of visible puzzle slots.
#[derive(Debug, Default)]
pub struct PuzzleSlots {
    table: Mutex<SlotTable>,
}

impl PuzzleSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, slot: &str) -> SlotTicket {
        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        if !table.entries.contains_key(slot) && table.entries.len() >= MAX_SLOTS {
            table.evict_one();
        }
        table.clock += 1;
        let issued_at = table.clock;

        let state = table.entries.entry(slot.to_string()).or_default();
        state.generation += 1;
        state.loading = true;
        state.issued_at = issued_at;
        SlotTicket {
            slot: slot.to_string(),
            generation: state.generation,
            issued_at,
        }
    }

    /// Applies `result` unless a newer request was issued for the slot since `ticket`.
    pub fn resolve(
        &self,
        ticket: &SlotTicket,
        result: &Result<FetchedPuzzle, FetchError>,
    ) -> bool {
        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        let Some(state) = table
            .entries
            .get_mut(&ticket.slot)
            .filter(|state| state.issued_at == ticket.issued_at)
        else {
            tracing::debug!(
                "Discarding stale result for slot '{}' (generation {})",
                ticket.slot,
                ticket.generation
            );
            STALE_RESULTS_DISCARDED_TOTAL.inc();
            return false;
        };

        state.loading = false;
        match result {
            Ok(fetched) => {
                state.puzzle = Some(fetched.puzzle.to_payload());
                state.origin = Some(fetched.origin);
                state.error = None;
            }
            Err(e) => {
                state.error = Some(e.to_string());
            }
        }
        true
    }

    pub fn get(&self, slot: &str) -> SlotState {
        let table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        table.entries.get(slot).cloned().unwrap_or_default()
    }

    pub fn slot_count(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .len()
    }
}
