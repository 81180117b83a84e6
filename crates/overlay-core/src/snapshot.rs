use crate::cycle::CardCycleTracker;
use crate::elixir::ElixirTracker;
use crate::model::phase::ElixirPhase;
use serde::{Deserialize, Serialize};

/// Point-in-time view of both trackers, used for logging and replay output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverlaySnapshot {
    pub discovered_deck: Vec<String>,
    pub inferred_hand: Vec<String>,
    pub inferred_next_card: Option<String>,
    pub plays_recorded: usize,
    pub elixir: f64,
    pub phase: ElixirPhase,
    pub last_update: Option<f64>,
}

impl OverlaySnapshot {
    pub fn capture(cycle: &CardCycleTracker, elixir: &ElixirTracker) -> Self {
        OverlaySnapshot {
            discovered_deck: owned(cycle.discovered_deck()),
            inferred_hand: owned(cycle.inferred_hand()),
            inferred_next_card: cycle.inferred_next_card().map(str::to_string),
            plays_recorded: cycle.plays_recorded(),
            elixir: elixir.current(),
            phase: elixir.phase(),
            last_update: elixir.last_update(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

fn owned(cards: Vec<&str>) -> Vec<String> {
    cards.into_iter().map(str::to_string).collect()
}
