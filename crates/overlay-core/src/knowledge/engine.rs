use super::KnowledgeBase;
use crate::cycle::CardCycleTracker;
use crate::elixir::{ElixirRates, ElixirTracker};

/// Parameters the trackers are built from. Only the elixir rates come from
/// configuration; deck and hand sizes are the fixed `DECK_SIZE`/`HAND_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub rates: ElixirRates,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::with_rates(ElixirRates::default())
    }
}

impl EngineConfig {
    pub const fn with_rates(rates: ElixirRates) -> Self {
        Self { rates }
    }

    pub fn from_knowledge(knowledge: &KnowledgeBase) -> Self {
        Self::with_rates(knowledge.elixir_rates())
    }

    pub fn new_cycle_tracker(&self) -> CardCycleTracker {
        CardCycleTracker::new()
    }

    pub fn new_elixir_tracker(&self) -> ElixirTracker {
        ElixirTracker::new(self.rates)
    }
}
