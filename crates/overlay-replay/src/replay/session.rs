use overlay_core::knowledge::{EngineConfig, KnowledgeBase};
use overlay_core::model::UNKNOWN_CARD;
use overlay_core::{CardCycleTracker, CardPlay, ElixirPhase, ElixirTracker, OverlaySnapshot};
use serde::Serialize;
use tracing::{Level, event};

use super::schedule::PhaseSchedule;
use crate::config::{DeckCapPolicy, PhaseChange};
use crate::events::MatchEvent;

/// Running counters for one match.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub events: usize,
    pub plays: usize,
    pub unknown_plays: usize,
    pub ignored_plays: usize,
    pub unpriced_plays: usize,
    pub phase_changes: usize,
    pub elixir_spent: f64,
}

/// What the session did with a single event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventOutcome {
    pub cost: Option<u32>,
    pub evolution_cycles: Option<u32>,
    pub ignored: bool,
    pub phases_applied: Vec<ElixirPhase>,
}

/// Drives both trackers for one match.
///
/// This is where the game knowledge meets the engine: phase switches from the
/// match clock, card costs spent on plays and the deck-size policy all live
/// here rather than in the trackers.
pub struct OverlaySession<'k> {
    knowledge: &'k KnowledgeBase,
    cycle: CardCycleTracker,
    elixir: ElixirTracker,
    schedule: PhaseSchedule,
    deck_cap: DeckCapPolicy,
    stats: SessionStats,
}

impl<'k> OverlaySession<'k> {
    pub fn new(
        knowledge: &'k KnowledgeBase,
        phases: Vec<PhaseChange>,
        deck_cap: DeckCapPolicy,
    ) -> Self {
        let engine = EngineConfig::from_knowledge(knowledge);
        Self {
            knowledge,
            cycle: engine.new_cycle_tracker(),
            elixir: engine.new_elixir_tracker(),
            schedule: PhaseSchedule::new(phases),
            deck_cap,
            stats: SessionStats::default(),
        }
    }

    pub fn knowledge(&self) -> &'k KnowledgeBase {
        self.knowledge
    }

    pub fn cycle(&self) -> &CardCycleTracker {
        &self.cycle
    }

    pub fn elixir(&self) -> &ElixirTracker {
        &self.elixir
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn snapshot(&self) -> OverlaySnapshot {
        OverlaySnapshot::capture(&self.cycle, &self.elixir)
    }

    pub fn apply(&mut self, match_event: &MatchEvent) -> EventOutcome {
        self.stats.events += 1;
        let mut outcome = EventOutcome::default();

        if let Some(now) = match_event.timestamp() {
            self.advance_to(now, &mut outcome);
        }

        match match_event {
            MatchEvent::Play { card, evolved, t } => {
                self.observe_play(card.as_deref(), *evolved, *t, &mut outcome);
            }
            MatchEvent::Tick { .. } => {}
            MatchEvent::Adjust { delta } => self.elixir.adjust(*delta),
            MatchEvent::Phase { phase } => self.elixir.set_phase(*phase),
        }

        outcome
    }

    fn advance_to(&mut self, now: f64, outcome: &mut EventOutcome) {
        for change in self.schedule.due(now) {
            // Accrue up to the boundary at the old rate when the baseline allows it.
            if let Some(last) = self.elixir.last_update()
                && change.at >= last
            {
                self.elixir.advance_time(change.at);
            }
            self.elixir.set_phase(change.phase);
            outcome.phases_applied.push(change.phase);
            self.stats.phase_changes += 1;
            event!(
                target: "overlay_replay::phase",
                Level::INFO,
                at = change.at,
                phase = change.phase.as_str(),
                elixir = self.elixir.current()
            );
        }
        // Lagged detections keep their timestamp for the cycle but never rewind the clock.
        if let Err(err) = self.elixir.try_advance_time(now) {
            tracing::warn!(
                target: "overlay_replay::event",
                error = %err,
                now,
                "elixir clock not advanced"
            );
        }
    }

    fn observe_play(
        &mut self,
        card: Option<&str>,
        evolved: bool,
        timestamp: f64,
        outcome: &mut EventOutcome,
    ) {
        let identifier = card.unwrap_or(UNKNOWN_CARD).to_string();
        let is_new = !self.cycle.contains(&identifier);

        if is_new && self.deck_cap == DeckCapPolicy::IgnoreNew && self.cycle.is_deck_complete() {
            self.stats.ignored_plays += 1;
            outcome.ignored = true;
            tracing::warn!(
                target: "overlay_replay::event",
                card = %identifier,
                timestamp,
                "ignoring play outside the discovered deck"
            );
            return;
        }

        let cost = self.knowledge.card_cost(&identifier);
        match cost {
            Some(cost) => {
                self.elixir.spend(f64::from(cost));
                self.stats.elixir_spent += f64::from(cost);
            }
            None => self.stats.unpriced_plays += 1,
        }
        outcome.cost = cost;
        if evolved {
            outcome.evolution_cycles = self.knowledge.evolution_cycles_for(&identifier);
        }

        let play = CardPlay::new(identifier, evolved, timestamp);
        if play.is_unknown() {
            self.stats.unknown_plays += 1;
        }
        self.cycle.record(play);
        self.stats.plays += 1;

        if is_new && self.cycle.exceeds_deck_size() {
            tracing::warn!(
                target: "overlay_replay::event",
                card = card.unwrap_or(UNKNOWN_CARD),
                discovered = self.cycle.discovered_count() as u32,
                "discovered deck is larger than a real deck"
            );
        }

        if tracing::enabled!(target: "overlay_replay::event", Level::INFO) {
            let hand = self.cycle.inferred_hand().join(",");
            event!(
                target: "overlay_replay::event",
                Level::INFO,
                card = card.unwrap_or(UNKNOWN_CARD),
                evolved,
                timestamp,
                cost = cost.map(i64::from).unwrap_or(-1),
                elixir = self.elixir.current(),
                hand = %hand,
                next = self.cycle.inferred_next_card().unwrap_or("")
            );
        }
    }
}
