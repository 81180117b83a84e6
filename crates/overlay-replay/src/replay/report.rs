use std::fs;
use std::path::Path;

use overlay_core::OverlaySnapshot;

use super::session::{OverlaySession, SessionStats};
use crate::config::{DeckCapPolicy, ReplayConfig};

/// End-of-match view written to the markdown summary.
#[derive(Debug, Clone)]
pub struct MatchReport {
    run_id: String,
    deck_cap: DeckCapPolicy,
    stats: SessionStats,
    snapshot: OverlaySnapshot,
    cards: Vec<DeckRow>,
}

#[derive(Debug, Clone)]
struct DeckRow {
    card: String,
    cost: Option<u32>,
    plays: usize,
    evolved_plays: usize,
    last_played: Option<f64>,
}

impl MatchReport {
    pub fn new(config: &ReplayConfig, session: &OverlaySession<'_>) -> Self {
        let cycle = session.cycle();
        let cards = cycle
            .discovered_deck()
            .into_iter()
            .map(|card| DeckRow {
                card: card.to_string(),
                cost: session.knowledge().card_cost(card),
                plays: cycle.history().iter().filter(|p| p.card == card).count(),
                evolved_plays: cycle.evolved_plays(card),
                last_played: cycle.last_played(card),
            })
            .collect();

        Self {
            run_id: config.run_id.clone(),
            deck_cap: config.deck_cap,
            stats: session.stats().clone(),
            snapshot: session.snapshot(),
            cards,
        }
    }

    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Match Replay Summary\n\n");
        out.push_str(&format!("Run: `{}`\n\n", self.run_id));
        out.push_str(&format!("Deck cap policy: {}\n\n", self.deck_cap.as_str()));

        out.push_str("| Events | Plays | Unknown | Ignored | Unpriced | Phase changes | Elixir spent |\n");
        out.push_str("|--------|-------|---------|---------|----------|---------------|--------------|\n");
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {:.1} |\n\n",
            self.stats.events,
            self.stats.plays,
            self.stats.unknown_plays,
            self.stats.ignored_plays,
            self.stats.unpriced_plays,
            self.stats.phase_changes,
            self.stats.elixir_spent,
        ));

        out.push_str("## Discovered deck\n\n");
        if self.cards.is_empty() {
            out.push_str("No cards observed.\n\n");
        } else {
            out.push_str("| Card | Cost | Plays | Evolved | Last played (s) |\n");
            out.push_str("|------|------|-------|---------|-----------------|\n");
            for row in &self.cards {
                let cost = row
                    .cost
                    .map(|cost| cost.to_string())
                    .unwrap_or_else(|| "?".to_string());
                let last = row
                    .last_played
                    .map(|t| format!("{t:.2}"))
                    .unwrap_or_else(|| "-".to_string());
                out.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    row.card, cost, row.plays, row.evolved_plays, last
                ));
            }
            out.push('\n');
        }

        out.push_str("## Final state\n\n");
        let hand = if self.snapshot.inferred_hand.is_empty() {
            "-".to_string()
        } else {
            self.snapshot.inferred_hand.join(", ")
        };
        out.push_str(&format!("- Inferred hand: {hand}\n"));
        out.push_str(&format!(
            "- Next card: {}\n",
            self.snapshot.inferred_next_card.as_deref().unwrap_or("-")
        ));
        out.push_str(&format!(
            "- Elixir: {:.2} ({} phase)\n",
            self.snapshot.elixir, self.snapshot.phase
        ));
        out
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        fs::write(path.as_ref(), self.render_markdown())
    }
}
