use crate::model::play::CardPlay;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{Level, event};

/// Number of distinct cards in a deck.
pub const DECK_SIZE: usize = 8;
/// Number of cards available to play at any moment.
pub const HAND_SIZE: usize = 4;

/// Tracks the opponent's discovered cards and guesses hand and next draw
/// from how recently each card was played.
///
/// One tracker covers one match. Start a new match with a fresh tracker.
#[derive(Debug, Clone, Default)]
pub struct CardCycleTracker {
    discovered: BTreeSet<String>,
    history: Vec<CardPlay>,
}

impl CardCycleTracker {
    pub fn new() -> Self {
        Self {
            discovered: BTreeSet::new(),
            history: Vec::new(),
        }
    }

    /// Records a play. Any identifier and any timestamp are accepted; the
    /// history keeps insertion order even when timestamps go backwards.
    pub fn record_play(&mut self, card: impl Into<String>, is_evolved: bool, timestamp: f64) {
        self.record(CardPlay::new(card, is_evolved, timestamp));
    }

    pub fn record(&mut self, play: CardPlay) {
        if !self.discovered.contains(&play.card) {
            self.discovered.insert(play.card.clone());
            event!(
                target: "overlay_core::cycle",
                Level::DEBUG,
                card = %play.card,
                discovered = self.discovered.len() as u32,
                timestamp = play.timestamp,
                "discovered card"
            );
            if self.discovered.len() == DECK_SIZE + 1 {
                tracing::warn!(
                    target: "overlay_core::cycle",
                    card = %play.card,
                    "more distinct cards than a deck holds"
                );
            }
        }
        self.history.push(play);
    }

    /// Distinct identifiers seen so far, in lexicographic order.
    pub fn discovered_deck(&self) -> Vec<&str> {
        self.discovered.iter().map(String::as_str).collect()
    }

    /// Best guess for the current hand: the least recently played cards.
    ///
    /// Returns everything discovered (sorted) while fewer than a hand's worth
    /// of cards are known.
    pub fn inferred_hand(&self) -> Vec<&str> {
        if self.history.is_empty() {
            return Vec::new();
        }
        if self.discovered.len() < HAND_SIZE {
            return self.discovered_deck();
        }

        self.ranked_by_recency()
            .into_iter()
            .take(HAND_SIZE)
            .map(|(card, _)| card)
            .collect()
    }

    /// Best guess for the next card drawn into hand: the least recently played
    /// card outside the inferred hand.
    pub fn inferred_next_card(&self) -> Option<&str> {
        if self.discovered.len() < HAND_SIZE + 1 {
            return None;
        }

        let hand = self.inferred_hand();
        self.ranked_by_recency()
            .into_iter()
            .map(|(card, _)| card)
            .find(|card| !hand.contains(card))
    }

    pub fn history(&self) -> &[CardPlay] {
        &self.history
    }

    pub fn discovered_count(&self) -> usize {
        self.discovered.len()
    }

    pub fn plays_recorded(&self) -> usize {
        self.history.len()
    }

    pub fn contains(&self, card: &str) -> bool {
        self.discovered.contains(card)
    }

    pub fn is_deck_complete(&self) -> bool {
        self.discovered.len() >= DECK_SIZE
    }

    /// True once more distinct identifiers were seen than a deck can hold,
    /// usually a sign of misclassified plays.
    pub fn exceeds_deck_size(&self) -> bool {
        self.discovered.len() > DECK_SIZE
    }

    /// Timestamp of the play written last in history order for this card.
    pub fn last_played(&self, card: &str) -> Option<f64> {
        self.history
            .iter()
            .rev()
            .find(|play| play.card == card)
            .map(|play| play.timestamp)
    }

    pub fn evolved_plays(&self, card: &str) -> usize {
        self.history
            .iter()
            .filter(|play| play.is_evolved && play.card == card)
            .count()
    }

    // Last write wins while scanning in insertion order. For non-decreasing
    // timestamps this is the most recent play.
    fn last_played_times(&self) -> BTreeMap<&str, f64> {
        let mut times = BTreeMap::new();
        for play in &self.history {
            times.insert(play.card.as_str(), play.timestamp);
        }
        times
    }

    /// Discovered cards ordered by `(last_played, card)`, oldest first.
    fn ranked_by_recency(&self) -> Vec<(&str, f64)> {
        let times = self.last_played_times();
        let mut ranked: Vec<(&str, f64)> = self
            .discovered
            .iter()
            .map(|card| {
                let last = times
                    .get(card.as_str())
                    .copied()
                    .unwrap_or(f64::NEG_INFINITY);
                (card.as_str(), last)
            })
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECK: [&str; 8] = [
        "Knight",
        "Archers",
        "Fireball",
        "Log",
        "Hog Rider",
        "Musketeer",
        "Ice Spirit",
        "Cannon",
    ];

    fn tracker_with_full_deck() -> CardCycleTracker {
        let mut tracker = CardCycleTracker::new();
        for (i, card) in DECK.iter().enumerate() {
            tracker.record_play(*card, false, i as f64);
        }
        tracker
    }

    #[test]
    fn new_tracker_is_empty() {
        let tracker = CardCycleTracker::new();
        assert_eq!(tracker.discovered_count(), 0);
        assert_eq!(tracker.plays_recorded(), 0);
        assert!(tracker.discovered_deck().is_empty());
        assert!(tracker.inferred_hand().is_empty());
        assert_eq!(tracker.inferred_next_card(), None);
    }

    #[test]
    fn single_play_is_discovered_and_in_hand() {
        let mut tracker = CardCycleTracker::new();
        tracker.record_play("Knight", false, 1.0);

        assert_eq!(tracker.discovered_deck(), vec!["Knight"]);
        assert_eq!(tracker.inferred_hand(), vec!["Knight"]);
        assert_eq!(tracker.inferred_next_card(), None);

        let play = &tracker.history()[0];
        assert_eq!(play.card, "Knight");
        assert!(!play.is_evolved);
        assert_eq!(play.timestamp, 1.0);
    }

    #[test]
    fn repeated_card_is_discovered_once_but_logged_each_time() {
        let mut tracker = CardCycleTracker::new();
        tracker.record_play("Knight", false, 1.0);
        tracker.record_play("Archers", false, 2.0);
        tracker.record_play("Knight", true, 3.0);

        assert_eq!(tracker.discovered_count(), 2);
        assert_eq!(tracker.plays_recorded(), 3);
        assert_eq!(tracker.history()[2].card, "Knight");
        assert!(tracker.history()[2].is_evolved);
        assert_eq!(tracker.evolved_plays("Knight"), 1);
        assert_eq!(tracker.evolved_plays("Archers"), 0);
    }

    #[test]
    fn discovered_deck_is_sorted() {
        let mut tracker = CardCycleTracker::new();
        tracker.record_play("Wizard", false, 1.0);
        tracker.record_play("Knight", false, 2.0);
        tracker.record_play("Archers", false, 3.0);
        assert_eq!(tracker.discovered_deck(), vec!["Archers", "Knight", "Wizard"]);
    }

    #[test]
    fn few_cards_returns_everything_known_sorted() {
        let mut tracker = CardCycleTracker::new();
        tracker.record_play("Knight", false, 1.0);
        tracker.record_play("Archers", false, 2.0);
        assert_eq!(tracker.inferred_hand(), vec!["Archers", "Knight"]);
    }

    #[test]
    fn four_cards_fill_the_hand() {
        let mut tracker = CardCycleTracker::new();
        for (i, card) in DECK.iter().take(4).enumerate() {
            tracker.record_play(*card, false, i as f64 + 1.0);
        }
        let mut hand = tracker.inferred_hand();
        assert_eq!(hand.len(), 4);
        hand.sort();
        assert_eq!(hand, vec!["Archers", "Fireball", "Knight", "Log"]);
        assert_eq!(tracker.inferred_next_card(), None);
    }

    #[test]
    fn full_deck_in_order_predicts_oldest_four_and_fifth() {
        let tracker = tracker_with_full_deck();
        assert!(tracker.is_deck_complete());
        assert_eq!(
            tracker.inferred_hand(),
            vec!["Knight", "Archers", "Fireball", "Log"]
        );
        assert_eq!(tracker.inferred_next_card(), Some("Hog Rider"));
    }

    #[test]
    fn replayed_card_leaves_the_hand() {
        let mut tracker = tracker_with_full_deck();
        tracker.record_play("Knight", false, 10.0);

        let hand = tracker.inferred_hand();
        assert_eq!(hand, vec!["Archers", "Fireball", "Log", "Hog Rider"]);
        assert_eq!(tracker.inferred_next_card(), Some("Musketeer"));
    }

    #[test]
    fn next_card_is_never_in_hand_after_cycling() {
        let mut tracker = tracker_with_full_deck();
        tracker.record_play("Knight", false, 10.0);
        tracker.record_play("Archers", false, 11.0);

        let hand = tracker.inferred_hand();
        let next = tracker.inferred_next_card().expect("enough cards discovered");
        assert!(!hand.contains(&next));
        assert_eq!(next, "Ice Spirit");
    }

    #[test]
    fn equal_timestamps_break_ties_by_name() {
        let mut tracker = CardCycleTracker::new();
        for card in ["Zap", "Log", "Arrows", "Miner", "Bats"] {
            tracker.record_play(card, false, 5.0);
        }
        assert_eq!(
            tracker.inferred_hand(),
            vec!["Arrows", "Bats", "Log", "Miner"]
        );
        assert_eq!(tracker.inferred_next_card(), Some("Zap"));
    }

    #[test]
    fn out_of_order_timestamps_are_stored_as_given() {
        let mut tracker = CardCycleTracker::new();
        tracker.record_play("Knight", false, 5.0);
        tracker.record_play("Archers", false, 3.0);
        tracker.record_play("Fireball", false, 7.0);

        let stamps: Vec<f64> = tracker.history().iter().map(|p| p.timestamp).collect();
        assert_eq!(stamps, vec![5.0, 3.0, 7.0]);
    }

    #[test]
    fn last_write_in_history_order_drives_recency() {
        let mut tracker = CardCycleTracker::new();
        for (i, card) in ["A", "B", "C", "D", "E"].iter().enumerate() {
            tracker.record_play(*card, false, 10.0 + i as f64);
        }
        // A late-arriving detection with an older timestamp overwrites A's 10.0.
        tracker.record_play("A", false, 1.0);
        tracker.record_play("A", false, 0.5);

        assert_eq!(tracker.last_played("A"), Some(0.5));
        assert_eq!(tracker.inferred_hand(), vec!["A", "B", "C", "D"]);
        assert_eq!(tracker.inferred_next_card(), Some("E"));
    }

    #[test]
    fn zero_and_negative_timestamps_are_accepted() {
        let mut tracker = CardCycleTracker::new();
        tracker.record_play("Knight", false, 0.0);
        tracker.record_play("Archers", false, -1.0);
        assert_eq!(tracker.history()[0].timestamp, 0.0);
        assert_eq!(tracker.history()[1].timestamp, -1.0);
    }

    #[test]
    fn empty_and_unknown_identifiers_are_distinct_discoveries() {
        let mut tracker = CardCycleTracker::new();
        tracker.record_play("", false, 1.0);
        tracker.record_play("unknown", false, 2.0);
        tracker.record_play("Mini P.E.K.K.A", false, 3.0);

        assert!(tracker.contains(""));
        assert!(tracker.contains("unknown"));
        assert!(tracker.contains("Mini P.E.K.K.A"));
        assert_eq!(tracker.discovered_count(), 3);
    }

    #[test]
    fn ninth_distinct_card_is_accepted_and_flagged() {
        let mut tracker = tracker_with_full_deck();
        assert!(!tracker.exceeds_deck_size());
        tracker.record_play("Goblin Barrel", false, 8.0);

        assert_eq!(tracker.discovered_count(), 9);
        assert!(tracker.exceeds_deck_size());
        assert_eq!(tracker.inferred_hand().len(), HAND_SIZE);
    }

    #[test]
    fn discovery_count_never_exceeds_plays() {
        let mut tracker = CardCycleTracker::new();
        let sequence = ["Knight", "Knight", "Log", "Zap", "Log", "Miner"];
        let mut previous = 0;
        for (i, card) in sequence.iter().enumerate() {
            tracker.record_play(*card, false, i as f64);
            assert!(tracker.discovered_count() >= previous);
            assert!(tracker.discovered_count() <= tracker.plays_recorded());
            previous = tracker.discovered_count();
            for known in tracker.discovered_deck() {
                assert!(tracker.history().iter().any(|play| play.card == known));
            }
        }
        assert_eq!(tracker.discovered_count(), 4);
    }

    #[test]
    fn last_played_is_none_for_unseen_card() {
        let tracker = tracker_with_full_deck();
        assert_eq!(tracker.last_played("Knight"), Some(0.0));
        assert_eq!(tracker.last_played("Golem"), None);
    }
}
