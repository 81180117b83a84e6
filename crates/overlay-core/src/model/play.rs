use core::fmt;
use serde::{Deserialize, Serialize};

/// Identifier recorded when the classifier could not name a card.
pub const UNKNOWN_CARD: &str = "unknown";

/// A single observed card play. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardPlay {
    pub card: String,
    pub is_evolved: bool,
    pub timestamp: f64,
}

impl CardPlay {
    pub fn new(card: impl Into<String>, is_evolved: bool, timestamp: f64) -> Self {
        Self {
            card: card.into(),
            is_evolved,
            timestamp,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.card.is_empty() || self.card == UNKNOWN_CARD
    }
}

impl fmt::Display for CardPlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_evolved {
            write!(f, "{} (evo) @ {:.2}s", self.card, self.timestamp)
        } else {
            write!(f, "{} @ {:.2}s", self.card, self.timestamp)
        }
    }
}
