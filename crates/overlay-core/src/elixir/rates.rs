use crate::model::phase::ElixirPhase;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SINGLE_SECONDS_PER_ELIXIR: f64 = 2.8;
pub const DEFAULT_DOUBLE_SECONDS_PER_ELIXIR: f64 = 1.4;
pub const DEFAULT_TRIPLE_SECONDS_PER_ELIXIR: f64 = 0.9;
pub const DEFAULT_MAX_ELIXIR: f64 = 10.0;

/// Generation rates (seconds per elixir) for each phase, plus the cap.
///
/// Values are taken as given; the knowledge loader rejects non-positive rates
/// before a tracker is ever built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElixirRates {
    pub single: f64,
    pub double: f64,
    pub triple: f64,
    pub max_elixir: f64,
}

impl Default for ElixirRates {
    fn default() -> Self {
        Self {
            single: DEFAULT_SINGLE_SECONDS_PER_ELIXIR,
            double: DEFAULT_DOUBLE_SECONDS_PER_ELIXIR,
            triple: DEFAULT_TRIPLE_SECONDS_PER_ELIXIR,
            max_elixir: DEFAULT_MAX_ELIXIR,
        }
    }
}

impl ElixirRates {
    pub const fn new(single: f64, double: f64, triple: f64, max_elixir: f64) -> Self {
        Self {
            single,
            double,
            triple,
            max_elixir,
        }
    }

    pub const fn seconds_per_elixir(&self, phase: ElixirPhase) -> f64 {
        match phase {
            ElixirPhase::Single => self.single,
            ElixirPhase::Double => self.double,
            ElixirPhase::Triple => self.triple,
        }
    }
}
