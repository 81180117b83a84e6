use crate::elixir::{DEFAULT_MAX_ELIXIR, ElixirRates};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

const INLINE_SOURCE: &str = "<inline>";

/// Seconds per elixir for each phase, as read from the knowledge file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElixirTiming {
    pub single_seconds_per_elixir: f64,
    pub double_seconds_per_elixir: f64,
    pub triple_seconds_per_elixir: f64,
}

/// Game constants loaded from the knowledge JSON file.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeBase {
    cards_by_elixir: BTreeMap<u32, Vec<String>>,
    evolution_cycles: BTreeMap<String, u32>,
    card_costs: BTreeMap<String, u32>,
    timing: ElixirTiming,
    max_elixir: f64,
}

impl KnowledgeBase {
    /// Load and validate a knowledge file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, KnowledgeError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| KnowledgeError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let root: Value =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                KnowledgeError::Parse {
                    source,
                    path: path_buf.clone(),
                }
            })?;
        Self::from_value(root).map_err(|source| KnowledgeError::Invalid {
            path: path_buf,
            source,
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self, KnowledgeError> {
        let root: Value = serde_json::from_str(text).map_err(|source| KnowledgeError::Parse {
            source,
            path: PathBuf::from(INLINE_SOURCE),
        })?;
        Self::from_value(root).map_err(|source| KnowledgeError::Invalid {
            path: PathBuf::from(INLINE_SOURCE),
            source,
        })
    }

    /// Validate an already parsed document without performing I/O.
    pub fn from_value(root: Value) -> Result<Self, ValidationError> {
        validate_schema(&root)?;
        let raw: RawKnowledge =
            serde_json::from_value(root).map_err(|err| ValidationError::InvalidField {
                field: "<document>".to_string(),
                message: err.to_string(),
            })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawKnowledge) -> Result<Self, ValidationError> {
        let mut cards_by_elixir = BTreeMap::new();
        for (key, cards) in raw.cards.cards_by_elixir {
            let cost = key
                .trim()
                .parse::<u32>()
                .map_err(|_| ValidationError::InvalidField {
                    field: format!("cards.cards_by_elixir.{key}"),
                    message: "elixir cost keys must be non-negative integers".to_string(),
                })?;
            cards_by_elixir.insert(cost, cards);
        }

        // Variable-cost cards listed under several costs keep the lowest one.
        let mut card_costs = BTreeMap::new();
        for (cost, cards) in &cards_by_elixir {
            for card in cards {
                card_costs.entry(card.clone()).or_insert(*cost);
            }
        }

        for (card, cycles) in &raw.cards.evolution_cycles {
            if *cycles == 0 {
                return Err(ValidationError::InvalidField {
                    field: format!("cards.evolution_cycles.{card}"),
                    message: "evolution cycle count must be greater than zero".to_string(),
                });
            }
        }

        let elixir = raw.game_mechanics.elixir;
        for (label, value) in [
            ("single_elixir", elixir.single_elixir.exact_seconds_per_elixir),
            ("double_elixir", elixir.double_elixir.exact_seconds_per_elixir),
            ("triple_elixir", elixir.triple_elixir.exact_seconds_per_elixir),
        ] {
            validate_positive(
                &format!("game_mechanics.elixir.{label}.exact_seconds_per_elixir"),
                value,
            )?;
        }
        validate_positive("game_mechanics.elixir.max_elixir", elixir.max_elixir)?;

        Ok(Self {
            cards_by_elixir,
            evolution_cycles: raw.cards.evolution_cycles,
            card_costs,
            timing: ElixirTiming {
                single_seconds_per_elixir: elixir.single_elixir.exact_seconds_per_elixir,
                double_seconds_per_elixir: elixir.double_elixir.exact_seconds_per_elixir,
                triple_seconds_per_elixir: elixir.triple_elixir.exact_seconds_per_elixir,
            },
            max_elixir: elixir.max_elixir,
        })
    }

    pub fn cards_by_elixir(&self) -> &BTreeMap<u32, Vec<String>> {
        &self.cards_by_elixir
    }

    pub fn evolution_cycles(&self) -> &BTreeMap<String, u32> {
        &self.evolution_cycles
    }

    pub fn elixir_timing(&self) -> ElixirTiming {
        self.timing
    }

    pub fn max_elixir(&self) -> f64 {
        self.max_elixir
    }

    pub fn elixir_rates(&self) -> ElixirRates {
        ElixirRates::new(
            self.timing.single_seconds_per_elixir,
            self.timing.double_seconds_per_elixir,
            self.timing.triple_seconds_per_elixir,
            self.max_elixir,
        )
    }

    /// Elixir cost of a card, if the knowledge file lists it.
    pub fn card_cost(&self, card: &str) -> Option<u32> {
        self.card_costs.get(card).copied()
    }

    pub fn evolution_cycles_for(&self, card: &str) -> Option<u32> {
        self.evolution_cycles.get(card).copied()
    }

    pub fn card_count(&self) -> usize {
        self.card_costs.len()
    }
}

fn validate_schema(root: &Value) -> Result<(), ValidationError> {
    let cards = require(root, "cards", "cards")?;
    let mechanics = require(root, "game_mechanics", "game_mechanics")?;
    require(cards, "cards_by_elixir", "cards.cards_by_elixir")?;
    require(cards, "evolution_cycles", "cards.evolution_cycles")?;
    let elixir = require(mechanics, "elixir", "game_mechanics.elixir")?;
    for key in ["single_elixir", "double_elixir", "triple_elixir"] {
        let timing = require(elixir, key, &format!("game_mechanics.elixir.{key}"))?;
        require(
            timing,
            "exact_seconds_per_elixir",
            &format!("game_mechanics.elixir.{key}.exact_seconds_per_elixir"),
        )?;
    }
    Ok(())
}

fn require<'a>(parent: &'a Value, key: &str, path: &str) -> Result<&'a Value, ValidationError> {
    parent.get(key).ok_or_else(|| ValidationError::MissingKey {
        key: path.to_string(),
    })
}

fn validate_positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidField {
            field: field.to_string(),
            message: format!("must be a positive number (got {value})"),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawKnowledge {
    cards: RawCards,
    game_mechanics: RawMechanics,
}

#[derive(Debug, Deserialize)]
struct RawCards {
    cards_by_elixir: BTreeMap<String, Vec<String>>,
    evolution_cycles: BTreeMap<String, u32>,
}

#[derive(Debug, Deserialize)]
struct RawMechanics {
    elixir: RawElixir,
}

#[derive(Debug, Deserialize)]
struct RawElixir {
    single_elixir: RawTiming,
    double_elixir: RawTiming,
    triple_elixir: RawTiming,
    #[serde(default = "default_max_elixir")]
    max_elixir: f64,
}

#[derive(Debug, Deserialize)]
struct RawTiming {
    exact_seconds_per_elixir: f64,
}

fn default_max_elixir() -> f64 {
    DEFAULT_MAX_ELIXIR
}

/// Errors surfaced when loading a knowledge file.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("failed to read knowledge file {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse knowledge file {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
        path: PathBuf,
    },
    #[error("invalid knowledge file {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl KnowledgeError {
    pub fn path(&self) -> &Path {
        match self {
            KnowledgeError::Read { path, .. }
            | KnowledgeError::Parse { path, .. }
            | KnowledgeError::Invalid { path, .. } => path.as_path(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required key '{key}'")]
    MissingKey { key: String },
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
