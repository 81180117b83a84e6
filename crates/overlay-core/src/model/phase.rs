use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Match period with its own elixir generation rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElixirPhase {
    #[default]
    Single,
    Double,
    Triple,
}

impl ElixirPhase {
    pub const ALL: [ElixirPhase; 3] = [ElixirPhase::Single, ElixirPhase::Double, ElixirPhase::Triple];

    pub const fn as_str(self) -> &'static str {
        match self {
            ElixirPhase::Single => "single",
            ElixirPhase::Double => "double",
            ElixirPhase::Triple => "triple",
        }
    }
}

impl fmt::Display for ElixirPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown elixir phase '{0}' (expected single, double or triple)")]
pub struct ParsePhaseError(pub String);

impl FromStr for ElixirPhase {
    type Err = ParsePhaseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(ElixirPhase::Single),
            "double" => Ok(ElixirPhase::Double),
            "triple" => Ok(ElixirPhase::Triple),
            _ => Err(ParsePhaseError(value.to_string())),
        }
    }
}
