#![deny(warnings)]
pub mod cycle;
pub mod elixir;
pub mod knowledge;
pub mod model;
pub mod snapshot;

pub use cycle::{CardCycleTracker, DECK_SIZE, HAND_SIZE};
pub use elixir::{ElixirInputError, ElixirRates, ElixirTracker};
pub use knowledge::{EngineConfig, KnowledgeBase, KnowledgeError};
pub use model::{CardPlay, ElixirPhase};
pub use snapshot::OverlaySnapshot;
