//! Game constants: the knowledge file and the engine parameters built from it.
//!
//! Loading fails fast on malformed input so no tracker is ever built from a
//! partial configuration.

mod engine;
mod loader;

pub use engine::EngineConfig;
pub use loader::{ElixirTiming, KnowledgeBase, KnowledgeError, ValidationError};
