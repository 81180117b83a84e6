pub mod phase;
pub mod play;

pub use phase::{ElixirPhase, ParsePhaseError};
pub use play::{CardPlay, UNKNOWN_CARD};
