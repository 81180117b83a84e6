//! Opponent deck discovery and hand/next-card inference.
//!
//! Cards cycle to the back of the draw order once played, so the cards
//! played longest ago are the likeliest to be back in hand.

mod tracker;

pub use tracker::{CardCycleTracker, DECK_SIZE, HAND_SIZE};
