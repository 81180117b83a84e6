//! Opponent elixir simulation: phase-dependent accrual, spends and manual
//! corrections.

mod rates;
mod tracker;

pub use rates::{
    DEFAULT_DOUBLE_SECONDS_PER_ELIXIR, DEFAULT_MAX_ELIXIR, DEFAULT_SINGLE_SECONDS_PER_ELIXIR,
    DEFAULT_TRIPLE_SECONDS_PER_ELIXIR, ElixirRates,
};
pub use tracker::{ElixirInputError, ElixirTracker};
