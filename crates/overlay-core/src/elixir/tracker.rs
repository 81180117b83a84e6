use super::rates::ElixirRates;
use crate::model::phase::ElixirPhase;
use thiserror::Error;
use tracing::{Level, event};

/// Rejections from the checked entry points. The unchecked operations never fail.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ElixirInputError {
    #[error("timestamp {now} is earlier than the last update at {last}")]
    TimeWentBackwards { now: f64, last: f64 },
    #[error("timestamp must be finite (got {0})")]
    NonFiniteTimestamp(f64),
    #[error("cost must be a finite, non-negative amount (got {0})")]
    InvalidCost(f64),
}

/// Continuous elixir model for the opponent.
///
/// Elixir accrues with elapsed time at the rate of the current phase and is
/// decremented by spends. Accrual is capped at `max_elixir`, spends floor at
/// zero and manual adjustments clamp to both bounds. A backwards
/// [`Self::advance_time`] is not floored and can leave the value below zero.
#[derive(Debug, Clone)]
pub struct ElixirTracker {
    rates: ElixirRates,
    current: f64,
    last_update: Option<f64>,
    phase: ElixirPhase,
}

impl Default for ElixirTracker {
    fn default() -> Self {
        Self::new(ElixirRates::default())
    }
}

impl ElixirTracker {
    pub fn new(rates: ElixirRates) -> Self {
        Self {
            rates,
            current: 0.0,
            last_update: None,
            phase: ElixirPhase::Single,
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn phase(&self) -> ElixirPhase {
        self.phase
    }

    pub fn last_update(&self) -> Option<f64> {
        self.last_update
    }

    pub fn max_elixir(&self) -> f64 {
        self.rates.max_elixir
    }

    pub fn rates(&self) -> &ElixirRates {
        &self.rates
    }

    /// Accrues elixir for the time elapsed since the previous call.
    ///
    /// The first call only sets the baseline. The whole interval uses the
    /// phase active now, even if a phase boundary fell inside it.
    /// Callers are expected to pass non-decreasing timestamps; an earlier
    /// timestamp subtracts accrual (see [`Self::try_advance_time`]).
    pub fn advance_time(&mut self, now: f64) {
        if let Some(last) = self.last_update {
            let delta = now - last;
            let seconds_per_elixir = self.rates.seconds_per_elixir(self.phase);
            let gained = delta / seconds_per_elixir;
            self.current = (self.current + gained).min(self.rates.max_elixir);
            event!(
                target: "overlay_core::elixir",
                Level::TRACE,
                phase = self.phase.as_str(),
                delta,
                gained,
                current = self.current
            );
        }
        self.last_update = Some(now);
    }

    /// Like [`Self::advance_time`] but refuses non-finite or backwards timestamps.
    pub fn try_advance_time(&mut self, now: f64) -> Result<(), ElixirInputError> {
        if !now.is_finite() {
            return Err(ElixirInputError::NonFiniteTimestamp(now));
        }
        if let Some(last) = self.last_update
            && now < last
        {
            return Err(ElixirInputError::TimeWentBackwards { now, last });
        }
        self.advance_time(now);
        Ok(())
    }

    /// Subtracts a card cost, flooring at zero. A negative cost acts as a gain.
    pub fn spend(&mut self, cost: f64) {
        self.current = (self.current - cost).max(0.0);
    }

    /// Like [`Self::spend`] but refuses negative or non-finite costs.
    pub fn try_spend(&mut self, cost: f64) -> Result<(), ElixirInputError> {
        if !cost.is_finite() || cost < 0.0 {
            return Err(ElixirInputError::InvalidCost(cost));
        }
        self.spend(cost);
        Ok(())
    }

    /// Manual correction, clamped to both bounds.
    pub fn adjust(&mut self, delta: f64) {
        self.current = (self.current + delta).clamp(0.0, self.rates.max_elixir);
        event!(
            target: "overlay_core::elixir",
            Level::DEBUG,
            delta,
            current = self.current,
            "manual adjustment"
        );
    }

    pub fn set_single(&mut self) {
        self.set_phase(ElixirPhase::Single);
    }

    pub fn set_double(&mut self) {
        self.set_phase(ElixirPhase::Double);
    }

    pub fn set_triple(&mut self) {
        self.set_phase(ElixirPhase::Triple);
    }

    /// Switches phase. Takes effect on the next [`Self::advance_time`].
    pub fn set_phase(&mut self, phase: ElixirPhase) {
        if self.phase != phase {
            event!(
                target: "overlay_core::elixir",
                Level::DEBUG,
                from = self.phase.as_str(),
                to = phase.as_str(),
                "phase change"
            );
        }
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    fn tracker_at(value: f64) -> ElixirTracker {
        let mut tracker = ElixirTracker::default();
        tracker.adjust(value);
        tracker
    }

    #[test]
    fn starts_empty_in_single_phase() {
        let tracker = ElixirTracker::default();
        assert_eq!(tracker.current(), 0.0);
        assert_eq!(tracker.last_update(), None);
        assert_eq!(tracker.phase(), ElixirPhase::Single);
        assert_eq!(tracker.max_elixir(), 10.0);
    }

    #[test]
    fn custom_rates_are_kept() {
        let tracker = ElixirTracker::new(ElixirRates::new(3.0, 1.5, 1.0, 12.0));
        assert_eq!(tracker.rates().single, 3.0);
        assert_eq!(tracker.rates().double, 1.5);
        assert_eq!(tracker.rates().triple, 1.0);
        assert_eq!(tracker.max_elixir(), 12.0);
    }

    #[test]
    fn first_update_only_sets_baseline() {
        let mut tracker = ElixirTracker::default();
        tracker.advance_time(10.0);
        assert_eq!(tracker.last_update(), Some(10.0));
        assert_eq!(tracker.current(), 0.0);
    }

    #[test]
    fn single_phase_generates_one_per_rate_interval() {
        let mut tracker = ElixirTracker::default();
        tracker.advance_time(0.0);
        tracker.advance_time(2.8);
        assert!(approx(tracker.current(), 1.0));
        assert_eq!(tracker.last_update(), Some(2.8));
    }

    #[test]
    fn double_and_triple_use_their_rates() {
        let mut double = ElixirTracker::default();
        double.set_double();
        double.advance_time(0.0);
        double.advance_time(1.4);
        assert!(approx(double.current(), 1.0));

        let mut triple = ElixirTracker::default();
        triple.set_triple();
        triple.advance_time(0.0);
        triple.advance_time(0.9);
        assert!(approx(triple.current(), 1.0));
    }

    #[test]
    fn double_phase_generates_twice_single() {
        let mut single = ElixirTracker::default();
        single.advance_time(0.0);
        single.advance_time(2.8);

        let mut double = ElixirTracker::default();
        double.set_double();
        double.advance_time(0.0);
        double.advance_time(2.8);

        assert!(approx(double.current(), single.current() * 2.0));
    }

    #[test]
    fn accrual_caps_at_max() {
        let mut tracker = ElixirTracker::default();
        tracker.advance_time(0.0);
        tracker.advance_time(100.0);
        assert_eq!(tracker.current(), 10.0);
    }

    #[test]
    fn incremental_updates_accumulate() {
        let mut tracker = ElixirTracker::default();
        tracker.advance_time(0.0);
        tracker.advance_time(1.4);
        assert!(approx(tracker.current(), 0.5));
        tracker.advance_time(4.2);
        assert!(approx(tracker.current(), 1.5));
    }

    #[test]
    fn accrual_matches_closed_form_for_single_interval() {
        for (start, end) in [(0.0, 1.0), (3.0, 17.5), (10.0, 40.0), (0.5, 0.6)] {
            let mut tracker = ElixirTracker::default();
            tracker.advance_time(start);
            tracker.advance_time(end);
            let expected = ((end - start) / 2.8_f64).min(10.0);
            assert!(approx(tracker.current(), expected), "{start} -> {end}");
        }
    }

    #[test]
    fn phase_switch_applies_to_next_interval_only() {
        let mut tracker = ElixirTracker::default();
        tracker.advance_time(0.0);
        tracker.set_double();
        assert_eq!(tracker.current(), 0.0);
        tracker.advance_time(2.8);
        assert!(approx(tracker.current(), 2.0));
    }

    #[test]
    fn backwards_time_subtracts_accrual() {
        let mut tracker = tracker_at(5.0);
        tracker.advance_time(10.0);
        tracker.advance_time(7.2);
        assert!(approx(tracker.current(), 4.0));
    }

    #[test]
    fn backwards_time_from_empty_goes_below_zero() {
        let mut tracker = ElixirTracker::default();
        tracker.advance_time(10.0);
        tracker.advance_time(7.2);
        assert!(approx(tracker.current(), -1.0));
        assert_eq!(tracker.last_update(), Some(7.2));

        // The checked entry point refuses the same input and leaves state alone.
        let mut checked = ElixirTracker::default();
        checked.advance_time(10.0);
        assert_eq!(
            checked.try_advance_time(7.2),
            Err(ElixirInputError::TimeWentBackwards {
                now: 7.2,
                last: 10.0
            })
        );
        assert_eq!(checked.current(), 0.0);
        assert_eq!(checked.last_update(), Some(10.0));
    }

    #[test]
    fn spend_reduces_and_clamps_at_zero() {
        let mut tracker = tracker_at(5.0);
        tracker.spend(3.0);
        assert_eq!(tracker.current(), 2.0);
        tracker.spend(3.0);
        assert_eq!(tracker.current(), 0.0);
    }

    #[test]
    fn spend_of_exact_amount_empties() {
        let mut tracker = tracker_at(4.0);
        tracker.spend(4.0);
        assert_eq!(tracker.current(), 0.0);
    }

    #[test]
    fn spend_twice_equals_spend_double() {
        for (start, cost) in [(7.0, 1.5), (3.0, 2.0), (10.0, 6.0)] {
            let mut twice = tracker_at(start);
            twice.spend(cost);
            twice.spend(cost);

            let mut once = tracker_at(start);
            once.spend(cost * 2.0);

            assert!(approx(twice.current(), once.current()));
        }
    }

    #[test]
    fn negative_spend_acts_as_gain() {
        let mut tracker = tracker_at(2.0);
        tracker.spend(-1.5);
        assert!(approx(tracker.current(), 3.5));
    }

    #[test]
    fn adjust_moves_in_both_directions() {
        let mut tracker = tracker_at(5.0);
        tracker.adjust(1.0);
        assert_eq!(tracker.current(), 6.0);
        tracker.adjust(-1.0);
        assert_eq!(tracker.current(), 5.0);
        tracker.adjust(-2.0);
        assert_eq!(tracker.current(), 3.0);
    }

    #[test]
    fn adjust_clamps_to_both_bounds() {
        let mut tracker = tracker_at(8.0);
        for _ in 0..5 {
            tracker.adjust(1e6);
            assert_eq!(tracker.current(), 10.0);
        }
        for _ in 0..5 {
            tracker.adjust(-1e6);
            assert_eq!(tracker.current(), 0.0);
        }
    }

    #[test]
    fn phase_setters_do_not_touch_elixir_or_time() {
        let mut tracker = tracker_at(4.0);
        tracker.advance_time(3.0);
        tracker.set_triple();
        assert_eq!(tracker.phase(), ElixirPhase::Triple);
        tracker.set_double();
        assert_eq!(tracker.phase(), ElixirPhase::Double);
        tracker.set_single();
        assert_eq!(tracker.phase(), ElixirPhase::Single);
        assert_eq!(tracker.current(), 4.0);
        assert_eq!(tracker.last_update(), Some(3.0));
    }

    #[test]
    fn checked_advance_rejects_backwards_time() {
        let mut tracker = ElixirTracker::default();
        tracker.try_advance_time(5.0).expect("baseline");
        let err = tracker.try_advance_time(4.0).expect_err("backwards");
        assert_eq!(err, ElixirInputError::TimeWentBackwards { now: 4.0, last: 5.0 });
        assert_eq!(tracker.last_update(), Some(5.0));
        assert!(tracker.try_advance_time(f64::NAN).is_err());
        tracker.try_advance_time(7.8).expect("forward");
        assert!(approx(tracker.current(), 1.0));
    }

    #[test]
    fn checked_spend_rejects_negative_cost() {
        let mut tracker = tracker_at(5.0);
        assert_eq!(
            tracker.try_spend(-1.0),
            Err(ElixirInputError::InvalidCost(-1.0))
        );
        assert_eq!(tracker.current(), 5.0);
        tracker.try_spend(2.0).expect("valid cost");
        assert_eq!(tracker.current(), 3.0);
    }

    #[test]
    fn typical_match_scenario() {
        let mut tracker = ElixirTracker::default();
        tracker.advance_time(0.0);
        assert_eq!(tracker.current(), 0.0);

        tracker.advance_time(5.0);
        let mut expected = 5.0 / 2.8;
        assert!(approx(tracker.current(), expected));

        tracker.spend(3.0);
        expected = (expected - 3.0_f64).max(0.0);
        assert!(approx(tracker.current(), expected));

        tracker.advance_time(13.0);
        expected += 8.0 / 2.8;
        assert!(approx(tracker.current(), expected));

        tracker.advance_time(120.0);
        tracker.set_double();
        assert_eq!(tracker.current(), 10.0);
        tracker.spend(6.0);
        tracker.advance_time(121.4);
        assert!(approx(tracker.current(), 5.0));
    }

    #[test]
    fn spend_after_short_accrual_clamps() {
        let mut tracker = ElixirTracker::default();
        tracker.advance_time(0.0);
        tracker.advance_time(2.8);
        assert!(approx(tracker.current(), 1.0));
        tracker.spend(3.0);
        assert_eq!(tracker.current(), 0.0);
    }
}
