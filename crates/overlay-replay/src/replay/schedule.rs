use crate::config::PhaseChange;

/// Pending phase changes, consumed in match-time order.
#[derive(Debug, Clone)]
pub struct PhaseSchedule {
    changes: Vec<PhaseChange>,
    next: usize,
}

impl PhaseSchedule {
    /// `changes` must be sorted by `at`; the config validator enforces this.
    pub fn new(changes: Vec<PhaseChange>) -> Self {
        Self { changes, next: 0 }
    }

    /// Removes and returns every change due at or before `now`.
    pub fn due(&mut self, now: f64) -> &[PhaseChange] {
        let start = self.next;
        while self
            .changes
            .get(self.next)
            .is_some_and(|change| change.at <= now)
        {
            self.next += 1;
        }
        &self.changes[start..self.next]
    }

    pub fn remaining(&self) -> usize {
        self.changes.len() - self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlay_core::ElixirPhase;

    fn standard_schedule() -> PhaseSchedule {
        PhaseSchedule::new(vec![
            PhaseChange {
                at: 120.0,
                phase: ElixirPhase::Double,
            },
            PhaseChange {
                at: 240.0,
                phase: ElixirPhase::Triple,
            },
        ])
    }

    #[test]
    fn nothing_due_before_first_change() {
        let mut schedule = standard_schedule();
        assert!(schedule.due(119.9).is_empty());
        assert_eq!(schedule.remaining(), 2);
    }

    #[test]
    fn changes_fire_once_in_order() {
        let mut schedule = standard_schedule();
        let due: Vec<ElixirPhase> = schedule.due(120.0).iter().map(|c| c.phase).collect();
        assert_eq!(due, vec![ElixirPhase::Double]);
        assert!(schedule.due(130.0).is_empty());

        let mut schedule = standard_schedule();
        assert_eq!(schedule.due(500.0).len(), 2);
        assert_eq!(schedule.remaining(), 0);
    }
}
