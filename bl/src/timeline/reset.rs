//! ResetCoordinator - immediate vs deferred reset and the grace timer race
//!
//! The coordinator only decides; it never touches the clock. A deferred reset
//! gets an attempt number that stamps its grace timer, so a firing from a
//! replaced or canceled timer is recognised and dropped.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::TimelineError;

/// Observable reset state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetState {
    /// Waiting for busy work or the grace period
    pub pending: bool,
    /// Operator postponed the current attempt
    pub postponed: bool,
    /// Attempt whose grace timer is live
    #[serde(rename = "timer-attempt", default, skip_serializing_if = "Option::is_none")]
    pub timer_attempt: Option<u64>,
}

/// Outcome of `begin_reset`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetDecision {
    /// Nothing busy: reset now. `canceled` is a timer that must be stopped.
    Immediate { canceled: Option<u64> },
    /// Busy: wait up to `grace`. `replaced` is a previous timer that must be stopped.
    Deferred {
        attempt: u64,
        grace: Duration,
        replaced: Option<u64>,
    },
}

#[derive(Debug, Default)]
pub struct ResetCoordinator {
    pending: bool,
    postponed: bool,
    timer_attempt: Option<u64>,
    attempts: u64,
}

impl ResetCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ResetState {
        ResetState {
            pending: self.pending,
            postponed: self.postponed,
            timer_attempt: self.timer_attempt,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Start a reset attempt
    ///
    /// Postponement is per attempt, so it is cleared here.
    pub fn begin_reset(&mut self, busy: bool, grace: Duration) -> ResetDecision {
        debug!(busy, ?grace, "ResetCoordinator::begin_reset: called");
        self.postponed = false;
        let previous = self.timer_attempt.take();

        if !busy {
            self.pending = false;
            return ResetDecision::Immediate { canceled: previous };
        }

        self.attempts += 1;
        self.pending = true;
        self.timer_attempt = Some(self.attempts);
        ResetDecision::Deferred {
            attempt: self.attempts,
            grace,
            replaced: previous,
        }
    }

    /// Busy work just finished; true if that completes the pending reset
    pub fn busy_cleared(&self) -> bool {
        let completes = self.pending && !self.postponed;
        debug!(completes, "ResetCoordinator::busy_cleared: called");
        completes
    }

    /// The grace timer for `attempt` fired; true if that forces the reset
    pub fn grace_expired(&self, attempt: u64) -> bool {
        let forces = self.pending && !self.postponed && self.timer_attempt == Some(attempt);
        debug!(attempt, forces, "ResetCoordinator::grace_expired: called");
        forces
    }

    /// Operator postpones the pending reset
    ///
    /// Returns the timer attempt to cancel.
    pub fn postpone(&mut self) -> Result<Option<u64>, TimelineError> {
        debug!(pending = self.pending, "ResetCoordinator::postpone: called");
        if !self.pending {
            return Err(TimelineError::NoResetPending);
        }
        self.pending = false;
        self.postponed = true;
        Ok(self.timer_attempt.take())
    }

    /// Operator asks for the reset now; the caller re-runs `begin_reset`
    pub fn reset_now(&mut self) {
        debug!("ResetCoordinator::reset_now: called");
        self.postponed = false;
    }

    /// Drop all reset state; returns the live timer attempt, if any
    pub fn clear(&mut self) -> Option<u64> {
        debug!("ResetCoordinator::clear: called");
        self.pending = false;
        self.postponed = false;
        self.timer_attempt.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRACE: Duration = Duration::from_secs(30);

    #[test]
    fn test_idle_reset_is_immediate() {
        let mut reset = ResetCoordinator::new();
        assert_eq!(reset.begin_reset(false, GRACE), ResetDecision::Immediate { canceled: None });
        assert_eq!(reset.state(), ResetState::default());
    }

    #[test]
    fn test_busy_reset_is_deferred() {
        let mut reset = ResetCoordinator::new();
        let decision = reset.begin_reset(true, GRACE);

        assert_eq!(
            decision,
            ResetDecision::Deferred {
                attempt: 1,
                grace: GRACE,
                replaced: None
            }
        );
        assert!(reset.is_pending());
        assert_eq!(reset.state().timer_attempt, Some(1));
    }

    #[test]
    fn test_new_attempt_replaces_timer() {
        let mut reset = ResetCoordinator::new();
        reset.begin_reset(true, GRACE);

        match reset.begin_reset(true, GRACE) {
            ResetDecision::Deferred { attempt, replaced, .. } => {
                assert_eq!(attempt, 2);
                assert_eq!(replaced, Some(1));
            }
            other => panic!("Expected deferred reset, got {:?}", other),
        }

        // The old timer's firing is stale
        assert!(!reset.grace_expired(1));
        assert!(reset.grace_expired(2));
    }

    #[test]
    fn test_postpone_suppresses_both_paths() {
        let mut reset = ResetCoordinator::new();
        reset.begin_reset(true, GRACE);

        assert_eq!(reset.postpone(), Ok(Some(1)));
        assert!(!reset.busy_cleared());
        assert!(!reset.grace_expired(1));
        assert_eq!(
            reset.state(),
            ResetState {
                pending: false,
                postponed: true,
                timer_attempt: None
            }
        );
    }

    #[test]
    fn test_postpone_without_pending_is_error() {
        let mut reset = ResetCoordinator::new();
        assert_eq!(reset.postpone(), Err(TimelineError::NoResetPending));
    }

    #[test]
    fn test_begin_reset_clears_postponed() {
        let mut reset = ResetCoordinator::new();
        reset.begin_reset(true, GRACE);
        reset.postpone().unwrap();

        reset.begin_reset(true, GRACE);
        assert!(!reset.state().postponed);
        assert!(reset.is_pending());
    }

    #[test]
    fn test_clear_returns_live_timer() {
        let mut reset = ResetCoordinator::new();
        reset.begin_reset(true, GRACE);
        assert_eq!(reset.clear(), Some(1));
        assert_eq!(reset.clear(), None);
    }
}
