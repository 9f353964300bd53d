//! Timeline error types

use thiserror::Error;

use crate::domain::{OperatorMode, TimelinePhase};

/// Operator commands refused by the timeline
///
/// Clock signals never produce these; out-of-order or repeated signals are
/// absorbed silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimelineError {
    #[error("{command} is not permitted in phase {phase}")]
    NotPermitted {
        command: &'static str,
        phase: TimelinePhase,
    },

    #[error("{command} requires {required} mode")]
    WrongMode {
        command: &'static str,
        required: OperatorMode,
    },

    #[error("No reset is pending")]
    NoResetPending,
}
