//! Side effects requested by a transition
//!
//! A transition returns its side effects as an ordered list; the coordinator
//! executes them in that order.

use std::path::PathBuf;
use std::time::Duration;

use crate::audit::OverrideAuditEntry;
use crate::events::BoothEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Publish a presentation event
    Emit(BoothEvent),
    /// Start the grace timer for a reset attempt, replacing any live one
    StartGraceTimer { attempt: u64, grace: Duration },
    /// Cancel the grace timer of a reset attempt (no-op if already gone)
    CancelGraceTimer { attempt: u64 },
    /// Best-effort cancel of in-flight export work
    CancelBusyWork,
    /// Send an override entry to the audit sink
    LogAudit(OverrideAuditEntry),
    /// Load the session's content; the result comes back stamped with `generation`
    LoadContent { generation: u64, path: PathBuf },
}

impl Effect {
    pub fn emitted(&self) -> Option<&BoothEvent> {
        match self {
            Self::Emit(event) => Some(event),
            _ => None,
        }
    }
}
