//! Presentation events published by the coordinator
//!
//! These are the outbound side effects meant for the kiosk UI:
//! - Phase changes and the flags derived from them
//! - Warning, toast, lockout modal, export-decision prompt and end screen
//! - Session application, content loading and reset progress

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::audit::OverrideAuditEntry;
use crate::domain::{LockoutFlags, OperatorMode, TimelinePhase};

/// Why a reset completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResetReason {
    /// Nothing was busy when the reset began
    Immediate,
    /// Busy work finished during the grace period
    BusyCleared,
    /// The grace period ran out and busy work was canceled
    GraceExpired,
}

impl std::fmt::Display for ResetReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Immediate => write!(f, "immediate"),
            Self::BusyCleared => write!(f, "busy-cleared"),
            Self::GraceExpired => write!(f, "grace-expired"),
        }
    }
}

/// Event vocabulary of the booth timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BoothEvent {
    // === Timeline ===
    /// The phase changed; `flags` are the recomputed lockout flags
    PhaseChanged {
        from: TimelinePhase,
        to: TimelinePhase,
        flags: LockoutFlags,
    },
    /// Operator mode switched at runtime
    OperatorModeChanged { mode: OperatorMode, flags: LockoutFlags },
    /// Remaining session time from the clock
    TimerTick {
        #[serde(rename = "remaining-secs")]
        remaining_secs: u64,
    },

    // === Surfaces ===
    /// Blocking warning for customers
    WarningShown,
    /// Non-blocking toast for operators
    ToastShown { message: String },
    WarningHidden,
    LockoutModalOpened,
    LockoutModalClosed,
    ExportDecisionRequested,
    EndScreenShown,

    // === Session ===
    /// Session buffered until configuration loads
    SessionDeferred {
        #[serde(rename = "session-key")]
        session_key: String,
    },
    SessionApplied {
        #[serde(rename = "session-key")]
        session_key: String,
        path: PathBuf,
    },
    ContentLoaded { path: PathBuf, items: usize },
    /// Content failed to load; the session stays active
    ContentLoadFailed { path: PathBuf, message: String },
    /// The previous session's content list was dropped
    ContentCleared,

    // === Reset ===
    /// Reset is waiting for busy work
    ResetDeferred {
        attempt: u64,
        #[serde(rename = "grace-secs")]
        grace_secs: u64,
    },
    ResetPostponed,
    ResetCompleted { reason: ResetReason },
    BusyChanged { busy: bool },

    // === Operator ===
    OverrideRecorded { entry: OverrideAuditEntry },
    /// An operator command was refused in the current phase or mode
    CommandRejected { command: String, reason: String },
}

impl BoothEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::PhaseChanged { .. } => "phase-changed",
            Self::OperatorModeChanged { .. } => "operator-mode-changed",
            Self::TimerTick { .. } => "timer-tick",
            Self::WarningShown => "warning-shown",
            Self::ToastShown { .. } => "toast-shown",
            Self::WarningHidden => "warning-hidden",
            Self::LockoutModalOpened => "lockout-modal-opened",
            Self::LockoutModalClosed => "lockout-modal-closed",
            Self::ExportDecisionRequested => "export-decision-requested",
            Self::EndScreenShown => "end-screen-shown",
            Self::SessionDeferred { .. } => "session-deferred",
            Self::SessionApplied { .. } => "session-applied",
            Self::ContentLoaded { .. } => "content-loaded",
            Self::ContentLoadFailed { .. } => "content-load-failed",
            Self::ContentCleared => "content-cleared",
            Self::ResetDeferred { .. } => "reset-deferred",
            Self::ResetPostponed => "reset-postponed",
            Self::ResetCompleted { .. } => "reset-completed",
            Self::BusyChanged { .. } => "busy-changed",
            Self::OverrideRecorded { .. } => "override-recorded",
            Self::CommandRejected { .. } => "command-rejected",
        }
    }
}
