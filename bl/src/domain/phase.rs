//! Timeline phases, operator mode and the derived lockout flags

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Phase of the session timeline
///
/// Exactly one phase is live at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimelinePhase {
    /// No customer session is loaded
    #[default]
    NoSession,
    /// Customer is working
    Active,
    /// The "time almost up" warning is showing
    Warned,
    /// Time is up; editing is locked
    Locked,
    /// A reset was requested and is waiting for busy work or the grace period
    ResetPending,
}

impl std::fmt::Display for TimelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSession => write!(f, "no-session"),
            Self::Active => write!(f, "active"),
            Self::Warned => write!(f, "warned"),
            Self::Locked => write!(f, "locked"),
            Self::ResetPending => write!(f, "reset-pending"),
        }
    }
}

/// Who is at the terminal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorMode {
    /// Unattended customer terminal: warnings block, lockout is silent
    #[default]
    Customer,
    /// Operator terminal: warnings are toasts, lockout opens a dismissible modal
    Admin,
}

impl OperatorMode {
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for OperatorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for OperatorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OperatorMode::from_str: called");
        match s.to_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            other => Err(format!("Unknown operator mode: {}", other)),
        }
    }
}

/// UI-facing lockout flags
///
/// Always computed from the phase and mode, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockoutFlags {
    #[serde(rename = "editing-locked")]
    pub editing_locked: bool,
    /// The customer warning; an admin in `Warned` only gets a toast
    #[serde(rename = "warning-visible")]
    pub warning_visible: bool,
    #[serde(rename = "lockout-modal-visible")]
    pub lockout_modal_visible: bool,
}

impl LockoutFlags {
    /// Derive the flags for a phase
    ///
    /// `modal_open` is the lockout modal's own open/closed bit; an admin can
    /// close the modal while the lock stays in effect.
    pub fn derive(phase: TimelinePhase, mode: OperatorMode, modal_open: bool) -> Self {
        let editing_locked = match phase {
            TimelinePhase::Locked | TimelinePhase::ResetPending => true,
            TimelinePhase::Warned => !mode.is_admin(),
            TimelinePhase::NoSession | TimelinePhase::Active => false,
        };
        Self {
            editing_locked,
            warning_visible: phase == TimelinePhase::Warned && !mode.is_admin(),
            lockout_modal_visible: phase == TimelinePhase::Locked && mode.is_admin() && modal_open,
        }
    }
}
