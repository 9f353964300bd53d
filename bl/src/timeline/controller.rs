//! BoothController - the single owner of timeline state
//!
//! Every input goes through [`BoothController::handle`], which mutates the
//! components in a fixed order and returns the side effects to execute. The
//! controller is synchronous; the coordinator actor feeds it and runs the
//! effects.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::effect::Effect;
use super::error::TimelineError;
use super::machine::PhaseMachine;
use super::reset::{ResetCoordinator, ResetDecision, ResetState};
use crate::audit::{OverrideAction, OverrideAuditEntry, OverrideLog};
use crate::busy::{BusyAggregator, BusySource, BusyTransition};
use crate::config::TimelineSettings;
use crate::domain::{LockoutFlags, OperatorMode, SessionDescriptor, TimelinePhase};
use crate::events::{BoothEvent, ResetReason};
use crate::session::{ApplyOutcome, LoadFence, SessionTracker};

/// External inputs to the timeline
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    // === Session clock ===
    SessionChanged(SessionDescriptor),
    TimerTick { remaining_secs: u64 },
    Warning,
    Lockout,
    ResetRequested,

    // === Local configuration ===
    ConfigLoaded(TimelineSettings),
    SetOperatorMode(OperatorMode),

    // === Operator ===
    WarningDismissed,
    WarningAcknowledged,
    AdminContinue,
    DismissLockoutModal,
    Postpone,
    ResetNow,

    // === Subsystems ===
    BusyChanged { source: BusySource, busy: bool },
}

impl Input {
    /// Wire name of the input
    pub fn name(&self) -> &'static str {
        match self {
            Self::SessionChanged(_) => "session-changed",
            Self::TimerTick { .. } => "session-timer-tick",
            Self::Warning => "session-warning",
            Self::Lockout => "session-lockout",
            Self::ResetRequested => "session-reset-requested",
            Self::ConfigLoaded(_) => "config-loaded",
            Self::SetOperatorMode(_) => "set-operator-mode",
            Self::WarningDismissed => "warning-dismissed",
            Self::WarningAcknowledged => "warning-acknowledged",
            Self::AdminContinue => "admin-continue",
            Self::DismissLockoutModal => "admin-dismiss-modal",
            Self::Postpone => "postpone",
            Self::ResetNow => "reset-now",
            Self::BusyChanged { .. } => "busy-changed",
        }
    }
}

/// Completion of work started for the timeline
///
/// Only the coordinator's grace timer and its content loads produce these;
/// [`CoordinatorHandle`](crate::coordinator::CoordinatorHandle) cannot send them.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    GraceExpired {
        attempt: u64,
    },
    ContentLoaded {
        generation: u64,
        path: PathBuf,
        result: Result<usize, String>,
    },
}

impl Completion {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GraceExpired { .. } => "grace-expired",
            Self::ContentLoaded { .. } => "content-loaded",
        }
    }
}

/// Point-in-time view of the timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineSnapshot {
    pub phase: TimelinePhase,
    pub mode: OperatorMode,
    pub flags: LockoutFlags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionDescriptor>,
    pub reset: ResetState,
    pub busy: bool,
    #[serde(rename = "override-occurred")]
    pub override_occurred: bool,
    pub overrides: Vec<OverrideAuditEntry>,
    #[serde(rename = "grace-secs")]
    pub grace_secs: u64,
    #[serde(rename = "config-loaded")]
    pub config_loaded: bool,
}

/// Owns every piece of timeline state
#[derive(Debug)]
pub struct BoothController {
    settings: TimelineSettings,
    tracker: SessionTracker,
    fence: LoadFence,
    machine: PhaseMachine,
    reset: ResetCoordinator,
    busy: BusyAggregator,
    overrides: OverrideLog,
}

impl BoothController {
    /// Create a controller; sessions are buffered until `ConfigLoaded`
    pub fn new(settings: TimelineSettings) -> Self {
        debug!(?settings, "BoothController::new: called");
        Self {
            settings,
            tracker: SessionTracker::new(),
            fence: LoadFence::new(),
            machine: PhaseMachine::new(settings.operator_mode),
            reset: ResetCoordinator::new(),
            busy: BusyAggregator::new(),
            overrides: OverrideLog::new(),
        }
    }

    pub fn phase(&self) -> TimelinePhase {
        self.machine.phase()
    }

    pub fn snapshot(&self) -> TimelineSnapshot {
        TimelineSnapshot {
            phase: self.machine.phase(),
            mode: self.machine.mode(),
            flags: self.machine.flags(),
            session: self.tracker.current().cloned(),
            reset: self.reset.state(),
            busy: self.busy.is_busy(),
            override_occurred: self.overrides.override_occurred(),
            overrides: self.overrides.entries().to_vec(),
            grace_secs: self.settings.grace_secs,
            config_loaded: self.tracker.is_config_loaded(),
        }
    }

    /// Apply one input
    ///
    /// Only operator commands can fail; a failed command changes nothing.
    pub fn handle(&mut self, input: Input) -> Result<Vec<Effect>, TimelineError> {
        debug!(input = input.name(), phase = %self.machine.phase(), "BoothController::handle: called");
        match input {
            Input::SessionChanged(descriptor) => Ok(self.session_changed(descriptor)),
            Input::TimerTick { remaining_secs } => Ok(vec![Effect::Emit(BoothEvent::TimerTick { remaining_secs })]),
            Input::Warning => Ok(self.machine.warning()),
            Input::Lockout => Ok(self.machine.lockout()),
            Input::ResetRequested => Ok(self.reset_requested()),
            Input::ConfigLoaded(settings) => Ok(self.config_loaded(settings)),
            Input::SetOperatorMode(mode) => {
                self.settings.operator_mode = mode;
                Ok(self.machine.set_mode(mode))
            }
            Input::WarningDismissed => {
                let mut effects = self.machine.dismiss_warning()?;
                self.record_override(OverrideAction::TMinus5Dismiss, &mut effects);
                Ok(effects)
            }
            Input::WarningAcknowledged => self.machine.acknowledge_warning(),
            Input::AdminContinue => {
                let mut effects = self.machine.admin_continue()?;
                self.record_override(OverrideAction::TZeroContinueWorking, &mut effects);
                Ok(effects)
            }
            Input::DismissLockoutModal => self.machine.dismiss_lockout_modal(),
            Input::Postpone => self.postpone(),
            Input::ResetNow => self.reset_now(),
            Input::BusyChanged { source, busy } => Ok(self.busy_changed(source, busy)),
        }
    }

    /// Apply a completion; stale ones yield no effects
    pub fn complete(&mut self, completion: Completion) -> Vec<Effect> {
        debug!(completion = completion.name(), phase = %self.machine.phase(), "BoothController::complete: called");
        match completion {
            Completion::GraceExpired { attempt } => self.grace_expired(attempt),
            Completion::ContentLoaded {
                generation,
                path,
                result,
            } => self.content_loaded(generation, path, result),
        }
    }

    fn session_changed(&mut self, descriptor: SessionDescriptor) -> Vec<Effect> {
        let session_key = descriptor.session_key.clone();
        match self.tracker.apply(descriptor) {
            ApplyOutcome::Deferred => vec![Effect::Emit(BoothEvent::SessionDeferred { session_key })],
            ApplyOutcome::Duplicate => {
                debug!(%session_key, "BoothController::session_changed: duplicate, ignoring");
                vec![]
            }
            ApplyOutcome::Applied(descriptor) => self.begin_session(descriptor),
        }
    }

    /// Tear down the previous session's transient state, then load the new one
    fn begin_session(&mut self, descriptor: SessionDescriptor) -> Vec<Effect> {
        info!(session_key = %descriptor.session_key, "Applying session");
        let mut effects = Vec::new();

        if let Some(attempt) = self.reset.clear() {
            effects.push(Effect::CancelGraceTimer { attempt });
        }
        effects.extend(self.machine.session_applied());
        self.overrides.clear();

        let path = descriptor.content_path().to_path_buf();
        effects.push(Effect::Emit(BoothEvent::SessionApplied {
            session_key: descriptor.session_key,
            path: path.clone(),
        }));
        let generation = self.fence.next();
        effects.push(Effect::LoadContent { generation, path });
        effects
    }

    fn config_loaded(&mut self, settings: TimelineSettings) -> Vec<Effect> {
        debug!(?settings, "BoothController::config_loaded: called");
        self.settings = settings;
        let mut effects = self.machine.set_mode(settings.operator_mode);

        if let Some(descriptor) = self.tracker.config_loaded() {
            debug!(session_key = %descriptor.session_key, "BoothController::config_loaded: applying buffered session");
            effects.extend(self.session_changed(descriptor));
        }
        effects
    }

    fn reset_requested(&mut self) -> Vec<Effect> {
        match self.machine.phase() {
            TimelinePhase::NoSession => {
                debug!("BoothController::reset_requested: no session, ignoring");
                vec![]
            }
            TimelinePhase::ResetPending if self.reset.is_pending() => {
                debug!("BoothController::reset_requested: reset already pending, ignoring");
                vec![]
            }
            TimelinePhase::ResetPending => self.begin_reset(),
            TimelinePhase::Active | TimelinePhase::Warned | TimelinePhase::Locked => {
                let mut effects = self.machine.enter_reset_pending();
                effects.extend(self.begin_reset());
                effects
            }
        }
    }

    fn begin_reset(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        match self.reset.begin_reset(self.busy.is_busy(), self.settings.grace()) {
            ResetDecision::Immediate { canceled } => {
                if let Some(attempt) = canceled {
                    effects.push(Effect::CancelGraceTimer { attempt });
                }
                self.complete_reset(ResetReason::Immediate, &mut effects);
            }
            ResetDecision::Deferred {
                attempt,
                grace,
                replaced,
            } => {
                info!(attempt, grace_secs = grace.as_secs(), "Reset deferred until busy work finishes");
                if let Some(previous) = replaced {
                    effects.push(Effect::CancelGraceTimer { attempt: previous });
                }
                effects.push(Effect::StartGraceTimer { attempt, grace });
                effects.push(Effect::Emit(BoothEvent::ResetDeferred {
                    attempt,
                    grace_secs: grace.as_secs(),
                }));
            }
        }
        effects
    }

    /// Full teardown back to NoSession
    fn complete_reset(&mut self, reason: ResetReason, effects: &mut Vec<Effect>) {
        info!(%reason, "Reset completed");
        if let Some(attempt) = self.reset.clear() {
            effects.push(Effect::CancelGraceTimer { attempt });
        }
        effects.extend(self.machine.reset_completed());
        self.tracker.clear();
        self.fence.invalidate();
        effects.push(Effect::Emit(BoothEvent::ContentCleared));
        effects.push(Effect::Emit(BoothEvent::ResetCompleted { reason }));
    }

    fn require_admin(&self, command: &'static str) -> Result<(), TimelineError> {
        if !self.machine.mode().is_admin() {
            return Err(TimelineError::WrongMode {
                command,
                required: OperatorMode::Admin,
            });
        }
        Ok(())
    }

    fn require_reset_phase(&self, command: &'static str) -> Result<(), TimelineError> {
        if self.machine.phase() != TimelinePhase::ResetPending {
            return Err(TimelineError::NotPermitted {
                command,
                phase: self.machine.phase(),
            });
        }
        Ok(())
    }

    fn postpone(&mut self) -> Result<Vec<Effect>, TimelineError> {
        self.require_admin("postpone")?;
        self.require_reset_phase("postpone")?;

        let mut effects = Vec::new();
        if let Some(attempt) = self.reset.postpone()? {
            effects.push(Effect::CancelGraceTimer { attempt });
        }
        effects.push(Effect::Emit(BoothEvent::ResetPostponed));
        self.record_override(OverrideAction::N59ResetPostpone, &mut effects);
        Ok(effects)
    }

    /// Re-evaluates busy state; a still-busy booth waits again
    fn reset_now(&mut self) -> Result<Vec<Effect>, TimelineError> {
        self.require_admin("reset-now")?;
        self.require_reset_phase("reset-now")?;

        self.reset.reset_now();
        Ok(self.begin_reset())
    }

    fn busy_changed(&mut self, source: BusySource, busy: bool) -> Vec<Effect> {
        let mut effects = Vec::new();
        let Some(transition) = self.busy.report(source, busy) else {
            return effects;
        };

        effects.push(Effect::Emit(BoothEvent::BusyChanged {
            busy: self.busy.is_busy(),
        }));
        if transition == BusyTransition::BecameIdle && self.reset.busy_cleared() {
            self.complete_reset(ResetReason::BusyCleared, &mut effects);
        }
        effects
    }

    /// Reset wins: cancel busy work, then tear down regardless of the outcome
    fn grace_expired(&mut self, attempt: u64) -> Vec<Effect> {
        if !self.reset.grace_expired(attempt) {
            debug!(attempt, "BoothController::grace_expired: stale timer, ignoring");
            return vec![];
        }

        warn!(attempt, "Grace period expired with work still busy, canceling it");
        let mut effects = vec![Effect::CancelBusyWork];
        self.complete_reset(ResetReason::GraceExpired, &mut effects);
        effects
    }

    fn content_loaded(&mut self, generation: u64, path: PathBuf, result: Result<usize, String>) -> Vec<Effect> {
        if !self.fence.is_current(generation) {
            debug!(generation, current = self.fence.generation(), "BoothController::content_loaded: stale load, discarding");
            return vec![];
        }

        match result {
            Ok(items) => vec![Effect::Emit(BoothEvent::ContentLoaded { path, items })],
            Err(message) => {
                warn!(path = %path.display(), %message, "Session content failed to load");
                vec![Effect::Emit(BoothEvent::ContentLoadFailed { path, message })]
            }
        }
    }

    fn record_override(&mut self, action: OverrideAction, effects: &mut Vec<Effect>) {
        let session_key = self.tracker.current().map(|d| d.session_key.as_str());
        let entry = self.overrides.record(action, session_key);
        effects.push(Effect::LogAudit(entry.clone()));
        effects.push(Effect::Emit(BoothEvent::OverrideRecorded { entry }));
    }
}
