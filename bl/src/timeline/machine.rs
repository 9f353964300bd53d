//! PhaseMachine - the five-phase session timeline
//!
//! ```text
//! NoSession --session-applied--> Active --warning--> Warned
//!                                  ^  <--dismiss/ack--'  |
//!                                  |                     | lockout
//!                                  '--admin-continue-- Locked <--lockout-- Active
//! Active/Warned/Locked --reset-requested--> ResetPending --reset-completed--> NoSession
//! ```
//!
//! Clock signals that do not apply to the current phase are ignored. Operator
//! commands that do not apply return a [`TimelineError`].

use tracing::{debug, info};

use super::effect::Effect;
use super::error::TimelineError;
use crate::domain::{LockoutFlags, OperatorMode, TimelinePhase};
use crate::events::BoothEvent;

const WARNING_TOAST: &str = "Five minutes left in this session";

/// Owner of the live [`TimelinePhase`]
#[derive(Debug, Default)]
pub struct PhaseMachine {
    phase: TimelinePhase,
    mode: OperatorMode,
    /// Open/closed bit of the admin lockout modal, meaningful only while Locked
    modal_open: bool,
}

impl PhaseMachine {
    pub fn new(mode: OperatorMode) -> Self {
        debug!(%mode, "PhaseMachine::new: called");
        Self {
            phase: TimelinePhase::NoSession,
            mode,
            modal_open: false,
        }
    }

    pub fn phase(&self) -> TimelinePhase {
        self.phase
    }

    pub fn mode(&self) -> OperatorMode {
        self.mode
    }

    /// Current lockout flags
    pub fn flags(&self) -> LockoutFlags {
        LockoutFlags::derive(self.phase, self.mode, self.modal_open)
    }

    /// Switch operator mode; flags are recomputed, no transition fires
    pub fn set_mode(&mut self, mode: OperatorMode) -> Vec<Effect> {
        if self.mode == mode {
            return vec![];
        }
        info!(from = %self.mode, to = %mode, "Operator mode changed");
        self.mode = mode;
        vec![Effect::Emit(BoothEvent::OperatorModeChanged {
            mode,
            flags: self.flags(),
        })]
    }

    fn transition(&mut self, to: TimelinePhase, effects: &mut Vec<Effect>) {
        let from = self.phase;
        if from == to {
            return;
        }
        info!(%from, %to, "Phase transition");
        self.phase = to;
        effects.push(Effect::Emit(BoothEvent::PhaseChanged {
            from,
            to,
            flags: self.flags(),
        }));
    }

    /// Hide the warning and close the lockout modal, whichever are showing
    fn clear_surfaces(&mut self, effects: &mut Vec<Effect>) {
        if self.phase == TimelinePhase::Warned {
            effects.push(Effect::Emit(BoothEvent::WarningHidden));
        }
        if self.modal_open {
            self.modal_open = false;
            effects.push(Effect::Emit(BoothEvent::LockoutModalClosed));
        }
    }

    fn require_mode(&self, command: &'static str, required: OperatorMode) -> Result<(), TimelineError> {
        if self.mode != required {
            return Err(TimelineError::WrongMode { command, required });
        }
        Ok(())
    }

    fn require_phase(&self, command: &'static str, phase: TimelinePhase) -> Result<(), TimelineError> {
        if self.phase != phase {
            return Err(TimelineError::NotPermitted {
                command,
                phase: self.phase,
            });
        }
        Ok(())
    }

    /// A new session was applied; any phase goes to Active with clean surfaces
    pub fn session_applied(&mut self) -> Vec<Effect> {
        debug!(phase = %self.phase, "PhaseMachine::session_applied: called");
        let mut effects = Vec::new();
        self.clear_surfaces(&mut effects);
        self.transition(TimelinePhase::Active, &mut effects);
        effects
    }

    /// Clock says time is almost up
    pub fn warning(&mut self) -> Vec<Effect> {
        debug!(phase = %self.phase, "PhaseMachine::warning: called");
        if self.phase != TimelinePhase::Active {
            debug!("PhaseMachine::warning: not active, ignoring");
            return vec![];
        }

        let mut effects = Vec::new();
        self.transition(TimelinePhase::Warned, &mut effects);
        if self.mode.is_admin() {
            effects.push(Effect::Emit(BoothEvent::ToastShown {
                message: WARNING_TOAST.to_string(),
            }));
        } else {
            effects.push(Effect::Emit(BoothEvent::WarningShown));
        }
        effects
    }

    /// Admin dismissed the warning (an override)
    pub fn dismiss_warning(&mut self) -> Result<Vec<Effect>, TimelineError> {
        debug!(phase = %self.phase, "PhaseMachine::dismiss_warning: called");
        self.require_mode("warning-dismissed", OperatorMode::Admin)?;
        self.require_phase("warning-dismissed", TimelinePhase::Warned)?;

        let mut effects = Vec::new();
        self.clear_surfaces(&mut effects);
        self.transition(TimelinePhase::Active, &mut effects);
        Ok(effects)
    }

    /// Customer acknowledged the warning (the expected path)
    pub fn acknowledge_warning(&mut self) -> Result<Vec<Effect>, TimelineError> {
        debug!(phase = %self.phase, "PhaseMachine::acknowledge_warning: called");
        self.require_mode("warning-acknowledged", OperatorMode::Customer)?;
        self.require_phase("warning-acknowledged", TimelinePhase::Warned)?;

        let mut effects = Vec::new();
        self.clear_surfaces(&mut effects);
        self.transition(TimelinePhase::Active, &mut effects);
        Ok(effects)
    }

    /// Clock says time is up
    ///
    /// Fan-out order: lock, lockout modal (admin only), export-decision prompt, end screen.
    pub fn lockout(&mut self) -> Vec<Effect> {
        debug!(phase = %self.phase, "PhaseMachine::lockout: called");
        if !matches!(self.phase, TimelinePhase::Active | TimelinePhase::Warned) {
            debug!("PhaseMachine::lockout: not active or warned, ignoring");
            return vec![];
        }

        let mut effects = Vec::new();
        self.clear_surfaces(&mut effects);
        self.modal_open = self.mode.is_admin();
        self.transition(TimelinePhase::Locked, &mut effects);
        if self.modal_open {
            effects.push(Effect::Emit(BoothEvent::LockoutModalOpened));
        }
        effects.push(Effect::Emit(BoothEvent::ExportDecisionRequested));
        effects.push(Effect::Emit(BoothEvent::EndScreenShown));
        effects
    }

    /// Admin keeps working after lockout (an override)
    pub fn admin_continue(&mut self) -> Result<Vec<Effect>, TimelineError> {
        debug!(phase = %self.phase, "PhaseMachine::admin_continue: called");
        self.require_mode("admin-continue", OperatorMode::Admin)?;
        self.require_phase("admin-continue", TimelinePhase::Locked)?;

        let mut effects = Vec::new();
        self.clear_surfaces(&mut effects);
        self.transition(TimelinePhase::Active, &mut effects);
        Ok(effects)
    }

    /// Admin closes the lockout modal; the lock stays
    pub fn dismiss_lockout_modal(&mut self) -> Result<Vec<Effect>, TimelineError> {
        debug!(phase = %self.phase, "PhaseMachine::dismiss_lockout_modal: called");
        self.require_mode("admin-dismiss-modal", OperatorMode::Admin)?;
        self.require_phase("admin-dismiss-modal", TimelinePhase::Locked)?;

        let mut effects = Vec::new();
        self.clear_surfaces(&mut effects);
        Ok(effects)
    }

    /// Enter ResetPending from a live session phase
    pub fn enter_reset_pending(&mut self) -> Vec<Effect> {
        debug!(phase = %self.phase, "PhaseMachine::enter_reset_pending: called");
        let mut effects = Vec::new();
        if matches!(
            self.phase,
            TimelinePhase::Active | TimelinePhase::Warned | TimelinePhase::Locked
        ) {
            self.clear_surfaces(&mut effects);
            self.transition(TimelinePhase::ResetPending, &mut effects);
        }
        effects
    }

    /// The reset went through
    pub fn reset_completed(&mut self) -> Vec<Effect> {
        debug!(phase = %self.phase, "PhaseMachine::reset_completed: called");
        let mut effects = Vec::new();
        self.clear_surfaces(&mut effects);
        self.transition(TimelinePhase::NoSession, &mut effects);
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(effects: &[Effect]) -> Vec<&'static str> {
        effects
            .iter()
            .filter_map(Effect::emitted)
            .map(BoothEvent::event_type)
            .collect()
    }

    fn active(mode: OperatorMode) -> PhaseMachine {
        let mut machine = PhaseMachine::new(mode);
        machine.session_applied();
        machine
    }

    #[test]
    fn test_customer_warning_blocks_editing() {
        let mut machine = active(OperatorMode::Customer);
        let effects = machine.warning();

        assert_eq!(machine.phase(), TimelinePhase::Warned);
        assert_eq!(events(&effects), vec!["phase-changed", "warning-shown"]);
        assert!(machine.flags().editing_locked);
    }

    #[test]
    fn test_admin_warning_is_a_toast() {
        let mut machine = active(OperatorMode::Admin);
        let effects = machine.warning();

        assert_eq!(events(&effects), vec!["phase-changed", "toast-shown"]);
        assert!(!machine.flags().editing_locked);
    }

    #[test]
    fn test_repeated_warning_has_no_effects() {
        let mut machine = active(OperatorMode::Customer);
        machine.warning();
        assert!(machine.warning().is_empty());
        assert_eq!(machine.phase(), TimelinePhase::Warned);
    }

    #[test]
    fn test_dismiss_requires_admin() {
        let mut machine = active(OperatorMode::Customer);
        machine.warning();

        let err = machine.dismiss_warning().unwrap_err();
        assert!(matches!(err, TimelineError::WrongMode { .. }));
        assert_eq!(machine.phase(), TimelinePhase::Warned);

        assert!(machine.acknowledge_warning().is_ok());
        assert_eq!(machine.phase(), TimelinePhase::Active);
    }

    #[test]
    fn test_customer_lockout_is_silent() {
        let mut machine = active(OperatorMode::Customer);
        machine.warning();
        let effects = machine.lockout();

        assert_eq!(
            events(&effects),
            vec![
                "warning-hidden",
                "phase-changed",
                "export-decision-requested",
                "end-screen-shown"
            ]
        );
        assert!(!machine.flags().lockout_modal_visible);
        assert!(machine.flags().editing_locked);
    }

    #[test]
    fn test_admin_lockout_opens_modal() {
        let mut machine = active(OperatorMode::Admin);
        let effects = machine.lockout();

        assert_eq!(
            events(&effects),
            vec![
                "phase-changed",
                "lockout-modal-opened",
                "export-decision-requested",
                "end-screen-shown"
            ]
        );
        assert!(machine.flags().lockout_modal_visible);
    }

    #[test]
    fn test_repeated_lockout_has_no_effects() {
        let mut machine = active(OperatorMode::Admin);
        machine.lockout();
        assert!(machine.lockout().is_empty());
    }

    #[test]
    fn test_dismiss_modal_keeps_lock() {
        let mut machine = active(OperatorMode::Admin);
        machine.lockout();

        let effects = machine.dismiss_lockout_modal().unwrap();
        assert_eq!(events(&effects), vec!["lockout-modal-closed"]);
        assert_eq!(machine.phase(), TimelinePhase::Locked);
        assert!(machine.flags().editing_locked);
        assert!(!machine.flags().lockout_modal_visible);
    }

    #[test]
    fn test_admin_continue_unlocks() {
        let mut machine = active(OperatorMode::Admin);
        machine.lockout();

        let effects = machine.admin_continue().unwrap();
        assert_eq!(events(&effects), vec!["lockout-modal-closed", "phase-changed"]);
        assert_eq!(machine.phase(), TimelinePhase::Active);
        assert!(!machine.flags().editing_locked);
    }

    #[test]
    fn test_admin_continue_rejected_for_customer() {
        let mut machine = active(OperatorMode::Customer);
        machine.lockout();
        assert!(machine.admin_continue().is_err());
        assert_eq!(machine.phase(), TimelinePhase::Locked);
    }

    #[test]
    fn test_signals_ignored_without_session() {
        let mut machine = PhaseMachine::new(OperatorMode::Customer);
        assert!(machine.warning().is_empty());
        assert!(machine.lockout().is_empty());
        assert!(machine.enter_reset_pending().is_empty());
        assert_eq!(machine.phase(), TimelinePhase::NoSession);
    }

    #[test]
    fn test_reset_cycle() {
        let mut machine = active(OperatorMode::Admin);
        machine.lockout();
        machine.enter_reset_pending();
        assert_eq!(machine.phase(), TimelinePhase::ResetPending);
        assert!(machine.flags().editing_locked);

        machine.reset_completed();
        assert_eq!(machine.phase(), TimelinePhase::NoSession);
        assert_eq!(machine.flags(), LockoutFlags::default());
    }

    #[test]
    fn test_set_mode_recomputes_flags() {
        let mut machine = active(OperatorMode::Customer);
        machine.warning();
        assert!(machine.flags().editing_locked);

        let effects = machine.set_mode(OperatorMode::Admin);
        assert_eq!(events(&effects), vec!["operator-mode-changed"]);
        assert!(!machine.flags().editing_locked);
        assert!(machine.set_mode(OperatorMode::Admin).is_empty());
    }
}
