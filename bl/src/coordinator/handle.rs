//! CoordinatorHandle - Client interface for feeding the timeline

use eyre::{Result, eyre};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::messages::{CoordRequest, CoordinatorMetrics};
use crate::busy::BusySource;
use crate::config::TimelineSettings;
use crate::domain::{OperatorMode, SessionDescriptor};
use crate::timeline::{Input, TimelineSnapshot};

/// Handle for the session clock, the operator UI and subsystems
///
/// This handle is cloneable. Every method only enqueues; outcomes are
/// observed on the event bus or through [`snapshot`](Self::snapshot).
#[derive(Clone)]
pub struct CoordinatorHandle {
    /// Sender to the Coordinator task
    tx: mpsc::Sender<CoordRequest>,
}

impl CoordinatorHandle {
    pub(crate) fn new(tx: mpsc::Sender<CoordRequest>) -> Self {
        debug!("CoordinatorHandle::new: called");
        Self { tx }
    }

    /// Send an external timeline input
    pub async fn send(&self, input: Input) -> Result<()> {
        debug!(input = input.name(), "CoordinatorHandle::send: called");
        self.tx
            .send(CoordRequest::Input(input))
            .await
            .map_err(|_| eyre!("Coordinator channel closed"))?;

        Ok(())
    }

    // === Session clock ===

    pub async fn session_changed(&self, descriptor: SessionDescriptor) -> Result<()> {
        debug!(session_key = %descriptor.session_key, "CoordinatorHandle::session_changed: called");
        self.send(Input::SessionChanged(descriptor)).await
    }

    pub async fn timer_tick(&self, remaining_secs: u64) -> Result<()> {
        self.send(Input::TimerTick { remaining_secs }).await
    }

    pub async fn warning(&self) -> Result<()> {
        self.send(Input::Warning).await
    }

    pub async fn lockout(&self) -> Result<()> {
        self.send(Input::Lockout).await
    }

    pub async fn reset_requested(&self) -> Result<()> {
        self.send(Input::ResetRequested).await
    }

    // === Local configuration ===

    /// Local configuration finished loading; releases a buffered session
    pub async fn config_loaded(&self, settings: TimelineSettings) -> Result<()> {
        self.send(Input::ConfigLoaded(settings)).await
    }

    pub async fn set_operator_mode(&self, mode: OperatorMode) -> Result<()> {
        debug!(%mode, "CoordinatorHandle::set_operator_mode: called");
        self.send(Input::SetOperatorMode(mode)).await
    }

    // === Operator ===

    pub async fn dismiss_warning(&self) -> Result<()> {
        self.send(Input::WarningDismissed).await
    }

    pub async fn acknowledge_warning(&self) -> Result<()> {
        self.send(Input::WarningAcknowledged).await
    }

    pub async fn admin_continue(&self) -> Result<()> {
        self.send(Input::AdminContinue).await
    }

    pub async fn dismiss_lockout_modal(&self) -> Result<()> {
        self.send(Input::DismissLockoutModal).await
    }

    pub async fn postpone(&self) -> Result<()> {
        self.send(Input::Postpone).await
    }

    pub async fn reset_now(&self) -> Result<()> {
        self.send(Input::ResetNow).await
    }

    // === Subsystems ===

    /// Report a subsystem's busy status
    pub async fn busy_changed(&self, source: BusySource, busy: bool) -> Result<()> {
        debug!(%source, busy, "CoordinatorHandle::busy_changed: called");
        self.send(Input::BusyChanged { source, busy }).await
    }

    // === Queries ===

    /// Get a snapshot of the timeline
    pub async fn snapshot(&self) -> Result<TimelineSnapshot> {
        debug!("CoordinatorHandle::snapshot: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(CoordRequest::GetSnapshot { reply_tx })
            .await
            .map_err(|_| eyre!("Coordinator channel closed"))?;

        reply_rx.await.map_err(|_| eyre!("Coordinator shutdown"))
    }

    /// Get coordinator metrics
    pub async fn metrics(&self) -> Result<CoordinatorMetrics> {
        debug!("CoordinatorHandle::metrics: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(CoordRequest::GetMetrics { reply_tx })
            .await
            .map_err(|_| eyre!("Coordinator channel closed"))?;

        reply_rx.await.map_err(|_| eyre!("Coordinator shutdown"))
    }

    /// Request shutdown of the Coordinator
    pub async fn shutdown(&self) -> Result<()> {
        debug!("CoordinatorHandle::shutdown: called");
        self.tx
            .send(CoordRequest::Shutdown)
            .await
            .map_err(|_| eyre!("Coordinator channel closed"))?;

        Ok(())
    }
}
