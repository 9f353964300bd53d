//! GraceTimer - the single live grace timer of a deferred reset
//!
//! Firing sends `GraceExpired` back into the coordinator channel. A firing
//! that races a cancel is still delivered; the controller drops it because
//! its attempt is no longer live.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::messages::CoordRequest;
use crate::timeline::Completion;

#[derive(Debug, Default)]
pub(crate) struct GraceTimer {
    live: Option<(u64, JoinHandle<()>)>,
}

impl GraceTimer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Start the timer for `attempt`, aborting any live one
    pub(crate) fn start(&mut self, attempt: u64, grace: Duration, tx: mpsc::Sender<CoordRequest>) {
        debug!(attempt, ?grace, "GraceTimer::start: called");
        self.abort();

        let task = tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let _ = tx.send(CoordRequest::Complete(Completion::GraceExpired { attempt })).await;
        });
        self.live = Some((attempt, task));
    }

    /// Cancel the timer of `attempt`; a no-op if it is not the live one
    pub(crate) fn cancel(&mut self, attempt: u64) {
        debug!(attempt, "GraceTimer::cancel: called");
        if matches!(self.live, Some((live, _)) if live == attempt) {
            self.abort();
        }
    }

    #[cfg(test)]
    pub(crate) fn live_attempt(&self) -> Option<u64> {
        self.live.as_ref().map(|(attempt, _)| *attempt)
    }

    pub(crate) fn abort(&mut self) {
        if let Some((attempt, task)) = self.live.take() {
            debug!(attempt, "GraceTimer::abort: aborting timer task");
            task.abort();
        }
    }
}

impl Drop for GraceTimer {
    fn drop(&mut self) {
        self.abort();
    }
}
