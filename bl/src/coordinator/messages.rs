//! Message types for the Coordinator

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::timeline::{Completion, Input, TimelineSnapshot};

/// Internal requests to the Coordinator task
#[derive(Debug)]
pub(crate) enum CoordRequest {
    /// Feed one external input to the timeline
    Input(Input),

    /// A grace timer fired or a content load finished
    Complete(Completion),

    /// Get a snapshot of the timeline
    GetSnapshot {
        reply_tx: oneshot::Sender<TimelineSnapshot>,
    },

    /// Get coordinator metrics
    GetMetrics {
        reply_tx: oneshot::Sender<CoordinatorMetrics>,
    },

    /// Shutdown the coordinator
    Shutdown,
}

/// Coordinator metrics for observability
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorMetrics {
    /// External inputs received, including rejected ones; completions are not counted
    #[serde(rename = "inputs-received")]
    pub inputs_received: u64,
    /// Operator commands refused by the timeline
    #[serde(rename = "rejected-inputs")]
    pub rejected_inputs: u64,
    /// Resets that reached NoSession
    #[serde(rename = "resets-completed")]
    pub resets_completed: u64,
    /// Resets forced by grace expiry
    #[serde(rename = "grace-expiries")]
    pub grace_expiries: u64,
    #[serde(rename = "overrides-recorded")]
    pub overrides_recorded: u64,
    #[serde(rename = "events-emitted")]
    pub events_emitted: u64,
}
