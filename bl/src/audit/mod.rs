//! Override & Audit Log
//!
//! Every operator action that diverges from the unattended timeline is
//! recorded here. The in-memory [`OverrideLog`] backs the "override occurred"
//! badge; the [`AuditStore`] is the append-only JSONL telemetry sink.

mod log;
mod store;

pub use log::{OverrideAction, OverrideAuditEntry, OverrideLog};
pub use store::AuditStore;
