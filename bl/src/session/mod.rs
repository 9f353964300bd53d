//! Session identity tracking
//!
//! - [`SessionTracker`] deduplicates session-apply events and buffers them
//!   until local configuration has loaded
//! - [`LoadFence`] stamps content loads with a generation so a slow load for a
//!   previous session cannot overwrite the current one

mod fence;
mod tracker;

pub use fence::LoadFence;
pub use tracker::{ApplyOutcome, SessionTracker};
