//! Domain types for the booth session timeline

mod phase;
mod session;

pub use phase::{LockoutFlags, OperatorMode, TimelinePhase};
pub use session::SessionDescriptor;
