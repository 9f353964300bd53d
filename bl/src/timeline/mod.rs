//! Session timeline
//!
//! - [`PhaseMachine`] owns the phase and the lockout surfaces
//! - [`ResetCoordinator`] decides immediate vs deferred resets
//! - [`BoothController`] owns all timeline state and turns inputs into [`Effect`]s

mod controller;
mod effect;
mod error;
mod machine;
mod reset;

pub use controller::{BoothController, Completion, Input, TimelineSnapshot};
pub use effect::Effect;
pub use error::TimelineError;
pub use machine::PhaseMachine;
pub use reset::{ResetCoordinator, ResetDecision, ResetState};
