//! Presentation events
//!
//! Every UI-facing side effect of a transition is published as a
//! [`BoothEvent`] on the [`EventBus`]. The kiosk front end and the CLI printer
//! subscribe; emission never blocks the coordinator.

mod bus;
mod types;

pub use bus::{EventBus, create_event_bus};
pub use types::{BoothEvent, ResetReason};
