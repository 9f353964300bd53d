//! Coordinator - the actor that drives the timeline
//!
//! All inputs are serialised through one channel into a single
//! [`BoothController`](crate::timeline::BoothController). The actor executes
//! the returned effects:
//! - **Events:** published on the [`EventBus`](crate::events::EventBus)
//! - **Grace timer:** one live sleep task that reports back into the channel
//! - **Services:** content loads and busy-work cancels run in spawned tasks

mod config;
mod core;
mod handle;
mod messages;
mod timer;

pub use config::CoordinatorConfig;
pub use core::Coordinator;
pub use handle::CoordinatorHandle;
pub use messages::CoordinatorMetrics;
