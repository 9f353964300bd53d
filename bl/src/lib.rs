//! BoothLock - Session timeline and lockout coordinator for photo-booth kiosks
//!
//! A customer gets the kiosk for a fixed duration. An external session clock
//! announces the warning, the lockout and the reset; BoothLock turns those
//! signals into phase transitions, protects in-flight export work during the
//! reset, and keeps a record of every operator override.
//!
//! # Core Concepts
//!
//! - **Phases**: `NoSession -> Active -> Warned -> Locked -> ResetPending -> NoSession`
//! - **Grace Period**: a busy reset waits up to `grace-secs` for export/import work
//! - **Reset Wins**: when the grace period expires the busy work is canceled and the reset proceeds
//! - **Overrides**: operator deviations from the timeline are audited until the next session
//!
//! # Modules
//!
//! - [`domain`] - Session descriptors, phases and derived lockout flags
//! - [`busy`] - Aggregation of export/import busy statuses
//! - [`session`] - Session identity tracking and content-load fencing
//! - [`timeline`] - Phase machine, reset grace coordinator and controller
//! - [`audit`] - Override log and its JSONL store
//! - [`coordinator`] - The actor that owns the controller and drives timers and services
//! - [`events`] - Presentation event bus
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod audit;
pub mod busy;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod events;
pub mod feed;
pub mod services;
pub mod session;
pub mod timeline;

// Re-export commonly used types
pub use audit::{AuditStore, OverrideAction, OverrideAuditEntry, OverrideLog};
pub use busy::{BusyAggregator, BusySource, BusyTransition};
pub use config::{AuditConfig, Config, ServicesConfig, TimelineSettings};
pub use coordinator::{Coordinator, CoordinatorConfig, CoordinatorHandle, CoordinatorMetrics};
pub use domain::{LockoutFlags, OperatorMode, SessionDescriptor, TimelinePhase};
pub use events::{BoothEvent, EventBus, ResetReason, create_event_bus};
pub use feed::InboundEvent;
pub use services::{BoothServices, LocalServices};
pub use session::{ApplyOutcome, LoadFence, SessionTracker};
pub use timeline::{
    BoothController, Completion, Effect, Input, PhaseMachine, ResetCoordinator, ResetDecision, ResetState, TimelineError,
    TimelineSnapshot,
};
