//! SessionTracker - dedupe and deferral of session-apply events

use tracing::debug;

use crate::domain::SessionDescriptor;

/// Result of offering a descriptor to the tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Configuration has not loaded; the descriptor is buffered (latest wins)
    Deferred,
    /// Same key as the last applied session; nothing to do
    Duplicate,
    /// A new session; the caller must tear down and load it
    Applied(SessionDescriptor),
}

/// Tracks which session is applied and which one is waiting for configuration
#[derive(Debug, Default)]
pub struct SessionTracker {
    config_loaded: bool,
    buffered: Option<SessionDescriptor>,
    current: Option<SessionDescriptor>,
    last_applied_key: Option<String>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a descriptor from a "session changed" event
    pub fn apply(&mut self, descriptor: SessionDescriptor) -> ApplyOutcome {
        debug!(session_key = %descriptor.session_key, "SessionTracker::apply: called");

        if !self.config_loaded {
            debug!("SessionTracker::apply: config not loaded, buffering");
            self.buffered = Some(descriptor);
            return ApplyOutcome::Deferred;
        }

        if self.last_applied_key.as_deref() == Some(descriptor.session_key.as_str()) {
            debug!("SessionTracker::apply: duplicate session key");
            return ApplyOutcome::Duplicate;
        }

        self.last_applied_key = Some(descriptor.session_key.clone());
        self.current = Some(descriptor.clone());
        ApplyOutcome::Applied(descriptor)
    }

    /// Mark configuration as loaded
    ///
    /// Returns the buffered descriptor the first time only; the caller applies it.
    pub fn config_loaded(&mut self) -> Option<SessionDescriptor> {
        if self.config_loaded {
            debug!("SessionTracker::config_loaded: already loaded");
            return None;
        }
        debug!(buffered = self.buffered.is_some(), "SessionTracker::config_loaded: first load");
        self.config_loaded = true;
        self.buffered.take()
    }

    pub fn is_config_loaded(&self) -> bool {
        self.config_loaded
    }

    /// The applied session, if any
    pub fn current(&self) -> Option<&SessionDescriptor> {
        self.current.as_ref()
    }

    /// Forget the applied session after a completed reset
    ///
    /// The last-applied key goes too, so the next session is applied even if
    /// the clock reuses its key.
    pub fn clear(&mut self) {
        debug!("SessionTracker::clear: called");
        self.current = None;
        self.last_applied_key = None;
    }
}
