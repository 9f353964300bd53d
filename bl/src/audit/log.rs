//! In-memory override log for the current session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// Operator actions that diverge from the automatic timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverrideAction {
    /// Admin dismissed the "five minutes left" warning
    #[serde(rename = "t_minus_5_dismiss")]
    TMinus5Dismiss,
    /// Admin kept working after time ran out
    #[serde(rename = "t_zero_continue_working")]
    TZeroContinueWorking,
    /// Admin postponed a pending reset
    #[serde(rename = "n_59_reset_postpone")]
    N59ResetPostpone,
}

impl OverrideAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TMinus5Dismiss => "t_minus_5_dismiss",
            Self::TZeroContinueWorking => "t_zero_continue_working",
            Self::N59ResetPostpone => "n_59_reset_postpone",
        }
    }
}

impl std::fmt::Display for OverrideAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One recorded override
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideAuditEntry {
    /// Unique entry ID
    pub id: String,
    pub action: OverrideAction,
    /// Session the override happened in
    #[serde(rename = "session-key", default, skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,
    /// RFC 3339 timestamp
    pub timestamp: DateTime<Utc>,
}

impl OverrideAuditEntry {
    pub fn new(action: OverrideAction, session_key: Option<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            action,
            session_key,
            timestamp: Utc::now(),
        }
    }
}

/// Append-only override list for the current session
#[derive(Debug, Default)]
pub struct OverrideLog {
    entries: Vec<OverrideAuditEntry>,
    occurred: bool,
}

impl OverrideLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an override and raise the "override occurred" flag
    pub fn record(&mut self, action: OverrideAction, session_key: Option<&str>) -> OverrideAuditEntry {
        info!(%action, ?session_key, "Override recorded");
        let entry = OverrideAuditEntry::new(action, session_key.map(str::to_string));
        self.entries.push(entry.clone());
        self.occurred = true;
        entry
    }

    /// Whether any override happened since the last session was applied
    pub fn override_occurred(&self) -> bool {
        self.occurred
    }

    pub fn entries(&self) -> &[OverrideAuditEntry] {
        &self.entries
    }

    /// Start fresh for a newly applied session
    pub fn clear(&mut self) {
        debug!(entries = self.entries.len(), "OverrideLog::clear: called");
        self.entries.clear();
        self.occurred = false;
    }
}
