//! Inbound event feed
//!
//! `bl run` reads one JSON object per line. The `event` field names the
//! input, e.g.
//!
//! ```text
//! {"event":"session-changed","session-key":"s-1","storage-path":"/srv/booth/s-1"}
//! {"event":"busy-changed","source":"export","busy":true}
//! {"event":"session-reset-requested"}
//! ```

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::busy::BusySource;
use crate::config::TimelineSettings;
use crate::domain::{OperatorMode, SessionDescriptor};
use crate::timeline::Input;

/// One line of the inbound feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum InboundEvent {
    // === Session clock ===
    SessionChanged(SessionDescriptor),
    SessionTimerTick {
        #[serde(rename = "remaining-secs")]
        remaining_secs: u64,
    },
    SessionWarning,
    SessionLockout,
    SessionResetRequested,

    // === Local configuration ===
    /// Local configuration is ready; the loaded settings are applied
    ConfigLoaded,
    SetOperatorMode { mode: OperatorMode },

    // === Operator ===
    WarningDismissed,
    WarningAcknowledged,
    AdminContinue,
    AdminDismissModal,
    Postpone,
    ResetNow,

    // === Subsystems ===
    BusyChanged { source: BusySource, busy: bool },
}

impl InboundEvent {
    /// Parse one feed line; blank lines and `#` comments yield None
    pub fn parse_line(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let event = serde_json::from_str(line).context(format!("Invalid feed line: {}", line))?;
        Ok(Some(event))
    }

    /// Convert to a timeline input; `settings` fills `config-loaded`
    pub fn into_input(self, settings: &TimelineSettings) -> Input {
        match self {
            Self::SessionChanged(descriptor) => Input::SessionChanged(descriptor),
            Self::SessionTimerTick { remaining_secs } => Input::TimerTick { remaining_secs },
            Self::SessionWarning => Input::Warning,
            Self::SessionLockout => Input::Lockout,
            Self::SessionResetRequested => Input::ResetRequested,
            Self::ConfigLoaded => Input::ConfigLoaded(*settings),
            Self::SetOperatorMode { mode } => Input::SetOperatorMode(mode),
            Self::WarningDismissed => Input::WarningDismissed,
            Self::WarningAcknowledged => Input::WarningAcknowledged,
            Self::AdminContinue => Input::AdminContinue,
            Self::AdminDismissModal => Input::DismissLockoutModal,
            Self::Postpone => Input::Postpone,
            Self::ResetNow => Input::ResetNow,
            Self::BusyChanged { source, busy } => Input::BusyChanged { source, busy },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_parse_session_changed() {
        let line = r#"{"event":"session-changed","session-key":"s-1","storage-path":"/srv/booth/s-1","raw-storage-path":"/srv/raw/s-1"}"#;
        let event = InboundEvent::parse_line(line).unwrap().unwrap();

        match event {
            InboundEvent::SessionChanged(descriptor) => {
                assert_eq!(descriptor.session_key, "s-1");
                assert_eq!(descriptor.content_path(), Path::new("/srv/booth/s-1"));
                assert_eq!(descriptor.raw_storage_path.as_deref(), Some(Path::new("/srv/raw/s-1")));
            }
            other => panic!("Expected session-changed, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_busy_and_mode() {
        let busy = InboundEvent::parse_line(r#"{"event":"busy-changed","source":"booth-export","busy":true}"#)
            .unwrap()
            .unwrap();
        assert_eq!(
            busy.into_input(&TimelineSettings::default()),
            Input::BusyChanged {
                source: BusySource::BoothExport,
                busy: true
            }
        );

        let mode = InboundEvent::parse_line(r#"{"event":"set-operator-mode","mode":"admin"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(mode, InboundEvent::SetOperatorMode { mode: OperatorMode::Admin });
    }

    #[test]
    fn test_config_loaded_uses_settings() {
        let settings = TimelineSettings {
            grace_secs: 10,
            operator_mode: OperatorMode::Admin,
        };
        let event = InboundEvent::parse_line(r#"{"event":"config-loaded"}"#).unwrap().unwrap();
        assert_eq!(event.into_input(&settings), Input::ConfigLoaded(settings));
    }

    #[test]
    fn test_blank_and_comment_lines_skipped() {
        assert!(InboundEvent::parse_line("   ").unwrap().is_none());
        assert!(InboundEvent::parse_line("# warm-up").unwrap().is_none());
    }

    #[test]
    fn test_unknown_event_is_error() {
        assert!(InboundEvent::parse_line(r#"{"event":"self-destruct"}"#).is_err());
        assert!(InboundEvent::parse_line("not json").is_err());
    }
}
