//! Busy Aggregator - one "destructive work in flight" signal from several subsystems

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A subsystem whose long-running work must not be interrupted casually
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BusySource {
    /// Single-session export
    Export,
    /// Import from the camera or a card
    Import,
    /// Booth-wide export progress (batch export across sessions)
    BoothExport,
}

impl std::fmt::Display for BusySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Export => write!(f, "export"),
            Self::Import => write!(f, "import"),
            Self::BoothExport => write!(f, "booth-export"),
        }
    }
}

/// Change of the aggregated busy signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyTransition {
    BecameBusy,
    BecameIdle,
}

/// Aggregates per-subsystem busy statuses into one boolean
#[derive(Debug, Clone, Default)]
pub struct BusyAggregator {
    export: bool,
    import: bool,
    booth_export: bool,
}

impl BusyAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while any watched subsystem reports work in flight
    pub fn is_busy(&self) -> bool {
        self.export || self.import || self.booth_export
    }

    /// Record a subsystem status
    ///
    /// Returns the transition of the aggregated signal, if the report changed it.
    pub fn report(&mut self, source: BusySource, busy: bool) -> Option<BusyTransition> {
        debug!(%source, busy, "BusyAggregator::report: called");
        let before = self.is_busy();
        match source {
            BusySource::Export => self.export = busy,
            BusySource::Import => self.import = busy,
            BusySource::BoothExport => self.booth_export = busy,
        }
        let after = self.is_busy();

        match (before, after) {
            (false, true) => Some(BusyTransition::BecameBusy),
            (true, false) => {
                debug!("BusyAggregator::report: all subsystems idle");
                Some(BusyTransition::BecameIdle)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_by_default() {
        assert!(!BusyAggregator::new().is_busy());
    }

    #[test]
    fn test_idle_only_when_every_source_clears() {
        let mut busy = BusyAggregator::new();
        assert_eq!(busy.report(BusySource::Export, true), Some(BusyTransition::BecameBusy));
        assert_eq!(busy.report(BusySource::Import, true), None);

        assert_eq!(busy.report(BusySource::Export, false), None);
        assert!(busy.is_busy());

        assert_eq!(busy.report(BusySource::Import, false), Some(BusyTransition::BecameIdle));
        assert!(!busy.is_busy());
    }

    #[test]
    fn test_repeated_reports_do_not_transition() {
        let mut busy = BusyAggregator::new();
        busy.report(BusySource::BoothExport, true);
        assert_eq!(busy.report(BusySource::BoothExport, true), None);
        assert_eq!(busy.report(BusySource::Export, false), None);
    }
}
