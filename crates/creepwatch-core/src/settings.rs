// ── Tracking settings ──
//
// The user-tunable knobs of the pipeline. Loaded once at startup from the
// config layer and passed by value into the monitor; a poll cycle never
// sees settings change under it. Edits take effect on restart.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::geo::Unit;

/// User-configurable tracking parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Unit for threshold comparison and display.
    pub unit: Unit,

    /// Devices whose min↔max location spread meets or exceeds this
    /// distance (in `unit`) are flagged as creeps.
    pub threshold_distance: f64,

    /// When true, only flagged devices are projected into the table.
    pub show_only_creeps: bool,

    /// Window selector for the first fetch: a positive value is an
    /// absolute epoch, `1` means "everything since the sensor session
    /// started", and a negative value `-N` means "the last N seconds".
    pub initial_window_secs: i64,

    /// Interval between poll cycles, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            unit: Unit::Mile,
            threshold_distance: 0.2,
            show_only_creeps: false,
            initial_window_secs: 1,
            poll_interval_ms: 10_000,
        }
    }
}

impl Settings {
    /// Validate value ranges. Called once by whoever assembled the
    /// settings, before handing them to the monitor.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.threshold_distance.is_finite() || self.threshold_distance < 0.0 {
            return Err(CoreError::Config {
                message: format!(
                    "threshold_distance must be a non-negative number, got {}",
                    self.threshold_distance
                ),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(CoreError::Config {
                message: "poll_interval_ms must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_detector_conventions() {
        let s = Settings::default();
        assert_eq!(s.unit, Unit::Mile);
        assert!((s.threshold_distance - 0.2).abs() < f64::EPSILON);
        assert!(!s.show_only_creeps);
        assert_eq!(s.initial_window_secs, 1);
        assert_eq!(s.poll_interval_ms, 10_000);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn rejects_negative_threshold() {
        let s = Settings {
            threshold_distance: -0.5,
            ..Settings::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn rejects_zero_interval() {
        let s = Settings {
            poll_interval_ms: 0,
            ..Settings::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn zero_threshold_is_allowed() {
        // threshold 0 means "every located device is a creep" — odd but legal
        let s = Settings {
            threshold_distance: 0.0,
            ..Settings::default()
        };
        assert!(s.validate().is_ok());
    }
}
