//! Session configuration and validation.

use std::error::Error;
use std::fmt;

use beatmeter_core::TimeSource;
use beatmeter_ledger::RunConfig;
use beatmeter_report::ReportConfig;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SessionConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Run capacity is zero; not even the START event would fit.
    ZeroRunCapacity,
    /// Endless loop retention window is zero.
    ZeroEndlessCapacity,
    /// Run capacity exceeds `u32::MAX`, so step indices would not fit
    /// an event payload.
    RunCapacityOverflow {
        /// The configured capacity.
        value: usize,
    },
    /// Endless loop window exceeds `u32::MAX` and cannot be encoded in
    /// the LOOP event payload.
    EndlessCapacityOverflow {
        /// The configured window.
        value: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroRunCapacity => write!(f, "run capacity must be at least 1"),
            Self::ZeroEndlessCapacity => {
                write!(f, "endless loop capacity must be at least 1")
            }
            Self::RunCapacityOverflow { value } => {
                write!(f, "run capacity {value} exceeds u32::MAX")
            }
            Self::EndlessCapacityOverflow { value } => {
                write!(f, "endless loop capacity {value} exceeds u32::MAX")
            }
        }
    }
}

impl Error for ConfigError {}

// ── SessionConfig ──────────────────────────────────────────────────

/// Complete configuration for a recording session.
///
/// Fixed once the session is built; every run the session opens uses the
/// same sizing, and every report the same columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Sizing of each run and its loop trackers.
    pub run: RunConfig,
    /// Columns and sections of rendered reports.
    pub report: ReportConfig,
    /// Which clock timestamps come from. Default: monotonic.
    pub time_source: TimeSource,
    /// Log target used when reports are written through `log`.
    /// Default: `"meter"`.
    pub output_tag: String,
}

impl SessionConfig {
    /// Default log target for reports.
    pub const DEFAULT_OUTPUT_TAG: &'static str = "meter";

    /// Check every sizing invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.run.capacity == 0 {
            return Err(ConfigError::ZeroRunCapacity);
        }
        if self.run.capacity > RunConfig::MAX_CAPACITY {
            return Err(ConfigError::RunCapacityOverflow {
                value: self.run.capacity,
            });
        }
        if self.run.endless_loop_capacity == 0 {
            return Err(ConfigError::ZeroEndlessCapacity);
        }
        if self.run.endless_loop_capacity > RunConfig::MAX_CAPACITY {
            return Err(ConfigError::EndlessCapacityOverflow {
                value: self.run.endless_loop_capacity,
            });
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            run: RunConfig::default(),
            report: ReportConfig::default(),
            time_source: TimeSource::default(),
            output_tag: Self::DEFAULT_OUTPUT_TAG.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.output_tag, "meter");
        assert_eq!(config.time_source, TimeSource::Monotonic);
        assert_eq!(config.run.capacity, 256);
        assert_eq!(config.run.endless_loop_capacity, 1000);
    }

    #[test]
    fn zero_capacity_rejected() {
        let config = SessionConfig {
            run: RunConfig::with_capacity(0),
            ..SessionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroRunCapacity));
    }

    #[test]
    fn zero_endless_window_rejected() {
        let config = SessionConfig {
            run: RunConfig {
                capacity: 8,
                endless_loop_capacity: 0,
            },
            ..SessionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroEndlessCapacity));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn oversized_capacities_rejected() {
        let too_big = RunConfig::MAX_CAPACITY + 1;
        let config = SessionConfig {
            run: RunConfig::with_capacity(too_big),
            ..SessionConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::RunCapacityOverflow { value: too_big })
        );

        let config = SessionConfig {
            run: RunConfig {
                capacity: 8,
                endless_loop_capacity: too_big,
            },
            ..SessionConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::EndlessCapacityOverflow { value: too_big })
        );
    }

    #[test]
    fn errors_display() {
        assert_eq!(
            ConfigError::RunCapacityOverflow { value: 5 }.to_string(),
            "run capacity 5 exceeds u32::MAX"
        );
        assert_eq!(
            ConfigError::ZeroRunCapacity.to_string(),
            "run capacity must be at least 1"
        );
    }
}
