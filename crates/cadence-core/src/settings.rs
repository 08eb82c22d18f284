//! Runtime timer settings.
//!
//! Settings arrive from the storage collaborator in milliseconds and are
//! validated at the `init`/`update` boundaries so the timeline never holds a
//! non-positive duration or an even period count.

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::timer::PeriodKind;

/// Whether the schedule continues automatically out of each kind of period.
///
/// `cycles` governs the transition out of a finished cycle (i.e. whether the
/// following break starts on its own); `breaks` governs the transition out of
/// a finished break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoStart {
    #[serde(default = "default_true")]
    pub cycles: bool,
    #[serde(default = "default_true")]
    pub breaks: bool,
}

impl Default for AutoStart {
    fn default() -> Self {
        Self {
            cycles: true,
            breaks: true,
        }
    }
}

/// Externally supplied timer settings. May be re-supplied mid-run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    #[serde(default = "default_cycle_time_ms")]
    pub cycle_time_ms: u64,
    #[serde(default = "default_break_time_ms")]
    pub break_time_ms: u64,
    /// Total schedule length: cycles plus the breaks between them, always odd.
    #[serde(default = "default_total_periods")]
    pub total_periods: usize,
    #[serde(default)]
    pub auto_start: AutoStart,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            cycle_time_ms: default_cycle_time_ms(),
            break_time_ms: default_break_time_ms(),
            total_periods: default_total_periods(),
            auto_start: AutoStart::default(),
        }
    }
}

impl TimerSettings {
    /// Reject malformed settings before they can reach the timeline.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.cycle_time_ms == 0 {
            return Err(SettingsError::InvalidValue {
                key: "cycle_time_ms",
                message: "cycle duration must be positive".into(),
            });
        }
        if self.total_periods == 0 {
            return Err(SettingsError::InvalidValue {
                key: "total_periods",
                message: "schedule needs at least one period".into(),
            });
        }
        if self.total_periods % 2 == 0 {
            return Err(SettingsError::InvalidValue {
                key: "total_periods",
                message: format!(
                    "{} is even; breaks sit strictly between cycles, so the count is 2 * cycles - 1",
                    self.total_periods
                ),
            });
        }
        if self.total_periods > 1 && self.break_time_ms == 0 {
            return Err(SettingsError::InvalidValue {
                key: "break_time_ms",
                message: "break duration must be positive when the schedule contains breaks".into(),
            });
        }
        Ok(())
    }

    pub fn duration_for(&self, kind: PeriodKind) -> u64 {
        match kind {
            PeriodKind::Cycle => self.cycle_time_ms,
            PeriodKind::Break => self.break_time_ms,
        }
    }

    pub fn total_cycles(&self) -> usize {
        self.total_periods / 2 + 1
    }
}

fn default_cycle_time_ms() -> u64 {
    25 * 60_000
}
fn default_break_time_ms() -> u64 {
    5 * 60_000
}
fn default_total_periods() -> usize {
    7
}
fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let s = TimerSettings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.total_cycles(), 4);
    }

    #[test]
    fn zero_cycle_time_rejected() {
        let s = TimerSettings {
            cycle_time_ms: 0,
            ..TimerSettings::default()
        };
        assert!(matches!(
            s.validate(),
            Err(SettingsError::InvalidValue { key: "cycle_time_ms", .. })
        ));
    }

    #[test]
    fn even_period_count_rejected() {
        let s = TimerSettings {
            total_periods: 6,
            ..TimerSettings::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn single_period_schedule_needs_no_break_time() {
        let s = TimerSettings {
            break_time_ms: 0,
            total_periods: 1,
            ..TimerSettings::default()
        };
        assert!(s.validate().is_ok());
    }
}
