//! Formatted state snapshots published to the UI channel.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::timer::PeriodStatus;

/// Clock display value derived from remaining milliseconds.
///
/// Negative remaining time (completion overshoot) clamps to 0:00 for display;
/// the raw value stays visible on the period itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeParts {
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeParts {
    pub fn from_ms(ms: i64) -> Self {
        let clamped = ms.max(0) as u64;
        Self {
            minutes: clamped / 60_000,
            seconds: clamped % 60_000 / 1000,
        }
    }
}

impl fmt::Display for TimeParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes, self.seconds)
    }
}

/// Snapshot published on every state-changing operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Ordinal of the current period within the schedule.
    pub period: usize,
    pub time: TimeParts,
    pub status: PeriodStatus,
    pub total_periods: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_minutes() {
        assert_eq!(
            TimeParts::from_ms(600_000),
            TimeParts {
                minutes: 10,
                seconds: 0
            }
        );
    }

    #[test]
    fn parses_mixed_value() {
        assert_eq!(
            TimeParts::from_ms(90_500),
            TimeParts {
                minutes: 1,
                seconds: 30
            }
        );
    }

    #[test]
    fn overshoot_clamps_to_zero() {
        assert_eq!(
            TimeParts::from_ms(-1000),
            TimeParts {
                minutes: 0,
                seconds: 0
            }
        );
    }

    #[test]
    fn displays_zero_padded() {
        assert_eq!(TimeParts::from_ms(65_000).to_string(), "01:05");
    }
}
