//! Notification collaborator interface.
//!
//! The timer reports period completions; delivery (desktop notification,
//! sound, permission checks) belongs entirely to the host implementation.

use serde::{Deserialize, Serialize};

use crate::timer::PeriodKind;

/// What kind of completion a notification announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// A work cycle finished; `next_duration_ms` is the upcoming break.
    Cycle,
    /// A break finished; `next_duration_ms` is the upcoming cycle.
    Break,
    /// The whole schedule finished.
    Complete,
}

impl From<PeriodKind> for NotificationKind {
    fn from(kind: PeriodKind) -> Self {
        match kind {
            PeriodKind::Cycle => NotificationKind::Cycle,
            PeriodKind::Break => NotificationKind::Break,
        }
    }
}

pub trait Notifier: Send + Sync {
    /// Announce a period completion. `next_duration_ms` is the duration of
    /// the period about to begin, 0 when the schedule is complete.
    fn notify(&self, period: usize, next_duration_ms: u64, kind: NotificationKind);

    /// Retract a pending notification for one period, if the host can.
    fn clear(&self, period: usize);

    /// Retract every pending notification for a schedule of `total` periods.
    fn clear_all(&self, total: usize) {
        for period in 0..total {
            self.clear(period);
        }
    }
}

/// Host-less notifier; completions go unannounced.
#[derive(Debug, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _period: usize, _next_duration_ms: u64, _kind: NotificationKind) {}

    fn clear(&self, _period: usize) {}
}

/// 1-based cycle ordinal for a period id (periods 0, 2, 4, ... are cycles).
pub fn cycle_number(period: usize) -> usize {
    period / 2 + 1
}

/// 1-based break ordinal for a period id (periods 1, 3, 5, ... are breaks).
pub fn break_number(period: usize) -> usize {
    (period + 1) / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_map_by_parity() {
        assert_eq!(cycle_number(0), 1);
        assert_eq!(cycle_number(2), 2);
        assert_eq!(cycle_number(6), 4);
        assert_eq!(break_number(1), 1);
        assert_eq!(break_number(5), 3);
    }
}
