//! A single schedulable slot: one work cycle or one break.

use serde::{Deserialize, Serialize};

/// Kind of a period, always derived from its ordinal: even ids are cycles,
/// odd ids are the breaks between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Cycle,
    Break,
}

impl PeriodKind {
    pub fn of(id: usize) -> Self {
        if id % 2 == 0 {
            PeriodKind::Cycle
        } else {
            PeriodKind::Break
        }
    }
}

/// Period lifecycle. `Complete` is terminal for the period; only an explicit
/// reset re-enters `Initial`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    Initial,
    Running,
    Paused,
    Complete,
}

/// One slot in the timeline.
///
/// `remaining_ms` is authoritative for display while the period is running or
/// paused; once complete it is frozen at whatever value it held, which lets a
/// small negative overshoot stay visible. `target_ms` is the absolute
/// wall-clock end time and is what drift correction reconciles against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Period {
    id: usize,
    duration_ms: u64,
    remaining_ms: i64,
    target_ms: Option<i64>,
    status: PeriodStatus,
    enabled: bool,
}

impl Period {
    pub fn new(id: usize, duration_ms: u64, enabled: bool) -> Self {
        Self {
            id,
            duration_ms,
            remaining_ms: duration_ms as i64,
            target_ms: None,
            status: PeriodStatus::Initial,
            enabled,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn kind(&self) -> PeriodKind {
        PeriodKind::of(self.id)
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn remaining_ms(&self) -> i64 {
        self.remaining_ms
    }

    pub fn target_ms(&self) -> Option<i64> {
        self.target_ms
    }

    pub fn status(&self) -> PeriodStatus {
        self.status
    }

    /// Whether this period starts on its own when the cursor reaches it.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Begin or resume the countdown for this period.
    ///
    /// A fresh start anchors `target = now + duration`; resuming from pause
    /// anchors `target = now + remaining`. No-op from `Running`/`Complete`.
    pub fn start(&mut self, now_ms: i64) {
        match self.status {
            PeriodStatus::Initial => {
                self.remaining_ms = self.duration_ms as i64;
                self.target_ms = Some(now_ms + self.remaining_ms);
                self.status = PeriodStatus::Running;
            }
            PeriodStatus::Paused => {
                self.target_ms = Some(now_ms + self.remaining_ms);
                self.status = PeriodStatus::Running;
            }
            PeriodStatus::Running | PeriodStatus::Complete => {}
        }
    }

    /// Freeze the countdown. No-op unless `Running`.
    pub fn pause(&mut self) {
        if self.status == PeriodStatus::Running {
            self.status = PeriodStatus::Paused;
        }
    }

    /// Natural or forced completion; `remaining` is left as-is so overshoot
    /// stays observable.
    pub fn end(&mut self) {
        self.status = PeriodStatus::Complete;
    }

    /// Force completion regardless of remaining time, bypassing the
    /// countdown.
    pub fn skip(&mut self) {
        self.end();
    }

    /// Back to pristine: `Initial`, full duration, no target.
    pub fn reset(&mut self) {
        self.status = PeriodStatus::Initial;
        self.remaining_ms = self.duration_ms as i64;
        self.target_ms = None;
    }

    /// Adopt a new configured duration. A period that has not started yet
    /// also refreshes its remaining time.
    pub(crate) fn apply_duration(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
        if self.status == PeriodStatus::Initial {
            self.remaining_ms = duration_ms as i64;
        }
    }

    pub(crate) fn set_target(&mut self, target_ms: i64) {
        self.target_ms = Some(target_ms);
    }

    /// One 1 Hz countdown step.
    pub(crate) fn tick(&mut self) {
        self.remaining_ms -= 1000;
    }

    /// True remaining time against the wall clock: `target - reference`.
    pub fn actual(&self, reference_ms: i64) -> Option<i64> {
        self.target_ms.map(|t| t - reference_ms)
    }

    /// Sub-second surplus between the wall clock and the 1 Hz grid implied by
    /// `target`. Delaying the next tick by this much keeps whole-second
    /// remaining values consistent with the absolute target.
    pub fn adjust(&self, reference_ms: i64) -> i64 {
        self.actual(reference_ms)
            .map(|actual| actual.rem_euclid(1000))
            .unwrap_or(0)
    }

    /// Snap `remaining` onto the whole-second grid below the true wall-clock
    /// remaining time.
    pub(crate) fn realign(&mut self, actual_ms: i64) {
        self.remaining_ms = actual_ms - actual_ms.rem_euclid(1000);
    }
}
