//! The ordered schedule of periods for one full run.
//!
//! A timeline owns the alternating cycle/break sequence, the cursor for the
//! current period, and the absolute target chain that drift correction
//! reconciles against.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SettingsError, TimerError};
use crate::settings::TimerSettings;
use crate::timer::period::{Period, PeriodKind, PeriodStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    periods: Vec<Period>,
    index: usize,
}

impl Timeline {
    /// Construct a fresh schedule from validated settings: `total_periods`
    /// slots of alternating kind starting with a cycle, cursor at 0.
    ///
    /// Each period's autostart flag is copied from the setting for the kind
    /// it follows: breaks continue out of cycles, cycles continue out of
    /// breaks.
    pub fn new(settings: &TimerSettings) -> Result<Self, SettingsError> {
        settings.validate()?;

        let periods = (0..settings.total_periods)
            .map(|id| {
                let kind = PeriodKind::of(id);
                let enabled = match kind {
                    PeriodKind::Cycle => settings.auto_start.breaks,
                    PeriodKind::Break => settings.auto_start.cycles,
                };
                Period::new(id, settings.duration_for(kind), enabled)
            })
            .collect();

        debug!(total = settings.total_periods, "timeline built");
        Ok(Self { periods, index: 0 })
    }

    /// Rebuild in place. Idempotent while nothing has started; once any
    /// period has advanced the schedule must be reshaped through `update`
    /// or a full reset instead.
    pub fn build(&mut self, settings: &TimerSettings) -> Result<(), TimerError> {
        if self.started() {
            return Err(TimerError::AlreadyStarted);
        }
        *self = Self::new(settings)?;
        Ok(())
    }

    /// Whether any period has left its pristine state.
    pub fn started(&self) -> bool {
        self.index > 0
            || self
                .periods
                .iter()
                .any(|p| p.status() != PeriodStatus::Initial)
    }

    /// Recompute durations and absolute targets with `reference` as the new
    /// time origin. Completed periods are untouched; the current period's
    /// target becomes `reference + remaining` and every later period chains
    /// its own duration onto the previous target.
    pub fn update(
        &mut self,
        reference_ms: i64,
        settings: &TimerSettings,
    ) -> Result<(), SettingsError> {
        settings.validate()?;
        if settings.total_periods != self.periods.len() {
            return Err(SettingsError::InvalidValue {
                key: "total_periods",
                message: format!(
                    "cannot change period count mid-run ({} -> {})",
                    self.periods.len(),
                    settings.total_periods
                ),
            });
        }

        for period in &mut self.periods {
            if period.status() != PeriodStatus::Complete {
                period.apply_duration(settings.duration_for(period.kind()));
            }
        }

        if self.current().status() != PeriodStatus::Complete {
            let anchor = reference_ms + self.current().remaining_ms();
            self.periods[self.index].set_target(anchor);

            let mut previous = anchor;
            for period in &mut self.periods[self.index + 1..] {
                let target = previous + period.duration_ms() as i64;
                period.set_target(target);
                previous = target;
            }
        }

        Ok(())
    }

    pub fn current(&self) -> &Period {
        &self.periods[self.index]
    }

    pub fn current_mut(&mut self) -> &mut Period {
        &mut self.periods[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn is_last(&self) -> bool {
        self.index == self.periods.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Period> {
        self.periods.get(index)
    }

    /// Advance the cursor by one, clamped at the final period.
    pub(crate) fn advance(&mut self) {
        if self.index + 1 < self.periods.len() {
            self.index += 1;
        }
    }

    /// Step the cursor back by one.
    pub(crate) fn retreat(&mut self) {
        if self.index > 0 {
            self.index -= 1;
        }
    }

    /// Find where the schedule stands at `reference`: the first period from
    /// the cursor onward whose target is still in the future. `None` means
    /// every remaining target has elapsed.
    pub fn locate(&self, reference_ms: i64) -> Option<usize> {
        (self.index..self.periods.len()).find(|&i| {
            self.periods[i]
                .target_ms()
                .map_or(true, |target| target > reference_ms)
        })
    }

    /// Force-complete everything before `index` and move the cursor there.
    /// Used when drift correction relocates past elapsed periods.
    pub(crate) fn complete_through(&mut self, index: usize) {
        let index = index.min(self.periods.len() - 1);
        for period in &mut self.periods[self.index..index] {
            period.skip();
        }
        self.index = index;
    }

    /// Force-complete the rest of the schedule and park the cursor on the
    /// final period.
    pub(crate) fn complete_all_remaining(&mut self) {
        for period in &mut self.periods[self.index..] {
            period.skip();
        }
        self.index = self.periods.len() - 1;
    }

    /// Reinitialize every period in place and rewind the cursor.
    pub(crate) fn reset_all(&mut self) {
        for period in &mut self.periods {
            period.reset();
        }
        self.index = 0;
    }
}
