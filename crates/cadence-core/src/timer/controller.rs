//! The timer controller.
//!
//! Owns the timeline, drives the 1 Hz countdown, and re-derives correctness
//! from absolute wall-clock targets when the host signals a time
//! discontinuity. The interval tick is a display convenience; truth lives in
//! the target timestamps.
//!
//! All mutations happen under one mutex held only for synchronous work. The
//! countdown and the deferred sync resume are the only spawned tasks; both
//! are cancelled before a replacement is spawned, and both carry an epoch so
//! a callback that lost the race against a newer operation discards itself.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::{debug, error};

use crate::clock::{Clock, SystemClock};
use crate::comms::{NullChannel, OutputChannel};
use crate::error::{Result, TimerError};
use crate::notify::{NotificationKind, Notifier, NullNotifier};
use crate::settings::TimerSettings;
use crate::state::{StateSnapshot, TimeParts};
use crate::timer::period::{Period, PeriodStatus};
use crate::timer::timeline::Timeline;

const TICK: Duration = Duration::from_millis(1000);

struct Inner {
    settings: TimerSettings,
    timeline: Option<Timeline>,
    channel: Arc<dyn OutputChannel>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    countdown: Option<JoinHandle<()>>,
    pending_resume: Option<JoinHandle<()>>,
    /// Generation counter for spawned callbacks. Bumped every time the
    /// countdown is stopped, so a stale tick or deferred resume can tell it
    /// has been superseded.
    epoch: u64,
}

/// Cheaply cloneable handle to one timer instance. Spawned tasks hold a weak
/// reference, so dropping every user handle shuts the countdown down.
#[derive(Clone)]
pub struct Timer {
    inner: Arc<Mutex<Inner>>,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                settings: TimerSettings::default(),
                timeline: None,
                channel: Arc::new(NullChannel),
                notifier: Arc::new(NullNotifier),
                clock: Arc::new(SystemClock),
                countdown: None,
                pending_resume: None,
                epoch: 0,
            })),
        }
    }

    pub fn with_channel(self, channel: Arc<dyn OutputChannel>) -> Self {
        self.lock().channel = channel;
        self
    }

    pub fn with_notifier(self, notifier: Arc<dyn Notifier>) -> Self {
        self.lock().notifier = notifier;
        self
    }

    pub fn with_clock(self, clock: Arc<dyn Clock>) -> Self {
        self.lock().clock = clock;
        self
    }

    /// Swap the UI channel as the host connects and disconnects.
    pub fn set_channel(&self, channel: Arc<dyn OutputChannel>) {
        self.lock().channel = channel;
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Formatted state of the current period, `None` before `init`.
    pub fn snapshot(&self) -> Option<StateSnapshot> {
        Self::make_snapshot(&self.lock())
    }

    /// Copy of the current period, `None` before `init`.
    pub fn current(&self) -> Option<Period> {
        self.lock().timeline.as_ref().map(|tl| tl.current().clone())
    }

    /// Copy of an arbitrary period, `None` before `init` or out of bounds.
    pub fn period(&self, index: usize) -> Option<Period> {
        self.lock()
            .timeline
            .as_ref()
            .and_then(|tl| tl.get(index).cloned())
    }

    /// Cursor position, `None` before `init`.
    pub fn index(&self) -> Option<usize> {
        self.lock().timeline.as_ref().map(|tl| tl.index())
    }

    pub fn settings(&self) -> TimerSettings {
        self.lock().settings.clone()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Store settings and build the schedule. Must run before any other
    /// operation. Re-running is idempotent until a period has advanced.
    pub fn init(&self, settings: TimerSettings) -> Result<()> {
        let mut g = self.lock();
        match g.timeline.as_mut() {
            Some(timeline) => timeline.build(&settings)?,
            None => g.timeline = Some(Timeline::new(&settings)?),
        }
        debug!(
            cycle_ms = settings.cycle_time_ms,
            break_ms = settings.break_time_ms,
            total = settings.total_periods,
            "timer initialized"
        );
        g.settings = settings;
        Ok(())
    }

    /// Re-anchor targets at "now", start the current period, and begin the
    /// countdown.
    pub fn start(&self) -> Result<()> {
        let mut g = self.lock();
        self.start_locked(&mut g)
    }

    /// Complete the current period: final state for the last period,
    /// otherwise advance through `next()`.
    pub fn end(&self) -> Result<()> {
        let mut g = self.lock();
        self.end_locked(&mut g)
    }

    /// Freeze the current period. Meaningful only while running; anything
    /// else is a published no-op.
    pub fn pause(&self) -> Result<()> {
        let mut g = self.lock();
        if g.timeline.is_none() {
            return Err(TimerError::Uninitialized);
        }
        Self::stop_ticker(&mut g);
        if let Some(timeline) = g.timeline.as_mut() {
            timeline.current_mut().pause();
            debug!(period = timeline.current().id(), "paused");
        }
        Self::post_state(&g);
        Ok(())
    }

    /// Force-complete the current period and advance. The skipped period
    /// completes silently.
    pub fn skip(&self) -> Result<()> {
        let mut g = self.lock();
        if g.timeline.is_none() {
            return Err(TimerError::Uninitialized);
        }
        Self::stop_ticker(&mut g);
        if let Some(timeline) = g.timeline.as_mut() {
            debug!(period = timeline.current().id(), "skipped");
            timeline.current_mut().skip();
        }
        self.next_locked(&mut g)
    }

    /// Reset the current period; pressed on a not-yet-started period it
    /// rewinds past the most recent break/cycle pair instead, returning the
    /// user to the start of the previous cycle.
    pub fn reset(&self) -> Result<()> {
        let mut g = self.lock();
        if g.timeline.is_none() {
            return Err(TimerError::Uninitialized);
        }
        Self::stop_ticker(&mut g);
        let mut cleared = Vec::new();
        if let Some(timeline) = g.timeline.as_mut() {
            if timeline.current().status() == PeriodStatus::Initial && timeline.index() > 0 {
                let steps = timeline.index().min(2);
                for _ in 0..steps {
                    timeline.retreat();
                    timeline.current_mut().reset();
                    cleared.push(timeline.current().id());
                }
                debug!(index = timeline.index(), "rewound to previous cycle");
            } else {
                timeline.current_mut().reset();
                debug!(period = timeline.current().id(), "reset");
            }
        }
        for period in cleared {
            g.notifier.clear(period);
        }
        Self::post_state(&g);
        Ok(())
    }

    /// Reinitialize every period in place and rewind the cursor to 0.
    pub fn reset_all(&self) -> Result<()> {
        let mut g = self.lock();
        if g.timeline.is_none() {
            return Err(TimerError::Uninitialized);
        }
        Self::stop_ticker(&mut g);
        let mut total = 0;
        if let Some(timeline) = g.timeline.as_mut() {
            timeline.reset_all();
            total = timeline.len();
        }
        debug!("schedule reset");
        g.notifier.clear_all(total);
        Self::post_state(&g);
        Ok(())
    }

    /// Advance the cursor; autostart-enabled periods begin immediately,
    /// anything else waits for a manual `start`.
    pub fn next(&self) -> Result<()> {
        let mut g = self.lock();
        self.next_locked(&mut g)
    }

    /// Update the cycle duration mid-run and re-anchor pending targets.
    pub fn update_cycle_time(&self, cycle_time_ms: u64) -> Result<()> {
        self.apply_settings(|s| s.cycle_time_ms = cycle_time_ms)
    }

    /// Update the break duration mid-run and re-anchor pending targets.
    pub fn update_break_time(&self, break_time_ms: u64) -> Result<()> {
        self.apply_settings(|s| s.break_time_ms = break_time_ms)
    }

    /// Drift correction. Called when the host suspects a time discontinuity;
    /// `reference` is the host's current wall-clock reading.
    ///
    /// Stops the countdown unconditionally, then reconciles the current
    /// period against its absolute target: still in the future means a
    /// realign-and-resume, already past means relocating the cursor to
    /// wherever the target chain says the schedule stands now.
    pub fn sync(&self, reference_ms: i64) -> Result<()> {
        enum Action {
            Idle,
            Resume { actual: i64 },
            Relocate { surplus: i64 },
            ForceEnd,
            Exhausted { last: usize },
        }

        let mut g = self.lock();
        if g.timeline.is_none() {
            return Err(TimerError::Uninitialized);
        }
        Self::stop_ticker(&mut g);

        let action = match g.timeline.as_mut() {
            None => return Err(TimerError::Uninitialized),
            Some(timeline) => {
                if timeline.current().status() != PeriodStatus::Running {
                    debug!(status = ?timeline.current().status(), "sync: nothing running, no correction");
                    Action::Idle
                } else {
                    // A running period with no anchored target is treated as
                    // perfectly on time.
                    let actual = timeline
                        .current()
                        .actual(reference_ms)
                        .unwrap_or_else(|| timeline.current().remaining_ms());
                    if actual >= 0 {
                        Action::Resume { actual }
                    } else {
                        match timeline.locate(reference_ms) {
                            Some(index) => {
                                timeline.complete_through(index);
                                match timeline.current().actual(reference_ms) {
                                    Some(relocated) if relocated >= 0 => Action::Relocate {
                                        surplus: timeline.current().adjust(reference_ms),
                                    },
                                    // Landed exactly on (or past) a boundary:
                                    // let normal completion handling take over.
                                    _ => Action::ForceEnd,
                                }
                            }
                            None => {
                                timeline.complete_all_remaining();
                                Action::Exhausted {
                                    last: timeline.current().id(),
                                }
                            }
                        }
                    }
                }
            }
        };

        match action {
            Action::Idle => Ok(()),
            Action::Resume { actual } => {
                let surplus = actual.rem_euclid(1000);
                if let Some(timeline) = g.timeline.as_mut() {
                    timeline.current_mut().realign(actual);
                }
                debug!(actual, surplus, "sync: realigned countdown");
                Self::post_state(&g);
                self.schedule_resume(&mut g, surplus, false);
                Ok(())
            }
            Action::Relocate { surplus } => {
                debug!(surplus, "sync: relocated, deferring start");
                self.schedule_resume(&mut g, surplus, true);
                Ok(())
            }
            Action::ForceEnd => self.end_locked(&mut g),
            Action::Exhausted { last } => {
                debug!("sync: drifted past the whole schedule");
                g.notifier.notify(last, 0, NotificationKind::Complete);
                Self::post_state(&g);
                Ok(())
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn start_locked(&self, g: &mut Inner) -> Result<()> {
        Self::stop_ticker(g);
        let now = g.clock.now_ms();
        let settings = g.settings.clone();
        let running = match g.timeline.as_mut() {
            None => return Err(TimerError::Uninitialized),
            Some(timeline) => {
                timeline.update(now, &settings)?;
                timeline.current_mut().start(now);
                debug!(period = timeline.current().id(), "started");
                timeline.current().status() == PeriodStatus::Running
            }
        };
        if running {
            self.spawn_countdown(g);
        }
        Self::post_state(g);
        Ok(())
    }

    fn end_locked(&self, g: &mut Inner) -> Result<()> {
        Self::stop_ticker(g);
        let (ended, kind, is_last, next_duration) = match g.timeline.as_mut() {
            None => return Err(TimerError::Uninitialized),
            Some(timeline) => {
                let ended = timeline.current().id();
                let kind = timeline.current().kind();
                timeline.current_mut().end();
                debug!(period = ended, "period complete");
                let is_last = timeline.is_last();
                let next_duration = timeline
                    .get(timeline.index() + 1)
                    .map(|p| p.duration_ms())
                    .unwrap_or(0);
                (ended, kind, is_last, next_duration)
            }
        };
        if is_last {
            g.notifier.notify(ended, 0, NotificationKind::Complete);
            Self::post_state(g);
            Ok(())
        } else {
            g.notifier.notify(ended, next_duration, kind.into());
            self.next_locked(g)
        }
    }

    fn next_locked(&self, g: &mut Inner) -> Result<()> {
        let autostart = match g.timeline.as_mut() {
            None => return Err(TimerError::Uninitialized),
            Some(timeline) => {
                if timeline.is_last() {
                    // Schedule exhausted: terminal, not an error.
                    None
                } else {
                    timeline.advance();
                    Some(timeline.current().enabled())
                }
            }
        };
        match autostart {
            Some(true) => self.start_locked(g),
            Some(false) | None => {
                Self::post_state(g);
                Ok(())
            }
        }
    }

    /// Mutate settings through a validated candidate; nothing is stored if
    /// the timeline rejects it.
    fn apply_settings(&self, mutate: impl FnOnce(&mut TimerSettings)) -> Result<()> {
        let mut g = self.lock();
        let now = g.clock.now_ms();
        let mut candidate = g.settings.clone();
        mutate(&mut candidate);
        match g.timeline.as_mut() {
            None => return Err(TimerError::Uninitialized),
            Some(timeline) => timeline.update(now, &candidate)?,
        }
        g.settings = candidate;
        Ok(())
    }

    /// Cancel the countdown and any pending deferred resume. Safe to call
    /// redundantly; every path that may start ticking calls this first.
    fn stop_ticker(g: &mut Inner) {
        g.epoch = g.epoch.wrapping_add(1);
        if let Some(handle) = g.countdown.take() {
            handle.abort();
        }
        if let Some(handle) = g.pending_resume.take() {
            handle.abort();
        }
    }

    fn spawn_countdown(&self, g: &mut Inner) {
        let epoch = g.epoch;
        let weak = Arc::downgrade(&self.inner);
        g.countdown = Some(tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + TICK, TICK);
            // Ticks lost to suspend or throttling are reconciled by sync(),
            // not replayed in a burst.
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticks.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                let timer = Timer { inner };
                if !timer.tick(epoch) {
                    break;
                }
            }
        }));
    }

    /// One countdown step. Returns false once this tick stream is done,
    /// either because the period completed or because a newer operation
    /// superseded it.
    fn tick(&self, epoch: u64) -> bool {
        let mut g = self.lock();
        if g.epoch != epoch {
            return false;
        }
        let crossed = match g.timeline.as_mut() {
            None => return false,
            Some(timeline) => {
                if timeline.current().status() != PeriodStatus::Running {
                    return false;
                }
                timeline.current_mut().tick();
                timeline.current().remaining_ms() < 0
            }
        };
        if crossed {
            if let Err(error) = self.end_locked(&mut g) {
                error!(%error, "countdown completion failed");
            }
            false
        } else {
            Self::post_state(&g);
            true
        }
    }

    /// Defer the sync resume by the adjust surplus. `restart` distinguishes
    /// a relocated period (full `start()`) from a realigned one (tick only).
    fn schedule_resume(&self, g: &mut Inner, surplus_ms: i64, restart: bool) {
        let epoch = g.epoch;
        let weak = Arc::downgrade(&self.inner);
        let delay = Duration::from_millis(surplus_ms.max(0) as u64);
        g.pending_resume = Some(tokio::spawn(async move {
            sleep(delay).await;
            let Some(inner) = weak.upgrade() else { return };
            let timer = Timer { inner };
            timer.finish_sync(epoch, restart);
        }));
    }

    fn finish_sync(&self, epoch: u64, restart: bool) {
        let mut g = self.lock();
        if g.epoch != epoch {
            return;
        }
        g.pending_resume = None;
        if restart {
            if let Err(error) = self.start_locked(&mut g) {
                error!(%error, "deferred start after sync failed");
            }
        } else {
            self.spawn_countdown(&mut g);
        }
    }

    fn make_snapshot(g: &Inner) -> Option<StateSnapshot> {
        let timeline = g.timeline.as_ref()?;
        Some(StateSnapshot {
            period: timeline.current().id(),
            time: TimeParts::from_ms(timeline.current().remaining_ms()),
            status: timeline.current().status(),
            total_periods: g.settings.total_periods,
        })
    }

    fn post_state(g: &Inner) {
        if let Some(snapshot) = Self::make_snapshot(g) {
            if g.channel.is_open() {
                g.channel.post(&snapshot);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations_before_init_fail() {
        let timer = Timer::new();
        assert!(matches!(timer.start(), Err(TimerError::Uninitialized)));
        assert!(matches!(timer.pause(), Err(TimerError::Uninitialized)));
        assert!(matches!(timer.skip(), Err(TimerError::Uninitialized)));
        assert!(matches!(timer.reset(), Err(TimerError::Uninitialized)));
        assert!(matches!(timer.sync(0), Err(TimerError::Uninitialized)));
        assert!(timer.snapshot().is_none());
    }

    #[test]
    fn init_rejects_malformed_settings() {
        let timer = Timer::new();
        let settings = TimerSettings {
            cycle_time_ms: 0,
            ..TimerSettings::default()
        };
        assert!(timer.init(settings).is_err());
        assert!(timer.snapshot().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn reinit_after_start_is_rejected() {
        let timer = Timer::new();
        timer.init(TimerSettings::default()).unwrap();
        timer.init(TimerSettings::default()).unwrap();

        timer.start().unwrap();
        assert!(matches!(
            timer.init(TimerSettings::default()),
            Err(TimerError::AlreadyStarted)
        ));
    }

    #[test]
    fn update_leaves_settings_untouched_on_failure() {
        let timer = Timer::new();
        timer.init(TimerSettings::default()).unwrap();
        assert!(timer.update_cycle_time(0).is_err());
        assert_eq!(
            timer.settings().cycle_time_ms,
            TimerSettings::default().cycle_time_ms
        );
    }
}
