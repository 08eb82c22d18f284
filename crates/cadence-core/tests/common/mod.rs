//! Shared fixtures for the integration scenarios.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use cadence_core::{
    AutoStart, ManualClock, NotificationKind, Notifier, OutputChannel, StateSnapshot, Timer,
    TimerSettings,
};

pub const CYCLE_MS: u64 = 600_000;
pub const BREAK_MS: u64 = 300_000;
pub const TOTAL_PERIODS: usize = 7;

/// Always-open channel that records every published snapshot.
#[derive(Default)]
pub struct RecordingChannel {
    posts: Mutex<Vec<StateSnapshot>>,
}

impl RecordingChannel {
    pub fn last(&self) -> Option<StateSnapshot> {
        self.posts.lock().unwrap().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }
}

impl OutputChannel for RecordingChannel {
    fn is_open(&self) -> bool {
        true
    }

    fn post(&self, state: &StateSnapshot) {
        self.posts.lock().unwrap().push(state.clone());
    }
}

/// Notifier that records announcements and clears.
#[derive(Default)]
pub struct RecordingNotifier {
    notified: Mutex<Vec<(usize, u64, NotificationKind)>>,
    cleared: Mutex<Vec<usize>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<(usize, u64, NotificationKind)> {
        self.notified.lock().unwrap().clone()
    }

    pub fn cleared(&self) -> Vec<usize> {
        self.cleared.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, period: usize, next_duration_ms: u64, kind: NotificationKind) {
        self.notified
            .lock()
            .unwrap()
            .push((period, next_duration_ms, kind));
    }

    fn clear(&self, period: usize) {
        self.cleared.lock().unwrap().push(period);
    }
}

pub fn settings(auto_cycles: bool, auto_breaks: bool) -> TimerSettings {
    TimerSettings {
        cycle_time_ms: CYCLE_MS,
        break_time_ms: BREAK_MS,
        total_periods: TOTAL_PERIODS,
        auto_start: AutoStart {
            cycles: auto_cycles,
            breaks: auto_breaks,
        },
    }
}

pub struct Fixture {
    pub timer: Timer,
    pub clock: Arc<ManualClock>,
    pub channel: Arc<RecordingChannel>,
    pub notifier: Arc<RecordingNotifier>,
}

/// An initialized timer on a manual clock anchored at t=0.
pub fn fixture(auto_cycles: bool, auto_breaks: bool) -> Fixture {
    let clock = ManualClock::new(0);
    let channel = Arc::new(RecordingChannel::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let timer = Timer::new()
        .with_clock(clock.clone())
        .with_channel(channel.clone())
        .with_notifier(notifier.clone());
    timer.init(settings(auto_cycles, auto_breaks)).unwrap();
    Fixture {
        timer,
        clock,
        channel,
        notifier,
    }
}

/// Let spawned timer tasks observe whatever is ready.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

/// Advance paused tokio time and the manual wall clock together, one second
/// at a time, so the countdown task sees every tick in order.
pub async fn advance_ms(clock: &ManualClock, ms: u64) {
    assert_eq!(ms % 1000, 0, "advance in whole seconds");
    for _ in 0..ms / 1000 {
        settle().await;
        clock.advance(1000);
        tokio::time::advance(Duration::from_millis(1000)).await;
        settle().await;
    }
}
