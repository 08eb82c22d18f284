//! Autostart matrix scenarios: which periods continue on their own as the
//! schedule advances, for every combination of the two flags.
//!
//! Cycle 600000 ms, break 300000 ms, 7 periods throughout. The flags mean
//! "continue automatically out of this kind": `cycles` governs whether the
//! break after a cycle starts on its own, `breaks` whether the next cycle
//! does.

mod common;

use cadence_core::{NotificationKind, PeriodStatus};
use common::{advance_ms, fixture, BREAK_MS, CYCLE_MS};

#[tokio::test(start_paused = true)]
async fn nothing_continues_with_both_flags_off() {
    let f = fixture(false, false);

    // Cycle is started, runs for the full cycle time.
    f.timer.start().unwrap();
    advance_ms(&f.clock, CYCLE_MS).await;
    let p = f.timer.current().unwrap();
    assert_eq!(p.id(), 0);
    assert_eq!(p.status(), PeriodStatus::Running);
    assert_eq!(p.remaining_ms(), 0);

    // One more second ends the cycle; the break waits for a manual start.
    advance_ms(&f.clock, 1000).await;
    let p = f.timer.current().unwrap();
    assert_eq!(p.id(), 1);
    assert_eq!(p.status(), PeriodStatus::Initial);
    assert_eq!(p.remaining_ms(), BREAK_MS as i64);

    // Nothing changes while the break stays disabled.
    advance_ms(&f.clock, 5000).await;
    let p = f.timer.current().unwrap();
    assert_eq!(p.id(), 1);
    assert_eq!(p.status(), PeriodStatus::Initial);
    assert_eq!(p.remaining_ms(), BREAK_MS as i64);

    // Started manually, the break runs out and the next cycle waits too.
    f.timer.start().unwrap();
    advance_ms(&f.clock, BREAK_MS).await;
    let p = f.timer.current().unwrap();
    assert_eq!(p.id(), 1);
    assert_eq!(p.status(), PeriodStatus::Running);
    assert_eq!(p.remaining_ms(), 0);

    advance_ms(&f.clock, 1000).await;
    let p = f.timer.current().unwrap();
    assert_eq!(p.id(), 2);
    assert_eq!(p.status(), PeriodStatus::Initial);
    assert_eq!(p.remaining_ms(), CYCLE_MS as i64);
}

#[tokio::test(start_paused = true)]
async fn breaks_continue_out_of_cycles() {
    let f = fixture(true, false);

    f.timer.start().unwrap();
    advance_ms(&f.clock, CYCLE_MS + 1000).await;

    // The break after the cycle started on its own.
    let p = f.timer.current().unwrap();
    assert_eq!(p.id(), 1);
    assert_eq!(p.status(), PeriodStatus::Running);
    assert_eq!(p.remaining_ms(), BREAK_MS as i64);

    // But the cycle after the break does not.
    advance_ms(&f.clock, BREAK_MS + 1000).await;
    let p = f.timer.current().unwrap();
    assert_eq!(p.id(), 2);
    assert_eq!(p.status(), PeriodStatus::Initial);
    assert_eq!(p.remaining_ms(), CYCLE_MS as i64);
}

#[tokio::test(start_paused = true)]
async fn cycles_continue_out_of_breaks() {
    let f = fixture(false, true);

    f.timer.start().unwrap();
    advance_ms(&f.clock, CYCLE_MS + 1000).await;

    // The break waits for a manual start.
    let p = f.timer.current().unwrap();
    assert_eq!(p.id(), 1);
    assert_eq!(p.status(), PeriodStatus::Initial);
    assert_eq!(p.remaining_ms(), BREAK_MS as i64);

    // Once through the break, the next cycle starts on its own.
    f.timer.start().unwrap();
    advance_ms(&f.clock, BREAK_MS + 1000).await;
    let p = f.timer.current().unwrap();
    assert_eq!(p.id(), 2);
    assert_eq!(p.status(), PeriodStatus::Running);
    assert_eq!(p.remaining_ms(), CYCLE_MS as i64);
}

#[tokio::test(start_paused = true)]
async fn full_schedule_runs_unattended_with_both_flags_on() {
    let f = fixture(true, true);

    f.timer.start().unwrap();

    // Every period takes its duration plus the completion tick.
    let total = 4 * (CYCLE_MS + 1000) + 3 * (BREAK_MS + 1000);
    advance_ms(&f.clock, total).await;

    let p = f.timer.current().unwrap();
    assert_eq!(p.id(), 6);
    assert_eq!(p.status(), PeriodStatus::Complete);
    assert_eq!(f.channel.last().unwrap().status, PeriodStatus::Complete);

    // Completions were announced in order, ending with the schedule itself.
    let kinds: Vec<NotificationKind> =
        f.notifier.notifications().iter().map(|n| n.2).collect();
    assert_eq!(
        kinds,
        vec![
            NotificationKind::Cycle,
            NotificationKind::Break,
            NotificationKind::Cycle,
            NotificationKind::Break,
            NotificationKind::Cycle,
            NotificationKind::Break,
            NotificationKind::Complete,
        ]
    );

    // Cycle completions announce the upcoming break's length.
    let (period, next, kind) = f.notifier.notifications()[0];
    assert_eq!(period, 0);
    assert_eq!(next, BREAK_MS);
    assert_eq!(kind, NotificationKind::Cycle);
}
