//! Foreground timer host.
//!
//! Wires the scheduler to its collaborators: settings come from the TOML
//! store, state goes out as JSON lines on stdout, completions are announced
//! on stderr, and control commands arrive on stdin. A watchdog compares the
//! wall clock against the monotonic clock and fires the drift signal when
//! the process appears to have slept.

use std::error::Error;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cadence_core::{SettingsFile, SettingsStore, Timer};
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::host::{ConsoleNotifier, StdoutChannel};

/// Wall-vs-monotonic divergence beyond which the process is assumed to have
/// been suspended.
const SUSPEND_SLACK_MS: i64 = 2_000;
const WATCHDOG_PERIOD: Duration = Duration::from_secs(15);

pub fn run() -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_loop())
}

async fn run_loop() -> Result<(), Box<dyn Error>> {
    let store = SettingsFile::new()?;
    let prefs = store.config().unwrap_or_default().notifications;
    let settings = store.load()?;

    let timer = Timer::new()
        .with_channel(Arc::new(StdoutChannel))
        .with_notifier(Arc::new(ConsoleNotifier::new(prefs)));
    timer.init(settings)?;

    println!(
        "commands: start | pause | skip | reset | all | status | cycle <min> | break <min> | reload | quit"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut watchdog = tokio::time::interval(WATCHDOG_PERIOD);
    watchdog.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut wall_anchor = Utc::now().timestamp_millis();
    let mut monotonic_anchor = Instant::now();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(input) => match dispatch(&timer, &store, input.trim()) {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(error) => warn!(%error, "command failed"),
                    },
                    None => break,
                }
            }
            _ = watchdog.tick() => {
                let wall = Utc::now().timestamp_millis();
                let drift = (wall - wall_anchor) - monotonic_anchor.elapsed().as_millis() as i64;
                if drift.abs() > SUSPEND_SLACK_MS {
                    info!(drift_ms = drift, "wall clock discontinuity, resyncing");
                    timer.sync(wall)?;
                }
                wall_anchor = wall;
                monotonic_anchor = Instant::now();
            }
        }
    }
    Ok(())
}

/// Map one input line onto a timer operation. Returns false to quit.
fn dispatch(timer: &Timer, store: &SettingsFile, command: &str) -> Result<bool, Box<dyn Error>> {
    let mut parts = command.split_whitespace();
    match parts.next() {
        None => {}
        Some("start") => timer.start()?,
        Some("pause") => timer.pause()?,
        Some("skip") => timer.skip()?,
        Some("reset") => timer.reset()?,
        Some("all") => timer.reset_all()?,
        Some("status") => {
            if let Some(snapshot) = timer.snapshot() {
                println!("{}", serde_json::to_string(&snapshot)?);
            }
        }
        Some("cycle") => match parts.next().and_then(|v| v.parse::<u64>().ok()) {
            Some(minutes) if minutes > 0 => {
                timer.update_cycle_time(minutes * 60_000)?;
                store.save(&timer.settings())?;
            }
            _ => eprintln!("usage: cycle <minutes>"),
        },
        Some("break") => match parts.next().and_then(|v| v.parse::<u64>().ok()) {
            Some(minutes) if minutes > 0 => {
                timer.update_break_time(minutes * 60_000)?;
                store.save(&timer.settings())?;
            }
            _ => eprintln!("usage: break <minutes>"),
        },
        Some("reload") => {
            // Settings changed on disk: wipe the schedule and rebuild.
            let settings = store.load()?;
            timer.reset_all()?;
            timer.init(settings)?;
        }
        Some("quit") | Some("exit") => return Ok(false),
        Some(other) => eprintln!("unknown command: {other}"),
    }
    Ok(true)
}
