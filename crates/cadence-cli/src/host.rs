//! Host-side collaborator implementations: the stdout state channel and the
//! console notifier.

use cadence_core::notify::{break_number, cycle_number};
use cadence_core::storage::NotificationsConfig;
use cadence_core::{NotificationKind, Notifier, OutputChannel, StateSnapshot};

/// UI channel that writes one JSON line per state change.
pub struct StdoutChannel;

impl OutputChannel for StdoutChannel {
    fn is_open(&self) -> bool {
        true
    }

    fn post(&self, state: &StateSnapshot) {
        if let Ok(line) = serde_json::to_string(state) {
            println!("{line}");
        }
    }
}

/// Notifier that prints completion announcements to stderr, with a terminal
/// bell when sound is enabled.
pub struct ConsoleNotifier {
    prefs: NotificationsConfig,
}

impl ConsoleNotifier {
    pub fn new(prefs: NotificationsConfig) -> Self {
        Self { prefs }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, period: usize, next_duration_ms: u64, kind: NotificationKind) {
        if !self.prefs.enabled {
            return;
        }
        let (title, message) = match kind {
            NotificationKind::Cycle => (
                format!("Cycle {} complete!", cycle_number(period)),
                format!("Great job. Take {} minutes.", next_duration_ms / 60_000),
            ),
            NotificationKind::Break => (
                format!("Break {} is over.", break_number(period)),
                "Time to grind!".to_string(),
            ),
            NotificationKind::Complete => (
                "You did it! All cycles are complete.".to_string(),
                "Take a long break.".to_string(),
            ),
        };
        let bell = if self.prefs.sound { "\x07" } else { "" };
        eprintln!("{bell}{title} {message}");
    }

    fn clear(&self, _period: usize) {
        // Printed lines cannot be retracted.
    }
}
