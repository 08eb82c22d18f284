//! Settings persistence.
//!
//! The scheduler itself never touches storage; hosts hand it settings loaded
//! through the [`SettingsStore`] capability. The shipped implementation is a
//! TOML file under the user config directory.

mod config;

pub use config::{Config, NotificationsConfig, SettingsFile, TimerConfig};

use std::path::PathBuf;

use crate::error::StoreError;
use crate::settings::TimerSettings;

/// Returns `~/.config/cadence[-dev]/` based on CADENCE_ENV.
///
/// Set CADENCE_ENV=dev to use a separate development data directory.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("CADENCE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("cadence-dev")
    } else {
        base_dir.join("cadence")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Storage collaborator: load and persist timer settings.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<TimerSettings, StoreError>;

    fn save(&self, settings: &TimerSettings) -> Result<(), StoreError>;
}
