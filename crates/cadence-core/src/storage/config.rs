//! TOML-based application configuration.
//!
//! Stores the timer schedule (in minutes, the way users think about it),
//! autostart flags, and notification preferences. Stored at
//! `~/.config/cadence/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{data_dir, SettingsStore};
use crate::error::StoreError;
use crate::settings::{AutoStart, TimerSettings};

/// Timer schedule configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_cycle_minutes")]
    pub cycle_minutes: u64,
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u64,
    #[serde(default = "default_total_cycles")]
    pub total_cycles: usize,
    #[serde(default)]
    pub auto_start: AutoStart,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            cycle_minutes: default_cycle_minutes(),
            break_minutes: default_break_minutes(),
            total_cycles: default_total_cycles(),
            auto_start: AutoStart::default(),
        }
    }
}

impl TimerConfig {
    /// Runtime settings in milliseconds. Breaks sit strictly between cycles,
    /// so the period count is `2 * cycles - 1`.
    pub fn to_settings(&self) -> TimerSettings {
        TimerSettings {
            cycle_time_ms: self.cycle_minutes * 60_000,
            break_time_ms: self.break_minutes * 60_000,
            total_periods: (self.total_cycles * 2).saturating_sub(1),
            auto_start: self.auto_start,
        }
    }

    pub fn set_from(&mut self, settings: &TimerSettings) {
        self.cycle_minutes = settings.cycle_time_ms / 60_000;
        self.break_minutes = settings.break_time_ms / 60_000;
        self.total_cycles = settings.total_periods / 2 + 1;
        self.auto_start = settings.auto_start;
    }
}

/// Notification preferences, consumed by the host's notifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub sound: bool,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sound: true,
        }
    }
}

/// Application configuration, serialized to/from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

impl Config {
    pub fn path() -> Result<PathBuf, StoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    pub fn load() -> Result<Self, StoreError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path. A missing file yields the defaults; a
    /// present-but-unparsable file is an error.
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| StoreError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn save(&self) -> Result<(), StoreError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self).map_err(|e| StoreError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}

/// [`SettingsStore`] backed by the TOML config file.
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    pub fn new() -> Result<Self, StoreError> {
        Ok(Self {
            path: Config::path()?,
        })
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn config(&self) -> Result<Config, StoreError> {
        Config::load_from(&self.path)
    }
}

impl SettingsStore for SettingsFile {
    fn load(&self) -> Result<TimerSettings, StoreError> {
        Ok(Config::load_from(&self.path)?.timer.to_settings())
    }

    fn save(&self, settings: &TimerSettings) -> Result<(), StoreError> {
        let mut config = Config::load_from(&self.path).unwrap_or_default();
        config.timer.set_from(settings);
        config.save_to(&self.path)
    }
}

fn default_cycle_minutes() -> u64 {
    25
}
fn default_break_minutes() -> u64 {
    5
}
fn default_total_cycles() -> usize {
    4
}
fn default_true() -> bool {
    true
}
