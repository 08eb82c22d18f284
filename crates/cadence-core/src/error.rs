//! Error types for cadence-core.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by [`crate::timer::Timer`] operations.
#[derive(Error, Debug)]
pub enum TimerError {
    /// An operation was invoked before `init()` built a timeline.
    #[error("timer is not initialized; call init() before other operations")]
    Uninitialized,

    /// `init()` was re-invoked after the schedule had already advanced.
    #[error("schedule already started; mid-run changes must go through update() or reset_all()")]
    AlreadyStarted,

    /// Settings rejected at an `init`/`update` boundary.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Validation errors for timer settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Errors from the settings storage collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to load settings from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("failed to save settings to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for timer operations.
pub type Result<T, E = TimerError> = std::result::Result<T, E>;
