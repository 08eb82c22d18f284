//! Output channel to the UI surface.
//!
//! The channel is owned by the host and may connect or disconnect at any
//! time; the timer never blocks on it, and posts while the far end is closed
//! are dropped.

use crate::state::StateSnapshot;

pub trait OutputChannel: Send + Sync {
    /// Whether the far end is currently connected.
    fn is_open(&self) -> bool;

    /// Deliver a state snapshot. Must not block.
    fn post(&self, state: &StateSnapshot);
}

/// Disconnected channel; every post is dropped.
#[derive(Debug, Default)]
pub struct NullChannel;

impl OutputChannel for NullChannel {
    fn is_open(&self) -> bool {
        false
    }

    fn post(&self, _state: &StateSnapshot) {}
}
