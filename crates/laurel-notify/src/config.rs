//! Scheduler timing configuration

use crate::scheduler::Tick;
use serde::{Deserialize, Serialize};

/// Timing for notification display, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// How long an item stays up unless dismissed
    pub display_duration_ms: Tick,
    /// Exit-animation interval between one item and the next
    pub exit_grace_ms: Tick,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            display_duration_ms: 5_000,
            exit_grace_ms: 300,
        }
    }
}

impl SchedulerConfig {
    /// No exit interval; the next item shows at the dismissal instant
    pub fn without_grace(display_duration_ms: Tick) -> Self {
        Self {
            display_duration_ms,
            exit_grace_ms: 0,
        }
    }
}
