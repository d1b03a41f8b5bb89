//! Timing constants for the simulator.
//!
//! `std::time::Duration` versions of the library's millisecond constants.

use std::time::Duration;

use vape_timer::config::POLL_INTERVAL_MS;

/// Sleep between two passes of the main loop.
pub const POLL_INTERVAL: Duration = Duration::from_millis(POLL_INTERVAL_MS);

/// Milliseconds elapsed since `start`, the clock fed to buttons and countdown.
pub fn millis_since(start: std::time::Instant) -> u64 { start.elapsed().as_millis() as u64 }
