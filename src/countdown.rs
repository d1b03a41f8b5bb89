//! Heat-up countdown driven by polling a millisecond clock.
//!
//! The countdown doesn't own a timer. The main loop calls
//! [`Countdown::poll`] with the current time and reacts to the returned
//! event. Once a full tick has elapsed the tick reference jumps to the poll
//! time, so late polls stretch the following second instead of bunching up
//! several ticks.

use core::fmt::Write;

use heapless::String;

use crate::config::{LONG_COUNTDOWN_SECS, SHORT_COUNTDOWN_SECS, TICK_MS};

/// The two countdown durations the buttons can start.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerPreset {
    ThirtySeconds,
    FiveMinutes,
}

impl TimerPreset {
    /// Countdown length in seconds.
    pub const fn seconds(self) -> u32 {
        match self {
            Self::ThirtySeconds => SHORT_COUNTDOWN_SECS,
            Self::FiveMinutes => LONG_COUNTDOWN_SECS,
        }
    }
}

/// What changed during a [`Countdown::poll`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CountdownEvent {
    /// One second passed; seconds left.
    Tick(u32),
    /// A tick passed at zero. The countdown has stopped.
    Finished,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Countdown {
    remaining: u32,
    running: bool,
    last_tick_ms: u64,
}

impl Countdown {
    /// Idle countdown.
    pub const fn new() -> Self {
        Self {
            remaining: 0,
            running: false,
            last_tick_ms: 0,
        }
    }

    /// Start counting down from `preset`, replacing any countdown in progress.
    pub fn start(
        &mut self,
        preset: TimerPreset,
        now_ms: u64,
    ) {
        self.remaining = preset.seconds();
        self.running = true;
        self.last_tick_ms = now_ms;
    }

    /// Seconds left.
    #[inline]
    pub const fn remaining(&self) -> u32 { self.remaining }

    #[inline]
    pub const fn is_running(&self) -> bool { self.running }

    /// Advance the countdown to `now_ms`.
    ///
    /// Yields at most one event per call. When the remaining time is already
    /// zero a tick finishes the countdown, so `00:00` stays up for a full
    /// second.
    pub fn poll(
        &mut self,
        now_ms: u64,
    ) -> Option<CountdownEvent> {
        if !self.running || now_ms.saturating_sub(self.last_tick_ms) < TICK_MS {
            return None;
        }
        self.last_tick_ms = now_ms;

        if self.remaining > 0 {
            self.remaining -= 1;
            Some(CountdownEvent::Tick(self.remaining))
        } else {
            self.running = false;
            Some(CountdownEvent::Finished)
        }
    }
}

/// Longest `MM:SS` label: `u32::MAX` seconds is 71582788 minutes.
const MAX_LABEL_LEN: usize = 11;

/// Format seconds as zero-padded `MM:SS`.
///
/// Minutes are not wrapped, so anything past 99 minutes widens the field.
pub fn format_mm_ss(seconds: u32) -> String<MAX_LABEL_LEN> {
    let mut text = String::new();
    // Cannot overflow: every u32 fits in MAX_LABEL_LEN
    let _ = write!(text, "{:02}:{:02}", seconds / 60, seconds % 60);
    text
}
