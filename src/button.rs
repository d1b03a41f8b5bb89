//! Button debounce handling for the timer presets.
//!
//! Provides time-based edge detection with debouncing to prevent
//! multiple triggers from contact bounce on physical buttons. The caller
//! supplies the clock, so the same logic runs on the board (embassy
//! `Instant`) and in the simulator (`std::time::Instant`).

use crate::config::DEBOUNCE_MS;

/// Button debounce state with time-based edge detection.
#[derive(Clone, Copy, Debug, Default)]
pub struct ButtonState {
    was_pressed: bool,
    last_change_ms: Option<u64>,
}

impl ButtonState {
    /// Create a new button state (not pressed).
    pub const fn new() -> Self {
        Self {
            was_pressed: false,
            last_change_ms: None,
        }
    }

    /// Returns true only on the falling edge (button just pressed).
    ///
    /// Buttons are active-low, so `is_low` means pressed. A held button
    /// fires once. Level changes within [`DEBOUNCE_MS`] of the last
    /// accepted change are ignored.
    pub fn just_pressed(
        &mut self,
        is_low: bool,
        now_ms: u64,
    ) -> bool {
        if is_low == self.was_pressed {
            return false;
        }

        if let Some(last) = self.last_change_ms
            && now_ms.saturating_sub(last) < DEBOUNCE_MS
        {
            return false;
        }

        self.was_pressed = is_low;
        self.last_change_ms = Some(now_ms);
        is_low
    }
}
