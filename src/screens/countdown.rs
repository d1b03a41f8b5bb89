//! Countdown screen, redrawn once per second while the timer runs.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use super::layout::{draw_chrome, draw_headline};
use crate::colors::RED;
use crate::countdown::format_mm_ss;

/// Red screen with the remaining time as `MM:SS`.
pub fn draw_countdown_screen<D>(
    display: &mut D,
    remaining_secs: u32,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    draw_chrome(display, RED)?;
    draw_headline(display, &format_mm_ss(remaining_secs))
}
