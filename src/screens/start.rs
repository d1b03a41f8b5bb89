//! Start screen, shown until a button is pressed.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use super::layout::{draw_chrome, draw_headline};
use crate::colors::RED;

/// Headline while waiting for a button press.
const START_HEADLINE: &str = "Heizen!";

/// Red screen asking to start heating.
pub fn draw_start_screen<D>(display: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    draw_chrome(display, RED)?;
    draw_headline(display, START_HEADLINE)
}
