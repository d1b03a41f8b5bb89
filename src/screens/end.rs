//! End screen, shown once the countdown and the closing animation are over.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use super::layout::{draw_chrome, draw_headline};
use crate::colors::GREEN;

/// Headline once the countdown is over.
const END_HEADLINE: &str = "Vape!";

/// Green screen announcing the end of the countdown.
pub fn draw_end_screen<D>(display: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    draw_chrome(display, GREEN)?;
    draw_headline(display, END_HEADLINE)
}
