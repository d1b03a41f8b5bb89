//! Color constants for the timer screens.
//!
//! Rgb565 uses 16 bits per pixel: 5 bits red, 6 bits green, 5 bits blue.
//! This format is native to the ST7789 and needs no conversion on the way
//! to the display.

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

/// Pure black. Boot background and text on the red/green screens.
pub const BLACK: Rgb565 = Rgb565::BLACK;

/// Pure red. Background while heating (start screen and countdown).
pub const RED: Rgb565 = Rgb565::RED;

/// Pure green. Background once the countdown is over.
pub const GREEN: Rgb565 = Rgb565::GREEN;
