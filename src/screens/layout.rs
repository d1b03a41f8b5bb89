//! Shared screen chrome: background, button labels and the headline anchor.

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;

use crate::config::TEXT_MARGIN_RIGHT;
use crate::styles::{BOTTOM_LEFT, HEADLINE_STYLE, LABEL_STYLE, MIDDLE_RIGHT, TOP_LEFT};

/// Label beside button A (top left).
pub(super) const LONG_LABEL: &str = "<- 5min";

/// Label beside button B (bottom left).
pub(super) const SHORT_LABEL: &str = "<- 30s";

/// Fill the screen and draw both button labels.
pub(super) fn draw_chrome<D>(
    display: &mut D,
    background: Rgb565,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    display.clear(background)?;

    let size = display.bounding_box().size;
    Text::with_text_style(LONG_LABEL, Point::zero(), LABEL_STYLE, TOP_LEFT).draw(display)?;
    Text::with_text_style(SHORT_LABEL, Point::new(0, size.height as i32), LABEL_STYLE, BOTTOM_LEFT).draw(display)?;
    Ok(())
}

/// Draw `text` vertically centered and right-aligned near the right edge.
pub(super) fn draw_headline<D>(
    display: &mut D,
    text: &str,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    headline(text, display.bounding_box().size).draw(display)?;
    Ok(())
}

/// Positioned headline for a display of `size`.
pub(super) fn headline(
    text: &str,
    size: Size,
) -> Text<'_, MonoTextStyle<'static, Rgb565>> {
    let anchor = Point::new(size.width as i32 - TEXT_MARGIN_RIGHT, size.height as i32 / 2);
    Text::with_text_style(text, anchor, HEADLINE_STYLE, MIDDLE_RIGHT)
}

// =============================================================================
// Unit Tests
// =============================================================================
