//! Pre-computed static text styles for the timer screens.
//!
//! All screens use black text on a solid background, so every style here is
//! a `const` and costs nothing at runtime. Text is anchored by its corner or
//! edge rather than by its baseline, which keeps the layout independent of
//! the font's ascent.

use embedded_graphics::{
    mono_font::{MonoTextStyle, ascii::FONT_10X20},
    pixelcolor::Rgb565,
    text::{Alignment, Baseline, TextStyle, TextStyleBuilder},
};
use profont::PROFONT_24_POINT;

use crate::colors::BLACK;

// =============================================================================
// Text Anchors
// =============================================================================

/// Anchored at the top-left corner. Upper button label.
pub const TOP_LEFT: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Left)
    .baseline(Baseline::Top)
    .build();

/// Anchored at the bottom-left corner. Lower button label.
pub const BOTTOM_LEFT: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Left)
    .baseline(Baseline::Bottom)
    .build();

/// Anchored at the middle of the right edge. Headline and remaining time.
pub const MIDDLE_RIGHT: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Right)
    .baseline(Baseline::Middle)
    .build();

// =============================================================================
// Character Styles
// =============================================================================

/// Button labels (10x20 pixels).
pub const LABEL_STYLE: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_10X20, BLACK);

/// Headline and countdown (`ProFont` 24pt).
pub const HEADLINE_STYLE: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&PROFONT_24_POINT, BLACK);
