//! Application configuration constants.
//!
//! Everything here is fixed at compile time. The only runtime choice the
//! timer offers is which of the two countdown presets to start.

// =============================================================================
// Display Configuration
// =============================================================================

/// Display width in pixels (ST7789 on Pimoroni PIM715: 320x240, landscape)
pub const SCREEN_WIDTH: u32 = 320;

/// Display height in pixels
pub const SCREEN_HEIGHT: u32 = 240;

/// Distance of the right-aligned headline from the right screen edge.
pub const TEXT_MARGIN_RIGHT: i32 = 10;

// =============================================================================
// Blitter Configuration
// =============================================================================

/// Capacity of one pixel staging buffer, in pixels.
///
/// Best when it is >= the GIF width or an integral division of it, so opaque
/// lines split into equal transfers.
pub const STAGING_CAPACITY: usize = 256;

/// Widest GIF frame the decoder accepts (line buffer size).
pub const MAX_LINE_WIDTH: usize = 480;

/// Frame delay used when a GIF frame asks for zero delay.
pub const MIN_FRAME_DELAY_MS: u32 = 20;

// =============================================================================
// Timer Configuration
// =============================================================================

/// Countdown preset bound to button B (bottom left).
pub const SHORT_COUNTDOWN_SECS: u32 = 30;

/// Countdown preset bound to button A (top left).
pub const LONG_COUNTDOWN_SECS: u32 = 300;

/// Countdown resolution. The display updates once per tick.
pub const TICK_MS: u64 = 1000;

/// Button debounce window in milliseconds.
pub const DEBOUNCE_MS: u64 = 50;

/// Main loop poll period in milliseconds.
pub const POLL_INTERVAL_MS: u64 = 10;
