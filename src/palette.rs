//! 256-entry color lookup table for palette-indexed scanlines.

use core::ops::Index;

use embedded_graphics::pixelcolor::Rgb565;

use crate::sink::PixelOrder;

/// Number of entries in a palette (all 8-bit indices).
pub const PALETTE_SIZE: usize = 256;

/// Maps an 8-bit index to a native 16-bit pixel value.
///
/// Entries are stored already encoded in the sink's [`PixelOrder`], so the
/// blitter copies them straight into the staging buffer.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Palette {
    entries: [u16; PALETTE_SIZE],
}

impl Palette {
    /// Palette with every entry set to 0.
    pub const fn new() -> Self {
        Self {
            entries: [0; PALETTE_SIZE],
        }
    }

    /// Palette from already encoded pixel values. Missing entries are 0.
    pub fn from_raw(values: &[u16]) -> Self {
        let mut palette = Self::new();
        for (entry, &value) in palette.entries.iter_mut().zip(values) {
            *entry = value;
        }
        palette
    }

    /// Palette from a GIF color table (`r, g, b` byte triplets).
    ///
    /// Each color is reduced to RGB565 and encoded in `order`. Entries the
    /// table does not cover are 0.
    pub fn from_rgb888(
        table: &[u8],
        order: PixelOrder,
    ) -> Self {
        let mut palette = Self::new();
        for (entry, rgb) in palette.entries.iter_mut().zip(table.chunks_exact(3)) {
            let color = Rgb565::new(rgb[0] >> 3, rgb[1] >> 2, rgb[2] >> 3);
            *entry = order.encode(color);
        }
        palette
    }

    /// Encoded pixel value for `index`.
    #[inline]
    pub const fn get(
        &self,
        index: u8,
    ) -> u16 {
        self.entries[index as usize]
    }
}

impl Default for Palette {
    fn default() -> Self { Self::new() }
}

impl Index<u8> for Palette {
    type Output = u16;

    #[inline]
    fn index(
        &self,
        index: u8,
    ) -> &u16 {
        &self.entries[index as usize]
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
