//! Scanline blitter: palette-indexed GIF lines to RGB565 display transfers.
//!
//! The GIF decoder calls [`Blitter::draw`] once per decoded scanline. The
//! blitter clips the line to the display, translates visible pixels through
//! the frame palette into a staging buffer and issues as few transfers as
//! possible: one per chunk of an opaque line, one per visible run of a line
//! with transparency. Transparent runs cost nothing.
//!
//! # Transfer strategies
//!
//! How a staged run reaches the display is chosen when the blitter is built:
//!
//! - [`Blocking`]: one staging buffer, each transfer completes before the
//!   next run is staged.
//! - [`DoubleBuffered`]: two staging buffers used alternately with DMA
//!   transfers. While one buffer is on the bus the next run is translated
//!   into the other.
//!
//! ```ignore
//! let mut blitter = Blitter::new(DoubleBuffered::new());
//! gif.play_frame(|line| blitter.draw(&mut panel, line))?;
//! blitter.flush(&mut panel);
//! ```

use crate::config::STAGING_CAPACITY;
use crate::palette::Palette;
use crate::sink::PixelSink;

// =============================================================================
// Scanline
// =============================================================================

/// GIF frame disposal method (graphic control extension, bits 2-4).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Disposal {
    /// No disposal specified (code 0, and reserved codes 4-7).
    #[default]
    Unspecified,
    /// Leave the frame in place (code 1).
    DoNotDispose,
    /// Restore the frame area to the background color (code 2).
    RestoreBackground,
    /// Restore the frame area to what was there before (code 3).
    RestorePrevious,
}

impl Disposal {
    /// Decode the 3-bit disposal code.
    pub const fn from_code(code: u8) -> Self {
        match code {
            1 => Self::DoNotDispose,
            2 => Self::RestoreBackground,
            3 => Self::RestorePrevious,
            _ => Self::Unspecified,
        }
    }
}

/// One decoded row of a GIF frame.
///
/// Lives for a single [`Blitter::draw`] call. `pixels` is mutable because
/// background disposal rewrites transparent indices in place.
pub struct Scanline<'a> {
    /// Palette indices, at least `width` of them.
    pub pixels: &'a mut [u8],
    /// Number of pixels in the row.
    pub width: u16,
    /// Frame left edge on the display.
    pub offset_x: u16,
    /// Frame top edge on the display.
    pub offset_y: u16,
    /// Row inside the frame. The destination row is `offset_y + row`.
    pub row: u16,
    /// Palette of the frame this row belongs to.
    pub palette: &'a Palette,
    /// Disposal method of the frame.
    pub disposal: Disposal,
    /// Transparent index, if the frame uses transparency.
    pub transparent: Option<u8>,
    /// Background index of the logical screen.
    pub background: u8,
}

impl Scanline<'_> {
    /// Absolute display row of this scanline.
    #[inline]
    pub const fn dest_row(&self) -> u32 { self.offset_y as u32 + self.row as u32 }
}

// =============================================================================
// Transfer Strategies
// =============================================================================

/// How staged pixels get to the display.
pub trait Transfer {
    /// Buffer the next run is translated into.
    fn staging(&mut self) -> &mut [u16; STAGING_CAPACITY];

    /// Send the first `count` staged pixels to a `count` x 1 window at `(x, y)`.
    fn dispatch<S: PixelSink + ?Sized>(
        &mut self,
        sink: &mut S,
        x: u16,
        y: u16,
        count: usize,
    );

    /// Wait until no transfer is outstanding.
    fn flush<S: PixelSink + ?Sized>(
        &mut self,
        _sink: &mut S,
    ) {
    }
}

/// Synchronous transfers from a single staging buffer.
pub struct Blocking {
    buffer: [u16; STAGING_CAPACITY],
}

impl Blocking {
    /// Create the strategy with a zeroed buffer.
    pub const fn new() -> Self {
        Self {
            buffer: [0; STAGING_CAPACITY],
        }
    }
}

impl Default for Blocking {
    fn default() -> Self { Self::new() }
}

impl Transfer for Blocking {
    #[inline]
    fn staging(&mut self) -> &mut [u16; STAGING_CAPACITY] { &mut self.buffer }

    fn dispatch<S: PixelSink + ?Sized>(
        &mut self,
        sink: &mut S,
        x: u16,
        y: u16,
        count: usize,
    ) {
        sink.set_addr_window(x, y, count as u16, 1);
        sink.push_pixels(&self.buffer[..count]);
    }
}

/// Asynchronous (DMA) transfers alternating between two staging buffers.
///
/// The sink runs at most one transfer at a time: every dispatch first waits
/// for the previous one. The buffer handed out by [`Transfer::staging`] is
/// therefore always the one whose transfer was waited for before the last
/// dispatch, never the one still on the bus.
pub struct DoubleBuffered {
    buffers: [[u16; STAGING_CAPACITY]; 2],
    /// Index of the buffer the next run is staged into (0 or 1).
    current: usize,
}

impl DoubleBuffered {
    /// Create the strategy with zeroed buffers, staging into buffer 0.
    pub const fn new() -> Self {
        Self {
            buffers: [[0; STAGING_CAPACITY]; 2],
            current: 0,
        }
    }

    /// Index of the buffer the next run is staged into.
    #[inline]
    pub const fn current(&self) -> usize { self.current }

    /// Switch buffers after a dispatch.
    ///
    /// Returns the index of the buffer that was just dispatched.
    #[inline]
    fn swap(&mut self) -> usize {
        let dispatched = self.current;
        self.current = 1 - self.current;
        dispatched
    }
}

impl Default for DoubleBuffered {
    fn default() -> Self { Self::new() }
}

impl Transfer for DoubleBuffered {
    #[inline]
    fn staging(&mut self) -> &mut [u16; STAGING_CAPACITY] { &mut self.buffers[self.current] }

    fn dispatch<S: PixelSink + ?Sized>(
        &mut self,
        sink: &mut S,
        x: u16,
        y: u16,
        count: usize,
    ) {
        // The window can't move while the previous transfer is on the bus
        sink.dma_wait();
        sink.set_addr_window(x, y, count as u16, 1);
        let dispatched = self.swap();
        sink.push_pixels_dma(&self.buffers[dispatched][..count]);
    }

    fn flush<S: PixelSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) {
        sink.dma_wait();
    }
}

// =============================================================================
// Blitter
// =============================================================================

/// Counters collected while drawing, for playback diagnostics.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlitStats {
    /// Scanlines with at least one column on the display.
    pub lines_drawn: u32,
    /// Scanlines skipped entirely by clipping.
    pub lines_clipped: u32,
    /// Transfer calls issued.
    pub transfers: u32,
    /// Pixels sent to the display.
    pub pixels: u32,
}

/// Translates scanlines into display transfers.
pub struct Blitter<T: Transfer> {
    transfer: T,
    stats: BlitStats,
}

impl Blitter<Blocking> {
    /// Blitter using synchronous transfers.
    pub const fn blocking() -> Self { Self::new(Blocking::new()) }
}

impl Blitter<DoubleBuffered> {
    /// Blitter using double-buffered DMA transfers.
    pub const fn double_buffered() -> Self { Self::new(DoubleBuffered::new()) }
}

impl<T: Transfer> Blitter<T> {
    /// Create a blitter with the given transfer strategy.
    pub const fn new(transfer: T) -> Self {
        Self {
            transfer,
            stats: BlitStats {
                lines_drawn: 0,
                lines_clipped: 0,
                transfers: 0,
                pixels: 0,
            },
        }
    }

    /// Counters since creation or the last [`Blitter::reset_stats`].
    #[inline]
    pub const fn stats(&self) -> BlitStats { self.stats }

    /// Zero the counters.
    pub fn reset_stats(&mut self) { self.stats = BlitStats::default(); }

    /// The transfer strategy.
    #[inline]
    pub const fn transfer(&self) -> &T { &self.transfer }

    /// Draw one scanline.
    ///
    /// Lines entirely outside the display are skipped. Otherwise the width
    /// is clamped to the right display edge and the visible pixels are sent
    /// left to right.
    pub fn draw<S: PixelSink + ?Sized>(
        &mut self,
        sink: &mut S,
        line: &mut Scanline<'_>,
    ) {
        let size = sink.size();
        let y = line.dest_row();
        let x = u32::from(line.offset_x);

        let mut width = u32::from(line.width).min(line.pixels.len() as u32);
        if x + width > size.width {
            width = size.width.saturating_sub(x);
        }
        if y >= size.height || x >= size.width || width < 1 {
            self.stats.lines_clipped += 1;
            return;
        }
        self.stats.lines_drawn += 1;

        let pixels = &mut line.pixels[..width as usize];
        let mut transparent = line.transparent;

        // Restoring to background shows transparent pixels in the background
        // color, so the line becomes opaque
        if line.disposal == Disposal::RestoreBackground {
            if let Some(index) = transparent {
                for pixel in pixels.iter_mut().filter(|p| **p == index) {
                    *pixel = line.background;
                }
            }
            transparent = None;
        }

        match transparent {
            Some(index) => self.draw_transparent(sink, pixels, line.palette, index, x as u16, y as u16),
            None => self.draw_opaque(sink, pixels, line.palette, x as u16, y as u16),
        }
    }

    /// Wait for any outstanding transfer. Call before releasing the display.
    pub fn flush<S: PixelSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) {
        self.transfer.flush(sink);
    }

    /// Every pixel is visible: send the line in buffer-sized chunks.
    fn draw_opaque<S: PixelSink + ?Sized>(
        &mut self,
        sink: &mut S,
        pixels: &[u8],
        palette: &Palette,
        x: u16,
        y: u16,
    ) {
        let mut column = x;
        for chunk in pixels.chunks(STAGING_CAPACITY) {
            let staging = self.transfer.staging();
            for (dst, &index) in staging.iter_mut().zip(chunk) {
                *dst = palette[index];
            }
            self.dispatch(sink, column, y, chunk.len());
            column += chunk.len() as u16;
        }
    }

    /// Alternate between collecting a run of visible pixels and skipping a
    /// run of transparent ones until the line is consumed.
    fn draw_transparent<S: PixelSink + ?Sized>(
        &mut self,
        sink: &mut S,
        pixels: &[u8],
        palette: &Palette,
        transparent: u8,
        x: u16,
        y: u16,
    ) {
        let end = pixels.len();
        // Read cursor into the raw line
        let mut read = 0;
        // Destination column relative to `x`
        let mut column = 0;

        while column < end {
            let mut count = 0;
            {
                let staging = self.transfer.staging();
                while read < end && count < STAGING_CAPACITY {
                    let index = pixels[read];
                    if index == transparent {
                        // Left unread: the transparent scan below consumes it
                        break;
                    }
                    staging[count] = palette[index];
                    count += 1;
                    read += 1;
                }
            }
            if count > 0 {
                self.dispatch(sink, x + column as u16, y, count);
                column += count;
            }

            while read < end && pixels[read] == transparent {
                read += 1;
                column += 1;
            }
        }
    }

    #[inline]
    fn dispatch<S: PixelSink + ?Sized>(
        &mut self,
        sink: &mut S,
        x: u16,
        y: u16,
        count: usize,
    ) {
        self.transfer.dispatch(sink, x, y, count);
        self.stats.transfers += 1;
        self.stats.pixels += count as u32;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
