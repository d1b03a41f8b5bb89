//! ST7789 display driver for embassy-rp.
//!
//! The driver is split into two components:
//! - [`St7789`]: Owns the SPI bus. Implements [`PixelSink`] so the GIF
//!   blitter can stream scanlines straight to the panel, and flushes the
//!   text-screen framebuffer.
//! - [`St7789Renderer`]: Implements `DrawTarget` on top of a framebuffer,
//!   used for the text screens.
//!
//! Pixels travel big-endian. The blitter's palette is built with
//! [`PixelOrder::BigEndian`](vape_timer::sink::PixelOrder), so a staged
//! `[u16]` run already has wire byte order in memory and is sent as is.

use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Async, Spi};
use embassy_time::Timer;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use vape_timer::sink::PixelSink;

/// Display dimensions (landscape mode after 90° rotation).
pub const WIDTH: usize = 320;
pub const HEIGHT: usize = 240;
/// Full-screen framebuffer size in bytes (153,600), big-endian RGB565.
pub const BUFFER_SIZE: usize = WIDTH * HEIGHT * 2;

// ST7789 Commands
const SWRESET: u8 = 0x01;
const SLPOUT: u8 = 0x11;
const NORON: u8 = 0x13;
const INVON: u8 = 0x21;
const DISPON: u8 = 0x29;
const CASET: u8 = 0x2A;
const RASET: u8 = 0x2B;
const RAMWR: u8 = 0x2C;
const MADCTL: u8 = 0x36;
const COLMOD: u8 = 0x3A;

// MADCTL flags
const MADCTL_MX: u8 = 0x40; // Column address order
const MADCTL_MV: u8 = 0x20; // Row/column exchange

/// View a run of pixel values as the bytes to put on the wire.
#[inline]
fn pixel_bytes(pixels: &[u16]) -> &[u8] {
    // SAFETY: u16 has no padding and u8 has alignment 1; the byte slice
    // covers exactly the memory of `pixels` and borrows it for the same lifetime
    unsafe { core::slice::from_raw_parts(pixels.as_ptr().cast::<u8>(), pixels.len() * 2) }
}

/// ST7789 panel on SPI0.
pub struct St7789<'d> {
    spi: Spi<'d, SPI0, Async>,
    dc: Output<'d>,
    cs: Output<'d>,
    /// Inside a `begin_write`/`end_write` bracket: CS stays low.
    selected: bool,
}

impl<'d> St7789<'d> {
    /// Create a panel from SPI and control pins.
    pub fn new(
        spi: Spi<'d, SPI0, Async>,
        dc: Output<'d>,
        cs: Output<'d>,
    ) -> Self {
        Self {
            spi,
            dc,
            cs,
            selected: false,
        }
    }

    /// Initialize the display hardware.
    pub async fn init(&mut self) {
        self.command(SWRESET, &[]);
        Timer::after_millis(150).await;

        self.command(SLPOUT, &[]);
        Timer::after_millis(10).await;

        // RGB565, landscape (MV | MX), inversion on for the PIM715 panel
        self.command(COLMOD, &[0x55]);
        self.command(MADCTL, &[MADCTL_MV | MADCTL_MX]);
        self.command(INVON, &[]);
        Timer::after_millis(10).await;

        self.command(NORON, &[]);
        Timer::after_millis(10).await;

        self.command(DISPON, &[]);
        Timer::after_millis(10).await;
    }

    /// Send a full-screen framebuffer via async DMA transfer.
    pub async fn flush_frame(
        &mut self,
        buffer: &[u8],
    ) {
        self.set_addr_window(0, 0, WIDTH as u16, HEIGHT as u16);
        self.cs.set_low();
        self.dc.set_high();
        self.spi.write(buffer).await.ok();
        self.release();
    }

    /// Send a command byte followed by its parameters.
    fn command(
        &mut self,
        cmd: u8,
        params: &[u8],
    ) {
        self.cs.set_low();
        self.dc.set_low();
        self.spi.blocking_write(&[cmd]).ok();
        if !params.is_empty() {
            self.dc.set_high();
            self.spi.blocking_write(params).ok();
        }
        self.release();
    }

    /// Deselect the panel unless a write bracket is open.
    #[inline]
    fn release(&mut self) {
        if !self.selected {
            self.cs.set_high();
        }
    }

    /// Stream pixel data into RAM after `set_addr_window`.
    #[inline]
    fn select_data(&mut self) {
        self.cs.set_low();
        self.dc.set_high();
    }
}

impl PixelSink for St7789<'_> {
    fn size(&self) -> Size { Size::new(WIDTH as u32, HEIGHT as u32) }

    fn begin_write(&mut self) {
        self.selected = true;
        self.cs.set_low();
    }

    fn end_write(&mut self) {
        self.selected = false;
        self.cs.set_high();
    }

    fn set_addr_window(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) {
        let x1 = x + width - 1;
        let y1 = y + height - 1;
        let [x_hi, x_lo] = x.to_be_bytes();
        let [x1_hi, x1_lo] = x1.to_be_bytes();
        let [y_hi, y_lo] = y.to_be_bytes();
        let [y1_hi, y1_lo] = y1.to_be_bytes();

        self.command(CASET, &[x_hi, x_lo, x1_hi, x1_lo]);
        self.command(RASET, &[y_hi, y_lo, y1_hi, y1_lo]);
        self.command(RAMWR, &[]);
    }

    fn push_pixels(
        &mut self,
        pixels: &[u16],
    ) {
        self.select_data();
        self.spi.blocking_write(pixel_bytes(pixels)).ok();
        self.release();
    }

    /// Sends the run through the SPI DMA channel.
    ///
    /// The SPI future is driven to completion here, so the bus is idle again
    /// on return and [`PixelSink::dma_wait`] has nothing left to wait for.
    fn push_pixels_dma(
        &mut self,
        pixels: &[u16],
    ) {
        self.select_data();
        embassy_futures::block_on(self.spi.write(pixel_bytes(pixels))).ok();
        self.release();
    }
}

/// ST7789 renderer - implements DrawTarget, writes to a framebuffer.
///
/// Writes big-endian RGB565 into a framebuffer reference and owns no
/// hardware. Flush the framebuffer with [`St7789::flush_frame`].
pub struct St7789Renderer<'a> {
    framebuffer: &'a mut [u8],
}

impl<'a> St7789Renderer<'a> {
    /// Create a new renderer targeting the given framebuffer.
    pub fn new(framebuffer: &'a mut [u8]) -> Self { Self { framebuffer } }

    #[inline]
    fn set_pixel(
        &mut self,
        x: usize,
        y: usize,
        color: Rgb565,
    ) {
        let idx = (y * WIDTH + x) * 2;
        let bytes = RawU16::from(color).into_inner().to_be_bytes();
        self.framebuffer[idx..idx + 2].copy_from_slice(&bytes);
    }
}

impl OriginDimensions for St7789Renderer<'_> {
    fn size(&self) -> Size { Size::new(WIDTH as u32, HEIGHT as u32) }
}

impl DrawTarget for St7789Renderer<'_> {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 && (point.x as usize) < WIDTH && (point.y as usize) < HEIGHT {
                self.set_pixel(point.x as usize, point.y as usize, color);
            }
        }
        Ok(())
    }

    fn fill_solid(
        &mut self,
        area: &Rectangle,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };

        let bytes = RawU16::from(color).into_inner().to_be_bytes();
        let (x0, x1) = (area.top_left.x as usize, bottom_right.x as usize);
        for y in area.top_left.y as usize..=bottom_right.y as usize {
            let row = &mut self.framebuffer[(y * WIDTH + x0) * 2..(y * WIDTH + x1 + 1) * 2];
            for pixel in row.chunks_exact_mut(2) {
                pixel.copy_from_slice(&bytes);
            }
        }
        Ok(())
    }
}
