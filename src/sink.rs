//! Downstream pixel-transfer contract.
//!
//! A [`PixelSink`] is the display as the blitter sees it: an addressable
//! window that consumes a stream of native 16-bit pixels. The firmware
//! implements it on top of the ST7789 SPI bus, the simulator and the tests
//! use [`DrawTargetSink`] on top of any `embedded-graphics` draw target.
//!
//! Transfer failures are not reported through this interface. A lost
//! transfer is a visual glitch, not something the caller can recover from.

use core::ops::{Deref, DerefMut};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// Byte order of the 16-bit pixel values handed to a sink.
///
/// `BigEndian` values are byte-swapped so that a little-endian CPU holds
/// them in memory in ST7789 wire order, ready to be streamed without
/// per-pixel conversion.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelOrder {
    /// Native `RawU16` value.
    #[default]
    LittleEndian,
    /// Byte-swapped `RawU16` value.
    BigEndian,
}

impl PixelOrder {
    /// Encode a color as a pixel value in this order.
    #[inline]
    pub fn encode(
        self,
        color: Rgb565,
    ) -> u16 {
        let raw = RawU16::from(color).into_inner();
        match self {
            Self::LittleEndian => raw,
            Self::BigEndian => raw.swap_bytes(),
        }
    }

    /// Decode a pixel value in this order back into a color.
    #[inline]
    pub fn decode(
        self,
        value: u16,
    ) -> Rgb565 {
        let raw = match self {
            Self::LittleEndian => value,
            Self::BigEndian => value.swap_bytes(),
        };
        Rgb565::from(RawU16::new(raw))
    }
}

/// A display that accepts windowed pixel streams.
pub trait PixelSink {
    /// Addressable size of the display.
    fn size(&self) -> Size;

    /// Acquire the display bus for a sequence of writes.
    fn begin_write(&mut self) {}

    /// Release the display bus.
    fn end_write(&mut self) {}

    /// Position the write cursor at the top-left of a `width` x `height` window.
    fn set_addr_window(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    );

    /// Stream pixels into the current window, returning when the transfer is done.
    fn push_pixels(
        &mut self,
        pixels: &[u16],
    );

    /// Start streaming pixels into the current window.
    ///
    /// The transfer may still be running on return. The caller must leave
    /// `pixels` untouched until [`PixelSink::dma_wait`] has returned.
    fn push_pixels_dma(
        &mut self,
        pixels: &[u16],
    ) {
        self.push_pixels(pixels);
    }

    /// Wait for the transfer started by the last `push_pixels_dma` to finish.
    fn dma_wait(&mut self) {}
}

/// Exclusive access to a sink for the lifetime of the guard.
///
/// Calls [`PixelSink::begin_write`] on creation and [`PixelSink::end_write`]
/// on drop, so a frame's writes can't leak past the bracket.
pub struct ExclusiveWrite<'a, S: PixelSink + ?Sized> {
    sink: &'a mut S,
}

impl<'a, S: PixelSink + ?Sized> ExclusiveWrite<'a, S> {
    /// Acquire the sink.
    pub fn new(sink: &'a mut S) -> Self {
        sink.begin_write();
        Self { sink }
    }
}

impl<S: PixelSink + ?Sized> Deref for ExclusiveWrite<'_, S> {
    type Target = S;

    fn deref(&self) -> &S { self.sink }
}

impl<S: PixelSink + ?Sized> DerefMut for ExclusiveWrite<'_, S> {
    fn deref_mut(&mut self) -> &mut S { self.sink }
}

impl<S: PixelSink + ?Sized> Drop for ExclusiveWrite<'_, S> {
    fn drop(&mut self) { self.sink.end_write(); }
}

/// Adapts an `embedded-graphics` draw target into a [`PixelSink`].
///
/// Emulates the controller's address window: pushed pixels fill the window
/// left to right, top to bottom, and wrap to its top-left corner once it is
/// full. Pixels outside the target are clipped by the target itself.
pub struct DrawTargetSink<'a, D> {
    target: &'a mut D,
    order: PixelOrder,
    window: Rectangle,
    /// Pixel offset of the write cursor inside `window`.
    cursor: u32,
}

impl<'a, D> DrawTargetSink<'a, D>
where
    D: DrawTarget<Color = Rgb565>,
{
    /// Wrap a draw target. Pixel values are decoded with `order`.
    pub fn new(
        target: &'a mut D,
        order: PixelOrder,
    ) -> Self {
        let window = target.bounding_box();
        Self {
            target,
            order,
            window,
            cursor: 0,
        }
    }

    /// Current address window.
    #[inline]
    pub const fn window(&self) -> Rectangle { self.window }
}

impl<D> PixelSink for DrawTargetSink<'_, D>
where
    D: DrawTarget<Color = Rgb565>,
{
    fn size(&self) -> Size { self.target.bounding_box().size }

    fn set_addr_window(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) {
        self.window = Rectangle::new(
            Point::new(i32::from(x), i32::from(y)),
            Size::new(u32::from(width), u32::from(height)),
        );
        self.cursor = 0;
    }

    fn push_pixels(
        &mut self,
        pixels: &[u16],
    ) {
        let width = self.window.size.width.max(1);
        let area = (self.window.size.width * self.window.size.height).max(1);
        let origin = self.window.top_left;
        let order = self.order;
        let start = self.cursor;

        let points = pixels.iter().enumerate().map(move |(i, &value)| {
            let offset = (start + i as u32) % area;
            let point = origin + Point::new((offset % width) as i32, (offset / width) as i32);
            Pixel(point, order.decode(value))
        });
        self.target.draw_iter(points).ok();

        self.cursor = (start + pixels.len() as u32) % area;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Small in-memory framebuffer used as a draw target by the tests.
    pub(crate) struct Framebuffer {
        pub width: u32,
        pub height: u32,
        pub pixels: Vec<Option<Rgb565>>,
    }

    impl Framebuffer {
        pub(crate) fn new(
            width: u32,
            height: u32,
        ) -> Self {
            Self {
                width,
                height,
                pixels: vec![None; (width * height) as usize],
            }
        }

        pub(crate) fn get(
            &self,
            x: u32,
            y: u32,
        ) -> Option<Rgb565> {
            self.pixels[(y * self.width + x) as usize]
        }

        pub(crate) fn written(&self) -> usize { self.pixels.iter().filter(|p| p.is_some()).count() }
    }

    impl OriginDimensions for Framebuffer {
        fn size(&self) -> Size { Size::new(self.width, self.height) }
    }

    impl DrawTarget for Framebuffer {
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
                if point.x >= 0 && point.y >= 0 && (point.x as u32) < self.width && (point.y as u32) < self.height {
                    let idx = (point.y as u32 * self.width + point.x as u32) as usize;
                    self.pixels[idx] = Some(color);
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_pixel_order_big_endian_swaps_bytes() {
        let raw = RawU16::from(Rgb565::RED).into_inner();
        assert_eq!(raw, 0xF800);
        assert_eq!(PixelOrder::BigEndian.encode(Rgb565::RED), 0x00F8);
        assert_eq!(PixelOrder::LittleEndian.encode(Rgb565::RED), 0xF800);
    }

    #[test]
    fn test_pixel_order_decode_inverts_encode() {
        for order in [PixelOrder::LittleEndian, PixelOrder::BigEndian] {
            let color = Rgb565::new(3, 40, 17);
            assert_eq!(order.decode(order.encode(color)), color);
        }
    }

    #[test]
    fn test_draw_target_sink_fills_window_row_by_row() {
        let mut fb = Framebuffer::new(8, 8);
        let red = PixelOrder::LittleEndian.encode(Rgb565::RED);
        {
            let mut sink = DrawTargetSink::new(&mut fb, PixelOrder::LittleEndian);
            sink.set_addr_window(2, 3, 2, 2);
            sink.push_pixels(&[red, red, red]);
        }
        assert_eq!(fb.get(2, 3), Some(Rgb565::RED));
        assert_eq!(fb.get(3, 3), Some(Rgb565::RED));
        assert_eq!(fb.get(2, 4), Some(Rgb565::RED));
        assert_eq!(fb.get(3, 4), None);
        assert_eq!(fb.written(), 3);
    }

    #[test]
    fn test_draw_target_sink_cursor_continues_across_pushes() {
        let mut fb = Framebuffer::new(8, 1);
        let white = PixelOrder::BigEndian.encode(Rgb565::WHITE);
        let black = PixelOrder::BigEndian.encode(Rgb565::BLACK);
        {
            let mut sink = DrawTargetSink::new(&mut fb, PixelOrder::BigEndian);
            sink.set_addr_window(1, 0, 4, 1);
            sink.push_pixels(&[white, white]);
            sink.push_pixels(&[black]);
        }
        assert_eq!(fb.get(0, 0), None);
        assert_eq!(fb.get(1, 0), Some(Rgb565::WHITE));
        assert_eq!(fb.get(2, 0), Some(Rgb565::WHITE));
        assert_eq!(fb.get(3, 0), Some(Rgb565::BLACK));
        assert_eq!(fb.get(4, 0), None);
    }

    #[test]
    fn test_draw_target_sink_clips_outside_target() {
        let mut fb = Framebuffer::new(4, 4);
        let red = PixelOrder::LittleEndian.encode(Rgb565::RED);
        {
            let mut sink = DrawTargetSink::new(&mut fb, PixelOrder::LittleEndian);
            assert_eq!(sink.size(), Size::new(4, 4));
            sink.set_addr_window(3, 0, 3, 1);
            sink.push_pixels(&[red, red, red]);
        }
        assert_eq!(fb.written(), 1, "Only the pixel inside the target should land");
    }

    #[test]
    fn test_exclusive_write_brackets_writes() {
        struct Counting {
            begins: u32,
            ends: u32,
        }
        impl PixelSink for Counting {
            fn size(&self) -> Size { Size::new(1, 1) }
            fn begin_write(&mut self) { self.begins += 1; }
            fn end_write(&mut self) { self.ends += 1; }
            fn set_addr_window(
                &mut self,
                _x: u16,
                _y: u16,
                _width: u16,
                _height: u16,
            ) {
            }
            fn push_pixels(
                &mut self,
                _pixels: &[u16],
            ) {
            }
        }

        let mut sink = Counting { begins: 0, ends: 0 };
        {
            let guard = ExclusiveWrite::new(&mut sink);
            assert_eq!(guard.begins, 1);
            assert_eq!(guard.ends, 0);
        }
        assert_eq!(sink.begins, 1);
        assert_eq!(sink.ends, 1);
    }
}
