//! Streaming GIF player that delivers frames one scanline at a time.
//!
//! [`GifPlayer`] walks an in-memory GIF87a/GIF89a stream frame by frame.
//! Each frame is LZW-decoded straight into a single line buffer and every
//! completed row is handed to a callback as a [`Scanline`], together with
//! the frame's palette, offsets, disposal method and transparency. Nothing
//! larger than one line is ever held, so a full-screen animation plays
//! without a framebuffer.
//!
//! ```ignore
//! let mut gif = GifPlayer::open(OUT_GIF, PixelOrder::BigEndian)?;
//! while let Some(frame) = gif.play_frame(|line| blitter.draw(&mut panel, line))? {
//!     Timer::after_millis(frame.delay_ms.into()).await;
//! }
//! ```

mod lzw;
mod reader;

#[cfg(test)]
pub(crate) mod encoder;

use core::fmt;

use lzw::LzwDecoder;
use reader::{ByteReader, SubBlocks};

use crate::blit::{Disposal, Scanline};
use crate::config::{MAX_LINE_WIDTH, MIN_FRAME_DELAY_MS};
use crate::palette::Palette;
use crate::sink::PixelOrder;

// =============================================================================
// Errors
// =============================================================================

/// Reasons a GIF stream can't be played.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GifError {
    /// The stream does not start with `GIF87a` or `GIF89a`.
    InvalidSignature,
    /// The stream ends in the middle of a block.
    Truncated,
    /// Corrupt LZW data or an unusable minimum code size.
    InvalidCode,
    /// A frame has neither a local nor a global color table.
    MissingPalette,
    /// A frame is wider than the line buffer.
    FrameTooWide(u16),
    /// A byte that starts no known block.
    UnexpectedBlock(u8),
}

impl fmt::Display for GifError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::InvalidSignature => f.write_str("not a GIF file"),
            Self::Truncated => f.write_str("GIF data ends unexpectedly"),
            Self::InvalidCode => f.write_str("corrupt LZW image data"),
            Self::MissingPalette => f.write_str("frame has no color table"),
            Self::FrameTooWide(width) => write!(f, "frame width {width} exceeds {MAX_LINE_WIDTH}"),
            Self::UnexpectedBlock(byte) => write!(f, "unexpected block 0x{byte:02X}"),
        }
    }
}

// =============================================================================
// Stream Layout
// =============================================================================

const SIGNATURE: &[u8] = b"GIF";
const VERSIONS: [&[u8]; 2] = [b"87a", b"89a"];

const EXTENSION_INTRODUCER: u8 = 0x21;
const IMAGE_SEPARATOR: u8 = 0x2C;
const TRAILER: u8 = 0x3B;
const GRAPHIC_CONTROL_LABEL: u8 = 0xF9;

/// Color table present (logical screen and image descriptors).
const COLOR_TABLE_FLAG: u8 = 0x80;
/// Rows stored in four-pass order (image descriptor).
const INTERLACE_FLAG: u8 = 0x40;

/// `(first row, row step)` of each interlace pass.
const INTERLACE_PASSES: [(u32, u32); 4] = [(0, 8), (4, 8), (2, 4), (1, 2)];

/// Byte length of the color table described by the low 3 bits of `packed`.
const fn color_table_len(packed: u8) -> usize { 3 << ((packed & 0x07) + 1) }

// =============================================================================
// Frames
// =============================================================================

/// Geometry and timing of a frame that was just played.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameInfo {
    /// How long the frame stays up before the next one, in milliseconds.
    pub delay_ms: u32,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

/// Graphic control extension state, applying to the next image only.
#[derive(Clone, Copy, Default)]
struct GraphicControl {
    disposal: Disposal,
    transparent: Option<u8>,
    delay_cs: u16,
}

impl GraphicControl {
    fn parse(reader: &mut ByteReader<'_>) -> Result<Self, GifError> {
        let len = reader.u8()? as usize;
        let block = reader.bytes(len)?;
        reader.skip_sub_blocks()?;

        // Shorter blocks carry nothing usable
        let &[packed, delay_lo, delay_hi, transparent_index, ..] = block else {
            return Ok(Self::default());
        };
        Ok(Self {
            disposal: Disposal::from_code((packed >> 2) & 0x07),
            transparent: (packed & 0x01 != 0).then_some(transparent_index),
            delay_cs: u16::from_le_bytes([delay_lo, delay_hi]),
        })
    }

    const fn delay_ms(&self) -> u32 {
        match self.delay_cs {
            0 => MIN_FRAME_DELAY_MS,
            cs => cs as u32 * 10,
        }
    }
}

/// Destination rows of an image in the order its data stores them.
struct RowOrder {
    height: u32,
    interlaced: bool,
    pass: usize,
    next: u32,
}

impl RowOrder {
    const fn new(
        height: u16,
        interlaced: bool,
    ) -> Self {
        Self {
            height: height as u32,
            interlaced,
            pass: 0,
            next: 0,
        }
    }
}

impl Iterator for RowOrder {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        let step = if self.interlaced {
            while self.next >= self.height {
                self.pass += 1;
                let &(start, _) = INTERLACE_PASSES.get(self.pass)?;
                self.next = start;
            }
            INTERLACE_PASSES[self.pass].1
        } else if self.next < self.height {
            1
        } else {
            return None;
        };

        let row = self.next as u16;
        self.next += step;
        Some(row)
    }
}

// =============================================================================
// Player
// =============================================================================

/// Plays an animated GIF held in memory, one frame per call.
///
/// The player owns the decoder tables and a line buffer, about 17 KiB in
/// total. Keep it in a `static` on small targets.
pub struct GifPlayer<'a> {
    data: &'a [u8],
    order: PixelOrder,
    canvas_width: u16,
    canvas_height: u16,
    background: u8,
    global_palette: Option<Palette>,
    /// Palette of the frame being decoded.
    palette: Palette,
    /// Offset of the first block after the header.
    first_block: usize,
    /// Offset of the next block to read.
    pos: usize,
    lzw: LzwDecoder,
    line: [u8; MAX_LINE_WIDTH],
}

impl<'a> GifPlayer<'a> {
    /// Parse the header of `data`.
    ///
    /// Palette entries are stored in `order`, which must match what the
    /// scanline consumer expects.
    pub fn open(
        data: &'a [u8],
        order: PixelOrder,
    ) -> Result<Self, GifError> {
        let mut reader = ByteReader::at(data, 0);
        let header = reader.bytes(6).map_err(|_| GifError::InvalidSignature)?;
        if &header[..3] != SIGNATURE || !VERSIONS.iter().any(|v| &header[3..] == *v) {
            return Err(GifError::InvalidSignature);
        }

        let canvas_width = reader.u16()?;
        let canvas_height = reader.u16()?;
        let packed = reader.u8()?;
        let background = reader.u8()?;
        let _aspect_ratio = reader.u8()?;

        let global_palette = if packed & COLOR_TABLE_FLAG != 0 {
            let table = reader.bytes(color_table_len(packed))?;
            Some(Palette::from_rgb888(table, order))
        } else {
            None
        };

        Ok(Self {
            data,
            order,
            canvas_width,
            canvas_height,
            background,
            global_palette,
            palette: Palette::new(),
            first_block: reader.pos(),
            pos: reader.pos(),
            lzw: LzwDecoder::new(),
            line: [0; MAX_LINE_WIDTH],
        })
    }

    /// Logical screen width.
    #[inline]
    pub const fn canvas_width(&self) -> u16 { self.canvas_width }

    /// Logical screen height.
    #[inline]
    pub const fn canvas_height(&self) -> u16 { self.canvas_height }

    /// Start over at the first frame.
    pub fn rewind(&mut self) { self.pos = self.first_block; }

    /// Decode the next frame, calling `on_line` once for every row.
    ///
    /// Returns the frame's geometry and delay, or `None` once the animation
    /// is over. Rows of interlaced frames arrive in pass order with
    /// [`Scanline::row`] set to their final position.
    pub fn play_frame<F>(
        &mut self,
        mut on_line: F,
    ) -> Result<Option<FrameInfo>, GifError>
    where
        F: FnMut(&mut Scanline<'_>),
    {
        let mut control = GraphicControl::default();

        loop {
            let mut reader = ByteReader::at(self.data, self.pos);
            // Streams that stop at a block boundary without a trailer are
            // treated as complete
            if reader.is_at_end() {
                return Ok(None);
            }

            match reader.u8()? {
                EXTENSION_INTRODUCER => {
                    if reader.u8()? == GRAPHIC_CONTROL_LABEL {
                        control = GraphicControl::parse(&mut reader)?;
                    } else {
                        reader.skip_sub_blocks()?;
                    }
                    self.pos = reader.pos();
                }
                IMAGE_SEPARATOR => return self.decode_image(reader, &control, &mut on_line).map(Some),
                TRAILER => return Ok(None),
                other => return Err(GifError::UnexpectedBlock(other)),
            }
        }
    }

    fn decode_image<F>(
        &mut self,
        mut reader: ByteReader<'a>,
        control: &GraphicControl,
        on_line: &mut F,
    ) -> Result<FrameInfo, GifError>
    where
        F: FnMut(&mut Scanline<'_>),
    {
        let x = reader.u16()?;
        let y = reader.u16()?;
        let width = reader.u16()?;
        let height = reader.u16()?;
        let packed = reader.u8()?;

        if usize::from(width) > MAX_LINE_WIDTH {
            return Err(GifError::FrameTooWide(width));
        }

        self.palette = if packed & COLOR_TABLE_FLAG != 0 {
            Palette::from_rgb888(reader.bytes(color_table_len(packed))?, self.order)
        } else {
            self.global_palette.clone().ok_or(GifError::MissingPalette)?
        };

        let min_code_size = reader.u8()?;
        let mut blocks = SubBlocks::at(self.data, reader.pos());

        let Self {
            lzw,
            line,
            palette,
            background,
            ..
        } = self;
        let mut rows = RowOrder::new(height, packed & INTERLACE_FLAG != 0);
        let line_width = usize::from(width);
        let mut filled = 0;

        lzw.decode(min_code_size, &mut blocks, |index| {
            // Zero-width frames and data past the last row are dropped
            if line_width == 0 || rows.height == 0 {
                return;
            }
            line[filled] = index;
            filled += 1;
            if filled < line_width {
                return;
            }
            filled = 0;
            if let Some(row) = rows.next() {
                on_line(&mut Scanline {
                    pixels: &mut line[..line_width],
                    width,
                    offset_x: x,
                    offset_y: y,
                    row,
                    palette: &*palette,
                    disposal: control.disposal,
                    transparent: control.transparent,
                    background: *background,
                });
            }
        })?;

        self.pos = blocks.finish()?;

        Ok(FrameInfo {
            delay_ms: control.delay_ms(),
            x,
            y,
            width,
            height,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::encoder::{FrameSpec, GifBuilder};
    use super::*;

    const BW: [[u8; 3]; 2] = [[0, 0, 0], [255, 255, 255]];
    const RGB: [[u8; 3]; 4] = [[0, 0, 0], [255, 0, 0], [0, 255, 0], [0, 0, 255]];

    /// Row as delivered to the callback.
    #[derive(Debug, PartialEq)]
    struct Row {
        row: u16,
        offset: (u16, u16),
        pixels: Vec<u8>,
        disposal: Disposal,
        transparent: Option<u8>,
        background: u8,
        first_color: u16,
    }

    fn play(gif: &mut GifPlayer<'_>) -> Result<Option<(FrameInfo, Vec<Row>)>, GifError> {
        let mut rows = Vec::new();
        let info = gif.play_frame(|line| {
            rows.push(Row {
                row: line.row,
                offset: (line.offset_x, line.offset_y),
                pixels: line.pixels[..line.width as usize].to_vec(),
                disposal: line.disposal,
                transparent: line.transparent,
                background: line.background,
                first_color: line.palette[line.pixels[0]],
            });
        })?;
        Ok(info.map(|info| (info, rows)))
    }

    fn rows_of(
        pixels: &[u8],
        width: usize,
    ) -> Vec<Vec<u8>> {
        pixels.chunks(width).map(<[u8]>::to_vec).collect()
    }

    // -------------------------------------------------------------------------
    // Header
    // -------------------------------------------------------------------------

    #[test]
    fn test_open_reads_canvas_size() {
        let data = GifBuilder::new(320, 240, Some(&BW), 0).finish();
        let gif = GifPlayer::open(&data, PixelOrder::LittleEndian).unwrap();
        assert_eq!(gif.canvas_width(), 320);
        assert_eq!(gif.canvas_height(), 240);
    }

    #[test]
    fn test_open_rejects_bad_signature() {
        assert_eq!(GifPlayer::open(b"PNG89a\0\0\0\0\0\0\0", PixelOrder::LittleEndian).err(), Some(GifError::InvalidSignature));
        assert_eq!(GifPlayer::open(b"GIF90a\0\0\0\0\0\0\0", PixelOrder::LittleEndian).err(), Some(GifError::InvalidSignature));
        assert_eq!(GifPlayer::open(b"GIF", PixelOrder::LittleEndian).err(), Some(GifError::InvalidSignature));
    }

    #[test]
    fn test_open_rejects_truncated_header() {
        assert_eq!(GifPlayer::open(b"GIF87a\x10\x00", PixelOrder::LittleEndian).err(), Some(GifError::Truncated));
    }

    // -------------------------------------------------------------------------
    // Frames
    // -------------------------------------------------------------------------

    #[test]
    fn test_single_frame_rows_in_order() {
        let pixels: Vec<u8> = (0..24).map(|i| (i % 4) as u8).collect();
        let data = GifBuilder::new(20, 20, Some(&RGB), 2)
            .frame(&FrameSpec {
                left: 3,
                top: 5,
                width: 6,
                height: 4,
                pixels: &pixels,
                delay_cs: 7,
                ..Default::default()
            })
            .finish();
        let mut gif = GifPlayer::open(&data, PixelOrder::LittleEndian).unwrap();

        let (info, rows) = play(&mut gif).unwrap().unwrap();

        assert_eq!(
            info,
            FrameInfo {
                delay_ms: 70,
                x: 3,
                y: 5,
                width: 6,
                height: 4,
            }
        );
        assert_eq!(rows.iter().map(|r| r.row).collect::<Vec<_>>(), [0, 1, 2, 3]);
        assert_eq!(rows.iter().map(|r| r.pixels.clone()).collect::<Vec<_>>(), rows_of(&pixels, 6));
        assert!(rows.iter().all(|r| r.offset == (3, 5) && r.background == 2));
        assert_eq!(rows[0].first_color, 0x0000, "Row 0 starts with index 0 (black)");
        assert_eq!(rows[1].first_color, 0x07E0, "Row 1 starts with index 2 (green)");
    }

    #[test]
    fn test_end_of_animation() {
        let data = GifBuilder::new(4, 4, Some(&BW), 0)
            .frame(&FrameSpec {
                width: 4,
                height: 1,
                pixels: &[1, 0, 1, 0],
                ..Default::default()
            })
            .finish();
        let mut gif = GifPlayer::open(&data, PixelOrder::LittleEndian).unwrap();

        assert!(play(&mut gif).unwrap().is_some());
        assert!(play(&mut gif).unwrap().is_none());
        assert!(play(&mut gif).unwrap().is_none(), "Trailer keeps reporting the end");
    }

    #[test]
    fn test_missing_trailer_ends_animation() {
        let data = GifBuilder::new(4, 4, Some(&BW), 0)
            .frame(&FrameSpec {
                width: 2,
                height: 1,
                pixels: &[1, 1],
                ..Default::default()
            })
            .unterminated();
        let mut gif = GifPlayer::open(&data, PixelOrder::LittleEndian).unwrap();

        assert!(play(&mut gif).unwrap().is_some());
        assert!(play(&mut gif).unwrap().is_none());
    }

    #[test]
    fn test_multiple_frames_and_rewind() {
        let data = GifBuilder::new(8, 8, Some(&RGB), 0)
            .extensions()
            .frame(&FrameSpec {
                width: 2,
                height: 2,
                pixels: &[1, 1, 1, 1],
                ..Default::default()
            })
            .frame(&FrameSpec {
                left: 4,
                top: 4,
                width: 2,
                height: 1,
                pixels: &[2, 3],
                ..Default::default()
            })
            .finish();
        let mut gif = GifPlayer::open(&data, PixelOrder::LittleEndian).unwrap();

        let (first, _) = play(&mut gif).unwrap().unwrap();
        let (second, rows) = play(&mut gif).unwrap().unwrap();
        assert_eq!((first.x, first.height), (0, 2));
        assert_eq!((second.x, second.y), (4, 4));
        assert_eq!(rows[0].pixels, [2, 3]);
        assert!(play(&mut gif).unwrap().is_none());

        gif.rewind();
        let (again, _) = play(&mut gif).unwrap().unwrap();
        assert_eq!(again, first);
    }

    #[test]
    fn test_zero_delay_uses_minimum() {
        let data = GifBuilder::new(2, 1, Some(&BW), 0)
            .frame(&FrameSpec {
                width: 2,
                height: 1,
                pixels: &[0, 1],
                delay_cs: 0,
                ..Default::default()
            })
            .finish();
        let mut gif = GifPlayer::open(&data, PixelOrder::LittleEndian).unwrap();

        let (info, _) = play(&mut gif).unwrap().unwrap();
        assert_eq!(info.delay_ms, MIN_FRAME_DELAY_MS);
    }

    #[test]
    fn test_transparency_and_disposal_reach_scanline() {
        let data = GifBuilder::new(4, 4, Some(&RGB), 3)
            .frame(&FrameSpec {
                width: 4,
                height: 2,
                pixels: &[0, 1, 1, 0, 2, 2, 0, 0],
                disposal: 2,
                transparent: Some(0),
                ..Default::default()
            })
            .frame(&FrameSpec {
                width: 1,
                height: 1,
                pixels: &[1],
                ..Default::default()
            })
            .finish();
        let mut gif = GifPlayer::open(&data, PixelOrder::LittleEndian).unwrap();

        let (_, rows) = play(&mut gif).unwrap().unwrap();
        assert!(rows.iter().all(|r| r.disposal == Disposal::RestoreBackground));
        assert!(rows.iter().all(|r| r.transparent == Some(0) && r.background == 3));

        let (_, rows) = play(&mut gif).unwrap().unwrap();
        assert_eq!(rows[0].transparent, None, "Control block applies to one image only");
        assert_eq!(rows[0].disposal, Disposal::Unspecified);
    }

    #[test]
    fn test_interlaced_rows_arrive_in_pass_order() {
        // Every pixel of row r holds r, so the delivered data identifies the row
        let height = 10;
        let pixels: Vec<u8> = (0..height).flat_map(|r| [r as u8; 3]).collect();
        let palette: Vec<[u8; 3]> = (0..16).map(|i| [i * 16, 0, 0]).collect();
        let data = GifBuilder::new(3, height, None, 0)
            .frame(&FrameSpec {
                width: 3,
                height,
                pixels: &pixels,
                local_palette: Some(&palette),
                interlaced: true,
                ..Default::default()
            })
            .finish();
        let mut gif = GifPlayer::open(&data, PixelOrder::LittleEndian).unwrap();

        let (_, rows) = play(&mut gif).unwrap().unwrap();

        let order: Vec<u16> = rows.iter().map(|r| r.row).collect();
        assert_eq!(order, [0, 8, 4, 2, 6, 1, 3, 5, 7, 9]);
        for row in &rows {
            assert_eq!(row.pixels, [row.row as u8; 3], "Row {} holds its own data", row.row);
        }
    }

    #[test]
    fn test_row_order_small_interlaced_image() {
        let rows: Vec<u16> = RowOrder::new(3, true).collect();
        assert_eq!(rows, [0, 2, 1]);
        assert_eq!(RowOrder::new(0, true).count(), 0);
        assert_eq!(RowOrder::new(4, false).collect::<Vec<_>>(), [0, 1, 2, 3]);
    }

    #[test]
    fn test_local_palette_overrides_global() {
        let local = [[0, 0, 0], [0, 0, 255]];
        let data = GifBuilder::new(2, 1, Some(&RGB), 0)
            .frame(&FrameSpec {
                width: 2,
                height: 1,
                pixels: &[1, 1],
                local_palette: Some(&local),
                ..Default::default()
            })
            .frame(&FrameSpec {
                width: 2,
                height: 1,
                pixels: &[1, 1],
                ..Default::default()
            })
            .finish();
        let mut gif = GifPlayer::open(&data, PixelOrder::BigEndian).unwrap();

        let (_, rows) = play(&mut gif).unwrap().unwrap();
        assert_eq!(rows[0].first_color, 0x001Fu16.swap_bytes(), "Local index 1 is blue");
        let (_, rows) = play(&mut gif).unwrap().unwrap();
        assert_eq!(rows[0].first_color, 0xF800u16.swap_bytes(), "Global index 1 is red");
    }

    #[test]
    fn test_large_noisy_frame() {
        // 256 colors of noise: the code table fills up and resets mid-frame
        let (width, height) = (320u16, 40u16);
        let mut state = 0x1234_5678u32;
        let pixels: Vec<u8> = (0..usize::from(width) * usize::from(height))
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (state >> 24) as u8
            })
            .collect();
        let palette: Vec<[u8; 3]> = (0..=255).map(|i| [i, 255 - i, i / 2]).collect();
        let data = GifBuilder::new(width, height, Some(&palette), 0)
            .frame(&FrameSpec {
                width,
                height,
                pixels: &pixels,
                ..Default::default()
            })
            .finish();
        let mut gif = GifPlayer::open(&data, PixelOrder::LittleEndian).unwrap();

        let (_, rows) = play(&mut gif).unwrap().unwrap();

        assert_eq!(rows.len(), usize::from(height));
        let decoded: Vec<u8> = rows.into_iter().flat_map(|r| r.pixels).collect();
        assert_eq!(decoded, pixels);
    }

    // -------------------------------------------------------------------------
    // Errors
    // -------------------------------------------------------------------------

    #[test]
    fn test_frame_too_wide() {
        let pixels = vec![0u8; MAX_LINE_WIDTH + 1];
        let data = GifBuilder::new(500, 1, Some(&BW), 0)
            .frame(&FrameSpec {
                width: (MAX_LINE_WIDTH + 1) as u16,
                height: 1,
                pixels: &pixels,
                ..Default::default()
            })
            .finish();
        let mut gif = GifPlayer::open(&data, PixelOrder::LittleEndian).unwrap();

        assert_eq!(play(&mut gif).err(), Some(GifError::FrameTooWide(481)));
    }

    #[test]
    fn test_missing_palette() {
        let data = GifBuilder::new(2, 1, None, 0)
            .frame(&FrameSpec {
                width: 2,
                height: 1,
                pixels: &[0, 0],
                ..Default::default()
            })
            .finish();
        let mut gif = GifPlayer::open(&data, PixelOrder::LittleEndian).unwrap();

        assert_eq!(play(&mut gif).err(), Some(GifError::MissingPalette));
    }

    #[test]
    fn test_truncated_image_data() {
        let pixels: Vec<u8> = (0..400).map(|i| (i % 2) as u8).collect();
        let mut data = GifBuilder::new(20, 20, Some(&BW), 0)
            .frame(&FrameSpec {
                width: 20,
                height: 20,
                pixels: &pixels,
                ..Default::default()
            })
            .finish();
        data.truncate(data.len() - 20);
        let mut gif = GifPlayer::open(&data, PixelOrder::LittleEndian).unwrap();

        assert_eq!(play(&mut gif).err(), Some(GifError::Truncated));
    }

    #[test]
    fn test_unexpected_block() {
        let mut data = GifBuilder::new(2, 1, Some(&BW), 0).unterminated();
        data.push(0x42);
        let mut gif = GifPlayer::open(&data, PixelOrder::LittleEndian).unwrap();

        assert_eq!(play(&mut gif).err(), Some(GifError::UnexpectedBlock(0x42)));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(GifError::FrameTooWide(640).to_string(), "frame width 640 exceeds 480");
        assert_eq!(GifError::UnexpectedBlock(0x42).to_string(), "unexpected block 0x42");
    }
}
