//! Minimal GIF89a writer used to build decoder inputs in tests.

use std::collections::HashMap;

/// One image to append to a [`GifBuilder`].
#[derive(Default)]
pub(crate) struct FrameSpec<'a> {
    pub left: u16,
    pub top: u16,
    pub width: u16,
    pub height: u16,
    /// Palette indices, row by row in display order.
    pub pixels: &'a [u8],
    pub delay_cs: u16,
    pub disposal: u8,
    pub transparent: Option<u8>,
    pub local_palette: Option<&'a [[u8; 3]]>,
    pub interlaced: bool,
}

pub(crate) struct GifBuilder {
    data: Vec<u8>,
}

impl GifBuilder {
    pub(crate) fn new(
        width: u16,
        height: u16,
        global_palette: Option<&[[u8; 3]]>,
        background: u8,
    ) -> Self {
        let mut data = Vec::new();
        data.extend_from_slice(b"GIF89a");
        data.extend_from_slice(&width.to_le_bytes());
        data.extend_from_slice(&height.to_le_bytes());
        match global_palette {
            Some(colors) => {
                let size = table_size_field(colors.len());
                data.push(0x80 | size);
                data.push(background);
                data.push(0);
                write_color_table(&mut data, colors, size);
            }
            None => {
                data.push(0);
                data.push(background);
                data.push(0);
            }
        }
        Self { data }
    }

    /// Append a NETSCAPE2.0 looping extension and a comment, which the
    /// decoder must skip.
    pub(crate) fn extensions(mut self) -> Self {
        self.data.extend_from_slice(&[0x21, 0xFF, 0x0B]);
        self.data.extend_from_slice(b"NETSCAPE2.0");
        self.data.extend_from_slice(&[0x03, 0x01, 0x00, 0x00, 0x00]);
        self.data.extend_from_slice(&[0x21, 0xFE, 0x05]);
        self.data.extend_from_slice(b"hello");
        self.data.push(0x00);
        self
    }

    pub(crate) fn frame(
        mut self,
        frame: &FrameSpec<'_>,
    ) -> Self {
        let packed = ((frame.disposal & 0x07) << 2) | u8::from(frame.transparent.is_some());
        self.data.extend_from_slice(&[0x21, 0xF9, 0x04, packed]);
        self.data.extend_from_slice(&frame.delay_cs.to_le_bytes());
        self.data.push(frame.transparent.unwrap_or(0));
        self.data.push(0x00);

        self.data.push(0x2C);
        for value in [frame.left, frame.top, frame.width, frame.height] {
            self.data.extend_from_slice(&value.to_le_bytes());
        }
        let mut packed = if frame.interlaced { 0x40 } else { 0 };
        let mut min_code_size = 8;
        if let Some(colors) = frame.local_palette {
            let size = table_size_field(colors.len());
            packed |= 0x80 | size;
            self.data.push(packed);
            write_color_table(&mut self.data, colors, size);
            min_code_size = (size + 1).max(2);
        } else {
            self.data.push(packed);
        }

        let pixels = if frame.interlaced {
            interlace(frame.pixels, frame.width as usize, frame.height as usize)
        } else {
            frame.pixels.to_vec()
        };
        self.data.push(min_code_size);
        self.data.extend_from_slice(&sub_blocks(&lzw_compress(&pixels, min_code_size)));
        self
    }

    pub(crate) fn finish(mut self) -> Vec<u8> {
        self.data.push(0x3B);
        self.data
    }

    /// The stream so far, without a trailer.
    pub(crate) fn unterminated(self) -> Vec<u8> { self.data }
}

/// Smallest `n` with `2^(n + 1) >= len`.
fn table_size_field(len: usize) -> u8 {
    let mut size = 0;
    while (2usize << size) < len {
        size += 1;
    }
    size
}

fn write_color_table(
    data: &mut Vec<u8>,
    colors: &[[u8; 3]],
    size: u8,
) {
    for i in 0..(2usize << size) {
        data.extend_from_slice(&colors.get(i).copied().unwrap_or([0; 3]));
    }
}

/// Reorder rows into the four-pass transmission order.
fn interlace(
    pixels: &[u8],
    width: usize,
    height: usize,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixels.len());
    for (start, step) in [(0, 8), (4, 8), (2, 4), (1, 2)] {
        for row in (start..height).step_by(step) {
            out.extend_from_slice(&pixels[row * width..(row + 1) * width]);
        }
    }
    out
}

/// Split data into length-prefixed sub-blocks plus the terminator.
pub(crate) fn sub_blocks(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / 255 + 2);
    for chunk in data.chunks(255) {
        out.push(chunk.len() as u8);
        out.extend_from_slice(chunk);
    }
    out.push(0);
    out
}

pub(crate) fn lzw_compress(
    data: &[u8],
    min_code_size: u8,
) -> Vec<u8> {
    let clear_code = 1u32 << min_code_size;
    let end_code = clear_code + 1;

    let mut output = BitWriter::default();
    let mut code_size = u32::from(min_code_size) + 1;
    let mut next_code = end_code + 1;
    let mut table: HashMap<(u32, u8), u32> = HashMap::new();

    output.write_bits(clear_code, code_size);

    let Some((&first, rest)) = data.split_first() else {
        output.write_bits(end_code, code_size);
        return output.finish();
    };

    let mut prefix = u32::from(first);
    for &byte in rest {
        if let Some(&code) = table.get(&(prefix, byte)) {
            prefix = code;
            continue;
        }

        output.write_bits(prefix, code_size);
        if next_code < 4096 {
            table.insert((prefix, byte), next_code);
            next_code += 1;
            if next_code > (1 << code_size) && code_size < 12 {
                code_size += 1;
            }
        } else {
            output.write_bits(clear_code, code_size);
            table.clear();
            code_size = u32::from(min_code_size) + 1;
            next_code = end_code + 1;
        }
        prefix = u32::from(byte);
    }

    output.write_bits(prefix, code_size);
    output.write_bits(end_code, code_size);
    output.finish()
}

#[derive(Default)]
struct BitWriter {
    data: Vec<u8>,
    current: u32,
    bits: u32,
}

impl BitWriter {
    fn write_bits(
        &mut self,
        value: u32,
        num_bits: u32,
    ) {
        self.current |= value << self.bits;
        self.bits += num_bits;
        while self.bits >= 8 {
            self.data.push(self.current as u8);
            self.current >>= 8;
            self.bits -= 8;
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.bits > 0 {
            self.data.push(self.current as u8);
        }
        self.data
    }
}
