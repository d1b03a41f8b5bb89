//! Variable-width LZW decompression as used by GIF image data.
//!
//! Codes are read least significant bit first. The code width starts at
//! `min_code_size + 1` bits and grows by one each time the table reaches the
//! next power of two, up to 12 bits. Once the table holds 4096 entries it
//! stops growing until the encoder sends a clear code.

use super::GifError;
use super::reader::SubBlocks;

/// Largest code width GIF allows.
const MAX_CODE_SIZE: u8 = 12;

/// Number of table entries addressable with `MAX_CODE_SIZE` bits.
const MAX_CODES: usize = 1 << MAX_CODE_SIZE;

/// Code table and bit reader state for one image.
///
/// Fixed-size tables, so a decoder can live in a `static` on targets
/// without an allocator.
pub(crate) struct LzwDecoder {
    prefix: [u16; MAX_CODES],
    suffix: [u8; MAX_CODES],
    /// Scratch for expanding one code, which comes out last byte first.
    stack: [u8; MAX_CODES],
    min_code_size: u8,
    code_size: u8,
    next_code: u16,
    bits: u32,
    bit_count: u8,
}

impl LzwDecoder {
    pub(crate) const fn new() -> Self {
        Self {
            prefix: [0; MAX_CODES],
            suffix: [0; MAX_CODES],
            stack: [0; MAX_CODES],
            min_code_size: 2,
            code_size: 3,
            next_code: 6,
            bits: 0,
            bit_count: 0,
        }
    }

    #[inline]
    const fn clear_code(&self) -> u16 { 1 << self.min_code_size }

    #[inline]
    const fn end_code(&self) -> u16 { self.clear_code() + 1 }

    fn reset_table(&mut self) {
        self.code_size = self.min_code_size + 1;
        self.next_code = self.clear_code() + 2;
    }

    /// Decompress one image, passing each palette index to `emit` in order.
    ///
    /// Stops at the end-of-information code or when the sub-blocks run out,
    /// whichever comes first.
    pub(crate) fn decode<F: FnMut(u8)>(
        &mut self,
        min_code_size: u8,
        blocks: &mut SubBlocks<'_>,
        mut emit: F,
    ) -> Result<(), GifError> {
        // Literals are palette indices, so at most 8 bits
        if !(1..=8).contains(&min_code_size) {
            return Err(GifError::InvalidCode);
        }
        self.min_code_size = min_code_size;
        self.bits = 0;
        self.bit_count = 0;
        self.reset_table();

        let clear = self.clear_code();
        let end = self.end_code();
        let mut previous: Option<u16> = None;

        while let Some(code) = self.read_code(blocks)? {
            if code == clear {
                self.reset_table();
                previous = None;
                continue;
            }
            if code == end {
                break;
            }

            let Some(prev) = previous else {
                // First code after a clear is always a literal
                if code >= clear {
                    return Err(GifError::InvalidCode);
                }
                emit(code as u8);
                previous = Some(code);
                continue;
            };

            let first = if code < self.next_code {
                self.expand(code, &mut emit)
            } else if code == self.next_code {
                // The code being defined right now: previous string plus its own first byte
                let first = self.expand(prev, &mut emit);
                emit(first);
                first
            } else {
                return Err(GifError::InvalidCode);
            };

            self.add_entry(prev, first);
            previous = Some(code);
        }

        Ok(())
    }

    /// Emit the string for `code` and return its first byte.
    fn expand<F: FnMut(u8)>(
        &mut self,
        code: u16,
        emit: &mut F,
    ) -> u8 {
        let first_entry = self.clear_code() + 2;
        let mut depth = 0;
        let mut code = code;
        while code >= first_entry {
            self.stack[depth] = self.suffix[code as usize];
            depth += 1;
            code = self.prefix[code as usize];
        }
        let first = code as u8;

        emit(first);
        for &byte in self.stack[..depth].iter().rev() {
            emit(byte);
        }
        first
    }

    fn add_entry(
        &mut self,
        prefix: u16,
        suffix: u8,
    ) {
        if usize::from(self.next_code) >= MAX_CODES {
            return;
        }
        self.prefix[self.next_code as usize] = prefix;
        self.suffix[self.next_code as usize] = suffix;
        self.next_code += 1;
        if self.next_code == 1 << self.code_size && self.code_size < MAX_CODE_SIZE {
            self.code_size += 1;
        }
    }

    fn read_code(
        &mut self,
        blocks: &mut SubBlocks<'_>,
    ) -> Result<Option<u16>, GifError> {
        while self.bit_count < self.code_size {
            let Some(byte) = blocks.next_byte()? else {
                return Ok(None);
            };
            self.bits |= u32::from(byte) << self.bit_count;
            self.bit_count += 8;
        }

        let code = (self.bits & ((1 << self.code_size) - 1)) as u16;
        self.bits >>= self.code_size;
        self.bit_count -= self.code_size;
        Ok(Some(code))
    }
}
