//! Bounds-checked cursors over the GIF byte stream.

use super::GifError;

/// Little-endian cursor over fixed-layout header fields.
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) const fn at(
        data: &'a [u8],
        pos: usize,
    ) -> Self {
        Self { data, pos }
    }

    #[inline]
    pub(crate) const fn pos(&self) -> usize { self.pos }

    #[inline]
    pub(crate) const fn is_at_end(&self) -> bool { self.pos >= self.data.len() }

    pub(crate) fn u8(&mut self) -> Result<u8, GifError> {
        let byte = *self.data.get(self.pos).ok_or(GifError::Truncated)?;
        self.pos += 1;
        Ok(byte)
    }

    pub(crate) fn u16(&mut self) -> Result<u16, GifError> {
        let bytes = self.bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub(crate) fn bytes(
        &mut self,
        len: usize,
    ) -> Result<&'a [u8], GifError> {
        let bytes = self.data.get(self.pos..self.pos + len).ok_or(GifError::Truncated)?;
        self.pos += len;
        Ok(bytes)
    }

    /// Skip a chain of length-prefixed sub-blocks up to and including the
    /// zero-length terminator.
    pub(crate) fn skip_sub_blocks(&mut self) -> Result<(), GifError> {
        loop {
            let len = self.u8()? as usize;
            if len == 0 {
                return Ok(());
            }
            self.bytes(len)?;
        }
    }
}

/// Byte stream spanning the sub-blocks of one image's compressed data.
pub(crate) struct SubBlocks<'a> {
    data: &'a [u8],
    pos: usize,
    /// Bytes left in the current sub-block.
    left: usize,
    /// Terminator seen.
    ended: bool,
}

impl<'a> SubBlocks<'a> {
    pub(crate) const fn at(
        data: &'a [u8],
        pos: usize,
    ) -> Self {
        Self {
            data,
            pos,
            left: 0,
            ended: false,
        }
    }

    /// Next data byte, or `None` once the terminator is reached.
    pub(crate) fn next_byte(&mut self) -> Result<Option<u8>, GifError> {
        while self.left == 0 {
            if self.ended {
                return Ok(None);
            }
            let len = *self.data.get(self.pos).ok_or(GifError::Truncated)?;
            self.pos += 1;
            if len == 0 {
                self.ended = true;
                return Ok(None);
            }
            self.left = len as usize;
        }

        let byte = *self.data.get(self.pos).ok_or(GifError::Truncated)?;
        self.pos += 1;
        self.left -= 1;
        Ok(Some(byte))
    }

    /// Skip whatever the decoder left unread and return the position just
    /// past the terminator.
    pub(crate) fn finish(mut self) -> Result<usize, GifError> {
        if !self.ended {
            self.pos += self.left;
            let mut reader = ByteReader::at(self.data, self.pos);
            reader.skip_sub_blocks()?;
            self.pos = reader.pos();
        }
        Ok(self.pos)
    }
}
