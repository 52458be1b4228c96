//! Bounds-checked cursor over encoded bytes.

use crate::error::{DecodeError, DecodeResult};

/// Reads big-endian fields from a byte slice.
///
/// `base` is the absolute offset of `data[0]` within the whole input so that
/// errors raised by nested readers point at the right place.
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            base: 0,
        }
    }

    /// Absolute offset of the next unread byte.
    pub(crate) fn offset(&self) -> usize {
        self.base + self.pos
    }

    /// Absolute offset of `data[0]`.
    pub(crate) fn start(&self) -> usize {
        self.base
    }

    pub(crate) fn consumed(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn take(&mut self, len: usize, context: &'static str) -> DecodeResult<&'a [u8]> {
        let available = self.remaining();
        if len > available {
            return Err(DecodeError::Truncated {
                context,
                offset: self.offset(),
                needed: len,
                available,
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Splits off the next `len` bytes as a reader of their own.
    pub(crate) fn sub_reader(&mut self, len: usize, context: &'static str) -> DecodeResult<Reader<'a>> {
        let base = self.offset();
        let data = self.take(len, context)?;
        Ok(Reader { data, pos: 0, base })
    }

    pub(crate) fn array<const N: usize>(&mut self, context: &'static str) -> DecodeResult<[u8; N]> {
        let bytes = self.take(N, context)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub(crate) fn u8(&mut self, context: &'static str) -> DecodeResult<u8> {
        Ok(self.array::<1>(context)?[0])
    }

    pub(crate) fn u16(&mut self, context: &'static str) -> DecodeResult<u16> {
        Ok(u16::from_be_bytes(self.array(context)?))
    }

    pub(crate) fn u32(&mut self, context: &'static str) -> DecodeResult<u32> {
        Ok(u32::from_be_bytes(self.array(context)?))
    }
}
