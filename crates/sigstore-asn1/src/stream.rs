//! Bounds-checked read cursor over a byte slice

use crate::error::{Error, Result};

/// A read cursor over an immutable buffer
///
/// Every read is bounds checked; reading past the end is a parse error and
/// leaves the position unchanged.
#[derive(Debug, Clone)]
pub struct ByteStream<'a> {
    buf: &'a [u8],
    position: usize,
}

impl<'a> ByteStream<'a> {
    /// Create a cursor positioned at the start of `buf`
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, position: 0 }
    }

    /// Current read position
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total length of the underlying buffer
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the underlying buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Number of bytes left to read
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.position
    }

    /// Move the cursor to an absolute position
    pub fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.buf.len() {
            return Err(Error::Parse(format!(
                "seek to {} beyond end of buffer ({} bytes)",
                position,
                self.buf.len()
            )));
        }
        self.position = position;
        Ok(())
    }

    /// Read one byte
    pub fn get_u8(&mut self) -> Result<u8> {
        let byte = *self
            .buf
            .get(self.position)
            .ok_or_else(|| Error::Parse("unexpected end of buffer".to_string()))?;
        self.position += 1;
        Ok(byte)
    }

    /// Read a big-endian u16
    pub fn get_u16(&mut self) -> Result<u16> {
        let bytes = self.get(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Read a big-endian u64
    pub fn get_u64(&mut self) -> Result<u64> {
        let bytes = self.get(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(bytes);
        Ok(u64::from_be_bytes(arr))
    }

    /// Read `n` bytes and advance past them
    pub fn get(&mut self, n: usize) -> Result<&'a [u8]> {
        let bytes = self.slice(self.position, n)?;
        self.position += n;
        Ok(bytes)
    }

    /// Borrow `len` bytes starting at `start` without moving the cursor
    pub fn slice(&self, start: usize, len: usize) -> Result<&'a [u8]> {
        let end = start
            .checked_add(len)
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| {
                Error::Parse(format!(
                    "request for {} bytes at offset {} exceeds buffer ({} bytes)",
                    len,
                    start,
                    self.buf.len()
                ))
            })?;
        Ok(&self.buf[start..end])
    }
}
