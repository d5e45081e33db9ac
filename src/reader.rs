//! Bounds-checked reader for fixed-layout container headers

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::Cursor;

use crate::error::{Result, TextureError};

/// Cursor over a header region with explicit per-read endianness.
///
/// The container headers handled by this crate mix byte orders (PVR v3
/// stores its version magic big-endian next to little-endian fields, PKM
/// is big-endian throughout), so each read names its endianness instead
/// of fixing one at construction.
pub struct HeaderReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> HeaderReader<'a> {
    /// Create a new reader over a byte slice
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    /// Current offset from the start of the slice
    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    /// Bytes left between the current offset and the end of the slice
    pub fn remaining(&self) -> usize {
        self.cursor.get_ref().len().saturating_sub(self.position())
    }

    fn require(&self, count: usize) -> Result<()> {
        if self.remaining() < count {
            return Err(TextureError::not_enough_data(count, self.remaining()));
        }
        Ok(())
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8> {
        self.require(1)?;
        Ok(self.cursor.read_u8()?)
    }

    /// Read a little-endian u16
    pub fn read_u16_le(&mut self) -> Result<u16> {
        self.require(2)?;
        Ok(self.cursor.read_u16::<LittleEndian>()?)
    }

    /// Read a big-endian u16
    pub fn read_u16_be(&mut self) -> Result<u16> {
        self.require(2)?;
        Ok(self.cursor.read_u16::<BigEndian>()?)
    }

    /// Read a little-endian u32
    pub fn read_u32_le(&mut self) -> Result<u32> {
        self.require(4)?;
        Ok(self.cursor.read_u32::<LittleEndian>()?)
    }

    /// Read a big-endian u32
    pub fn read_u32_be(&mut self) -> Result<u32> {
        self.require(4)?;
        Ok(self.cursor.read_u32::<BigEndian>()?)
    }

    /// Read a little-endian u64
    pub fn read_u64_le(&mut self) -> Result<u64> {
        self.require(8)?;
        Ok(self.cursor.read_u64::<LittleEndian>()?)
    }

    /// Read exactly `count` raw bytes
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        self.require(count)?;
        let start = self.position();
        let bytes = &self.cursor.get_ref()[start..start + count];
        self.cursor.set_position((start + count) as u64);
        Ok(bytes)
    }

    /// Advance past `count` bytes without reading them
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.require(count)?;
        let pos = self.cursor.position();
        self.cursor.set_position(pos + count as u64);
        Ok(())
    }
}

impl From<std::io::Error> for TextureError {
    fn from(err: std::io::Error) -> Self {
        // The cursor is length-checked before every read, so this only
        // fires if a check was missed.
        TextureError::malformed("header", err.to_string())
    }
}
