//! Endian-aware binary reader over byte slices.
//!
//! GeoFiles are written in the byte order of the target console, so every
//! multi-byte read goes through [`EndianReader`], which carries the file's
//! [`Endian`] alongside its cursor.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use zerocopy::FromBytes;

use crate::{Error, Result};

/// Byte order of a GeoFile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Endian {
    /// Most significant byte first (GameCube).
    Big,
    /// Least significant byte first (PlayStation 2, Xbox).
    Little,
}

impl Endian {
    /// Check if this is big endian.
    #[inline]
    pub const fn is_big(self) -> bool {
        matches!(self, Endian::Big)
    }
}

impl std::fmt::Display for Endian {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endian::Big => f.write_str("big-endian"),
            Endian::Little => f.write_str("little-endian"),
        }
    }
}

/// A binary reader over a byte slice with a runtime byte-order switch.
///
/// Positions are absolute offsets into the slice. Seeking never fails;
/// reading past the end does.
///
/// # Example
///
/// ```
/// use geom_common::{Endian, EndianReader};
///
/// let data = [0x00, 0x00, 0x00, 0xF0, 0xF0, 0x00, 0x00, 0x00];
///
/// let mut reader = EndianReader::new(&data, Endian::Big);
/// assert_eq!(reader.read_u32().unwrap(), 240);
///
/// let mut reader = EndianReader::new_at(&data, 4, Endian::Little);
/// assert_eq!(reader.read_u32().unwrap(), 240);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct EndianReader<'a> {
    data: &'a [u8],
    position: usize,
    endian: Endian,
}

impl<'a> EndianReader<'a> {
    /// Create a new reader at the start of a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8], endian: Endian) -> Self {
        Self {
            data,
            position: 0,
            endian,
        }
    }

    /// Create a new reader starting at a specific position.
    #[inline]
    pub const fn new_at(data: &'a [u8], position: usize, endian: Endian) -> Self {
        Self {
            data,
            position,
            endian,
        }
    }

    /// Get the byte order used for multi-byte reads.
    #[inline]
    pub const fn endian(&self) -> Endian {
        self.endian
    }

    /// Get the underlying buffer.
    #[inline]
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Seek to an absolute position.
    #[inline]
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    /// Advance the position by a number of bytes.
    #[inline]
    pub fn advance(&mut self, count: usize) {
        self.position = self.position.saturating_add(count);
    }

    /// Move forward to the next multiple of `alignment`.
    ///
    /// Alignment is relative to the start of the buffer, and the cursor
    /// never moves backwards.
    #[inline]
    pub fn align(&mut self, alignment: usize) {
        if alignment > 1 {
            let rem = self.position % alignment;
            if rem != 0 {
                self.advance(alignment - rem);
            }
        }
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEof {
                offset: self.position,
                needed: count,
                available: self.remaining(),
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a fixed-size byte array.
    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    /// Read a signed byte.
    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        self.read_u8().map(|b| b as i8)
    }

    /// Read a u16 in the reader's byte order.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(match self.endian {
            Endian::Big => BigEndian::read_u16(bytes),
            Endian::Little => LittleEndian::read_u16(bytes),
        })
    }

    /// Read an i16 in the reader's byte order.
    #[inline]
    pub fn read_i16(&mut self) -> Result<i16> {
        let bytes = self.read_bytes(2)?;
        Ok(match self.endian {
            Endian::Big => BigEndian::read_i16(bytes),
            Endian::Little => LittleEndian::read_i16(bytes),
        })
    }

    /// Read a u32 in the reader's byte order.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(match self.endian {
            Endian::Big => BigEndian::read_u32(bytes),
            Endian::Little => LittleEndian::read_u32(bytes),
        })
    }

    /// Read an i32 in the reader's byte order.
    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        let bytes = self.read_bytes(4)?;
        Ok(match self.endian {
            Endian::Big => BigEndian::read_i32(bytes),
            Endian::Little => LittleEndian::read_i32(bytes),
        })
    }

    /// Read an f32 in the reader's byte order.
    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        let bytes = self.read_bytes(4)?;
        Ok(match self.endian {
            Endian::Big => BigEndian::read_f32(bytes),
            Endian::Little => LittleEndian::read_f32(bytes),
        })
    }

    /// Peek at a u32 without advancing.
    #[inline]
    pub fn peek_u32(&self) -> Result<u32> {
        let bytes = self.peek_bytes(4)?;
        Ok(match self.endian {
            Endian::Big => BigEndian::read_u32(bytes),
            Endian::Little => LittleEndian::read_u32(bytes),
        })
    }

    /// Read a null-terminated ASCII string.
    pub fn read_cstring(&mut self) -> Result<&'a str> {
        let start = self.position;
        let remaining = &self.data[start.min(self.data.len())..];

        let null_pos = memchr::memchr(0, remaining)
            .ok_or(Error::MissingNullTerminator { offset: start })?;

        self.position = start + null_pos + 1;
        std::str::from_utf8(&remaining[..null_pos]).map_err(Error::Utf8)
    }

    /// Read a string from a fixed-size buffer, stopping at the first null.
    pub fn read_fixed_ascii(&mut self, buffer_size: usize) -> Result<String> {
        let bytes = self.read_bytes(buffer_size)?;
        let end = memchr::memchr(0, bytes).unwrap_or(buffer_size);
        Ok(bytes[..end].iter().map(|&b| b as char).collect())
    }

    /// Read a null-terminated UTF-16 string in the reader's byte order.
    ///
    /// Unpaired surrogates are replaced with U+FFFD.
    pub fn read_utf16_cstring(&mut self) -> Result<String> {
        let start = self.position;
        let mut units = Vec::new();
        loop {
            let unit = self.read_u16().map_err(|e| match e {
                Error::UnexpectedEof { .. } => Error::MissingNullTerminator { offset: start },
                other => other,
            })?;
            if unit == 0 {
                break;
            }
            units.push(unit);
        }
        Ok(String::from_utf16_lossy(&units))
    }

    /// Read a struct using zerocopy.
    ///
    /// Only meaningful for structs made of single bytes, since no byte
    /// swapping is applied.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let offset = self.position;
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            offset,
            needed: size,
            available: bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_both_endians() {
        let data = [0x01u8, 0x02, 0x03, 0x04];

        let mut be = EndianReader::new(&data, Endian::Big);
        assert_eq!(be.read_u32().unwrap(), 0x01020304);

        let mut le = EndianReader::new(&data, Endian::Little);
        assert_eq!(le.read_u32().unwrap(), 0x04030201);

        let mut be = EndianReader::new(&data, Endian::Big);
        assert_eq!(be.read_i16().unwrap(), 0x0102);
        assert_eq!(be.read_u16().unwrap(), 0x0304);
    }

    #[test]
    fn test_read_f32_big_endian() {
        let data = 1.5f32.to_be_bytes();
        let mut reader = EndianReader::new(&data, Endian::Big);
        assert_eq!(reader.read_f32().unwrap(), 1.5);
    }

    #[test]
    fn test_align_is_absolute_and_forward() {
        let data = [0u8; 16];
        let mut reader = EndianReader::new_at(&data, 5, Endian::Little);
        reader.align(4);
        assert_eq!(reader.position(), 8);
        reader.align(4);
        assert_eq!(reader.position(), 8);
        reader.align(1);
        assert_eq!(reader.position(), 8);
        reader.advance(1);
        reader.align(2);
        assert_eq!(reader.position(), 10);
    }

    #[test]
    fn test_read_cstring() {
        let data = b"GEOM\0MOEG\0";
        let mut reader = EndianReader::new(data, Endian::Big);

        assert_eq!(reader.read_cstring().unwrap(), "GEOM");
        assert_eq!(reader.read_cstring().unwrap(), "MOEG");
        assert!(matches!(
            reader.read_cstring(),
            Err(Error::MissingNullTerminator { offset: 10 })
        ));
    }

    #[test]
    fn test_read_fixed_ascii() {
        let data = b"main\0\0\0xyz";
        let mut reader = EndianReader::new(data, Endian::Big);
        assert_eq!(reader.read_fixed_ascii(7).unwrap(), "main");
        assert_eq!(reader.position(), 7);
    }

    #[test]
    fn test_read_utf16_cstring() {
        let data = [0x00, 0x48, 0x00, 0x69, 0x00, 0x00, 0xFF];
        let mut reader = EndianReader::new(&data, Endian::Big);
        assert_eq!(reader.read_utf16_cstring().unwrap(), "Hi");
        assert_eq!(reader.position(), 6);

        let data = [0x48, 0x00, 0x69, 0x00];
        let mut reader = EndianReader::new(&data, Endian::Little);
        assert!(reader.read_utf16_cstring().is_err());
    }

    #[test]
    fn test_eof_error_carries_offset() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = EndianReader::new_at(&data, 1, Endian::Big);

        match reader.read_u32() {
            Err(Error::UnexpectedEof {
                offset,
                needed,
                available,
            }) => {
                assert_eq!(offset, 1);
                assert_eq!(needed, 4);
                assert_eq!(available, 2);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_seek_past_end_then_read_fails() {
        let data = [0u8; 4];
        let mut reader = EndianReader::new(&data, Endian::Little);
        reader.seek(100);
        assert_eq!(reader.remaining(), 0);
        assert!(reader.read_u8().is_err());
    }

    #[test]
    fn test_peek_does_not_advance() {
        let data = [0x00, 0x00, 0x00, 0xF0];
        let reader = EndianReader::new(&data, Endian::Big);

        assert_eq!(reader.peek_u32().unwrap(), 240);
        assert_eq!(reader.position(), 0);
    }
}
