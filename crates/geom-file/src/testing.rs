//! Test-only builder for synthetic GeoFile bytes.

use geom_common::Endian;

/// Byte buffer that appends values in a chosen byte order.
pub(crate) struct ByteWriter {
    pub(crate) bytes: Vec<u8>,
    endian: Endian,
}

impl ByteWriter {
    pub(crate) fn new(endian: Endian) -> Self {
        Self {
            bytes: Vec::new(),
            endian,
        }
    }

    pub(crate) fn position(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn u8(&mut self, value: u8) -> &mut Self {
        self.bytes.push(value);
        self
    }

    pub(crate) fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub(crate) fn u16(&mut self, value: u16) -> &mut Self {
        match self.endian {
            Endian::Big => self.raw(&value.to_be_bytes()),
            Endian::Little => self.raw(&value.to_le_bytes()),
        }
    }

    pub(crate) fn i16(&mut self, value: i16) -> &mut Self {
        self.u16(value as u16)
    }

    pub(crate) fn u32(&mut self, value: u32) -> &mut Self {
        match self.endian {
            Endian::Big => self.raw(&value.to_be_bytes()),
            Endian::Little => self.raw(&value.to_le_bytes()),
        }
    }

    pub(crate) fn i32(&mut self, value: i32) -> &mut Self {
        self.u32(value as u32)
    }

    pub(crate) fn f32(&mut self, value: f32) -> &mut Self {
        self.u32(value.to_bits())
    }

    pub(crate) fn zeros(&mut self, count: usize) -> &mut Self {
        self.bytes.resize(self.bytes.len() + count, 0);
        self
    }

    /// Pad with zeros up to an absolute position.
    pub(crate) fn pad_to(&mut self, position: usize) -> &mut Self {
        assert!(position >= self.bytes.len());
        self.bytes.resize(position, 0);
        self
    }

    /// Write a relative pointer at the current position targeting `target`.
    pub(crate) fn rel_ptr_to(&mut self, target: usize) -> &mut Self {
        let offset = target as i64 - self.bytes.len() as i64;
        self.i32(offset as i32)
    }

    /// Overwrite a u32 at an absolute position.
    pub(crate) fn patch_u32(&mut self, position: usize, value: u32) {
        let bytes = match self.endian {
            Endian::Big => value.to_be_bytes(),
            Endian::Little => value.to_le_bytes(),
        };
        self.bytes[position..position + 4].copy_from_slice(&bytes);
    }

    /// Overwrite an i16 at an absolute position.
    pub(crate) fn patch_i16(&mut self, position: usize, value: i16) {
        let bytes = match self.endian {
            Endian::Big => value.to_be_bytes(),
            Endian::Little => value.to_le_bytes(),
        };
        self.bytes[position..position + 2].copy_from_slice(&bytes);
    }

    /// Overwrite a relative pointer at `position` so it targets `target`.
    pub(crate) fn patch_rel_ptr(&mut self, position: usize, target: usize) {
        let offset = target as i64 - position as i64;
        self.patch_u32(position, offset as i32 as u32);
    }

    pub(crate) fn finish(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}
