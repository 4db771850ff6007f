//! Data-sheet cells.

use std::fmt;

use geom_common::{EndianReader, HashCode};

use super::schema::ScalarType;
use crate::Result;

/// A single typed value of a data-sheet row.
///
/// The raw bytes are kept in little-endian order regardless of the file's
/// byte order, zero-padded to four bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    raw: [u8; 4],
    ty: ScalarType,
}

impl Cell {
    /// Build a cell from a value already in native integer form.
    pub fn from_u32(ty: ScalarType, value: u32) -> Self {
        let mut raw = value.to_le_bytes();
        raw[ty.size()..].fill(0);
        Self { raw, ty }
    }

    /// Read one cell, aligning to the type's size first.
    pub fn read(reader: &mut EndianReader<'_>, ty: ScalarType) -> Result<Self> {
        let size = ty.size();
        reader.align(size);

        let mut raw = [0u8; 4];
        raw[..size].copy_from_slice(reader.read_bytes(size)?);
        if reader.endian().is_big() {
            raw[..size].reverse();
        }
        Ok(Self { raw, ty })
    }

    pub fn ty(&self) -> ScalarType {
        self.ty
    }

    /// Raw bytes in little-endian order.
    pub fn bytes(&self) -> &[u8] {
        &self.raw[..self.ty.size()]
    }

    /// Zero-extended unsigned value.
    pub fn as_u32(&self) -> u32 {
        u32::from_le_bytes(self.raw)
    }

    /// Sign-extended value.
    pub fn as_i32(&self) -> i32 {
        match self.ty.size() {
            1 => self.raw[0] as i8 as i32,
            2 => i16::from_le_bytes([self.raw[0], self.raw[1]]) as i32,
            _ => i32::from_le_bytes(self.raw),
        }
    }

    /// Float value; 0.0 for types narrower than four bytes.
    pub fn as_f32(&self) -> f32 {
        if self.ty.size() == 4 {
            f32::from_le_bytes(self.raw)
        } else {
            0.0
        }
    }

    /// True if any byte is nonzero.
    pub fn as_bool(&self) -> bool {
        self.bytes().iter().any(|&b| b != 0)
    }

    pub fn as_hashcode(&self) -> HashCode {
        HashCode(self.as_u32())
    }

    /// Value of bit `index` of a bitfield cell.
    ///
    /// `None` if the cell is not a bitfield or the index is past its width.
    pub fn bit(&self, index: u8) -> Option<bool> {
        if !self.ty.is_bitfield() || index as usize >= self.ty.size() * 8 {
            return None;
        }
        Some((self.as_u32() >> index) & 1 == 1)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            ScalarType::U8 | ScalarType::U16 | ScalarType::U32 => write!(f, "{}", self.as_u32()),
            ScalarType::S8 | ScalarType::S16 | ScalarType::S32 => write!(f, "{}", self.as_i32()),
            ScalarType::Bool => write!(f, "{}", self.as_bool()),
            ScalarType::Float => write!(f, "{:.3}", self.as_f32()),
            ScalarType::HashCode
            | ScalarType::BitFieldU8
            | ScalarType::BitFieldU16
            | ScalarType::BitFieldU32 => write!(f, "{:X}", self.as_u32()),
        }
    }
}

#[cfg(test)]
mod tests {
    use geom_common::Endian;

    use super::*;

    #[test]
    fn test_bitfield_bits() {
        let cell = Cell::from_u32(ScalarType::BitFieldU8, 0b0000_0110);
        assert_eq!(cell.bit(1), Some(true));
        assert_eq!(cell.bit(0), Some(false));
        assert_eq!(cell.bit(3), Some(false));
        assert_eq!(cell.bit(8), None);

        let plain = Cell::from_u32(ScalarType::U8, 0b0000_0110);
        assert_eq!(plain.bit(1), None);
    }

    #[test]
    fn test_read_swaps_big_endian() {
        let data = [0xFF, 0xFE];
        let be = Cell::read(&mut EndianReader::new(&data, Endian::Big), ScalarType::S16).unwrap();
        let le = Cell::read(&mut EndianReader::new(&data, Endian::Little), ScalarType::S16).unwrap();
        assert_eq!(be.as_i32(), -2);
        assert_eq!(le.as_i32(), -257);
        assert_eq!(be.bytes(), &[0xFE, 0xFF]);
    }

    #[test]
    fn test_read_aligns_to_size() {
        let data = [0x01, 0xAA, 0xAA, 0xAA, 0x00, 0x00, 0x00, 0x07];
        let mut reader = EndianReader::new(&data, Endian::Big);
        let a = Cell::read(&mut reader, ScalarType::U8).unwrap();
        let b = Cell::read(&mut reader, ScalarType::U32).unwrap();
        assert_eq!(a.as_u32(), 1);
        assert_eq!(b.as_u32(), 7);
        assert_eq!(reader.position(), 8);
    }

    #[test]
    fn test_interpretations() {
        assert_eq!(Cell::from_u32(ScalarType::S8, 0xFF).as_i32(), -1);
        assert_eq!(Cell::from_u32(ScalarType::U8, 0xFF).as_u32(), 255);
        assert!(Cell::from_u32(ScalarType::Bool, 2).as_bool());
        assert!(!Cell::from_u32(ScalarType::Bool, 0).as_bool());
        assert_eq!(Cell::from_u32(ScalarType::Float, 1.5f32.to_bits()).as_f32(), 1.5);
        assert_eq!(Cell::from_u32(ScalarType::U16, 0x1_FFFF).as_u32(), 0xFFFF);
    }

    #[test]
    fn test_display() {
        assert_eq!(Cell::from_u32(ScalarType::Float, 0.5f32.to_bits()).to_string(), "0.500");
        assert_eq!(Cell::from_u32(ScalarType::HashCode, 0x1400_00AB).to_string(), "140000AB");
        assert_eq!(Cell::from_u32(ScalarType::S16, 0xFFFE).to_string(), "-2");
        assert_eq!(Cell::from_u32(ScalarType::Bool, 1).to_string(), "true");
    }
}
