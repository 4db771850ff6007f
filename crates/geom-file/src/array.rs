//! Array descriptors.
//!
//! A descriptor locates a homogeneous run of elements through a
//! [`RelPtr`]. Directory descriptors may also carry a block of hashcodes
//! stored immediately before the element run.

use geom_common::EndianReader;

use crate::pointer::RelPtr;
use crate::Result;

/// `{i16 count, i16 hash_count, i32 relative offset}`.
///
/// A negative `hash_count` means `|hash_count|` u32 hashcodes precede the
/// element run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArrayDescriptor {
    /// File offset of the descriptor.
    pub address: u64,
    /// Number of elements in the run.
    pub count: i16,
    /// Negated number of preceding hashcodes, or non-negative for none.
    pub hash_count: i16,
    /// Pointer to the first element.
    pub pointer: RelPtr,
}

impl ArrayDescriptor {
    /// Size of a descriptor on disk.
    pub const SIZE: u64 = 8;

    /// Read a descriptor at the reader's position.
    pub fn read(reader: &mut EndianReader<'_>) -> Result<Self> {
        let address = reader.position() as u64;
        let count = reader.read_i16()?;
        let hash_count = reader.read_i16()?;
        let pointer = RelPtr::read(reader)?;
        Ok(Self {
            address,
            count,
            hash_count,
            pointer,
        })
    }

    /// Number of elements, treating a negative count as empty.
    #[inline]
    pub fn len(&self) -> usize {
        self.count.max(0) as usize
    }

    /// Check if the run has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Address of element `index` for a run of fixed-size records.
    #[inline]
    pub fn element_address(&self, index: usize, record_size: u64) -> Option<u64> {
        self.pointer
            .resolve()
            .map(|base| base + index as u64 * record_size)
    }

    /// Address of the hashcode block, if the descriptor has one.
    #[inline]
    pub fn hash_block_address(&self) -> Option<u64> {
        if self.hash_count >= 0 {
            return None;
        }
        self.pointer
            .resolve()?
            .checked_add_signed(self.hash_count as i64 * 4)
    }

    /// Number of hashcodes in the hashcode block.
    #[inline]
    pub fn hash_block_len(&self) -> usize {
        if self.hash_count < 0 {
            self.hash_count.unsigned_abs() as usize
        } else {
            0
        }
    }
}

impl std::fmt::Display for ArrayDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "count: {} | hash count: {} | relative offset: {}",
            self.count, self.hash_count, self.pointer.offset
        )
    }
}

/// `{i32 size, i32 relative offset}`, used where no hashcode block exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelArray {
    /// File offset of the descriptor.
    pub address: u64,
    /// Number of elements.
    pub size: i32,
    /// Pointer to the first element.
    pub pointer: RelPtr,
}

impl RelArray {
    /// Size of a descriptor on disk.
    pub const SIZE: u64 = 8;

    /// Read a descriptor at the reader's position.
    pub fn read(reader: &mut EndianReader<'_>) -> Result<Self> {
        let address = reader.position() as u64;
        let size = reader.read_i32()?;
        let pointer = RelPtr::read(reader)?;
        Ok(Self {
            address,
            size,
            pointer,
        })
    }

    /// Number of elements, treating a negative size as empty.
    #[inline]
    pub fn len(&self) -> usize {
        self.size.max(0) as usize
    }

    /// Check if the array has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Display for RelArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "size: {} | relative offset: {}",
            self.size, self.pointer.offset
        )
    }
}

#[cfg(test)]
mod tests {
    use geom_common::Endian;

    use super::*;

    fn descriptor(count: i16, hash_count: i16, target: u64) -> ArrayDescriptor {
        // Pointer field sits at +4 within a descriptor at 0x40
        let anchor = 0x44;
        ArrayDescriptor {
            address: 0x40,
            count,
            hash_count,
            pointer: RelPtr::new(anchor, (target as i64 - anchor as i64) as i32),
        }
    }

    #[test]
    fn test_hash_block_precedes_elements() {
        let desc = descriptor(5, -5, 0x1000);
        assert_eq!(desc.pointer.resolve(), Some(0x1000));
        assert_eq!(desc.hash_block_address(), Some(0xFEC));
        assert_eq!(desc.hash_block_len(), 5);
    }

    #[test]
    fn test_no_hash_block() {
        for hash_count in [0, 3] {
            let desc = descriptor(3, hash_count, 0x1000);
            assert_eq!(desc.hash_block_address(), None);
            assert_eq!(desc.hash_block_len(), 0);
        }
    }

    #[test]
    fn test_count_independent_of_hash_count() {
        let desc = descriptor(2, -7, 0x1000);
        assert_eq!(desc.len(), 2);
        assert_eq!(desc.hash_block_len(), 7);
    }

    #[test]
    fn test_element_address() {
        let desc = descriptor(4, 0, 0x200);
        assert_eq!(desc.element_address(0, 0x14), Some(0x200));
        assert_eq!(desc.element_address(3, 0x14), Some(0x200 + 3 * 0x14));

        let null = ArrayDescriptor::default();
        assert_eq!(null.element_address(0, 0x10), None);
    }

    #[test]
    fn test_read_both_endians() {
        let be = [0x00, 0x02, 0xFF, 0xFE, 0x00, 0x00, 0x00, 0x10];
        let le = [0x02, 0x00, 0xFE, 0xFF, 0x10, 0x00, 0x00, 0x00];

        for (data, endian) in [(&be, Endian::Big), (&le, Endian::Little)] {
            let mut reader = EndianReader::new(data, endian);
            let desc = ArrayDescriptor::read(&mut reader).unwrap();
            assert_eq!(desc.count, 2);
            assert_eq!(desc.hash_count, -2);
            assert_eq!(desc.pointer, RelPtr::new(4, 0x10));
            assert_eq!(desc.pointer.resolve(), Some(0x14));
            assert_eq!(desc.hash_block_address(), Some(0x0C));
        }
    }
}
