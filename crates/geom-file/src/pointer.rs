//! Relative pointers.
//!
//! GeoFiles are relocatable: every in-file reference is stored as a signed
//! offset from the address of the offset field itself.

use geom_common::EndianReader;

use crate::{Error, Result};

/// A signed 32-bit offset relative to the position it was read from.
///
/// An offset of zero is the null pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RelPtr {
    /// File offset of the offset field.
    pub anchor: u64,
    /// Stored offset.
    pub offset: i32,
}

impl RelPtr {
    /// Size of a relative pointer on disk.
    pub const SIZE: u64 = 4;

    /// Create a pointer from its anchor and offset.
    #[inline]
    pub const fn new(anchor: u64, offset: i32) -> Self {
        Self { anchor, offset }
    }

    /// Read a pointer at the reader's position.
    ///
    /// The anchor is the position before the offset is consumed.
    pub fn read(reader: &mut EndianReader<'_>) -> Result<Self> {
        let anchor = reader.position() as u64;
        let offset = reader.read_i32()?;
        Ok(Self { anchor, offset })
    }

    /// Check if this is the null pointer.
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.offset == 0
    }

    /// Resolve to an absolute file offset.
    ///
    /// Returns `None` for the null pointer and for targets before offset 0;
    /// use [`try_resolve`](Self::try_resolve) to tell the two apart.
    #[inline]
    pub fn resolve(&self) -> Option<u64> {
        if self.is_null() {
            return None;
        }
        self.anchor.checked_add_signed(self.offset as i64)
    }

    /// Resolve to an absolute file offset, failing on null or underflow.
    ///
    /// `what` names the pointer in the error message.
    pub fn try_resolve(&self, what: &str) -> Result<u64> {
        if self.is_null() {
            return Err(Error::NullPointer {
                what: what.to_string(),
                address: self.anchor,
            });
        }
        self.anchor
            .checked_add_signed(self.offset as i64)
            .ok_or(Error::AddressUnderflow {
                anchor: self.anchor,
                offset: self.offset,
            })
    }
}
