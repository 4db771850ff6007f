//! EngineX hashcodes.
//!
//! Every asset in a GeoFile is identified by a 32-bit hashcode. The upper
//! byte names the hash section (0x01 files, 0x05 maps, 0x07 fonts,
//! 0x14 spreadsheets, ...), with bit 31 marking a file-local hash.

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// A 32-bit asset hashcode.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct HashCode(pub u32);

impl HashCode {
    /// Mask selecting the local-hash bit.
    pub const LOCAL_BIT: u32 = 0x8000_0000;

    /// Create a hashcode from its raw value.
    #[inline]
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Hash section, ignoring the local bit.
    #[inline]
    pub const fn section(self) -> u8 {
        ((self.0 >> 24) & 0x7F) as u8
    }

    /// Index within the section.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Check if this hashcode is local to the file that declares it.
    #[inline]
    pub const fn is_local(self) -> bool {
        self.0 & Self::LOCAL_BIT != 0
    }
}

impl From<u32> for HashCode {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Debug for HashCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashCode({:08X})", self.0)
    }
}

impl fmt::Display for HashCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

impl FromStr for HashCode {
    type Err = Error;

    /// Parse a hexadecimal hashcode, with or without a `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        u32::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|e| Error::InvalidHashCode(format!("{s:?}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_and_index() {
        let hash = HashCode(0x1400_0012);
        assert_eq!(hash.section(), 0x14);
        assert_eq!(hash.index(), 0x12);
        assert!(!hash.is_local());

        let local = HashCode(0x8500_0001);
        assert_eq!(local.section(), 0x05);
        assert!(local.is_local());
    }

    #[test]
    fn test_display_and_parse() {
        let hash = HashCode(0x0100_00AB);
        assert_eq!(hash.to_string(), "010000AB");
        assert_eq!("0x010000ab".parse::<HashCode>().unwrap(), hash);
        assert_eq!("010000AB".parse::<HashCode>().unwrap(), hash);
        assert!("not-a-hash".parse::<HashCode>().is_err());
    }
}
