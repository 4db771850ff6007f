//! Simple value types shared by GeoFile payloads.

use std::fmt;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{EndianReader, Result};

/// A point or direction with three `f32` components.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// Create a new vector.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Read three floats in the reader's byte order.
    pub fn read(reader: &mut EndianReader<'_>) -> Result<Self> {
        Ok(Self {
            x: reader.read_f32()?,
            y: reader.read_f32()?,
            z: reader.read_f32()?,
        })
    }

    /// Euclidean length.
    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

/// A bounding sphere.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundsSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundsSphere {
    /// Read a center vector followed by a radius.
    pub fn read(reader: &mut EndianReader<'_>) -> Result<Self> {
        Ok(Self {
            center: Vec3::read(reader)?,
            radius: reader.read_f32()?,
        })
    }
}

/// An 8-bit-per-channel color.
///
/// Stored as four single bytes, so the layout is the same on every platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Create a new color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }
}

/// Interpretation guessed for a [`Var32`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Var32Kind {
    Float,
    Signed,
    Unsigned,
}

/// A 32-bit value whose type is not recorded in the file.
///
/// Trigger data slots hold floats, signed and unsigned integers, and
/// hashcodes interchangeably.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Var32(u32);

impl Var32 {
    /// Wrap raw bits.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Unsigned interpretation.
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Signed interpretation.
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self.0 as i32
    }

    /// Floating-point interpretation.
    #[inline]
    pub fn as_f32(self) -> f32 {
        f32::from_bits(self.0)
    }

    /// Guess the most plausible interpretation of the bits.
    pub fn guess(self) -> Var32Kind {
        let f = self.as_f32();
        if f > 0.000_001 && f < 1_000_000.0 {
            Var32Kind::Float
        } else if self.as_i32() < 0 {
            Var32Kind::Signed
        } else {
            Var32Kind::Unsigned
        }
    }
}

impl fmt::Debug for Var32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Var32({:#010x})", self.0)
    }
}

impl fmt::Display for Var32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.guess() {
            Var32Kind::Float => write!(f, "{}f", self.as_f32()),
            Var32Kind::Signed => write!(f, "{}", self.as_i32()),
            // Hashcodes and flag words read better in hex
            Var32Kind::Unsigned if self.0 & 0xFFFF_0000 != 0 => write!(f, "{:X}h", self.0),
            Var32Kind::Unsigned => write!(f, "{}", self.0),
        }
    }
}
