//! Common utilities for geom.
//!
//! This crate provides the foundational types used across all geom crates:
//!
//! - [`EndianReader`] - Zero-copy binary reading with a big/little-endian switch
//! - [`HashCode`] - EngineX asset hashcodes
//! - [`Vec3`], [`BoundsSphere`], [`Rgba`], [`Var32`] - simple value types

mod error;
mod hashcode;
mod reader;
mod value;

pub use error::{Error, Result};
pub use hashcode::HashCode;
pub use reader::{Endian, EndianReader};
pub use value::{BoundsSphere, Rgba, Var32, Var32Kind, Vec3};

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
