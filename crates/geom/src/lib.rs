//! Geom - EngineX GeoFile (`.edb`) decoding library.
//!
//! This crate provides a unified interface to the geom crates.
//!
//! # Crates
//!
//! - [`geom_common`] - Common utilities (endian-aware reading, hashcodes, value types)
//! - [`geom_file`] - GeoFile directory, header records and payload decoders
//!
//! # Example
//!
//! ```no_run
//! use geom::prelude::*;
//!
//! let archive = GeoArchive::open("level.edb")?;
//! let file = archive.file();
//! println!("{} ({})", file.prologue().hashcode, file.platform());
//!
//! for header in file.category_headers(Category::Texture) {
//!     println!("{header}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use geom_common as common;
pub use geom_file as file;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use geom_common::{Endian, EndianReader, HashCode, Rgba, Var32, Vec3};
    pub use geom_file::{
        Category, DataSheet, GeoArchive, GeoFile, GeoMap, HeaderRecord, Platform,
        SchemaCollection, SheetKind, SpreadSheet, Trigger,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
