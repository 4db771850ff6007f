//! GeoFile (`.edb`) container decoder for EngineX games.
//!
//! A GeoFile bundles many asset categories (entities, animations, textures,
//! scripts, maps, spreadsheets, fonts) into one relocatable file. Every
//! in-file reference is a [`RelPtr`], so structures locate themselves
//! regardless of where the file is loaded.
//!
//! # Quick Start
//!
//! ```no_run
//! use geom_file::{Category, GeoArchive};
//!
//! let archive = GeoArchive::open("level.edb")?;
//! let file = archive.file();
//!
//! println!("{}", file.prologue());
//! for category in Category::ALL {
//!     println!("{category}: {}", file.category_headers(category).len());
//! }
//!
//! for (hashcode, map) in archive.read_maps() {
//!     let map = map?;
//!     println!("{hashcode}: {} triggers", map.triggers.triggers.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Layout
//!
//! - [`GeoFile`] - prologue, platform detection and per-category header lists
//! - [`HeaderRecord`] - one variant per [`Category`], each with its own record size
//! - [`DataSheet`] - schema-driven tables, see [`SchemaCollection`]
//! - [`Trigger`] - flag-selected variable-length records
//! - [`GeoMap`], [`Font`], [`TextSpreadSheet`] - other payload decoders

mod archive;
mod array;
mod directory;
mod error;
mod font;
mod header;
mod map;
mod pointer;
mod script;
mod sheet;
mod trigger;

#[cfg(test)]
mod testing;

pub use archive::GeoArchive;
pub use array::{ArrayDescriptor, RelArray};
pub use directory::{detect_endianness, GeoFile, Platform, Prologue, MAGIC_BIG, MAGIC_LITTLE};
pub use error::{Error, Result};
pub use font::{Font, FontChar};
pub use header::{
    AnimHeader, AnimSkinHeader, Category, CommonHeader, CountedHeader, EntityHeader, HeaderRecord,
    ScriptHeader, SectionHeader, SheetKind, SpreadSheetHeader, TextureHeader,
};
pub use map::{GeoMap, MapHeader, MapTriggers, TriggerTableHeader, TriggerType};
pub use pointer::RelPtr;
pub use script::{CodeLine, Procedure, TriggerScript};
pub use sheet::{
    BitFieldSchema, BitSchema, Cell, ColumnSchema, DataSheet, DataSpreadSheet, GeoFileSchema,
    ScalarType, SchemaCollection, SpreadSheet, SpreadSheetSchema, TableSchema, TextItem,
    TextSection, TextSpreadSheet,
};
pub use trigger::{Trigger, TriggerFlags};

pub use geom_common::{Endian, EndianReader, HashCode};
