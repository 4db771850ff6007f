//! Error types for GeoFile decoding.

use thiserror::Error;

/// Errors that can occur when decoding a GeoFile.
///
/// Variants fall into two classes. Format errors make the whole file
/// unreadable and abort [`GeoFile::parse`](crate::GeoFile::parse). Schema
/// mismatches are scoped to a single payload decode and leave the directory
/// usable.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Primitive read error.
    #[error("{0}")]
    Common(#[from] geom_common::Error),

    /// The marker at offset 0 is neither "GEOM" nor "MOEG".
    #[error("indeterminate endianness: marker {marker:02X?} reads neither \"GEOM\" nor \"MOEG\"")]
    IndeterminateEndianness { marker: [u8; 4] },

    /// The prologue declares a version outside the supported set.
    #[error("unsupported GeoFile version {version} (supported: {supported:?})")]
    UnsupportedVersion {
        version: i32,
        supported: &'static [i32],
    },

    /// No platform matches the endianness and first platform-version word.
    #[error("indeterminate platform: big_endian={big_endian}, platform version {platform_version}")]
    IndeterminatePlatform {
        big_endian: bool,
        platform_version: u32,
    },

    /// A null relative pointer was about to be dereferenced.
    #[error("null pointer for {what} (pointer field at {address:#x})")]
    NullPointer { what: String, address: u64 },

    /// A relative pointer resolves before the start of the file.
    #[error("relative pointer at {anchor:#x} with offset {offset} resolves before the start of the file")]
    AddressUnderflow { anchor: u64, offset: i32 },

    /// A row read past its schema-declared size.
    #[error("row {row} starting at {row_start:#x} exceeded its row size by {overflow} bytes")]
    RowOverflow {
        row: usize,
        row_start: u64,
        overflow: u64,
    },

    /// A table schema with no columns cannot consume any row bytes.
    #[error("table schema with row size {row_size} has no columns")]
    EmptyTableSchema { row_size: u32 },

    /// A schema column names a type that is not a known scalar type.
    #[error("unknown type {type_name:?} for column {column:?}")]
    UnknownColumnType { column: String, type_name: String },

    /// A payload decoder was handed a header of the wrong kind.
    #[error("spreadsheet {hashcode:08X} is a {actual} sheet, expected {expected}")]
    SheetKindMismatch {
        hashcode: u32,
        expected: String,
        actual: String,
    },

    /// A section index points outside the section list.
    #[error("section index {index} out of range (section count: {count})")]
    SectionOutOfRange { index: i64, count: usize },

    /// Schema text could not be deserialized.
    #[cfg(feature = "json")]
    #[error("schema error: {0}")]
    Schema(#[from] serde_json::Error),
}

impl Error {
    /// Check if this error makes the whole file unreadable.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::IndeterminateEndianness { .. }
                | Error::UnsupportedVersion { .. }
                | Error::IndeterminatePlatform { .. }
        )
    }

    /// Check if this error comes from a schema that does not fit the binary.
    ///
    /// Schema files that fail to load count too: an unknown column type
    /// found while deserializing surfaces as [`Error::Schema`].
    pub fn is_schema_mismatch(&self) -> bool {
        match self {
            Error::RowOverflow { .. }
            | Error::UnknownColumnType { .. }
            | Error::EmptyTableSchema { .. }
            | Error::SheetKindMismatch { .. }
            | Error::SectionOutOfRange { .. } => true,
            #[cfg(feature = "json")]
            Error::Schema(_) => true,
            _ => false,
        }
    }
}

/// Result type for GeoFile operations.
pub type Result<T> = std::result::Result<T, Error>;
