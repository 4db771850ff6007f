//! Table schemas for data spreadsheets.
//!
//! Column layouts of data sheets are not recoverable from the binary, so
//! callers supply them. The schema is a nested map
//! `geo file hashcode -> spreadsheet hashcode -> table index -> TableSchema`.
//! Column type names are translated to [`ScalarType`] once, while
//! deserializing.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Scalar types a data-sheet column can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    U8,
    U16,
    U32,
    S8,
    S16,
    S32,
    Bool,
    Float,
    HashCode,
    BitFieldU8,
    BitFieldU16,
    BitFieldU32,
}

impl ScalarType {
    pub const ALL: [ScalarType; 12] = [
        ScalarType::U8,
        ScalarType::U16,
        ScalarType::U32,
        ScalarType::S8,
        ScalarType::S16,
        ScalarType::S32,
        ScalarType::Bool,
        ScalarType::Float,
        ScalarType::HashCode,
        ScalarType::BitFieldU8,
        ScalarType::BitFieldU16,
        ScalarType::BitFieldU32,
    ];

    /// Size in bytes; also the alignment of the value in the file.
    pub const fn size(self) -> usize {
        match self {
            ScalarType::U8 | ScalarType::S8 | ScalarType::Bool | ScalarType::BitFieldU8 => 1,
            ScalarType::U16 | ScalarType::S16 | ScalarType::BitFieldU16 => 2,
            ScalarType::U32
            | ScalarType::S32
            | ScalarType::Float
            | ScalarType::HashCode
            | ScalarType::BitFieldU32 => 4,
        }
    }

    pub const fn is_bitfield(self) -> bool {
        matches!(
            self,
            ScalarType::BitFieldU8 | ScalarType::BitFieldU16 | ScalarType::BitFieldU32
        )
    }

    pub const fn is_signed(self) -> bool {
        matches!(self, ScalarType::S8 | ScalarType::S16 | ScalarType::S32)
    }

    /// Name used in schema files.
    pub const fn as_str(self) -> &'static str {
        match self {
            ScalarType::U8 => "u8",
            ScalarType::U16 => "u16",
            ScalarType::U32 => "u32",
            ScalarType::S8 => "s8",
            ScalarType::S16 => "s16",
            ScalarType::S32 => "s32",
            ScalarType::Bool => "bool",
            ScalarType::Float => "float",
            ScalarType::HashCode => "hashcode",
            ScalarType::BitFieldU8 => "bitfield_u8",
            ScalarType::BitFieldU16 => "bitfield_u16",
            ScalarType::BitFieldU32 => "bitfield_u32",
        }
    }

    /// Look up a type by its schema name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column: a name and its scalar type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawColumn", into = "RawColumn")]
pub struct ColumnSchema {
    pub name: String,
    pub ty: ScalarType,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, ty: ScalarType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Column as written in schema files, before its type name is resolved.
#[derive(Serialize, Deserialize)]
struct RawColumn {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
}

impl TryFrom<RawColumn> for ColumnSchema {
    type Error = Error;

    fn try_from(raw: RawColumn) -> Result<Self> {
        match ScalarType::from_name(&raw.type_name) {
            Some(ty) => Ok(Self { name: raw.name, ty }),
            None => Err(Error::UnknownColumnType {
                column: raw.name,
                type_name: raw.type_name,
            }),
        }
    }
}

impl From<ColumnSchema> for RawColumn {
    fn from(column: ColumnSchema) -> Self {
        Self {
            name: column.name,
            type_name: column.ty.as_str().to_string(),
        }
    }
}

/// A named bit of a bitfield column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitSchema {
    pub num: u8,
    pub name: String,
}

/// Names for the bits of one bitfield column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitFieldSchema {
    /// Name of the bitfield column these bits belong to.
    pub field_name: String,
    #[serde(default)]
    pub bits: Vec<BitSchema>,
}

impl BitFieldSchema {
    pub fn bit(&self, name: &str) -> Option<u8> {
        self.bits.iter().find(|b| b.name == name).map(|b| b.num)
    }
}

/// Layout of one data table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Bytes from one row's start to the next.
    pub row_size: u32,
    /// Columns in file order.
    pub columns: Vec<ColumnSchema>,
    #[serde(default)]
    pub bit_fields: Vec<BitFieldSchema>,
}

impl TableSchema {
    pub fn new(row_size: u32, columns: Vec<ColumnSchema>) -> Self {
        Self {
            row_size,
            columns,
            bit_fields: Vec::new(),
        }
    }

    pub fn with_bit_field(mut self, bit_field: BitFieldSchema) -> Self {
        self.bit_fields.push(bit_field);
        self
    }

    /// Bit definitions for a bitfield column, looked up by column name.
    pub fn bit_field(&self, column_name: &str) -> Option<&BitFieldSchema> {
        self.bit_fields.iter().find(|b| b.field_name == column_name)
    }

    /// Sum of the column sizes, ignoring alignment padding.
    pub fn packed_size(&self) -> usize {
        self.columns.iter().map(|c| c.ty.size()).sum()
    }
}

/// Tables of one spreadsheet, keyed by table index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadSheetSchema {
    #[serde(default)]
    pub sheets: FxHashMap<i32, TableSchema>,
}

impl SpreadSheetSchema {
    pub fn table(&self, index: i32) -> Option<&TableSchema> {
        self.sheets.get(&index)
    }
}

/// Spreadsheets of one GeoFile, keyed by spreadsheet hashcode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoFileSchema {
    #[serde(default)]
    pub spreadsheets: FxHashMap<u32, SpreadSheetSchema>,
}

/// Schemas for any number of GeoFiles, keyed by file hashcode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaCollection {
    #[serde(default)]
    pub geo_files: FxHashMap<u32, GeoFileSchema>,
}

impl SchemaCollection {
    /// Schema of one spreadsheet of one file.
    pub fn spreadsheet(&self, file: u32, sheet: u32) -> Option<&SpreadSheetSchema> {
        self.geo_files.get(&file)?.spreadsheets.get(&sheet)
    }

    /// Parse a schema collection from JSON text.
    #[cfg(feature = "json")]
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a schema collection from JSON bytes.
    #[cfg(feature = "json")]
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
