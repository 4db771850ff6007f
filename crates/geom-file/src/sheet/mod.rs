//! Spreadsheet payloads.
//!
//! Spreadsheet headers announce either a data spreadsheet (tables decoded
//! against a caller-supplied [`TableSchema`]) or a text spreadsheet
//! (localized UTF-16 strings).

mod cell;
mod data;
mod datasheet;
mod schema;
mod text;

pub use cell::Cell;
pub use data::DataSpreadSheet;
pub use datasheet::DataSheet;
pub use schema::{
    BitFieldSchema, BitSchema, ColumnSchema, GeoFileSchema, ScalarType, SchemaCollection,
    SpreadSheetSchema, TableSchema,
};
pub use text::{TextItem, TextSection, TextSpreadSheet};

/// Either kind of decoded spreadsheet.
#[derive(Debug, Clone, PartialEq)]
pub enum SpreadSheet {
    Data(DataSpreadSheet),
    Text(TextSpreadSheet),
}

impl std::fmt::Display for SpreadSheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpreadSheet::Data(sheet) => sheet.fmt(f),
            SpreadSheet::Text(sheet) => sheet.fmt(f),
        }
    }
}
