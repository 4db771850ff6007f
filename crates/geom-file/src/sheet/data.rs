//! Data spreadsheets: a list of tables decoded against a schema.

use std::fmt;

use geom_common::{EndianReader, HashCode};

use super::datasheet::DataSheet;
use super::schema::SpreadSheetSchema;
use crate::header::{SheetKind, SpreadSheetHeader};
use crate::pointer::RelPtr;
use crate::{Error, Result};

/// A decoded data spreadsheet.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSpreadSheet {
    pub hashcode: HashCode,
    /// File offset of the table count.
    pub address: u64,
    /// Pointers to every table, in index order.
    pub table_pointers: Vec<RelPtr>,
    /// Decoded tables with their index; only tables the schema describes.
    pub sheets: Vec<(i32, DataSheet)>,
}

impl DataSpreadSheet {
    /// Decode the spreadsheet a header points at.
    ///
    /// Without a schema, only the table pointers are read.
    pub fn read(
        reader: &EndianReader<'_>,
        header: &SpreadSheetHeader,
        schema: Option<&SpreadSheetSchema>,
    ) -> Result<Self> {
        if header.kind != SheetKind::Data {
            return Err(Error::SheetKindMismatch {
                hashcode: header.common.hashcode.value(),
                expected: SheetKind::Data.to_string(),
                actual: header.kind.to_string(),
            });
        }

        let mut reader = reader.clone();
        let address = header.common.address as u64;
        reader.seek(address as usize);

        let count = reader.read_i32()?.max(0);
        let table_pointers = (0..count)
            .map(|_| RelPtr::read(&mut reader))
            .collect::<Result<Vec<_>>>()?;

        let mut sheets = Vec::new();
        if let Some(schema) = schema {
            for (index, pointer) in (0..count).zip(&table_pointers) {
                let Some(table) = schema.table(index) else {
                    tracing::debug!(
                        hashcode = %header.common.hashcode,
                        index,
                        "no schema for data sheet, skipping"
                    );
                    continue;
                };
                reader.seek(pointer.try_resolve("data sheet")? as usize);
                sheets.push((index, DataSheet::read(&mut reader, table)?));
            }
        }

        Ok(Self {
            hashcode: header.common.hashcode,
            address,
            table_pointers,
            sheets,
        })
    }

    /// Number of tables in the file, decoded or not.
    pub fn table_count(&self) -> usize {
        self.table_pointers.len()
    }

    /// Decoded table by index.
    pub fn sheet(&self, index: i32) -> Option<&DataSheet> {
        self.sheets.iter().find(|(i, _)| *i == index).map(|(_, s)| s)
    }
}

impl fmt::Display for DataSpreadSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.table_count();
        writeln!(
            f,
            "SpreadSheet {}, {} data sheet{}",
            self.hashcode,
            count,
            if count == 1 { "" } else { "s" }
        )?;

        if self.sheets.is_empty() {
            return writeln!(f, "No schema provided.");
        }
        for (index, sheet) in &self.sheets {
            writeln!(f, "DataSheet {index}:")?;
            writeln!(f, "{sheet}")?;
        }
        Ok(())
    }
}
