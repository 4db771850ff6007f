//! GeoFile archives: a directory together with the bytes it was read from.

use std::fs::File;
use std::path::Path;

use geom_common::HashCode;
use memmap2::Mmap;

use crate::directory::GeoFile;
use crate::font::Font;
use crate::header::SheetKind;
use crate::map::GeoMap;
use crate::sheet::{SchemaCollection, SpreadSheet};
use crate::trigger::Trigger;
use crate::{Error, Result};

enum Backing {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Backing {
    fn bytes(&self) -> &[u8] {
        match self {
            Backing::Mapped(mmap) => mmap,
            Backing::Owned(bytes) => bytes,
        }
    }
}

/// An opened GeoFile.
///
/// Payload reads return one result per asset, so a malformed asset does not
/// hide the others.
///
/// # Example
///
/// ```no_run
/// use geom_file::{GeoArchive, SchemaCollection};
///
/// let archive = GeoArchive::open("level.edb")?;
/// let schema = SchemaCollection::from_json_str(&std::fs::read_to_string("schema.json")?)?;
///
/// for (hashcode, sheet) in archive.read_spreadsheets(Some(&schema)) {
///     match sheet {
///         Ok(sheet) => println!("{sheet}"),
///         Err(e) => eprintln!("{hashcode}: {e}"),
///     }
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct GeoArchive {
    backing: Backing,
    name: String,
    file: GeoFile,
}

impl GeoArchive {
    /// Memory-map and parse a GeoFile.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Self::with_backing(Backing::Mapped(mmap), name)
    }

    /// Parse a GeoFile held in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::with_backing(Backing::Owned(bytes), "memory".to_string())
    }

    fn with_backing(backing: Backing, name: String) -> Result<Self> {
        let file = GeoFile::parse(backing.bytes())?;
        Ok(Self {
            backing,
            name,
            file,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        self.backing.bytes()
    }

    /// The parsed directory.
    #[inline]
    pub fn file(&self) -> &GeoFile {
        &self.file
    }

    /// Decode every spreadsheet.
    ///
    /// Data sheets use the schema registered for this file's and the
    /// sheet's hashcode; without one only their table pointers are read.
    pub fn read_spreadsheets(
        &self,
        schema: Option<&SchemaCollection>,
    ) -> Vec<(HashCode, Result<SpreadSheet>)> {
        let file_hash = self.file.prologue().hashcode.value();

        self.file
            .spreadsheet_headers()
            .map(|header| {
                let hashcode = header.common.hashcode;
                let sheet = match header.kind {
                    SheetKind::Data => {
                        let sheet_schema =
                            schema.and_then(|s| s.spreadsheet(file_hash, hashcode.value()));
                        self.file
                            .decode_table(self.data(), header, sheet_schema)
                            .map(SpreadSheet::Data)
                    }
                    SheetKind::Text => self
                        .file
                        .decode_text_sheet(self.data(), header)
                        .map(SpreadSheet::Text),
                    SheetKind::Unknown(_) => Err(Error::SheetKindMismatch {
                        hashcode: hashcode.value(),
                        expected: "data or text".to_string(),
                        actual: header.kind.to_string(),
                    }),
                };
                (hashcode, sheet)
            })
            .collect()
    }

    /// Decode every map's trigger table.
    pub fn read_maps(&self) -> Vec<(HashCode, Result<GeoMap>)> {
        self.file
            .map_headers()
            .map(|header| (header.hashcode, self.file.decode_map(self.data(), header)))
            .collect()
    }

    /// Decode every font.
    pub fn read_fonts(&self) -> Vec<(HashCode, Result<Font>)> {
        self.file
            .font_headers()
            .map(|header| (header.hashcode, self.file.decode_font(self.data(), header)))
            .collect()
    }

    /// Decode one trigger at an absolute address.
    pub fn read_trigger(&self, address: u64) -> Result<Trigger> {
        self.file.decode_trigger(self.data(), address)
    }
}

impl std::fmt::Debug for GeoArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoArchive")
            .field("name", &self.name)
            .field("len", &self.data().len())
            .field("file", &self.file)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use geom_common::Endian;

    use super::*;
    use crate::directory::tests::{empty_file, set_descriptor};
    use crate::header::Category;
    use crate::sheet::{ColumnSchema, GeoFileSchema, ScalarType, SpreadSheetSchema, TableSchema};

    /// One data spreadsheet with a single table and one spreadsheet of unknown kind.
    fn archive_bytes() -> Vec<u8> {
        let mut w = empty_file(Endian::Big, 0);
        w.pad_to(0x100);
        w.u32(0x1400_0001).i16(0).i16(0).u32(0x200).u32(0).i32(2);
        w.u32(0x1400_0002).i16(0).i16(0).u32(0x200).u32(0).i32(9);
        set_descriptor(&mut w, Category::SpreadSheet, 2, 0, 0x100);

        w.pad_to(0x200);
        w.i32(1);
        let ptr = w.position();
        w.zeros(4);
        w.pad_to(0x220);
        w.patch_rel_ptr(ptr, 0x220);
        w.i32(2).u32(7).u32(8);
        w.finish()
    }

    fn schema() -> SchemaCollection {
        let mut sheet = SpreadSheetSchema::default();
        sheet.sheets.insert(
            0,
            TableSchema::new(4, vec![ColumnSchema::new("value", ScalarType::U32)]),
        );
        let mut file = GeoFileSchema::default();
        file.spreadsheets.insert(0x1400_0001, sheet);
        let mut collection = SchemaCollection::default();
        collection.geo_files.insert(0x0100_0042, file);
        collection
    }

    #[test]
    fn test_read_spreadsheets_scopes_errors() {
        let archive = GeoArchive::from_bytes(archive_bytes()).unwrap();
        let sheets = archive.read_spreadsheets(Some(&schema()));
        assert_eq!(sheets.len(), 2);

        match &sheets[0] {
            (hash, Ok(SpreadSheet::Data(sheet))) => {
                assert_eq!(*hash, HashCode(0x1400_0001));
                let table = sheet.sheet(0).unwrap();
                assert_eq!(table.cell(1, 0).unwrap().as_u32(), 8);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(
            &sheets[1],
            (_, Err(Error::SheetKindMismatch { hashcode: 0x1400_0002, .. }))
        ));
    }

    #[test]
    fn test_read_spreadsheets_without_schema() {
        let archive = GeoArchive::from_bytes(archive_bytes()).unwrap();
        let sheets = archive.read_spreadsheets(None);
        match &sheets[0].1 {
            Ok(SpreadSheet::Data(sheet)) => {
                assert_eq!(sheet.table_count(), 1);
                assert!(sheet.sheets.is_empty());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(GeoArchive::from_bytes(vec![0; 16]).is_err());
    }
}
