//! Text spreadsheets.
//!
//! A text spreadsheet lists the sections holding its strings. Text sections
//! are numbered from the section after the one holding the list, so each can
//! be loaded separately (one per language, for instance).

use std::fmt;

use geom_common::{EndianReader, HashCode};

use crate::directory::GeoFile;
use crate::header::{SheetKind, SpreadSheetHeader};
use crate::pointer::RelPtr;
use crate::{Error, Result};

/// One localized string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextItem {
    pub hashcode: HashCode,
    pub text: String,
    /// Two words of game data, when the item has any.
    pub user_data: Option<[u32; 2]>,
    pub sound_hashcode: HashCode,
}

/// Strings stored in one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSection {
    pub hashcode: HashCode,
    /// Section number relative to the spreadsheet's own section.
    pub section: i32,
    pub items: Vec<TextItem>,
}

impl TextSection {
    /// Bytes before the item count at the start of a text section.
    const PREAMBLE: usize = 0x14;
    /// Bytes per item descriptor.
    const ITEM_SIZE: usize = 16;

    fn read(reader: &mut EndianReader<'_>, hashcode: HashCode, section: i32) -> Result<Self> {
        reader.advance(Self::PREAMBLE);
        let count = reader.read_i32()?.max(0);

        let mut descriptors =
            Vec::with_capacity((count as usize).min(reader.remaining() / Self::ITEM_SIZE));
        for _ in 0..count {
            descriptors.push((
                HashCode(reader.read_u32()?),
                RelPtr::read(reader)?,
                RelPtr::read(reader)?,
                HashCode(reader.read_u32()?),
            ));
        }

        let mut items = Vec::with_capacity(descriptors.len());
        for (hashcode, string, user_data, sound_hashcode) in descriptors {
            reader.seek(string.try_resolve("text string")? as usize);
            let text = reader.read_utf16_cstring()?;

            let user_data = match user_data.resolve() {
                Some(address) => {
                    reader.seek(address as usize);
                    Some([reader.read_u32()?, reader.read_u32()?])
                }
                None => None,
            };

            items.push(TextItem {
                hashcode,
                text,
                user_data,
                sound_hashcode,
            });
        }

        Ok(Self {
            hashcode,
            section,
            items,
        })
    }

    /// Find a string by hashcode.
    pub fn get(&self, hashcode: HashCode) -> Option<&str> {
        self.items
            .iter()
            .find(|item| item.hashcode == hashcode)
            .map(|item| item.text.as_str())
    }
}

impl fmt::Display for TextSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hashcode | User Data            | Text")?;
        writeln!(f, "--------------------------------------")?;
        for item in &self.items {
            let [a, b] = item.user_data.unwrap_or_default();
            writeln!(f, "{} | [{a:>8X}, {b:>8X}] | {}", item.hashcode, item.text)?;
        }
        Ok(())
    }
}

/// A decoded text spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpreadSheet {
    pub hashcode: HashCode,
    pub address: u64,
    pub sections: Vec<TextSection>,
}

impl TextSpreadSheet {
    /// Bytes per entry of the section list.
    const ENTRY_SIZE: usize = 8;

    /// Decode the text spreadsheet a header points at.
    pub fn read(file: &GeoFile, reader: &EndianReader<'_>, header: &SpreadSheetHeader) -> Result<Self> {
        if header.kind != SheetKind::Text {
            return Err(Error::SheetKindMismatch {
                hashcode: header.common.hashcode.value(),
                expected: SheetKind::Text.to_string(),
                actual: header.kind.to_string(),
            });
        }

        let mut reader = reader.clone();
        let address = header.common.address as u64;
        reader.seek(address as usize);

        let count = reader.read_i32()?.max(0);
        let mut entries =
            Vec::with_capacity((count as usize).min(reader.remaining() / Self::ENTRY_SIZE));
        for _ in 0..count {
            entries.push((HashCode(reader.read_u32()?), reader.read_i32()?));
        }

        let mut sections = Vec::with_capacity(entries.len());
        for (hashcode, section) in entries {
            let index = header.common.section as i64 + section as i64 + 1;
            let bounds = file.section(index)?;
            reader.seek(bounds.start_offset as usize);
            sections.push(TextSection::read(&mut reader, hashcode, section)?);
        }

        Ok(Self {
            hashcode: header.common.hashcode,
            address,
            sections,
        })
    }
}

impl fmt::Display for TextSpreadSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Text SpreadSheet {}, Sections: {}",
            self.hashcode,
            self.sections.len()
        )?;
        for section in &self.sections {
            writeln!(f, "Text Section {}:", section.hashcode)?;
            writeln!(f, "{section}")?;
        }
        Ok(())
    }
}
