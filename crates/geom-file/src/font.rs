//! Font glyph tables.

use std::fmt;

use geom_common::{EndianReader, HashCode};

use crate::header::CommonHeader;
use crate::pointer::RelPtr;
use crate::Result;

/// A character a font can render, with its scale word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontChar {
    /// UTF-16 code unit.
    pub code: u16,
    pub scaling: u32,
}

impl FontChar {
    pub fn as_char(&self) -> char {
        char::from_u32(self.code as u32).unwrap_or(char::REPLACEMENT_CHARACTER)
    }
}

/// A decoded font.
///
/// Characters are found through a two-level table indexed by the high and
/// low byte of the code unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    pub hashcode: HashCode,
    pub address: u64,
    pub texture_index: u32,
    pub chars: Vec<FontChar>,
}

impl Font {
    const PAGES: usize = 256;

    pub fn read(reader: &EndianReader<'_>, header: &CommonHeader) -> Result<Self> {
        let mut reader = reader.clone();
        let address = header.address as u64;
        reader.seek(address as usize);

        let texture_index = reader.read_u32()?;
        let pages = (0..Self::PAGES)
            .map(|_| RelPtr::read(&mut reader))
            .collect::<Result<Vec<_>>>()?;

        let mut chars = Vec::new();
        for (hi, page) in pages.iter().enumerate() {
            if page.is_null() {
                continue;
            }
            reader.seek(page.try_resolve("font page")? as usize);
            for lo in 0..Self::PAGES {
                let scaling = reader.read_u32()?;
                if scaling != 0 {
                    chars.push(FontChar {
                        code: ((hi << 8) | lo) as u16,
                        scaling,
                    });
                }
            }
        }

        Ok(Self {
            hashcode: header.hashcode,
            address,
            texture_index,
            chars,
        })
    }

    pub fn supports(&self, c: char) -> bool {
        u16::try_from(c as u32).is_ok_and(|code| self.chars.iter().any(|fc| fc.code == code))
    }
}

impl fmt::Display for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hashcode: {}", self.hashcode)?;
        writeln!(f, "Texture Index: {}", self.texture_index)?;
        writeln!(f, "Supported Characters:")?;
        for line in self.chars.chunks(32) {
            let text: String = line.iter().map(FontChar::as_char).collect();
            writeln!(f, "{text}")?;
        }
        Ok(())
    }
}
