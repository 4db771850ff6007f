//! Per-category header records.
//!
//! Each asset category stores a run of fixed-size header records located
//! through the directory's [`ArrayDescriptor`](crate::ArrayDescriptor).
//! Most categories extend a common 0x10-byte element with trailing fields;
//! sections and scripts use their own 0x10-byte layouts.

use std::fmt;

use geom_common::{EndianReader, HashCode};

use crate::pointer::RelPtr;
use crate::Result;

/// Asset categories, in the order their descriptors appear in the prologue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Section,
    RefPointer,
    Entity,
    Anim,
    AnimSkin,
    Script,
    Map,
    AnimMode,
    AnimSet,
    Particle,
    Swoosh,
    SpreadSheet,
    Font,
    Texture,
}

impl Category {
    /// Number of categories.
    pub const COUNT: usize = 14;

    /// All categories in prologue order.
    pub const ALL: [Category; Self::COUNT] = [
        Category::Section,
        Category::RefPointer,
        Category::Entity,
        Category::Anim,
        Category::AnimSkin,
        Category::Script,
        Category::Map,
        Category::AnimMode,
        Category::AnimSet,
        Category::Particle,
        Category::Swoosh,
        Category::SpreadSheet,
        Category::Font,
        Category::Texture,
    ];

    /// Position of this category's descriptor in the prologue.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// On-disk size of one header record of this category.
    pub const fn record_size(self) -> u64 {
        match self {
            Category::Section | Category::Script => 0x10,
            Category::RefPointer
            | Category::Map
            | Category::Particle
            | Category::Swoosh
            | Category::Font => CommonHeader::SIZE,
            Category::Entity
            | Category::AnimMode
            | Category::AnimSet
            | Category::SpreadSheet => CommonHeader::SIZE + 0x4,
            Category::AnimSkin | Category::Texture => CommonHeader::SIZE + 0xC,
            Category::Anim => CommonHeader::SIZE + 0x10,
        }
    }

    /// Lowercase name, as accepted by [`FromStr`](std::str::FromStr).
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Section => "section",
            Category::RefPointer => "ref-pointer",
            Category::Entity => "entity",
            Category::Anim => "anim",
            Category::AnimSkin => "anim-skin",
            Category::Script => "script",
            Category::Map => "map",
            Category::AnimMode => "anim-mode",
            Category::AnimSet => "anim-set",
            Category::Particle => "particle",
            Category::Swoosh => "swoosh",
            Category::SpreadSheet => "spreadsheet",
            Category::Font => "font",
            Category::Texture => "texture",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// Kind of spreadsheet a spreadsheet header announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SheetKind {
    /// Localized text split across loadable sections.
    Text,
    /// User-defined tables decoded against a schema.
    Data,
    /// Any other stored value.
    Unknown(i32),
}

impl SheetKind {
    /// Interpret the stored kind value.
    pub const fn from_raw(value: i32) -> Self {
        match value {
            1 => SheetKind::Text,
            2 => SheetKind::Data,
            other => SheetKind::Unknown(other),
        }
    }
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetKind::Text => f.write_str("text"),
            SheetKind::Data => f.write_str("data"),
            SheetKind::Unknown(v) => write!(f, "unknown ({v})"),
        }
    }
}

/// Fields shared by most header records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommonHeader {
    /// File offset of the record.
    pub header_address: u64,
    pub hashcode: HashCode,
    /// Section holding the payload.
    pub section: i16,
    pub debug: i16,
    /// Absolute file offset of the payload.
    pub address: u32,
}

impl CommonHeader {
    /// Size of the common element on disk.
    pub const SIZE: u64 = 0x10;

    /// Read the common element; consumes all 0x10 bytes.
    pub fn read(reader: &mut EndianReader<'_>) -> Result<Self> {
        let header_address = reader.position() as u64;
        let hashcode = HashCode(reader.read_u32()?);
        let section = reader.read_i16()?;
        let debug = reader.read_i16()?;
        let address = reader.read_u32()?;
        // Runtime pointer slot
        reader.advance(4);
        Ok(Self {
            header_address,
            hashcode,
            section,
            debug,
            address,
        })
    }
}

/// Section bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader {
    pub header_address: u64,
    pub hashcode: HashCode,
    pub start_offset: u32,
    pub end_offset: u32,
}

impl SectionHeader {
    pub fn read(reader: &mut EndianReader<'_>) -> Result<Self> {
        Ok(Self {
            header_address: reader.position() as u64,
            hashcode: HashCode(reader.read_u32()?),
            start_offset: reader.read_u32()?,
            end_offset: reader.read_u32()?,
        })
    }

    /// Length of the section in bytes.
    pub fn len(&self) -> u32 {
        self.end_offset.saturating_sub(self.start_offset)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Script header: the common layout without the trailing runtime slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptHeader {
    pub header_address: u64,
    pub hashcode: HashCode,
    pub section: i16,
    pub debug: i16,
    pub address: u32,
}

impl ScriptHeader {
    pub fn read(reader: &mut EndianReader<'_>) -> Result<Self> {
        Ok(Self {
            header_address: reader.position() as u64,
            hashcode: HashCode(reader.read_u32()?),
            section: reader.read_i16()?,
            debug: reader.read_i16()?,
            address: reader.read_u32()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityHeader {
    pub common: CommonHeader,
    /// Pointer to the level-of-detail table.
    pub lod_table: RelPtr,
}

impl EntityHeader {
    pub fn read(reader: &mut EndianReader<'_>) -> Result<Self> {
        Ok(Self {
            common: CommonHeader::read(reader)?,
            lod_table: RelPtr::read(reader)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimHeader {
    pub common: CommonHeader,
    pub motion_data_info: u32,
    pub data_size: u32,
    pub skin_count: u32,
}

impl AnimHeader {
    pub fn read(reader: &mut EndianReader<'_>) -> Result<Self> {
        let common = CommonHeader::read(reader)?;
        let motion_data_info = reader.read_u32()?;
        reader.advance(4);
        Ok(Self {
            common,
            motion_data_info,
            data_size: reader.read_u32()?,
            skin_count: reader.read_u32()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimSkinHeader {
    pub common: CommonHeader,
    pub base_skin: u32,
    pub mip_ref: u32,
    pub mip_distance: f32,
}

impl AnimSkinHeader {
    pub fn read(reader: &mut EndianReader<'_>) -> Result<Self> {
        Ok(Self {
            common: CommonHeader::read(reader)?,
            base_skin: reader.read_u32()?,
            mip_ref: reader.read_u32()?,
            mip_distance: reader.read_f32()?,
        })
    }
}

/// Anim-mode and anim-set headers: common element plus an entry count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountedHeader {
    pub common: CommonHeader,
    pub count: u32,
}

impl CountedHeader {
    pub fn read(reader: &mut EndianReader<'_>) -> Result<Self> {
        Ok(Self {
            common: CommonHeader::read(reader)?,
            count: reader.read_u32()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpreadSheetHeader {
    pub common: CommonHeader,
    pub kind: SheetKind,
}

impl SpreadSheetHeader {
    pub fn read(reader: &mut EndianReader<'_>) -> Result<Self> {
        let common = CommonHeader::read(reader)?;
        let kind = SheetKind::from_raw(reader.read_i32()?);
        if let SheetKind::Unknown(value) = kind {
            tracing::warn!(
                hashcode = %common.hashcode,
                value,
                "spreadsheet header has an unknown sheet kind"
            );
        }
        Ok(Self { common, kind })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureHeader {
    pub common: CommonHeader,
    pub width: u16,
    pub height: u16,
    pub game_flags: u32,
    pub flags: u32,
}

impl TextureHeader {
    pub fn read(reader: &mut EndianReader<'_>) -> Result<Self> {
        Ok(Self {
            common: CommonHeader::read(reader)?,
            width: reader.read_u16()?,
            height: reader.read_u16()?,
            game_flags: reader.read_u32()?,
            flags: reader.read_u32()?,
        })
    }
}

/// A decoded header record of any category.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderRecord {
    Section(SectionHeader),
    RefPointer(CommonHeader),
    Entity(EntityHeader),
    Anim(AnimHeader),
    AnimSkin(AnimSkinHeader),
    Script(ScriptHeader),
    Map(CommonHeader),
    AnimMode(CountedHeader),
    AnimSet(CountedHeader),
    Particle(CommonHeader),
    Swoosh(CommonHeader),
    SpreadSheet(SpreadSheetHeader),
    Font(CommonHeader),
    Texture(TextureHeader),
}

impl HeaderRecord {
    /// Decode one record of `category` at the reader's position.
    pub fn read(category: Category, reader: &mut EndianReader<'_>) -> Result<Self> {
        Ok(match category {
            Category::Section => HeaderRecord::Section(SectionHeader::read(reader)?),
            Category::RefPointer => HeaderRecord::RefPointer(CommonHeader::read(reader)?),
            Category::Entity => HeaderRecord::Entity(EntityHeader::read(reader)?),
            Category::Anim => HeaderRecord::Anim(AnimHeader::read(reader)?),
            Category::AnimSkin => HeaderRecord::AnimSkin(AnimSkinHeader::read(reader)?),
            Category::Script => HeaderRecord::Script(ScriptHeader::read(reader)?),
            Category::Map => HeaderRecord::Map(CommonHeader::read(reader)?),
            Category::AnimMode => HeaderRecord::AnimMode(CountedHeader::read(reader)?),
            Category::AnimSet => HeaderRecord::AnimSet(CountedHeader::read(reader)?),
            Category::Particle => HeaderRecord::Particle(CommonHeader::read(reader)?),
            Category::Swoosh => HeaderRecord::Swoosh(CommonHeader::read(reader)?),
            Category::SpreadSheet => HeaderRecord::SpreadSheet(SpreadSheetHeader::read(reader)?),
            Category::Font => HeaderRecord::Font(CommonHeader::read(reader)?),
            Category::Texture => HeaderRecord::Texture(TextureHeader::read(reader)?),
        })
    }

    /// Category this record belongs to.
    pub const fn category(&self) -> Category {
        match self {
            HeaderRecord::Section(_) => Category::Section,
            HeaderRecord::RefPointer(_) => Category::RefPointer,
            HeaderRecord::Entity(_) => Category::Entity,
            HeaderRecord::Anim(_) => Category::Anim,
            HeaderRecord::AnimSkin(_) => Category::AnimSkin,
            HeaderRecord::Script(_) => Category::Script,
            HeaderRecord::Map(_) => Category::Map,
            HeaderRecord::AnimMode(_) => Category::AnimMode,
            HeaderRecord::AnimSet(_) => Category::AnimSet,
            HeaderRecord::Particle(_) => Category::Particle,
            HeaderRecord::Swoosh(_) => Category::Swoosh,
            HeaderRecord::SpreadSheet(_) => Category::SpreadSheet,
            HeaderRecord::Font(_) => Category::Font,
            HeaderRecord::Texture(_) => Category::Texture,
        }
    }

    /// On-disk size of this record, used to stride to the next one.
    #[inline]
    pub const fn record_size(&self) -> u64 {
        self.category().record_size()
    }

    /// The common element, for categories that have one.
    pub fn common(&self) -> Option<&CommonHeader> {
        match self {
            HeaderRecord::RefPointer(c)
            | HeaderRecord::Map(c)
            | HeaderRecord::Particle(c)
            | HeaderRecord::Swoosh(c)
            | HeaderRecord::Font(c) => Some(c),
            HeaderRecord::Entity(h) => Some(&h.common),
            HeaderRecord::Anim(h) => Some(&h.common),
            HeaderRecord::AnimSkin(h) => Some(&h.common),
            HeaderRecord::AnimMode(h) | HeaderRecord::AnimSet(h) => Some(&h.common),
            HeaderRecord::SpreadSheet(h) => Some(&h.common),
            HeaderRecord::Texture(h) => Some(&h.common),
            HeaderRecord::Section(_) | HeaderRecord::Script(_) => None,
        }
    }

    /// File offset of the record.
    pub fn header_address(&self) -> u64 {
        match self {
            HeaderRecord::Section(h) => h.header_address,
            HeaderRecord::Script(h) => h.header_address,
            other => other.common().map_or(0, |c| c.header_address),
        }
    }

    /// Hashcode identifying the asset.
    pub fn hashcode(&self) -> HashCode {
        match self {
            HeaderRecord::Section(h) => h.hashcode,
            HeaderRecord::Script(h) => h.hashcode,
            other => other.common().map_or(HashCode::default(), |c| c.hashcode),
        }
    }

    /// Absolute payload address, for categories that store one.
    pub fn payload_address(&self) -> Option<u32> {
        match self {
            HeaderRecord::Section(_) => None,
            HeaderRecord::Script(h) => Some(h.address),
            other => other.common().map(|c| c.address),
        }
    }
}

impl fmt::Display for HeaderRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} @ {:#x}", self.category(), self.hashcode(), self.header_address())?;
        match self {
            HeaderRecord::Section(h) => {
                write!(f, " | {:#x}..{:#x}", h.start_offset, h.end_offset)
            }
            HeaderRecord::Script(h) => {
                write!(f, " | section {} | data {:#x}", h.section, h.address)
            }
            HeaderRecord::SpreadSheet(h) => write!(
                f,
                " | section {} | data {:#x} | {} sheet",
                h.common.section, h.common.address, h.kind
            ),
            HeaderRecord::Texture(h) => write!(
                f,
                " | section {} | data {:#x} | {}x{}",
                h.common.section, h.common.address, h.width, h.height
            ),
            HeaderRecord::AnimMode(h) | HeaderRecord::AnimSet(h) => write!(
                f,
                " | section {} | data {:#x} | {} entries",
                h.common.section, h.common.address, h.count
            ),
            other => match other.common() {
                Some(c) => write!(f, " | section {} | data {:#x}", c.section, c.address),
                None => Ok(()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use geom_common::Endian;

    use super::*;
    use crate::testing::ByteWriter;

    fn common(w: &mut ByteWriter, hash: u32, section: i16, address: u32) {
        w.u32(hash).i16(section).i16(-1).u32(address).u32(0xDEAD_BEEF);
    }

    #[test]
    fn test_record_sizes() {
        assert_eq!(Category::Section.record_size(), 0x10);
        assert_eq!(Category::Script.record_size(), 0x10);
        assert_eq!(Category::Map.record_size(), 0x10);
        assert_eq!(Category::Entity.record_size(), 0x14);
        assert_eq!(Category::SpreadSheet.record_size(), 0x14);
        assert_eq!(Category::AnimSkin.record_size(), 0x1C);
        assert_eq!(Category::Texture.record_size(), 0x1C);
        assert_eq!(Category::Anim.record_size(), 0x20);
    }

    #[test]
    fn test_each_reader_consumes_record_size() {
        let data = vec![0u8; 0x40];
        for category in Category::ALL {
            let mut reader = EndianReader::new(&data, Endian::Big);
            let record = HeaderRecord::read(category, &mut reader).unwrap();
            assert_eq!(record.category(), category);
            // Sections and scripts leave trailing padding unread
            assert!(reader.position() as u64 <= category.record_size(), "{category}");
            if !matches!(category, Category::Section | Category::Script) {
                assert_eq!(reader.position() as u64, category.record_size(), "{category}");
            }
        }
    }

    #[test]
    fn test_read_common_header() {
        let mut w = ByteWriter::new(Endian::Little);
        w.zeros(8);
        common(&mut w, 0x0500_0001, 3, 0x800);
        let data = w.finish();

        let mut reader = EndianReader::new_at(&data, 8, Endian::Little);
        let record = HeaderRecord::read(Category::Map, &mut reader).unwrap();
        assert_eq!(record.header_address(), 8);
        assert_eq!(record.hashcode(), HashCode(0x0500_0001));
        assert_eq!(record.payload_address(), Some(0x800));
        let c = record.common().unwrap();
        assert_eq!(c.section, 3);
        assert_eq!(c.debug, -1);
    }

    #[test]
    fn test_read_anim_skips_runtime_word() {
        let mut w = ByteWriter::new(Endian::Big);
        common(&mut w, 0x0300_0002, 1, 0x100);
        w.u32(7).u32(0xFFFF_FFFF).u32(0x400).u32(2);
        let data = w.finish();

        let mut reader = EndianReader::new(&data, Endian::Big);
        match HeaderRecord::read(Category::Anim, &mut reader).unwrap() {
            HeaderRecord::Anim(h) => {
                assert_eq!(h.motion_data_info, 7);
                assert_eq!(h.data_size, 0x400);
                assert_eq!(h.skin_count, 2);
            }
            other => panic!("unexpected record: {other:?}"),
        }
    }

    #[test]
    fn test_read_texture_and_entity() {
        let mut w = ByteWriter::new(Endian::Big);
        common(&mut w, 0x0D00_0001, 0, 0x100);
        w.u16(256).u16(128).u32(1).u32(2);
        common(&mut w, 0x0200_0001, 0, 0x200);
        w.i32(-0x10);
        let data = w.finish();

        let mut reader = EndianReader::new(&data, Endian::Big);
        let texture = HeaderRecord::read(Category::Texture, &mut reader).unwrap();
        let entity = HeaderRecord::read(Category::Entity, &mut reader).unwrap();

        match texture {
            HeaderRecord::Texture(t) => {
                assert_eq!((t.width, t.height, t.game_flags, t.flags), (256, 128, 1, 2));
            }
            other => panic!("unexpected record: {other:?}"),
        }
        match entity {
            HeaderRecord::Entity(e) => {
                assert_eq!(e.lod_table.anchor, 0x2C);
                assert_eq!(e.lod_table.resolve(), Some(0x1C));
            }
            other => panic!("unexpected record: {other:?}"),
        }
    }

    #[test]
    fn test_sheet_kind() {
        assert_eq!(SheetKind::from_raw(1), SheetKind::Text);
        assert_eq!(SheetKind::from_raw(2), SheetKind::Data);
        assert_eq!(SheetKind::from_raw(9), SheetKind::Unknown(9));
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("spreadsheet".parse::<Category>().unwrap(), Category::SpreadSheet);
        assert_eq!("Anim-Skin".parse::<Category>().unwrap(), Category::AnimSkin);
        assert!("bogus".parse::<Category>().is_err());
        for (i, c) in Category::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
    }
}
