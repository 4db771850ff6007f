//! GeoFile container directory.
//!
//! Opening a GeoFile reads the prologue, fixes the byte order and target
//! platform, then walks every category's array descriptor to collect its
//! hashcode list and header records. Payloads are decoded on demand through
//! the `decode_*` methods.

use std::fmt;

use geom_common::{Endian, EndianReader, HashCode};

use crate::array::{ArrayDescriptor, RelArray};
use crate::font::Font;
use crate::header::{Category, CommonHeader, HeaderRecord, SectionHeader, SpreadSheetHeader};
use crate::map::GeoMap;
use crate::sheet::{DataSpreadSheet, SpreadSheetSchema, TextSpreadSheet};
use crate::trigger::Trigger;
use crate::{Error, Result};

/// Magic marker of a big-endian file.
pub const MAGIC_BIG: [u8; 4] = *b"GEOM";
/// Magic marker of a little-endian file (the big-endian marker reversed).
pub const MAGIC_LITTLE: [u8; 4] = *b"MOEG";

/// Determine the byte order from the marker at offset 0.
pub fn detect_endianness(data: &[u8]) -> Result<Endian> {
    let mut marker = [0u8; 4];
    let available = data.len().min(4);
    marker[..available].copy_from_slice(&data[..available]);

    match marker {
        MAGIC_BIG => Ok(Endian::Big),
        MAGIC_LITTLE => Ok(Endian::Little),
        _ => Err(Error::IndeterminateEndianness { marker }),
    }
}

/// Console a GeoFile was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    GameCube,
    PlayStation2,
    Xbox,
}

impl Platform {
    /// Identify the platform from the byte order and first platform-version word.
    pub fn detect(endian: Endian, platform_version: u32) -> Result<Self> {
        match (endian, platform_version) {
            (Endian::Big, 0) => Ok(Platform::GameCube),
            (Endian::Little, 0) => Ok(Platform::PlayStation2),
            (Endian::Little, 1) => Ok(Platform::Xbox),
            _ => Err(Error::IndeterminatePlatform {
                big_endian: endian.is_big(),
                platform_version,
            }),
        }
    }

    /// Alignment of section boundaries on this platform.
    pub const fn section_alignment(self) -> u32 {
        match self {
            Platform::GameCube => 0x20,
            Platform::PlayStation2 | Platform::Xbox => 0x800,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Platform::GameCube => "GameCube",
            Platform::PlayStation2 => "PlayStation 2",
            Platform::Xbox => "Xbox",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed fields at the start of every GeoFile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prologue {
    pub endian: Endian,
    pub hashcode: HashCode,
    pub version: i32,
    pub flags: u32,
    /// Build timestamp, 0 when absent.
    pub raw_timestamp: u32,
    pub file_size: u32,
    pub base_file_size: u32,
    pub platform_versions: [u32; 6],
    pub debug_section_offset: u32,
    pub debug_section_end: u32,
}

impl Prologue {
    /// Versions this decoder understands.
    pub const SUPPORTED_VERSIONS: &'static [i32] = &[240];

    /// Bytes occupied by the magic marker and prologue fields.
    pub const SIZE: usize = 84;

    /// Read the prologue, starting just after the magic marker.
    pub fn read(reader: &mut EndianReader<'_>) -> Result<Self> {
        reader.seek(4);
        let hashcode = HashCode(reader.read_u32()?);
        let version = reader.read_i32()?;
        if !Self::SUPPORTED_VERSIONS.contains(&version) {
            return Err(Error::UnsupportedVersion {
                version,
                supported: Self::SUPPORTED_VERSIONS,
            });
        }

        let flags = reader.read_u32()?;
        let raw_timestamp = reader.read_u32()?;
        let file_size = reader.read_u32()?;
        let base_file_size = reader.read_u32()?;

        let mut platform_versions = [0u32; 6];
        for slot in &mut platform_versions {
            *slot = reader.read_u32()?;
        }

        let debug_section_offset = reader.read_u32()?;
        let debug_section_end = reader.read_u32()?;

        // Runtime pointers, filled in by the engine after load
        reader.advance(6 * 4);

        Ok(Self {
            endian: reader.endian(),
            hashcode,
            version,
            flags,
            raw_timestamp,
            file_size,
            base_file_size,
            platform_versions,
            debug_section_offset,
            debug_section_end,
        })
    }

    /// Build timestamp, if one was recorded.
    pub fn timestamp(&self) -> Option<u32> {
        (self.raw_timestamp != 0).then_some(self.raw_timestamp)
    }

    /// Check if the file carries a debug section.
    pub fn has_debug_section(&self) -> bool {
        self.debug_section_end > self.debug_section_offset
    }
}

impl fmt::Display for Prologue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "hashcode:       {}", self.hashcode)?;
        writeln!(f, "version:        {}", self.version)?;
        writeln!(f, "byte order:     {}", self.endian)?;
        writeln!(f, "flags:          {:#010x}", self.flags)?;
        match self.timestamp() {
            Some(ts) => writeln!(f, "timestamp:      {ts}")?,
            None => writeln!(f, "timestamp:      none")?,
        }
        writeln!(f, "file size:      {:#x}", self.file_size)?;
        writeln!(f, "base file size: {:#x}", self.base_file_size)?;
        writeln!(f, "platform words: {:?}", self.platform_versions)?;
        write!(
            f,
            "debug section:  {:#x}..{:#x}",
            self.debug_section_offset, self.debug_section_end
        )
    }
}

/// A decoded GeoFile directory.
///
/// The directory borrows nothing: payload decoders take the same bytes the
/// directory was parsed from.
///
/// # Example
///
/// ```no_run
/// use geom_file::{Category, GeoFile};
///
/// let data = std::fs::read("level.edb")?;
/// let file = GeoFile::parse(&data)?;
///
/// println!("{} for {}", file.prologue().hashcode, file.platform());
/// for header in file.category_headers(Category::Map) {
///     println!("{header}");
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct GeoFile {
    prologue: Prologue,
    platform: Platform,
    descriptors: [ArrayDescriptor; Category::COUNT],
    texture_updates: RelArray,
    hashcodes: [Vec<HashCode>; Category::COUNT],
    headers: [Vec<HeaderRecord>; Category::COUNT],
}

impl GeoFile {
    /// Open a GeoFile: read the prologue and all category directories.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut file = Self::open(data)?;
        file.populate(data)?;
        Ok(file)
    }

    fn open(data: &[u8]) -> Result<Self> {
        let endian = detect_endianness(data)?;
        let mut reader = EndianReader::new(data, endian);

        let prologue = Prologue::read(&mut reader)?;

        let mut descriptors = [ArrayDescriptor::default(); Category::COUNT];
        for descriptor in &mut descriptors {
            *descriptor = ArrayDescriptor::read(&mut reader)?;
        }
        let texture_updates = RelArray::read(&mut reader)?;

        let platform = Platform::detect(endian, prologue.platform_versions[0])?;

        tracing::debug!(
            hashcode = %prologue.hashcode,
            version = prologue.version,
            %platform,
            %endian,
            "opened GeoFile"
        );

        Ok(Self {
            prologue,
            platform,
            descriptors,
            texture_updates,
            hashcodes: std::array::from_fn(|_| Vec::new()),
            headers: std::array::from_fn(|_| Vec::new()),
        })
    }

    fn populate(&mut self, data: &[u8]) -> Result<()> {
        let mut reader = EndianReader::new(data, self.prologue.endian);

        for category in Category::ALL {
            let descriptor = self.descriptors[category.index()];
            let hashcodes = read_hashcodes(&mut reader, category, &descriptor)?;
            let headers = read_headers(&mut reader, category, &descriptor)?;

            tracing::trace!(
                %category,
                count = headers.len(),
                hashcodes = hashcodes.len(),
                "populated category"
            );

            self.hashcodes[category.index()] = hashcodes;
            self.headers[category.index()] = headers;
        }
        Ok(())
    }

    pub fn prologue(&self) -> &Prologue {
        &self.prologue
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn endian(&self) -> Endian {
        self.prologue.endian
    }

    /// Array descriptor of a category, as stored in the prologue.
    pub fn descriptor(&self, category: Category) -> &ArrayDescriptor {
        &self.descriptors[category.index()]
    }

    /// Texture-update list descriptor.
    pub fn texture_updates(&self) -> &RelArray {
        &self.texture_updates
    }

    /// Hashcodes listed for a category; empty when the category has none.
    pub fn hashcodes(&self, category: Category) -> &[HashCode] {
        &self.hashcodes[category.index()]
    }

    /// Header records of a category, in file order.
    pub fn category_headers(&self, category: Category) -> &[HeaderRecord] {
        &self.headers[category.index()]
    }

    /// Find a header by hashcode within one category.
    pub fn find_header(&self, category: Category, hashcode: HashCode) -> Option<&HeaderRecord> {
        self.category_headers(category)
            .iter()
            .find(|h| h.hashcode() == hashcode)
    }

    pub fn section_headers(&self) -> impl Iterator<Item = &SectionHeader> {
        self.category_headers(Category::Section)
            .iter()
            .filter_map(|h| match h {
                HeaderRecord::Section(s) => Some(s),
                _ => None,
            })
    }

    pub fn spreadsheet_headers(&self) -> impl Iterator<Item = &SpreadSheetHeader> {
        self.category_headers(Category::SpreadSheet)
            .iter()
            .filter_map(|h| match h {
                HeaderRecord::SpreadSheet(s) => Some(s),
                _ => None,
            })
    }

    pub fn map_headers(&self) -> impl Iterator<Item = &CommonHeader> {
        self.category_headers(Category::Map)
            .iter()
            .filter_map(|h| match h {
                HeaderRecord::Map(c) => Some(c),
                _ => None,
            })
    }

    pub fn font_headers(&self) -> impl Iterator<Item = &CommonHeader> {
        self.category_headers(Category::Font)
            .iter()
            .filter_map(|h| match h {
                HeaderRecord::Font(c) => Some(c),
                _ => None,
            })
    }

    /// Section header by index into the section list.
    pub fn section(&self, index: i64) -> Result<&SectionHeader> {
        let sections = self.category_headers(Category::Section);
        usize::try_from(index)
            .ok()
            .and_then(|i| sections.get(i))
            .and_then(|h| match h {
                HeaderRecord::Section(s) => Some(s),
                _ => None,
            })
            .ok_or(Error::SectionOutOfRange {
                index,
                count: sections.len(),
            })
    }

    /// Decode the tables of a data spreadsheet.
    ///
    /// Without a schema only the table pointers are enumerated.
    pub fn decode_table(
        &self,
        data: &[u8],
        header: &SpreadSheetHeader,
        schema: Option<&SpreadSheetSchema>,
    ) -> Result<DataSpreadSheet> {
        DataSpreadSheet::read(&self.reader(data), header, schema)
    }

    /// Decode the localized strings of a text spreadsheet.
    pub fn decode_text_sheet(&self, data: &[u8], header: &SpreadSheetHeader) -> Result<TextSpreadSheet> {
        TextSpreadSheet::read(self, &self.reader(data), header)
    }

    /// Decode a single trigger record at an absolute address.
    pub fn decode_trigger(&self, data: &[u8], address: u64) -> Result<Trigger> {
        let mut reader = self.reader(data);
        reader.seek(address as usize);
        Trigger::read(&mut reader)
    }

    /// Decode a map's header and trigger table.
    pub fn decode_map(&self, data: &[u8], header: &CommonHeader) -> Result<GeoMap> {
        GeoMap::read(&self.reader(data), header)
    }

    /// Decode a font's glyph table.
    pub fn decode_font(&self, data: &[u8], header: &CommonHeader) -> Result<Font> {
        Font::read(&self.reader(data), header)
    }

    fn reader<'a>(&self, data: &'a [u8]) -> EndianReader<'a> {
        EndianReader::new(data, self.prologue.endian)
    }
}

fn read_hashcodes(
    reader: &mut EndianReader<'_>,
    category: Category,
    descriptor: &ArrayDescriptor,
) -> Result<Vec<HashCode>> {
    if descriptor.hash_count >= 0 {
        return Ok(Vec::new());
    }

    let base = descriptor.pointer.try_resolve(category.as_str())?;
    let address = base
        .checked_add_signed(descriptor.hash_count as i64 * 4)
        .ok_or(Error::AddressUnderflow {
            anchor: descriptor.pointer.anchor,
            offset: descriptor
                .pointer
                .offset
                .wrapping_add(descriptor.hash_count as i32 * 4),
        })?;

    reader.seek(address as usize);
    (0..descriptor.hash_block_len())
        .map(|_| Ok(HashCode(reader.read_u32()?)))
        .collect()
}

fn read_headers(
    reader: &mut EndianReader<'_>,
    category: Category,
    descriptor: &ArrayDescriptor,
) -> Result<Vec<HeaderRecord>> {
    if descriptor.is_empty() {
        return Ok(Vec::new());
    }

    let mut address = descriptor.pointer.try_resolve(category.as_str())?;
    let mut headers = Vec::with_capacity(descriptor.len());
    for _ in 0..descriptor.len() {
        reader.seek(address as usize);
        let record = HeaderRecord::read(category, reader)?;
        address += record.record_size();
        headers.push(record);
    }
    Ok(headers)
}
