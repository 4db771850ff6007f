//! Map trigger records.
//!
//! A trigger's on-disk size depends on its flags word: each of the 16 data
//! slots, 8 link slots and four optional trailing fields is only stored
//! when its bit is set, in bit order.

use std::fmt;

use bitflags::bitflags;
use geom_common::{EndianReader, HashCode, Rgba, Var32, Vec3};

use crate::Result;

bitflags! {
    /// Presence flags of a trigger's optional fields.
    ///
    /// Bits 0-15 select data slots and bits 16-23 select link slots.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TriggerFlags: u32 {
        const DATA = 0x0000_FFFF;
        const LINKS = 0x00FF_0000;
        const GFX_HASH = 1 << 24;
        const GEO_HASH = 1 << 25;
        const SCRIPT = 1 << 26;
        const TINT = 1 << 28;
    }
}

impl TriggerFlags {
    /// Flag selecting data slot `index`.
    pub fn data_slot(index: usize) -> Option<Self> {
        (index < Trigger::DATA_SLOTS).then(|| Self::from_bits_retain(1 << index))
    }

    /// Flag selecting link slot `index`.
    pub fn link_slot(index: usize) -> Option<Self> {
        (index < Trigger::LINK_SLOTS).then(|| Self::from_bits_retain(1 << (16 + index)))
    }
}

/// A decoded trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    /// File offset of the record.
    pub address: u64,
    pub type_index: u16,
    pub debug: u16,
    pub game_flags: u32,
    pub flags: TriggerFlags,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    data: [u32; Trigger::DATA_SLOTS],
    links: [u16; Trigger::LINK_SLOTS],
    gfx_hash: u32,
    geo_hash: u32,
    script_index: u32,
    tint: Rgba,
}

impl Trigger {
    pub const DATA_SLOTS: usize = 16;
    pub const LINK_SLOTS: usize = 8;

    /// Size of the fields every trigger stores.
    pub const FIXED_SIZE: usize = 12 + 3 * 12;

    /// Decode a trigger at the reader's position.
    pub fn read(reader: &mut EndianReader<'_>) -> Result<Self> {
        let address = reader.position() as u64;
        let type_index = reader.read_u16()?;
        let debug = reader.read_u16()?;
        let game_flags = reader.read_u32()?;
        let flags = TriggerFlags::from_bits_retain(reader.read_u32()?);

        let position = Vec3::read(reader)?;
        let rotation = Vec3::read(reader)?;
        let scale = Vec3::read(reader)?;

        let mut trigger = Self {
            address,
            type_index,
            debug,
            game_flags,
            flags,
            position,
            rotation,
            scale,
            data: [0; Self::DATA_SLOTS],
            links: [0; Self::LINK_SLOTS],
            gfx_hash: 0,
            geo_hash: 0,
            script_index: 0,
            tint: Rgba::default(),
        };

        for i in 0..Self::DATA_SLOTS {
            if trigger.has_data(i) {
                trigger.data[i] = reader.read_u32()?;
            }
        }
        for i in 0..Self::LINK_SLOTS {
            if trigger.has_link(i) {
                // Stored as a full word; only the low half is the trigger index
                trigger.links[i] = reader.read_u32()? as u16;
            }
        }
        if flags.contains(TriggerFlags::GFX_HASH) {
            trigger.gfx_hash = reader.read_u32()?;
        }
        if flags.contains(TriggerFlags::GEO_HASH) {
            trigger.geo_hash = reader.read_u32()?;
        }
        if flags.contains(TriggerFlags::SCRIPT) {
            trigger.script_index = reader.read_u32()?;
        }
        if flags.contains(TriggerFlags::TINT) {
            trigger.tint = reader.read_struct()?;
        }

        Ok(trigger)
    }

    /// Check if data slot `index` is stored. Out-of-range indices are absent.
    pub fn has_data(&self, index: usize) -> bool {
        TriggerFlags::data_slot(index).is_some_and(|bit| self.flags.contains(bit))
    }

    /// Value of data slot `index`, if stored.
    pub fn data(&self, index: usize) -> Option<Var32> {
        self.has_data(index)
            .then(|| Var32::from_bits(self.data[index]))
    }

    /// Number of stored data slots.
    pub fn count_data(&self) -> usize {
        (self.flags.bits() & TriggerFlags::DATA.bits()).count_ones() as usize
    }

    /// Check if link slot `index` is stored.
    pub fn has_link(&self, index: usize) -> bool {
        TriggerFlags::link_slot(index).is_some_and(|bit| self.flags.contains(bit))
    }

    /// Trigger index in link slot `index`, if stored.
    pub fn link(&self, index: usize) -> Option<u16> {
        self.has_link(index).then(|| self.links[index])
    }

    pub fn count_links(&self) -> usize {
        (self.flags.bits() & TriggerFlags::LINKS.bits()).count_ones() as usize
    }

    pub fn has_gfx_hash(&self) -> bool {
        self.flags.contains(TriggerFlags::GFX_HASH)
    }

    pub fn gfx_hash(&self) -> Option<HashCode> {
        self.has_gfx_hash().then_some(HashCode(self.gfx_hash))
    }

    pub fn has_geo_hash(&self) -> bool {
        self.flags.contains(TriggerFlags::GEO_HASH)
    }

    pub fn geo_hash(&self) -> Option<HashCode> {
        self.has_geo_hash().then_some(HashCode(self.geo_hash))
    }

    pub fn has_script(&self) -> bool {
        self.flags.contains(TriggerFlags::SCRIPT)
    }

    /// Index into the map's trigger script table.
    pub fn script_index(&self) -> Option<u32> {
        self.has_script().then_some(self.script_index)
    }

    pub fn has_tint(&self) -> bool {
        self.flags.contains(TriggerFlags::TINT)
    }

    pub fn tint(&self) -> Option<Rgba> {
        self.has_tint().then_some(self.tint)
    }

    /// Present data slots with their indices.
    pub fn data_slots(&self) -> impl Iterator<Item = (usize, Var32)> + '_ {
        (0..Self::DATA_SLOTS).filter_map(|i| self.data(i).map(|v| (i, v)))
    }

    /// Present link slots with their indices.
    pub fn link_slots(&self) -> impl Iterator<Item = (usize, u16)> + '_ {
        (0..Self::LINK_SLOTS).filter_map(|i| self.link(i).map(|v| (i, v)))
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type {} @ {:#x} | flags {:#010x} | pos {}",
            self.type_index,
            self.address,
            self.flags.bits(),
            self.position
        )?;
        for (i, value) in self.data_slots() {
            write!(f, " | d{i}={value}")?;
        }
        for (i, link) in self.link_slots() {
            write!(f, " | l{i}={link}")?;
        }
        if let Some(hash) = self.gfx_hash() {
            write!(f, " | gfx {hash}")?;
        }
        if let Some(hash) = self.geo_hash() {
            write!(f, " | geo {hash}")?;
        }
        if let Some(script) = self.script_index() {
            write!(f, " | script {script}")?;
        }
        if let Some(tint) = self.tint() {
            write!(f, " | tint {tint}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use geom_common::Endian;

    use super::*;
    use crate::testing::ByteWriter;

    fn fixed(w: &mut ByteWriter, flags: u32) {
        w.u16(3).u16(0).u32(0x40).u32(flags);
        for v in [1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0] {
            w.f32(v);
        }
    }

    #[test]
    fn test_single_data_slot() {
        let mut w = ByteWriter::new(Endian::Big);
        fixed(&mut w, 0b01);
        w.u32(0).u32(0xFFFF_FFFF);
        let data = w.finish();

        let mut reader = EndianReader::new(&data, Endian::Big);
        let trigger = Trigger::read(&mut reader).unwrap();

        assert!(trigger.has_data(0));
        assert!(!trigger.has_data(1));
        // Present and zero is still present
        assert_eq!(trigger.data(0), Some(Var32::from_bits(0)));
        assert_eq!(trigger.data(1), None);
        assert_eq!(trigger.count_data(), 1);
        assert_eq!(reader.position(), Trigger::FIXED_SIZE + 4);
        assert_eq!(reader.position(), 52);
        assert_eq!(trigger.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_all_optional_fields() {
        let flags = (1 << 3) | (1 << 15) | (1 << 17) | (0xF << 24) | (1 << 28);
        for endian in [Endian::Big, Endian::Little] {
            let mut w = ByteWriter::new(endian);
            fixed(&mut w, flags);
            w.f32(0.25).i32(-4); // data 3, 15
            w.u32(0xABCD_0007); // link 1
            w.u32(0x0300_0001).u32(0x0100_0002).u32(5);
            w.raw(&[0x10, 0x20, 0x30, 0xFF]);
            let data = w.finish();

            let mut reader = EndianReader::new(&data, endian);
            let trigger = Trigger::read(&mut reader).unwrap();
            assert_eq!(reader.position(), data.len());

            assert_eq!(trigger.data(3).map(Var32::as_f32), Some(0.25));
            assert_eq!(trigger.data(15).map(Var32::as_i32), Some(-4));
            assert_eq!(trigger.count_data(), 2);
            assert_eq!(trigger.link(1), Some(7));
            assert_eq!(trigger.link(0), None);
            assert_eq!(trigger.count_links(), 1);
            assert_eq!(trigger.gfx_hash(), Some(HashCode(0x0300_0001)));
            assert_eq!(trigger.geo_hash(), Some(HashCode(0x0100_0002)));
            assert_eq!(trigger.script_index(), Some(5));
            assert_eq!(trigger.tint(), Some(Rgba::new(0x10, 0x20, 0x30, 0xFF)));
        }
    }

    #[test]
    fn test_bit_27_reads_nothing() {
        let mut w = ByteWriter::new(Endian::Little);
        fixed(&mut w, 1 << 27);
        let data = w.finish();

        let mut reader = EndianReader::new(&data, Endian::Little);
        let trigger = Trigger::read(&mut reader).unwrap();
        assert_eq!(reader.position(), Trigger::FIXED_SIZE);
        assert_eq!(trigger.flags.bits(), 1 << 27);
        assert!(trigger.tint().is_none());
    }

    #[test]
    fn test_same_flags_same_slots() {
        let flags = 0b1010_0000_0101 | (0b11 << 20);
        let mut w = ByteWriter::new(Endian::Big);
        fixed(&mut w, flags);
        w.zeros(4 * 4 + 2 * 4);
        fixed(&mut w, flags);
        w.u32(9).u32(8).u32(7).u32(6).u32(1).u32(2);
        let data = w.finish();

        let mut reader = EndianReader::new(&data, Endian::Big);
        let a = Trigger::read(&mut reader).unwrap();
        let b = Trigger::read(&mut reader).unwrap();
        for i in 0..Trigger::DATA_SLOTS {
            assert_eq!(a.has_data(i), b.has_data(i));
        }
        for i in 0..Trigger::LINK_SLOTS {
            assert_eq!(a.has_link(i), b.has_link(i));
        }
        assert_eq!(b.address, 48 + 24);
        assert_eq!(b.link(5), Some(2));
    }

    #[test]
    fn test_out_of_range_slots() {
        let mut w = ByteWriter::new(Endian::Big);
        fixed(&mut w, 0);
        let data = w.finish();
        let trigger = Trigger::read(&mut EndianReader::new(&data, Endian::Big)).unwrap();

        assert!(!trigger.has_data(16));
        assert_eq!(trigger.data(100), None);
        assert!(!trigger.has_link(8));
        assert_eq!(trigger.link(8), None);
    }
}
