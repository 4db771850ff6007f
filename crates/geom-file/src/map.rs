//! Maps and their trigger tables.
//!
//! Only the parts of the map header needed to reach the trigger table are
//! interpreted; BSP geometry and the other per-map lists are kept as raw
//! descriptors.

use std::fmt;

use geom_common::{EndianReader, HashCode, Vec3};

use crate::array::{ArrayDescriptor, RelArray};
use crate::header::CommonHeader;
use crate::pointer::RelPtr;
use crate::script::TriggerScript;
use crate::trigger::Trigger;
use crate::Result;

/// Fixed header at the start of a map's payload.
#[derive(Debug, Clone, PartialEq)]
pub struct MapHeader {
    pub bsp_tree: RelPtr,
    pub paths: ArrayDescriptor,
    pub lights: ArrayDescriptor,
    pub cameras: ArrayDescriptor,
    pub specials: ArrayDescriptor,
    pub clusters: RelArray,
    pub sounds: ArrayDescriptor,
    pub portals: RelArray,
    pub skies: RelArray,
    pub placements: RelArray,
    pub placement_groups: RelArray,
    pub trigger_header: RelPtr,
    pub zone_sections: [u32; 4],
    pub bounds: [Vec3; 2],
}

impl MapHeader {
    /// Offset of the trigger-header pointer from the start of the map.
    pub const TRIGGER_HEADER_OFFSET: u64 = 88;

    pub fn read(reader: &mut EndianReader<'_>) -> Result<Self> {
        // Runtime vtable
        reader.advance(4);
        let bsp_tree = RelPtr::read(reader)?;
        let paths = ArrayDescriptor::read(reader)?;
        let lights = ArrayDescriptor::read(reader)?;
        let cameras = ArrayDescriptor::read(reader)?;
        let specials = ArrayDescriptor::read(reader)?;
        let clusters = RelArray::read(reader)?;
        let sounds = ArrayDescriptor::read(reader)?;
        let portals = RelArray::read(reader)?;
        let skies = RelArray::read(reader)?;
        let placements = RelArray::read(reader)?;
        let placement_groups = RelArray::read(reader)?;
        let trigger_header = RelPtr::read(reader)?;

        let mut zone_sections = [0u32; 4];
        for zone in &mut zone_sections {
            *zone = reader.read_u32()?;
        }
        let bounds = [Vec3::read(reader)?, Vec3::read(reader)?];

        Ok(Self {
            bsp_tree,
            paths,
            lights,
            cameras,
            specials,
            clusters,
            sounds,
            portals,
            skies,
            placements,
            placement_groups,
            trigger_header,
            zone_sections,
            bounds,
        })
    }
}

/// Pointers to a map's trigger, script, type and collision tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerTableHeader {
    pub triggers: RelArray,
    pub scripts: RelPtr,
    pub types: RelPtr,
    pub collisions: RelPtr,
}

impl TriggerTableHeader {
    pub fn read(reader: &mut EndianReader<'_>) -> Result<Self> {
        Ok(Self {
            triggers: RelArray::read(reader)?,
            scripts: RelPtr::read(reader)?,
            types: RelPtr::read(reader)?,
            collisions: RelPtr::read(reader)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerType {
    pub type_id: u32,
    pub subtype: u32,
}

impl TriggerType {
    pub const SIZE: usize = 16;

    fn read(reader: &mut EndianReader<'_>) -> Result<Self> {
        let type_id = reader.read_u32()?;
        let subtype = reader.read_u32()?;
        reader.advance(8);
        Ok(Self { type_id, subtype })
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type: {:X} | subtype: {:X}", self.type_id, self.subtype)
    }
}

/// All triggers of a map with the types and scripts they refer to.
#[derive(Debug, Clone, PartialEq)]
pub struct MapTriggers {
    pub header: TriggerTableHeader,
    pub triggers: Vec<Trigger>,
    /// Indexed by [`Trigger::type_index`].
    pub types: Vec<TriggerType>,
    /// Indexed by [`Trigger::script_index`].
    pub scripts: Vec<TriggerScript>,
}

impl MapTriggers {
    /// Bytes per entry of the trigger and script pointer tables.
    const TABLE_STRIDE: usize = 8;

    pub fn read(reader: &mut EndianReader<'_>) -> Result<Self> {
        let header = TriggerTableHeader::read(reader)?;

        let table = read_pointer_table(reader, header.triggers.pointer, header.triggers.len(), "trigger table")?;
        let triggers = table
            .iter()
            .map(|ptr| {
                reader.seek(ptr.try_resolve("trigger")? as usize);
                Trigger::read(reader)
            })
            .collect::<Result<Vec<_>>>()?;

        // Neither table stores its length; size them by the highest index in use
        let type_count = triggers
            .iter()
            .map(|t| t.type_index as usize + 1)
            .max()
            .unwrap_or(0);
        let script_count = triggers
            .iter()
            .filter_map(Trigger::script_index)
            .map(|i| i as usize + 1)
            .max()
            .unwrap_or(0);

        let mut types = Vec::with_capacity(type_count);
        if type_count > 0 {
            reader.seek(header.types.try_resolve("trigger types")? as usize);
            for _ in 0..type_count {
                types.push(TriggerType::read(reader)?);
            }
        }

        let script_table = read_pointer_table(reader, header.scripts, script_count, "trigger scripts")?;
        let scripts = script_table
            .iter()
            .map(|ptr| {
                reader.seek(ptr.try_resolve("trigger script")? as usize);
                TriggerScript::read(reader)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            header,
            triggers,
            types,
            scripts,
        })
    }

    /// Type record of a trigger.
    pub fn trigger_type(&self, trigger: &Trigger) -> Option<&TriggerType> {
        self.types.get(trigger.type_index as usize)
    }

    /// Script attached to a trigger.
    pub fn trigger_script(&self, trigger: &Trigger) -> Option<&TriggerScript> {
        self.scripts.get(trigger.script_index()? as usize)
    }
}

/// Read `count` `{relptr, 4 skipped}` entries.
fn read_pointer_table(
    reader: &mut EndianReader<'_>,
    table: RelPtr,
    count: usize,
    what: &str,
) -> Result<Vec<RelPtr>> {
    if count == 0 {
        return Ok(Vec::new());
    }

    reader.seek(table.try_resolve(what)? as usize);
    let mut pointers = Vec::with_capacity(count.min(reader.remaining() / MapTriggers::TABLE_STRIDE));
    for _ in 0..count {
        pointers.push(RelPtr::read(reader)?);
        reader.advance(4);
    }
    Ok(pointers)
}

/// A decoded map.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoMap {
    pub hashcode: HashCode,
    pub address: u64,
    pub header: MapHeader,
    pub triggers: MapTriggers,
}

impl GeoMap {
    /// Decode the map a header points at.
    pub fn read(reader: &EndianReader<'_>, header: &CommonHeader) -> Result<Self> {
        let mut reader = reader.clone();
        let address = header.address as u64;
        reader.seek(address as usize);

        let map_header = MapHeader::read(&mut reader)?;
        reader.seek(map_header.trigger_header.try_resolve("map trigger header")? as usize);
        let triggers = MapTriggers::read(&mut reader)?;

        tracing::trace!(
            hashcode = %header.hashcode,
            triggers = triggers.triggers.len(),
            scripts = triggers.scripts.len(),
            "decoded map"
        );

        Ok(Self {
            hashcode: header.hashcode,
            address,
            header: map_header,
            triggers,
        })
    }
}

impl fmt::Display for GeoMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "map {} @ {:#x} | {} triggers | {} types | {} scripts",
            self.hashcode,
            self.address,
            self.triggers.triggers.len(),
            self.triggers.types.len(),
            self.triggers.scripts.len()
        )
    }
}
