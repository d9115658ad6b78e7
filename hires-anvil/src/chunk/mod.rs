//! Decoded chunks.
//!
//! A [`Chunk`] answers block, light and biome queries for world
//! coordinates inside its 16x16 column. Coordinates are masked, so callers
//! may pass world coordinates directly.

mod section;

pub use section::{BLOCKS_PER_SECTION, Section, block_index};

use crate::biome::{default_biome, legacy_biome};
use crate::format::{BiomeLayout, FormatDescriptor, LightRule, RootLayout};
use crate::key::{BlockState, Key};
use crate::loader::LoaderOptions;
use crate::nbt::{self, ChunkData, LevelRoot};

const HEIGHTMAP_BITS: u32 = 9;
const COLUMNS: usize = 16 * 16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightData {
    pub sky: u8,
    pub block: u8,
}

impl LightData {
    pub const ZERO: LightData = LightData { sky: 0, block: 0 };
}

#[derive(Debug, Clone)]
pub struct Chunk {
    data_version: i32,
    format: Option<&'static FormatDescriptor>,
    status: String,
    generated: bool,
    has_light: bool,
    inhabited_time: i64,
    sections: Vec<Option<Section>>,
    section_min: i32,
    section_max: i32,
    world_min_y: i32,
    world_surface: Vec<i64>,
    ocean_floor: Vec<i64>,
    legacy_biomes: Vec<i32>,
    ambient_sky_light: u8,
}

impl Chunk {
    /// A chunk that was never generated (or could not be read).
    pub fn empty() -> Self {
        Self {
            data_version: 0,
            format: None,
            status: String::new(),
            generated: false,
            has_light: false,
            inhabited_time: 0,
            sections: Vec::new(),
            section_min: 0,
            section_max: -1,
            world_min_y: 0,
            world_surface: Vec::new(),
            ocean_floor: Vec::new(),
            legacy_biomes: Vec::new(),
            ambient_sky_light: 0,
        }
    }

    /// Decode uncompressed chunk NBT with the given format.
    pub fn decode(format: &'static FormatDescriptor, nbt_bytes: &[u8], options: &LoaderOptions) -> anyhow::Result<Self> {
        let data = match format.root {
            RootLayout::Flat => fastnbt::from_bytes::<ChunkData>(nbt_bytes)?,
            RootLayout::Level => {
                let root: LevelRoot = fastnbt::from_bytes(nbt_bytes)?;
                let mut level = root.level;
                level.data_version = root.data_version;
                level
            }
        };
        Ok(Self::from_data(format, data, options))
    }

    fn from_data(format: &'static FormatDescriptor, data: ChunkData, options: &LoaderOptions) -> Self {
        let status = data.status.strip_prefix("minecraft:").unwrap_or(&data.status).to_string();
        let complete = format.complete_status.contains(&status.as_str());
        let has_light = match format.light {
            LightRule::Status => complete,
            LightRule::Flag => complete && data.is_light_on.unwrap_or(0) != 0,
        };
        // Without light data a chunk only counts as generated when missing
        // light is explicitly tolerated.
        let generated = has_light
            || (options.ignore_missing_light_data && !status.is_empty() && status != "empty");

        let decoded: Vec<Section> = data
            .sections
            .into_iter()
            .map(|s| Section::from_nbt(s, format))
            .collect();
        let (sections, section_min, section_max) = index_sections(decoded);

        let world_min_y = match format.root {
            RootLayout::Flat => data.y_pos.unwrap_or(section_min) * 16,
            RootLayout::Level => 0,
        };

        let legacy_biomes = match format.biomes {
            BiomeLayout::SectionPalette => Vec::new(),
            BiomeLayout::Cells | BiomeLayout::Columns => nbt::biome_ids(data.biomes),
        };

        Self {
            data_version: data.data_version,
            format: Some(format),
            status,
            generated,
            has_light,
            inhabited_time: data.inhabited_time,
            sections,
            section_min,
            section_max,
            world_min_y,
            world_surface: nbt::long_vec(data.heightmaps.world_surface),
            ocean_floor: nbt::long_vec(data.heightmaps.ocean_floor),
            legacy_biomes,
            ambient_sky_light: options.ambient_sky_light,
        }
    }

    pub fn data_version(&self) -> i32 {
        self.data_version
    }

    /// Name of the format this chunk was decoded with.
    pub fn format_name(&self) -> Option<&'static str> {
        self.format.map(|f| f.name)
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn has_light_data(&self) -> bool {
        self.has_light
    }

    pub fn inhabited_time(&self) -> i64 {
        self.inhabited_time
    }

    pub fn section_min(&self) -> i32 {
        self.section_min
    }

    pub fn section_max(&self) -> i32 {
        self.section_max
    }

    pub fn section(&self, section_y: i32) -> Option<&Section> {
        if section_y < self.section_min || section_y > self.section_max {
            return None;
        }
        self.sections[(section_y - self.section_min) as usize].as_ref()
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().flatten()
    }

    pub fn block_state(&self, x: i32, y: i32, z: i32) -> &BlockState {
        match self.section(y >> 4) {
            Some(section) => section.block_state(x, y, z),
            None => BlockState::air(),
        }
    }

    pub fn light_data(&self, x: i32, y: i32, z: i32) -> LightData {
        if !self.has_light {
            return LightData { sky: self.ambient_sky_light, block: 0 };
        }
        let section_y = y >> 4;
        match self.section(section_y) {
            Some(section) => section.light_data(x, y, z),
            None if section_y < self.section_min => LightData::ZERO,
            None => LightData { sky: self.ambient_sky_light, block: 0 },
        }
    }

    pub fn biome(&self, x: i32, y: i32, z: i32) -> &Key {
        let Some(format) = self.format else {
            return default_biome();
        };
        match format.biomes {
            BiomeLayout::SectionPalette => match self.section(y >> 4) {
                Some(section) => section.biome(x, y, z),
                None => default_biome(),
            },
            BiomeLayout::Cells => {
                let y = y.clamp(0, 255);
                let index = ((y >> 2) << 4 | (z & 0xC) | (x & 0xC) >> 2) as usize;
                self.legacy_biome_at(index)
            }
            BiomeLayout::Columns => self.legacy_biome_at(((z & 0xF) << 4 | (x & 0xF)) as usize),
        }
    }

    fn legacy_biome_at(&self, index: usize) -> &Key {
        match self.legacy_biomes.get(index) {
            Some(&id) => legacy_biome(id),
            None => default_biome(),
        }
    }

    pub fn min_y(&self, _x: i32, _z: i32) -> i32 {
        self.section_min * 16
    }

    pub fn max_y(&self, _x: i32, _z: i32) -> i32 {
        self.section_max * 16 + 15
    }

    pub fn world_surface_y(&self, x: i32, z: i32) -> i32 {
        self.height(&self.world_surface, x, z)
    }

    pub fn ocean_floor_y(&self, x: i32, z: i32) -> i32 {
        self.height(&self.ocean_floor, x, z)
    }

    fn height(&self, heights: &[i64], x: i32, z: i32) -> i32 {
        let Some(format) = self.format else {
            return 0;
        };
        if heights.len() < format.packing.len(COLUMNS, HEIGHTMAP_BITS) {
            return 0;
        }
        let index = ((z & 0xF) << 4 | (x & 0xF)) as usize;
        format.packing.get(heights, index, HEIGHTMAP_BITS) as i32 + self.world_min_y
    }
}

/// Place sections at `y - min`, leaving gaps as `None`.
fn index_sections(decoded: Vec<Section>) -> (Vec<Option<Section>>, i32, i32) {
    let Some(min) = decoded.iter().map(Section::y).min() else {
        return (Vec::new(), 0, -1);
    };
    let max = decoded.iter().map(Section::y).max().unwrap_or(min);

    let mut sections: Vec<Option<Section>> = vec![None; (max - min + 1) as usize];
    for section in decoded {
        let index = (section.y() - min) as usize;
        sections[index] = Some(section);
    }
    (sections, min, max)
}
