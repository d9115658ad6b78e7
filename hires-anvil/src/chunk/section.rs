use crate::biome::default_biome;
use crate::format::{FormatDescriptor, Packing, RootLayout};
use crate::key::{BlockState, Key};
use crate::log_once::warn_once;
use crate::nbt::{self, SectionData};
use crate::packed::{aligned_len, ceil_log2};

use super::LightData;

pub const BLOCKS_PER_SECTION: usize = 16 * 16 * 16;

/// One 16x16x16 slice of a chunk.
#[derive(Debug, Clone)]
pub struct Section {
    y: i32,
    palette: Vec<BlockState>,
    blocks: Vec<i64>,
    bits_per_block: u32,
    packing: Packing,
    biome_palette: Vec<Key>,
    biomes: Vec<i64>,
    bits_per_biome: u32,
    block_light: Vec<u8>,
    sky_light: Vec<u8>,
}

impl Section {
    /// A data array whose length fits no width from 1 to 32 bits is dropped,
    /// leaving the section uniform.
    pub fn new(y: i32, palette: Vec<BlockState>, mut blocks: Vec<i64>, packing: Packing) -> Self {
        let bits_per_block = match bits_per_block(blocks.len(), palette.len(), packing) {
            Some(bits) => bits,
            None => {
                let len = blocks.len();
                warn_once(&format!("section-data-length-{}", len), || {
                    format!("Ignoring block data of {} longs in section {}: no valid width", len, y)
                });
                blocks.clear();
                0
            }
        };
        Self {
            y,
            palette,
            blocks,
            bits_per_block,
            packing,
            biome_palette: Vec::new(),
            biomes: Vec::new(),
            bits_per_biome: 0,
            block_light: Vec::new(),
            sky_light: Vec::new(),
        }
    }

    /// Attach a biome palette with long-packed 4x4x4 cell indices.
    pub fn with_biomes(mut self, palette: Vec<Key>, biomes: Vec<i64>) -> Self {
        self.bits_per_biome = ceil_log2(palette.len());
        self.biome_palette = palette;
        self.biomes = biomes;
        self
    }

    /// Attach nibble light arrays (2048 bytes each when present).
    pub fn with_light(mut self, block_light: Vec<u8>, sky_light: Vec<u8>) -> Self {
        self.block_light = block_light;
        self.sky_light = sky_light;
        self
    }

    pub(crate) fn from_nbt(data: SectionData, format: &FormatDescriptor) -> Self {
        let (palette, blocks, biomes) = match format.root {
            RootLayout::Flat => {
                let states = data.block_states.unwrap_or_default();
                (states.palette, nbt::long_vec(states.data), data.biomes)
            }
            RootLayout::Level => (data.palette, nbt::long_vec(data.block_indices), None),
        };

        let palette = palette
            .into_iter()
            .map(|b| BlockState::with_properties(Key::parse(&b.name), b.properties))
            .collect();

        let mut section = Self::new(data.y as i32, palette, blocks, format.packing)
            .with_light(nbt::nibble_vec(data.block_light), nbt::nibble_vec(data.sky_light));

        if let Some(biomes) = biomes {
            let palette = biomes.palette.iter().map(|b| Key::parse(b)).collect();
            section = section.with_biomes(palette, nbt::long_vec(biomes.data));
        }
        section
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn palette(&self) -> &[BlockState] {
        &self.palette
    }

    pub fn bits_per_block(&self) -> u32 {
        self.bits_per_block
    }

    pub fn block_state(&self, x: i32, y: i32, z: i32) -> &BlockState {
        match self.palette.len() {
            0 => return BlockState::air(),
            1 => return &self.palette[0],
            _ => {}
        }
        if self.blocks.is_empty() {
            return &self.palette[0];
        }

        let value = self.packing.get(&self.blocks, block_index(x, y, z), self.bits_per_block) as usize;
        match self.palette.get(value) {
            Some(state) => state,
            None => {
                let palette_len = self.palette.len();
                warn_once("section-palette-index", || {
                    format!("Got palette value {} but palette has size of {}", value, palette_len)
                });
                BlockState::missing()
            }
        }
    }

    pub fn biome(&self, x: i32, y: i32, z: i32) -> &Key {
        match self.biome_palette.len() {
            0 => return default_biome(),
            1 => return &self.biome_palette[0],
            _ => {}
        }
        if self.biomes.is_empty() {
            return &self.biome_palette[0];
        }

        let index = ((y & 0b1100) << 2 | (z & 0b1100) | (x & 0b1100) >> 2) as usize;
        let value = self.packing.get(&self.biomes, index, self.bits_per_biome) as usize;
        match self.biome_palette.get(value) {
            Some(biome) => biome,
            None => {
                let palette_len = self.biome_palette.len();
                warn_once("section-biome-palette-index", || {
                    format!("Got biome palette value {} but palette has size of {}", value, palette_len)
                });
                default_biome()
            }
        }
    }

    pub fn light_data(&self, x: i32, y: i32, z: i32) -> LightData {
        if self.block_light.is_empty() && self.sky_light.is_empty() {
            return LightData::ZERO;
        }
        let index = block_index(x, y, z);
        LightData {
            sky: nibble(&self.sky_light, index),
            block: nibble(&self.block_light, index),
        }
    }
}

/// `y << 8 | z << 4 | x` on section-local coordinates.
#[inline]
pub fn block_index(x: i32, y: i32, z: i32) -> usize {
    ((y & 0xF) << 8 | (z & 0xF) << 4 | (x & 0xF)) as usize
}

/// Even indices use the low nibble, odd indices the high one.
#[inline]
fn nibble(data: &[u8], index: usize) -> u8 {
    match data.get(index >> 1) {
        Some(&byte) if index & 1 == 0 => byte & 0xF,
        Some(&byte) => (byte >> 4) & 0xF,
        None => 0,
    }
}

/// Straddled arrays are exactly `len * 64 / 4096` bits wide. Aligned arrays
/// round up per word, so the vanilla width (palette based, at least 4) is
/// tried first and the smallest matching width otherwise.
///
/// `None` when the length allows no width from 1 to 32.
fn bits_per_block(len: usize, palette_len: usize, packing: Packing) -> Option<u32> {
    const MAX_BITS: u32 = 32;
    if len == 0 {
        return Some(0);
    }
    if packing == Packing::Straddled {
        let formula = (len * 64 / BLOCKS_PER_SECTION) as u32;
        return (1..=MAX_BITS).contains(&formula).then_some(formula);
    }

    let vanilla = ceil_log2(palette_len).max(4);
    if vanilla <= MAX_BITS && aligned_len(BLOCKS_PER_SECTION, vanilla) == len {
        return Some(vanilla);
    }
    (1..=MAX_BITS).find(|&bits| aligned_len(BLOCKS_PER_SECTION, bits) == len)
}
