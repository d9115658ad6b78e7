//! NBT (Named Binary Tag) structures for chunk data.
//!
//! One set of structures covers every supported data version. Fields that
//! only exist in some versions are optional, so decoding a blob with the
//! wrong layout yields an empty chunk with the right `DataVersion` instead of
//! an error.

use std::collections::BTreeMap;

use fastnbt::{ByteArray, LongArray, Value};
use serde::Deserialize;

/// Just enough of a chunk to find out which format it is in.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VersionProbe {
    #[serde(rename = "DataVersion")]
    pub data_version: i32,
}

/// Chunks before 1.18 wrap everything in a `Level` compound.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LevelRoot {
    #[serde(rename = "DataVersion")]
    pub data_version: i32,

    #[serde(rename = "Level")]
    pub level: ChunkData,
}

/// Chunk fields, either at the root (1.18+) or inside `Level`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChunkData {
    // only set when the chunk data is the root compound
    #[serde(rename = "DataVersion")]
    pub data_version: i32,

    #[serde(rename = "Status")]
    pub status: String,

    #[serde(rename = "InhabitedTime")]
    pub inhabited_time: i64,

    #[serde(rename = "isLightOn")]
    pub is_light_on: Option<i8>,

    // Lowest section index, absent before 1.18
    #[serde(rename = "yPos")]
    pub y_pos: Option<i32>,

    #[serde(rename = "Heightmaps")]
    pub heightmaps: Heightmaps,

    #[serde(rename = "sections", alias = "Sections")]
    pub sections: Vec<SectionData>,

    // Byte or int array of numeric biome ids, pre 1.18
    #[serde(rename = "Biomes")]
    pub biomes: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Heightmaps {
    #[serde(rename = "WORLD_SURFACE")]
    pub world_surface: Option<LongArray>,

    #[serde(rename = "OCEAN_FLOOR")]
    pub ocean_floor: Option<LongArray>,
}

// --- Section (16x16x16 Cube) ---
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SectionData {
    #[serde(rename = "Y")]
    pub y: i8,

    // 1.18+
    #[serde(rename = "block_states")]
    pub block_states: Option<BlockStates>,

    #[serde(rename = "biomes")]
    pub biomes: Option<Biomes>,

    // pre 1.18
    #[serde(rename = "Palette")]
    pub palette: Vec<BlockStateData>,

    #[serde(rename = "BlockStates")]
    pub block_indices: Option<LongArray>,

    #[serde(rename = "BlockLight")]
    pub block_light: Option<ByteArray>,

    #[serde(rename = "SkyLight")]
    pub sky_light: Option<ByteArray>,
}

// --- Block Palette ---
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BlockStates {
    pub palette: Vec<BlockStateData>,
    // Indices into the palette. Omitted if the palette has a single entry.
    pub data: Option<LongArray>,
}

// --- Biome Palette ---
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Biomes {
    pub palette: Vec<String>,
    pub data: Option<LongArray>,
}

// --- Single Block ---
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BlockStateData {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Properties")]
    pub properties: BTreeMap<String, String>,
}

pub(crate) fn long_vec(array: Option<LongArray>) -> Vec<i64> {
    array.map(LongArray::into_inner).unwrap_or_default()
}

pub(crate) fn nibble_vec(array: Option<ByteArray>) -> Vec<u8> {
    array
        .map(|a| a.iter().map(|&b| b as u8).collect())
        .unwrap_or_default()
}

/// Numeric biome ids, upgrading byte arrays to ints.
pub(crate) fn biome_ids(value: Option<Value>) -> Vec<i32> {
    match value {
        Some(Value::IntArray(ints)) => ints.iter().copied().collect(),
        Some(Value::ByteArray(bytes)) => bytes.iter().map(|&b| (b as i32) & 0xFF).collect(),
        _ => Vec::new(),
    }
}
