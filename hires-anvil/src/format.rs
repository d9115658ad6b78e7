//! Chunk format generations.
//!
//! The generations differ only in data layout, so each one is described by a
//! [`FormatDescriptor`] and decoded by the same code in [`crate::chunk`].

/// How palette indices and heightmaps are packed into long arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packing {
    Straddled,
    Aligned,
}

impl Packing {
    pub fn get(self, data: &[i64], index: usize, bits: u32) -> u64 {
        match self {
            Packing::Straddled => crate::packed::value_from_long_array(data, index, bits),
            Packing::Aligned => crate::packed::value_from_aligned_long_array(data, index, bits),
        }
    }

    /// Minimum number of words holding `count` values.
    pub fn len(self, count: usize, bits: u32) -> usize {
        match self {
            Packing::Straddled => crate::packed::straddled_len(count, bits),
            Packing::Aligned => crate::packed::aligned_len(count, bits),
        }
    }
}

/// Where chunk fields live in the NBT tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootLayout {
    /// Fields inside a `Level` compound.
    Level,
    /// Fields at the root compound.
    Flat,
}

/// Shape of the stored biome data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiomeLayout {
    /// One numeric id per column, 256 entries.
    Columns,
    /// One numeric id per 4x4x4 cell, 1024 entries covering y 0..256.
    Cells,
    /// Per-section palette with long-packed 4x4x4 cell indices.
    SectionPalette,
}

/// Where "has light data" comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightRule {
    /// Light is present whenever the chunk reached a complete status.
    Status,
    /// A separate `isLightOn` flag.
    Flag,
}

#[derive(Debug, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub name: &'static str,
    pub min_data_version: i32,
    pub root: RootLayout,
    pub packing: Packing,
    pub biomes: BiomeLayout,
    pub light: LightRule,
    /// Statuses (without namespace) of a fully generated chunk.
    pub complete_status: &'static [&'static str],
}

impl FormatDescriptor {
    pub fn supports(&self, data_version: i32) -> bool {
        data_version >= self.min_data_version
    }
}

/// First data version using block-state palettes (1.13).
pub const FLATTENING_DATA_VERSION: i32 = 1451;

/// Known formats, newest first.
pub static FORMATS: [FormatDescriptor; 4] = [
    FormatDescriptor {
        name: "1.18",
        min_data_version: 2844,
        root: RootLayout::Flat,
        packing: Packing::Aligned,
        biomes: BiomeLayout::SectionPalette,
        light: LightRule::Flag,
        complete_status: &["full"],
    },
    FormatDescriptor {
        name: "1.16",
        min_data_version: 2500,
        root: RootLayout::Level,
        packing: Packing::Aligned,
        biomes: BiomeLayout::Cells,
        light: LightRule::Flag,
        complete_status: &["full"],
    },
    FormatDescriptor {
        name: "1.15",
        min_data_version: 2200,
        root: RootLayout::Level,
        packing: Packing::Straddled,
        biomes: BiomeLayout::Cells,
        light: LightRule::Status,
        complete_status: &["full"],
    },
    FormatDescriptor {
        name: "1.13",
        min_data_version: 0,
        root: RootLayout::Level,
        packing: Packing::Straddled,
        biomes: BiomeLayout::Columns,
        light: LightRule::Status,
        complete_status: &["full", "fullchunk", "postprocessed", "spawn"],
    },
];

/// Index into [`FORMATS`] of the newest format able to read `data_version`.
pub fn best_format_for(data_version: i32) -> usize {
    FORMATS
        .iter()
        .position(|f| f.supports(data_version))
        .unwrap_or(FORMATS.len() - 1)
}
