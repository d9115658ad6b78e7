//! Reading Anvil worlds: region files, chunk formats and block queries.

pub mod biome;
pub mod chunk;
pub mod compression;
pub mod format;
pub mod key;
pub mod loader;
pub mod log_once;
pub mod nbt;
pub mod packed;
pub mod region;

pub use chunk::{Chunk, LightData, Section};
pub use key::{BlockState, Key};
pub use loader::{ChunkLoader, LoaderOptions};
pub use region::{RegionFile, RegionPos, RegionWriter};
