//! Picks a chunk format for each blob.
//!
//! Worlds rarely mix data versions, so the format used for the previous
//! chunk is tried first and only replaced when the decoded `DataVersion`
//! says a different one fits better.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::chunk::Chunk;
use crate::format::{FLATTENING_DATA_VERSION, FORMATS, best_format_for};
use crate::log_once::warn_once;
use crate::nbt::VersionProbe;

#[derive(Debug, Clone, Copy)]
pub struct LoaderOptions {
    /// Treat chunks without light data as generated (rendered with ambient light).
    pub ignore_missing_light_data: bool,
    /// Sky light assumed where no light data exists (15 in the overworld).
    pub ambient_sky_light: u8,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            ignore_missing_light_data: false,
            ambient_sky_light: 15,
        }
    }
}

pub struct ChunkLoader {
    options: LoaderOptions,
    last_used: AtomicUsize,
}

impl ChunkLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self {
            options,
            last_used: AtomicUsize::new(0),
        }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Name of the format the next chunk will be tried with.
    pub fn last_used_format(&self) -> &'static str {
        FORMATS[self.last_used.load(Ordering::Relaxed)].name
    }

    /// Decode uncompressed chunk NBT.
    pub fn load(&self, nbt_bytes: &[u8]) -> anyhow::Result<Chunk> {
        let used = self.last_used.load(Ordering::Relaxed);

        let data_version = match Chunk::decode(&FORMATS[used], nbt_bytes, &self.options) {
            Ok(chunk) if FORMATS[used].supports(chunk.data_version()) && best_format_for(chunk.data_version()) == used => {
                return self.checked(chunk);
            }
            Ok(chunk) => chunk.data_version(),
            Err(e) => {
                log::debug!("Decoding with format {} failed ({}), probing version", FORMATS[used].name, e);
                fastnbt::from_bytes::<VersionProbe>(nbt_bytes)?.data_version
            }
        };

        let best = best_format_for(data_version);
        let chunk = Chunk::decode(&FORMATS[best], nbt_bytes, &self.options)?;
        self.last_used.store(best, Ordering::Relaxed);
        self.checked(chunk)
    }

    fn checked(&self, chunk: Chunk) -> anyhow::Result<Chunk> {
        let version = chunk.data_version();
        if version > 0 && version < FLATTENING_DATA_VERSION {
            warn_once(&format!("unsupported-data-version-{}", version), || {
                format!("Chunk data version {} predates block palettes and is not supported", version)
            });
            anyhow::bail!("Unsupported chunk data version: {}", version);
        }
        Ok(chunk)
    }
}

impl Default for ChunkLoader {
    fn default() -> Self {
        Self::new(LoaderOptions::default())
    }
}
