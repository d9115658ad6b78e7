//! Tile files on disk.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use flate2::Compression;
use flate2::write::GzEncoder;

/// Square grid of tiles over the block range `[min, max]` on x and z.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    pub tile_size: i32,
    pub min: (i32, i32),
    pub max: (i32, i32),
}

impl TileGrid {
    pub fn new(tile_size: i32, min: (i32, i32), max: (i32, i32)) -> anyhow::Result<Self> {
        if tile_size <= 0 {
            anyhow::bail!("Tile size must be positive, got {}", tile_size);
        }
        if min.0 > max.0 || min.1 > max.1 {
            anyhow::bail!("Empty render area: {:?}..{:?}", min, max);
        }
        Ok(Self { tile_size, min, max })
    }

    /// Tile coordinates touching the area, row by row.
    pub fn tiles(&self) -> Vec<(i32, i32)> {
        let (min_tx, min_tz) = (self.min.0.div_euclid(self.tile_size), self.min.1.div_euclid(self.tile_size));
        let (max_tx, max_tz) = (self.max.0.div_euclid(self.tile_size), self.max.1.div_euclid(self.tile_size));
        (min_tz..=max_tz)
            .flat_map(|tz| (min_tx..=max_tx).map(move |tx| (tx, tz)))
            .collect()
    }

    /// Inclusive block bounds of a tile on x and z.
    pub fn bounds(&self, tile: (i32, i32)) -> ((i32, i32), (i32, i32)) {
        let min = (tile.0 * self.tile_size, tile.1 * self.tile_size);
        (min, (min.0 + self.tile_size - 1, min.1 + self.tile_size - 1))
    }
}

/// Path of a tile file, e.g. `x-1z3.prbm` or `x-1z3.prbm.gz`.
pub fn tile_path(dir: &Path, tile: (i32, i32), extension: &str, gzip: bool) -> PathBuf {
    let suffix = if gzip { ".gz" } else { "" };
    dir.join(format!("x{}z{}.{}{}", tile.0, tile.1, extension, suffix))
}

/// Write through `write` into a temp file next to `path`, then move it into
/// place. Returns what `write` returned.
pub fn write_atomic<F>(path: &Path, gzip: bool, write: F) -> anyhow::Result<u64>
where
    F: FnOnce(&mut dyn Write) -> anyhow::Result<u64>,
{
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let result = write_file(&tmp, gzip, write).and_then(|bytes| {
        std::fs::rename(&tmp, path).with_context(|| format!("Failed to move {:?} to {:?}", tmp, path))?;
        Ok(bytes)
    });
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

fn write_file<F>(path: &Path, gzip: bool, write: F) -> anyhow::Result<u64>
where
    F: FnOnce(&mut dyn Write) -> anyhow::Result<u64>,
{
    let file = BufWriter::new(File::create(path).with_context(|| format!("Failed to create {:?}", path))?);
    if gzip {
        let mut encoder = GzEncoder::new(file, Compression::default());
        let bytes = write(&mut encoder as &mut dyn Write)?;
        encoder.finish()?.flush()?;
        Ok(bytes)
    } else {
        let mut file = file;
        let bytes = write(&mut file as &mut dyn Write)?;
        file.flush()?;
        Ok(bytes)
    }
}
