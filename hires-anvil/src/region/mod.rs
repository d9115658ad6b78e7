//! Anvil region file format (.mca).
//!
//! Region files contain 32x32 chunks in a specific binary format:
//! - Bytes 0-4095: Location table (1024 entries × 4 bytes)
//! - Bytes 4096-8191: Timestamp table (1024 entries × 4 bytes)
//! - Bytes 8192+: Chunk data in 4096 byte sectors, each payload prefixed
//!   with a 4 byte big endian length and a 1 byte compression type

mod header;
mod writer;

pub use header::{Location, RegionHeader};
pub use writer::RegionWriter;

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::compression::{self, EXTERNAL_FLAG};

/// Size of one sector in bytes (4 KB).
pub const SECTOR_SIZE: usize = 4096;

/// Total header size (location table + timestamp table).
pub const HEADER_SIZE: usize = SECTOR_SIZE * 2; // 8192 bytes

/// Number of chunks per region dimension.
pub const REGION_SIZE: i32 = 32;

pub const CHUNKS_PER_REGION: usize = (REGION_SIZE * REGION_SIZE) as usize;

/// Convert chunk coordinates to local region coordinates (0-31).
#[inline]
pub fn chunk_to_local(chunk_coord: i32) -> i32 {
    chunk_coord & (REGION_SIZE - 1)
}

/// Convert chunk coordinates to region coordinates.
#[inline]
pub fn chunk_to_region(chunk_coord: i32) -> i32 {
    chunk_coord >> 5
}

/// Calculate linear index for a chunk within a region (0-1023).
#[inline]
pub fn local_to_index(local_x: i32, local_z: i32) -> usize {
    (local_z * REGION_SIZE + local_x) as usize
}

/// Calculate local coordinates from linear index.
#[inline]
pub fn index_to_local(index: usize) -> (i32, i32) {
    let local_x = (index % REGION_SIZE as usize) as i32;
    let local_z = (index / REGION_SIZE as usize) as i32;
    (local_x, local_z)
}

/// Region file coordinates (parsed from filename like "r.0.-1.mca").
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct RegionPos {
    pub x: i32,
    pub z: i32,
}

impl RegionPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Region holding the given chunk.
    pub fn of_chunk(chunk_x: i32, chunk_z: i32) -> Self {
        Self::new(chunk_to_region(chunk_x), chunk_to_region(chunk_z))
    }

    /// Parse region position from filename (e.g., "r.0.-1.mca").
    pub fn from_filename(name: &str) -> Option<Self> {
        let parts: Vec<&str> = name.split('.').collect();
        if parts.len() == 4 && parts[0] == "r" && parts[3] == "mca" {
            let x = parts[1].parse().ok()?;
            let z = parts[2].parse().ok()?;
            Some(Self { x, z })
        } else {
            None
        }
    }

    pub fn filename(&self) -> String {
        format!("r.{}.{}.mca", self.x, self.z)
    }

    /// Convert local chunk coordinates to world chunk coordinates.
    pub fn local_to_world(&self, local_x: i32, local_z: i32) -> (i32, i32) {
        (
            self.x * REGION_SIZE + local_x,
            self.z * REGION_SIZE + local_z,
        )
    }
}

/// Read access to one region file on disk.
///
/// The file is opened per read, so a `RegionFile` can be shared between
/// threads and sees chunks rewritten by other processes.
#[derive(Debug, Clone)]
pub struct RegionFile {
    path: PathBuf,
    pos: RegionPos,
}

impl RegionFile {
    pub fn new(path: impl Into<PathBuf>, pos: RegionPos) -> Self {
        Self { path: path.into(), pos }
    }

    /// Region file for `pos` inside a `region` directory.
    pub fn in_dir(dir: &Path, pos: RegionPos) -> Self {
        Self::new(dir.join(pos.filename()), pos)
    }

    /// Open a file named like `r.<x>.<z>.mca`.
    pub fn from_path(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let pos = RegionPos::from_filename(name)
            .with_context(|| format!("Not a region file name: {:?}", path))?;
        Ok(Self { path, pos })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pos(&self) -> RegionPos {
        self.pos
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Header of the file, `None` if the file is shorter than a header.
    pub fn read_header(&self) -> anyhow::Result<Option<RegionHeader>> {
        let mut file = File::open(&self.path)
            .with_context(|| format!("Failed to open region {:?}", self.path))?;
        if file.metadata()?.len() < HEADER_SIZE as u64 {
            return Ok(None);
        }
        let mut bytes = vec![0u8; HEADER_SIZE];
        file.read_exact(&mut bytes)?;
        RegionHeader::parse(&bytes).map(Some)
    }

    /// World chunk coordinates of every stored chunk.
    pub fn present_chunks(&self) -> anyhow::Result<Vec<(i32, i32)>> {
        let Some(header) = self.read_header()? else {
            return Ok(Vec::new());
        };
        Ok(header
            .present()
            .map(|i| {
                let (local_x, local_z) = index_to_local(i);
                self.pos.local_to_world(local_x, local_z)
            })
            .collect())
    }

    /// Decompressed NBT of a chunk, `None` if the chunk was never written.
    pub fn read_chunk(&self, chunk_x: i32, chunk_z: i32) -> anyhow::Result<Option<Vec<u8>>> {
        let mut file = File::open(&self.path)
            .with_context(|| format!("Failed to open region {:?}", self.path))?;
        if file.metadata()?.len() < HEADER_SIZE as u64 {
            return Ok(None);
        }

        let index = local_to_index(chunk_to_local(chunk_x), chunk_to_local(chunk_z));
        file.seek(SeekFrom::Start(index as u64 * 4))?;
        let mut entry = [0u8; 4];
        file.read_exact(&mut entry)?;
        let location = Location::from_bytes(entry);
        if location.is_empty() {
            return Ok(None);
        }

        // Parse header: [Length: 4 bytes][Type: 1 byte][Data...]
        file.seek(SeekFrom::Start(location.byte_offset()))?;
        let mut head = [0u8; 5];
        file.read_exact(&mut head)?;
        let length = u32::from_be_bytes([head[0], head[1], head[2], head[3]]) as usize;
        let compression_type = head[4];

        if compression_type & EXTERNAL_FLAG != 0 {
            let external = self.external_path(chunk_x, chunk_z);
            let data = std::fs::read(&external)
                .with_context(|| format!("Failed to read external chunk {:?}", external))?;
            return compression::decompress(compression_type & !EXTERNAL_FLAG, &data).map(Some);
        }

        if length <= 1 {
            return Ok(None);
        }
        let available = location.byte_len().saturating_sub(4);
        if length > available {
            anyhow::bail!(
                "Chunk ({}, {}) claims {} bytes but only {} sectors are allocated",
                chunk_x, chunk_z, length, location.sector_count
            );
        }

        let mut payload = vec![0u8; length - 1];
        file.read_exact(&mut payload)
            .with_context(|| format!("Truncated chunk ({}, {}) in {:?}", chunk_x, chunk_z, self.path))?;
        compression::decompress(compression_type, &payload).map(Some)
    }

    /// Oversized chunks are stored next to the region as `c.<x>.<z>.mcc`.
    pub fn external_path(&self, chunk_x: i32, chunk_z: i32) -> PathBuf {
        let name = format!("c.{}.{}.mcc", chunk_x, chunk_z);
        match self.path.parent() {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_coords_negative() {
        assert_eq!(chunk_to_local(-1), 31);
        assert_eq!(chunk_to_local(-32), 0);
        assert_eq!(chunk_to_local(33), 1);
        assert_eq!(chunk_to_region(-1), -1);
        assert_eq!(chunk_to_region(-33), -2);
        assert_eq!(chunk_to_region(31), 0);
    }

    #[test]
    fn test_index_round_trip() {
        for z in 0..32 {
            for x in 0..32 {
                let index = local_to_index(x, z);
                assert!(index < CHUNKS_PER_REGION);
                assert_eq!(index_to_local(index), (x, z));
            }
        }
        // (z mod 32) * 32 + (x mod 32)
        assert_eq!(local_to_index(chunk_to_local(-1), chunk_to_local(1)), 32 + 31);
    }

    #[test]
    fn test_region_filename() {
        let pos = RegionPos::from_filename("r.0.-1.mca").unwrap();
        assert_eq!(pos, RegionPos::new(0, -1));
        assert_eq!(pos.filename(), "r.0.-1.mca");
        assert!(RegionPos::from_filename("r.0.mca").is_none());
        assert!(RegionPos::from_filename("c.0.1.mcc").is_none());
        assert_eq!(RegionPos::of_chunk(-1, 40), RegionPos::new(-1, 1));
        assert_eq!(pos.local_to_world(3, 4), (3, -28));
    }

    #[test]
    fn test_external_path() {
        let region = RegionFile::from_path("/tmp/world/region/r.1.2.mca").unwrap();
        assert_eq!(region.pos(), RegionPos::new(1, 2));
        assert_eq!(region.external_path(33, 70), PathBuf::from("/tmp/world/region/c.33.70.mcc"));
        assert!(RegionFile::from_path("/tmp/level.dat").is_err());
    }
}
