//! Builds region files in memory.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;

use super::{Location, RegionHeader, HEADER_SIZE, REGION_SIZE, SECTOR_SIZE, local_to_index};
use crate::compression;

/// Collects chunk NBT and lays it out into sectors behind a header.
#[derive(Debug, Default)]
pub struct RegionWriter {
    // index -> wrapped payload ([len][type][data])
    chunks: BTreeMap<usize, Vec<u8>>,
    timestamps: BTreeMap<usize, u32>,
}

impl RegionWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store uncompressed NBT for the chunk at local coordinates (0-31).
    pub fn insert(&mut self, local_x: i32, local_z: i32, nbt: &[u8], compression_type: u8) -> anyhow::Result<()> {
        if !(0..REGION_SIZE).contains(&local_x) || !(0..REGION_SIZE).contains(&local_z) {
            anyhow::bail!("Local chunk coordinates out of range: ({}, {})", local_x, local_z);
        }
        let wrapped = wrap_chunk(nbt, compression_type)?;
        if wrapped.len().div_ceil(SECTOR_SIZE) > u8::MAX as usize {
            anyhow::bail!("Chunk ({}, {}) does not fit in 255 sectors", local_x, local_z);
        }
        self.chunks.insert(local_to_index(local_x, local_z), wrapped);
        Ok(())
    }

    pub fn set_timestamp(&mut self, local_x: i32, local_z: i32, timestamp: u32) {
        self.timestamps.insert(local_to_index(local_x, local_z), timestamp);
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Header followed by every chunk, each padded to whole sectors.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut header = RegionHeader::default();
        let mut body = Vec::new();
        let mut next_sector = (HEADER_SIZE / SECTOR_SIZE) as u32;

        for (&index, payload) in &self.chunks {
            let sector_count = payload.len().div_ceil(SECTOR_SIZE);
            header.set_location(index, Location {
                sector_offset: next_sector,
                sector_count: sector_count as u8,
            });
            body.extend_from_slice(payload);
            body.resize(body.len() + sector_count * SECTOR_SIZE - payload.len(), 0);
            next_sector += sector_count as u32;
        }
        for (&index, &timestamp) in &self.timestamps {
            header.set_timestamp(index, timestamp);
        }

        let mut bytes = header.to_bytes();
        bytes.extend_from_slice(&body);
        bytes
    }

    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, self.to_bytes())
            .with_context(|| format!("Failed to write region {:?}", path))
    }
}

/// Compress chunk NBT and prefix it with length and compression type.
pub fn wrap_chunk(nbt: &[u8], compression_type: u8) -> anyhow::Result<Vec<u8>> {
    let compressed = compression::compress(compression_type, nbt)?;
    let length = (compressed.len() + 1) as u32;

    let mut result = Vec::with_capacity(5 + compressed.len());
    result.extend_from_slice(&length.to_be_bytes());
    result.push(compression_type);
    result.extend_from_slice(&compressed);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::ZLIB;

    #[test]
    fn test_wrap_chunk_header() {
        let wrapped = wrap_chunk(&[1, 2, 3], compression::NONE).unwrap();
        assert_eq!(wrapped, vec![0, 0, 0, 4, 3, 1, 2, 3]);
    }

    #[test]
    fn test_layout_is_sector_aligned() {
        let mut writer = RegionWriter::new();
        writer.insert(0, 0, &[0u8; 10], ZLIB).unwrap();
        writer.insert(31, 31, &vec![7u8; 9000], compression::NONE).unwrap();
        writer.set_timestamp(31, 31, 42);
        assert_eq!(writer.len(), 2);

        let bytes = writer.to_bytes();
        assert_eq!(bytes.len() % SECTOR_SIZE, 0);

        let header = RegionHeader::parse(&bytes).unwrap();
        let first = header.location(0);
        let last = header.location(1023);
        assert_eq!(first.sector_offset, 2);
        assert_eq!(first.sector_count, 1);
        assert_eq!(last.sector_offset, 3);
        assert_eq!(last.sector_count, 3);
        assert_eq!(header.timestamp(1023), 42);
    }

    #[test]
    fn test_insert_rejects_bad_coords() {
        let mut writer = RegionWriter::new();
        assert!(writer.insert(32, 0, &[], ZLIB).is_err());
        assert!(writer.insert(0, -1, &[], ZLIB).is_err());
        assert!(writer.is_empty());
    }
}
