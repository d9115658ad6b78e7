//! Region file header.
//!
//! The header consists of two tables:
//! - Location table: where each chunk is stored
//! - Timestamp table: when each chunk was last saved

use super::{CHUNKS_PER_REGION, HEADER_SIZE, SECTOR_SIZE};

/// One location table entry: `offset << 8 | sector_count`, big endian.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Location {
    pub sector_offset: u32,
    pub sector_count: u8,
}

impl Location {
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        let raw = u32::from_be_bytes(bytes);
        Self {
            sector_offset: raw >> 8,
            sector_count: (raw & 0xFF) as u8,
        }
    }

    pub fn to_bytes(self) -> [u8; 4] {
        ((self.sector_offset & 0xFF_FFFF) << 8 | self.sector_count as u32).to_be_bytes()
    }

    /// No chunk stored here. Offsets pointing into the header count as empty.
    pub fn is_empty(&self) -> bool {
        self.sector_count == 0 || self.sector_offset < 2
    }

    /// Byte offset of the chunk payload in the file.
    pub fn byte_offset(&self) -> u64 {
        self.sector_offset as u64 * SECTOR_SIZE as u64
    }

    pub fn byte_len(&self) -> usize {
        self.sector_count as usize * SECTOR_SIZE
    }
}

#[derive(Debug, Clone)]
pub struct RegionHeader {
    locations: Vec<Location>,
    timestamps: Vec<u32>,
}

impl Default for RegionHeader {
    fn default() -> Self {
        Self {
            locations: vec![Location::default(); CHUNKS_PER_REGION],
            timestamps: vec![0; CHUNKS_PER_REGION],
        }
    }
}

impl RegionHeader {
    pub fn parse(bytes: &[u8]) -> anyhow::Result<Self> {
        if bytes.len() < HEADER_SIZE {
            anyhow::bail!("Region header too short: {} bytes", bytes.len());
        }
        let entry = |i: usize| [bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]];
        let locations = (0..CHUNKS_PER_REGION)
            .map(|i| Location::from_bytes(entry(i * 4)))
            .collect();
        let timestamps = (0..CHUNKS_PER_REGION)
            .map(|i| u32::from_be_bytes(entry(SECTOR_SIZE + i * 4)))
            .collect();
        Ok(Self { locations, timestamps })
    }

    pub fn location(&self, index: usize) -> Location {
        self.locations[index]
    }

    pub fn set_location(&mut self, index: usize, location: Location) {
        self.locations[index] = location;
    }

    pub fn timestamp(&self, index: usize) -> u32 {
        self.timestamps[index]
    }

    pub fn set_timestamp(&mut self, index: usize, timestamp: u32) {
        self.timestamps[index] = timestamp;
    }

    /// Indices of all chunks with a stored payload.
    pub fn present(&self) -> impl Iterator<Item = usize> + '_ {
        self.locations
            .iter()
            .enumerate()
            .filter(|(_, l)| !l.is_empty())
            .map(|(i, _)| i)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut header = vec![0u8; HEADER_SIZE];
        for (i, location) in self.locations.iter().enumerate() {
            header[i * 4..i * 4 + 4].copy_from_slice(&location.to_bytes());
        }
        for (i, timestamp) in self.timestamps.iter().enumerate() {
            let at = SECTOR_SIZE + i * 4;
            header[at..at + 4].copy_from_slice(&timestamp.to_be_bytes());
        }
        header
    }
}
