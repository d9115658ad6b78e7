//! In-memory world.
//!
//! Useful for development and testing. Chunks not inserted are empty.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use hires_anvil::{Chunk, ChunkLoader};

use crate::{ChunkPos, World, WorldId};

pub struct MemoryWorld {
    id: WorldId,
    chunks: RwLock<HashMap<ChunkPos, Arc<Chunk>>>,
    empty: Arc<Chunk>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self {
            id: WorldId::next(),
            chunks: RwLock::new(HashMap::new()),
            empty: Arc::new(Chunk::empty()),
        }
    }

    pub fn insert(&self, chunk_x: i32, chunk_z: i32, chunk: Chunk) {
        self.chunks.write().unwrap().insert(ChunkPos::new(chunk_x, chunk_z), Arc::new(chunk));
    }

    /// Decode uncompressed chunk NBT and store it.
    pub fn insert_nbt(&self, chunk_x: i32, chunk_z: i32, loader: &ChunkLoader, nbt: &[u8]) -> anyhow::Result<()> {
        let chunk = loader.load(nbt)?;
        self.insert(chunk_x, chunk_z, chunk);
        Ok(())
    }

    pub fn remove(&self, chunk_x: i32, chunk_z: i32) {
        self.chunks.write().unwrap().remove(&ChunkPos::new(chunk_x, chunk_z));
    }

    pub fn list_chunks(&self) -> Vec<ChunkPos> {
        self.chunks.read().unwrap().keys().cloned().collect()
    }
}

impl Default for MemoryWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl World for MemoryWorld {
    fn id(&self) -> WorldId {
        self.id
    }

    fn chunk(&self, chunk_x: i32, chunk_z: i32) -> Arc<Chunk> {
        self.chunks
            .read()
            .unwrap()
            .get(&ChunkPos::new(chunk_x, chunk_z))
            .cloned()
            .unwrap_or_else(|| self.empty.clone())
    }
}
