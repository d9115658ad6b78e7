//! Chunk access for tile rendering.
//!
//! A [`World`] hands out decoded chunks by chunk coordinate. Chunks that were
//! never generated, or could not be read, come back as [`Chunk::empty`], so
//! renderers never have to deal with I/O errors.

mod cache;
mod mca;
mod memory;

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use hires_anvil::Chunk;

pub use cache::{CacheConfig, ChunkCache};
pub use mca::McaWorld;
pub use memory::MemoryWorld;

/// Coordinates for a chunk in the world.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing the block column `(x, z)`.
    pub fn of_block(x: i32, z: i32) -> Self {
        Self::new(x >> 4, z >> 4)
    }
}

/// Distinguishes worlds sharing one [`ChunkCache`].
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct WorldId(u32);

impl WorldId {
    pub fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

pub trait World: Send + Sync {
    fn id(&self) -> WorldId;

    /// Chunk at chunk coordinates. Never fails.
    fn chunk(&self, chunk_x: i32, chunk_z: i32) -> Arc<Chunk>;

    /// Chunk containing the block column `(x, z)`.
    fn chunk_at_block(&self, x: i32, z: i32) -> Arc<Chunk> {
        let pos = ChunkPos::of_block(x, z);
        self.chunk(pos.x, pos.z)
    }

    /// Forget a cached chunk so the next access reloads it.
    fn invalidate_chunk(&self, _chunk_x: i32, _chunk_z: i32) {}

    /// Forget every cached chunk of this world.
    fn invalidate_all(&self) {}
}
