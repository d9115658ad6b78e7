use std::sync::Arc;

use hires_anvil::{BlockState, Chunk, Key, LightData};
use hires_world::{ChunkPos, World};

/// Cursor over the world around the block being rendered.
///
/// Remembers the last chunk it touched, so walking a column or looking at
/// direct neighbors rarely goes back to the world.
pub struct BlockNeighborhood<'w> {
    world: &'w dyn World,
    last: Option<(ChunkPos, Arc<Chunk>)>,
    x: i32,
    y: i32,
    z: i32,
}

impl<'w> BlockNeighborhood<'w> {
    pub fn new(world: &'w dyn World) -> Self {
        Self { world, last: None, x: 0, y: 0, z: 0 }
    }

    pub fn set(&mut self, x: i32, y: i32, z: i32) -> &mut Self {
        self.x = x;
        self.y = y;
        self.z = z;
        self
    }

    pub fn position(&self) -> (i32, i32, i32) {
        (self.x, self.y, self.z)
    }

    /// Chunk containing the block column `(x, z)`.
    pub fn chunk(&mut self, x: i32, z: i32) -> Arc<Chunk> {
        let pos = ChunkPos::of_block(x, z);
        if let Some((last_pos, chunk)) = &self.last {
            if *last_pos == pos {
                return chunk.clone();
            }
        }
        let chunk = self.world.chunk(pos.x, pos.z);
        self.last = Some((pos, chunk.clone()));
        chunk
    }

    pub fn block_state(&mut self) -> BlockState {
        self.neighbor(0, 0, 0)
    }

    /// Block at an offset from the current position.
    pub fn neighbor(&mut self, dx: i32, dy: i32, dz: i32) -> BlockState {
        let (x, y, z) = (self.x + dx, self.y + dy, self.z + dz);
        self.chunk(x, z).block_state(x, y, z).clone()
    }

    pub fn light(&mut self) -> LightData {
        self.neighbor_light(0, 0, 0)
    }

    pub fn neighbor_light(&mut self, dx: i32, dy: i32, dz: i32) -> LightData {
        let (x, y, z) = (self.x + dx, self.y + dy, self.z + dz);
        self.chunk(x, z).light_data(x, y, z)
    }

    pub fn biome(&mut self) -> Key {
        let (x, y, z) = (self.x, self.y, self.z);
        self.chunk(x, z).biome(x, y, z).clone()
    }
}
