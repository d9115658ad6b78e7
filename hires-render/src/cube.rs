//! Placeholder block renderer drawing every block as a full cube.

use std::collections::HashMap;
use std::sync::Mutex;

use hires_anvil::BlockState;
use hires_model::{BlockModelView, Color};

use crate::{BlockNeighborhood, BlockRenderError, BlockRenderer};

struct Side {
    offset: [i32; 3],
    corners: [[f32; 3]; 4],
    shade: f32,
}

// Corners wind counter-clockwise seen from outside the cube.
const SIDES: [Side; 6] = [
    Side { offset: [0, 1, 0], corners: [[0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 0.0]], shade: 1.0 },
    Side { offset: [0, -1, 0], corners: [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]], shade: 0.5 },
    Side { offset: [0, 0, -1], corners: [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 0.0]], shade: 0.8 },
    Side { offset: [0, 0, 1], corners: [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]], shade: 0.8 },
    Side { offset: [-1, 0, 0], corners: [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 1.0, 0.0]], shade: 0.6 },
    Side { offset: [1, 0, 0], corners: [[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0], [1.0, 0.0, 1.0]], shade: 0.6 },
];

const UVS: [[f32; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]];

/// Draws full cubes, skipping sides hidden by a neighboring block.
///
/// Each distinct block gets its own material index in order of first use and
/// a color derived from its id.
#[derive(Default)]
pub struct CubeRenderer {
    materials: Mutex<HashMap<String, i32>>,
}

impl CubeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn material_index(&self, state: &BlockState) -> i32 {
        let mut materials = self.materials.lock().unwrap();
        let next = materials.len() as i32;
        *materials.entry(state.key().formatted().to_string()).or_insert(next)
    }

    /// Block ids ordered by material index.
    pub fn materials(&self) -> Vec<String> {
        let materials = self.materials.lock().unwrap();
        let mut entries: Vec<(&String, &i32)> = materials.iter().collect();
        entries.sort_by_key(|(_, index)| **index);
        entries.into_iter().map(|(key, _)| key.clone()).collect()
    }
}

/// Stable opaque color for a block id (FNV-1a of the id).
pub fn block_color(state: &BlockState) -> Color {
    if state.is_missing() {
        return Color::from_rgb(0xFF00FF);
    }
    let mut hash: u32 = 0x811C_9DC5;
    for byte in state.key().formatted().bytes() {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(0x0100_0193);
    }
    let channel = |shift: u32| 0.2 + 0.8 * ((hash >> shift) & 0xFF) as f32 / 255.0;
    Color::straight(channel(16), channel(8), channel(0), 1.0)
}

impl BlockRenderer for CubeRenderer {
    fn render_block(
        &self,
        neighborhood: &mut BlockNeighborhood<'_>,
        state: &BlockState,
        view: &mut BlockModelView<'_>,
        color: &mut Color,
    ) -> Result<(), BlockRenderError> {
        let base = block_color(state);
        let material = self.material_index(state);

        for side in &SIDES {
            let [dx, dy, dz] = side.offset;
            if !neighborhood.neighbor(dx, dy, dz).is_air() {
                continue;
            }
            let light = neighborhood.neighbor_light(dx, dy, dz);
            let [c0, c1, c2, c3] = side.corners;
            let start = view.add(2);
            let model = view.model();
            for (face, [a, b, c], [ua, ub, uc]) in [
                (start, [c0, c1, c2], [UVS[0], UVS[1], UVS[2]]),
                (start + 1, [c0, c2, c3], [UVS[0], UVS[2], UVS[3]]),
            ] {
                model
                    .set_positions(face, a, b, c)
                    .set_uvs(face, ua, ub, uc)
                    .set_ao(face, 1.0, 1.0, 1.0)
                    .set_color(face, base.r * side.shade, base.g * side.shade, base.b * side.shade)
                    .set_sky_light(face, light.sky)
                    .set_block_light(face, light.block)
                    .set_material_index(face, material);
            }
        }

        color.set(base.to_premultiplied());
        Ok(())
    }
}
