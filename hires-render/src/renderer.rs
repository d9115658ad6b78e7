//! Tile renderer.
//!
//! Walks every column of a tile from the top down, lets the block renderer
//! add each block's faces and moves them to tile-local coordinates.

use std::sync::Arc;
use std::time::Instant;

use hires_anvil::BlockState;
use hires_metrics::RenderMetrics;
use hires_model::{BlockModelView, Color, TileModel};
use hires_world::World;

use crate::{BlockNeighborhood, BlockRenderer, TileMeta};

#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Lowest block rendered on each axis.
    pub min: [i32; 3],
    /// Highest block rendered on each axis.
    pub max: [i32; 3],
    /// Stop walking down a column at the first opaque block.
    pub render_top_only: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            min: [i32::MIN; 3],
            max: [i32::MAX; 3],
            render_top_only: false,
        }
    }
}

pub struct HiresRenderer<R: BlockRenderer> {
    block_renderer: R,
    settings: RenderSettings,
    metrics: Option<Arc<RenderMetrics>>,
}

impl<R: BlockRenderer> HiresRenderer<R> {
    pub fn new(block_renderer: R, settings: RenderSettings) -> Self {
        Self { block_renderer, settings, metrics: None }
    }

    pub fn with_metrics(mut self, metrics: Arc<RenderMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn block_renderer(&self) -> &R {
        &self.block_renderer
    }

    /// Render blocks in `[min, max]` (inclusive) into `model`.
    ///
    /// Faces are positioned relative to `(min.x, 0, min.z)`.
    pub fn render(&self, world: &dyn World, min: [i32; 3], max: [i32; 3], model: &mut TileModel) -> TileMeta {
        let start = Instant::now();
        let faces_before = model.size();
        let anchor = (min[0], min[2]);

        let min: [i32; 3] = std::array::from_fn(|i| min[i].max(self.settings.min[i]));
        let max: [i32; 3] = std::array::from_fn(|i| max[i].min(self.settings.max[i]));
        let size_x = (max[0] - min[0] + 1).max(0) as usize;
        let size_z = (max[2] - min[2] + 1).max(0) as usize;
        let mut meta = TileMeta::new(min[0], min[2], size_x, size_z);

        let mut neighborhood = BlockNeighborhood::new(world);
        let mut view = BlockModelView::new(model);
        let mut block_color = Color::TRANSPARENT;

        for x in min[0]..=max[0] {
            for z in min[2]..=max[2] {
                let chunk = neighborhood.chunk(x, z);
                if !chunk.is_generated() {
                    continue;
                }

                let mut max_height = None;
                let mut column_color = Color::TRANSPARENT;

                let top = max[1].min(chunk.max_y(x, z));
                let bottom = min[1].max(chunk.min_y(x, z));
                for y in (bottom..=top).rev() {
                    let state = chunk.block_state(x, y, z);
                    if state.is_air() {
                        continue;
                    }

                    neighborhood.set(x, y, z);
                    view.initialize();
                    block_color.clear();
                    self.render_block(&mut neighborhood, state, &mut view, &mut block_color);
                    view.translate((x - anchor.0) as f32, y as f32, (z - anchor.1) as f32);

                    if block_color.a > 0.0 {
                        max_height = max_height.max(Some(y));
                        column_color.underlay(block_color);
                    }
                    if self.settings.render_top_only && block_color.a > 0.999 {
                        break;
                    }
                }

                meta.set(x, z, max_height, column_color);
            }
        }

        let faces = model.size() - faces_before;
        log::debug!(
            "Rendered tile ({}, {})..({}, {}): {} faces in {:?}",
            min[0], min[2], max[0], max[2], faces, start.elapsed()
        );
        if let Some(metrics) = &self.metrics {
            metrics.record_tile(start.elapsed(), faces);
        }
        meta
    }

    /// Render one block, falling back to the placeholder model and finally
    /// to nothing. Never fails.
    fn render_block(
        &self,
        neighborhood: &mut BlockNeighborhood<'_>,
        state: &BlockState,
        view: &mut BlockModelView<'_>,
        color: &mut Color,
    ) {
        let Err(error) = self.block_renderer.render_block(neighborhood, state, view, color) else {
            return;
        };
        view.discard();
        color.clear();
        if let Some(metrics) = &self.metrics {
            metrics.record_block_failure();
        }

        let (x, y, z) = neighborhood.position();
        match self.block_renderer.render_block(neighborhood, BlockState::missing(), view, color) {
            Ok(()) => {
                log::debug!("Rendered placeholder for {} at ({}, {}, {}): {}", state, x, y, z, error);
            }
            Err(fallback) => {
                view.discard();
                color.clear();
                let chained = anyhow::Error::new(fallback)
                    .context(format!("placeholder model failed after: {}", error));
                log::debug!("Skipped block {} at ({}, {}, {}): {:#}", state, x, y, z, chained);
            }
        }
    }
}
