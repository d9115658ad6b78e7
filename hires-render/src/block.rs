use hires_anvil::BlockState;
use hires_model::{BlockModelView, Color};

use crate::{BlockNeighborhood, BlockRenderError};

/// Produces the geometry of a single block.
///
/// Faces are added through `view` in block-local space, `[0, 1]` on every
/// axis for a full cube; the caller moves them into place. `color` receives
/// the premultiplied color the block contributes to its column.
pub trait BlockRenderer: Send + Sync {
    fn render_block(
        &self,
        neighborhood: &mut BlockNeighborhood<'_>,
        state: &BlockState,
        view: &mut BlockModelView<'_>,
        color: &mut Color,
    ) -> Result<(), BlockRenderError>;
}
