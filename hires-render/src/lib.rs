//! Renders world columns into tile models.

mod block;
mod cube;
mod error;
mod meta;
mod neighborhood;
mod renderer;

pub use block::BlockRenderer;
pub use cube::CubeRenderer;
pub use error::BlockRenderError;
pub use meta::{ColumnMeta, TileMeta};
pub use neighborhood::BlockNeighborhood;
pub use renderer::{HiresRenderer, RenderSettings};
