//! Tile geometry: a growable per-face buffer, transforms over face ranges,
//! material sorting and the wire encoders.

pub mod color;
pub mod encode;
pub mod pool;
pub mod sort;
pub mod tile;
pub mod transform;
pub mod view;

pub use color::Color;
pub use encode::{MaterialGroup, TileFormat, material_groups};
pub use pool::TileModelPool;
pub use tile::TileModel;
pub use view::BlockModelView;
