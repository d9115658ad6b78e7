//! A window onto the faces one block adds to a [`TileModel`].

use crate::tile::TileModel;
use crate::transform::Quaternion;

/// Faces `[start, start + size)` of a model.
///
/// The window always ends at the model's current size; adding faces through
/// anything but the view breaks that and panics on the next [`add`](Self::add).
pub struct BlockModelView<'a> {
    model: &'a mut TileModel,
    start: usize,
    size: usize,
}

impl<'a> BlockModelView<'a> {
    pub fn new(model: &'a mut TileModel) -> Self {
        let start = model.size();
        Self { model, start, size: 0 }
    }

    /// Start a new empty window at the end of the model.
    pub fn initialize(&mut self) -> &mut Self {
        self.start = self.model.size();
        self.size = 0;
        self
    }

    /// Remove every face added through this window.
    pub fn discard(&mut self) -> &mut Self {
        self.check_end();
        self.model.reset(self.start);
        self.size = 0;
        self
    }

    pub fn add(&mut self, count: usize) -> usize {
        self.check_end();
        let start = self.model.add(count);
        self.size += count;
        start
    }

    fn check_end(&self) {
        assert_eq!(
            self.model.size(),
            self.start + self.size,
            "tile model size changed outside of the block model view"
        );
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn model(&mut self) -> &mut TileModel {
        self.model
    }

    pub fn rotate(&mut self, angle: f32, axis_x: f32, axis_y: f32, axis_z: f32) -> &mut Self {
        self.model.rotate(self.start, self.size, angle, axis_x, axis_y, axis_z);
        self
    }

    pub fn rotate_euler(&mut self, pitch: f32, yaw: f32, roll: f32) -> &mut Self {
        self.model.rotate_euler(self.start, self.size, pitch, yaw, roll);
        self
    }

    pub fn rotate_by_quaternion(&mut self, q: Quaternion) -> &mut Self {
        self.model.rotate_by_quaternion(self.start, self.size, q);
        self
    }

    pub fn scale(&mut self, sx: f32, sy: f32, sz: f32) -> &mut Self {
        self.model.scale(self.start, self.size, sx, sy, sz);
        self
    }

    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) -> &mut Self {
        self.model.translate(self.start, self.size, dx, dy, dz);
        self
    }

    pub fn transform3(&mut self, m: &[[f32; 3]; 3]) -> &mut Self {
        self.model.transform3(self.start, self.size, m);
        self
    }

    pub fn transform4(&mut self, m: &[[f32; 4]; 4]) -> &mut Self {
        self.model.transform4(self.start, self.size, m);
        self
    }
}
