//! Per-face attribute buffer.
//!
//! Every face is a triangle. Attributes are stored in parallel arrays and
//! addressed in face units; each array holds `capacity * width` values.

pub const POSITION_WIDTH: usize = 9;
pub const UV_WIDTH: usize = 6;
pub const AO_WIDTH: usize = 3;
pub const COLOR_WIDTH: usize = 3;
pub const LIGHT_WIDTH: usize = 1;
pub const MATERIAL_WIDTH: usize = 1;

pub const VERTICES_PER_FACE: usize = 3;

const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug, Clone)]
pub struct TileModel {
    capacity: usize,
    size: usize,
    pub(crate) position: Vec<f32>,
    pub(crate) uv: Vec<f32>,
    pub(crate) ao: Vec<f32>,
    pub(crate) color: Vec<f32>,
    pub(crate) sky_light: Vec<u8>,
    pub(crate) block_light: Vec<u8>,
    pub(crate) material: Vec<i32>,
}

impl TileModel {
    pub fn new(initial_capacity: usize) -> Self {
        let mut model = Self {
            capacity: 0,
            size: 0,
            position: Vec::new(),
            uv: Vec::new(),
            ao: Vec::new(),
            color: Vec::new(),
            sky_light: Vec::new(),
            block_light: Vec::new(),
            material: Vec::new(),
        };
        model.set_capacity(initial_capacity);
        model
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Append `count` faces, growing if needed. Returns the first new face.
    pub fn add(&mut self, count: usize) -> usize {
        if self.size + count > self.capacity {
            self.grow(count);
        }
        let start = self.size;
        self.size += count;
        start
    }

    /// Drop all faces from `size` on.
    pub fn reset(&mut self, size: usize) {
        assert!(size <= self.size, "cannot reset a model of size {} to {}", self.size, size);
        self.size = size;
    }

    pub fn clear(&mut self) {
        self.size = 0;
    }

    fn grow(&mut self, count: usize) {
        let capacity = (self.capacity as f64 * 1.5) as usize + count;
        log::trace!("Growing tile model from {} to {} faces", self.capacity, capacity);
        self.set_capacity(capacity);
    }

    fn set_capacity(&mut self, capacity: usize) {
        self.position.resize(capacity * POSITION_WIDTH, 0.0);
        self.uv.resize(capacity * UV_WIDTH, 0.0);
        self.ao.resize(capacity * AO_WIDTH, 0.0);
        self.color.resize(capacity * COLOR_WIDTH, 0.0);
        self.sky_light.resize(capacity * LIGHT_WIDTH, 0);
        self.block_light.resize(capacity * LIGHT_WIDTH, 0);
        self.material.resize(capacity * MATERIAL_WIDTH, 0);
        self.capacity = capacity;
    }

    pub fn set_positions(&mut self, face: usize, p1: [f32; 3], p2: [f32; 3], p3: [f32; 3]) -> &mut Self {
        let i = face * POSITION_WIDTH;
        self.position[i..i + 3].copy_from_slice(&p1);
        self.position[i + 3..i + 6].copy_from_slice(&p2);
        self.position[i + 6..i + 9].copy_from_slice(&p3);
        self
    }

    pub fn set_uvs(&mut self, face: usize, uv1: [f32; 2], uv2: [f32; 2], uv3: [f32; 2]) -> &mut Self {
        let i = face * UV_WIDTH;
        self.uv[i..i + 2].copy_from_slice(&uv1);
        self.uv[i + 2..i + 4].copy_from_slice(&uv2);
        self.uv[i + 4..i + 6].copy_from_slice(&uv3);
        self
    }

    pub fn set_ao(&mut self, face: usize, ao1: f32, ao2: f32, ao3: f32) -> &mut Self {
        let i = face * AO_WIDTH;
        self.ao[i..i + 3].copy_from_slice(&[ao1, ao2, ao3]);
        self
    }

    pub fn set_color(&mut self, face: usize, r: f32, g: f32, b: f32) -> &mut Self {
        let i = face * COLOR_WIDTH;
        self.color[i..i + 3].copy_from_slice(&[r, g, b]);
        self
    }

    pub fn set_sky_light(&mut self, face: usize, light: u8) -> &mut Self {
        self.sky_light[face] = light;
        self
    }

    pub fn set_block_light(&mut self, face: usize, light: u8) -> &mut Self {
        self.block_light[face] = light;
        self
    }

    pub fn set_material_index(&mut self, face: usize, material: i32) -> &mut Self {
        self.material[face] = material;
        self
    }

    /// Nine floats: three vertices of x, y, z.
    pub fn positions(&self, face: usize) -> &[f32] {
        &self.position[face * POSITION_WIDTH..(face + 1) * POSITION_WIDTH]
    }

    pub fn uvs(&self, face: usize) -> &[f32] {
        &self.uv[face * UV_WIDTH..(face + 1) * UV_WIDTH]
    }

    pub fn ao(&self, face: usize) -> &[f32] {
        &self.ao[face * AO_WIDTH..(face + 1) * AO_WIDTH]
    }

    pub fn color(&self, face: usize) -> &[f32] {
        &self.color[face * COLOR_WIDTH..(face + 1) * COLOR_WIDTH]
    }

    pub fn sky_light(&self, face: usize) -> u8 {
        self.sky_light[face]
    }

    pub fn block_light(&self, face: usize) -> u8 {
        self.block_light[face]
    }

    pub fn material_index(&self, face: usize) -> i32 {
        self.material[face]
    }

    /// Exchange every attribute of two faces.
    pub(crate) fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        swap_wide(&mut self.position, a, b, POSITION_WIDTH);
        swap_wide(&mut self.uv, a, b, UV_WIDTH);
        swap_wide(&mut self.ao, a, b, AO_WIDTH);
        swap_wide(&mut self.color, a, b, COLOR_WIDTH);
        self.sky_light.swap(a, b);
        self.block_light.swap(a, b);
        self.material.swap(a, b);
    }
}

impl Default for TileModel {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

fn swap_wide<T>(data: &mut [T], a: usize, b: usize, width: usize) {
    for k in 0..width {
        data.swap(a * width + k, b * width + k);
    }
}
