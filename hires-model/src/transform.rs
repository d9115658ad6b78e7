//! Transforms over a range of faces.
//!
//! All operations work on `[start, start + count)` in face units, compute in
//! f64 and store f32. They return the model so calls can be chained.

use crate::tile::{POSITION_WIDTH, TileModel};

/// A unit quaternion `(x, y, z, w)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Rotation of `angle` degrees around `(x, y, z)`.
    pub fn from_axis_angle(angle: f64, x: f64, y: f64, z: f64) -> Self {
        let half_angle = angle.to_radians() / 2.0;
        let length = (x * x + y * y + z * z).sqrt();
        if length == 0.0 {
            return Self::IDENTITY;
        }
        let q = half_angle.sin() / length;
        Self { x: x * q, y: y * q, z: z * q, w: half_angle.cos() }.normalized()
    }

    /// Rotation from euler angles in degrees: yaw around y, then pitch
    /// around x, then roll around z.
    pub fn from_euler(pitch: f64, yaw: f64, roll: f64) -> Self {
        let half_yaw = yaw.to_radians() / 2.0;
        let qy1 = half_yaw.sin();
        let qw1 = half_yaw.cos();

        let half_pitch = pitch.to_radians() / 2.0;
        let qx2 = half_pitch.sin();
        let qw2 = half_pitch.cos();

        let half_roll = roll.to_radians() / 2.0;
        let qz3 = half_roll.sin();
        let qw3 = half_roll.cos();

        // yaw * pitch
        let qx_a = qw1 * qx2;
        let qy_a = qy1 * qw2;
        let qz_a = -qy1 * qx2;
        let qw_a = qw1 * qw2;

        // * roll
        Self {
            x: qx_a * qw3 + qy_a * qz3,
            y: qy_a * qw3 - qx_a * qz3,
            z: qw_a * qz3 + qz_a * qw3,
            w: qw_a * qw3 - qz_a * qz3,
        }
    }

    pub fn normalized(self) -> Self {
        let length = (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt();
        if length == 0.0 {
            return Self::IDENTITY;
        }
        Self { x: self.x / length, y: self.y / length, z: self.z / length, w: self.w / length }
    }

    pub fn inverse(self) -> Self {
        Self { x: -self.x, y: -self.y, z: -self.z, w: self.w }
    }

    /// `q * v * q^-1`, expanded.
    pub fn rotate(&self, x: f64, y: f64, z: f64) -> [f64; 3] {
        let (qx, qy, qz, qw) = (self.x, self.y, self.z, self.w);

        let px = qw * x + qy * z - qz * y;
        let py = qw * y + qz * x - qx * z;
        let pz = qw * z + qx * y - qy * x;
        let pw = -qx * x - qy * y - qz * z;

        [
            pw * -qx + px * qw - py * qz + pz * qy,
            pw * -qy + py * qw - pz * qx + px * qz,
            pw * -qz + pz * qw - px * qy + py * qx,
        ]
    }
}

impl TileModel {
    /// Rotate by `angle` degrees around the axis `(axis_x, axis_y, axis_z)`.
    pub fn rotate(&mut self, start: usize, count: usize, angle: f32, axis_x: f32, axis_y: f32, axis_z: f32) -> &mut Self {
        let q = Quaternion::from_axis_angle(angle as f64, axis_x as f64, axis_y as f64, axis_z as f64);
        self.rotate_by_quaternion(start, count, q)
    }

    /// Rotate by euler angles in degrees.
    pub fn rotate_euler(&mut self, start: usize, count: usize, pitch: f32, yaw: f32, roll: f32) -> &mut Self {
        let q = Quaternion::from_euler(pitch as f64, yaw as f64, roll as f64);
        self.rotate_by_quaternion(start, count, q)
    }

    pub fn rotate_by_quaternion(&mut self, start: usize, count: usize, q: Quaternion) -> &mut Self {
        self.map_vertices(start, count, |x, y, z| q.rotate(x, y, z))
    }

    pub fn scale(&mut self, start: usize, count: usize, sx: f32, sy: f32, sz: f32) -> &mut Self {
        let (sx, sy, sz) = (sx as f64, sy as f64, sz as f64);
        self.map_vertices(start, count, |x, y, z| [x * sx, y * sy, z * sz])
    }

    pub fn translate(&mut self, start: usize, count: usize, dx: f32, dy: f32, dz: f32) -> &mut Self {
        let (dx, dy, dz) = (dx as f64, dy as f64, dz as f64);
        self.map_vertices(start, count, |x, y, z| [x + dx, y + dy, z + dz])
    }

    /// Multiply by a row-major 3x3 matrix.
    pub fn transform3(&mut self, start: usize, count: usize, m: &[[f32; 3]; 3]) -> &mut Self {
        let m = m.map(|row| row.map(f64::from));
        self.map_vertices(start, count, |x, y, z| {
            [
                m[0][0] * x + m[0][1] * y + m[0][2] * z,
                m[1][0] * x + m[1][1] * y + m[1][2] * z,
                m[2][0] * x + m[2][1] * y + m[2][2] * z,
            ]
        })
    }

    /// Multiply by a row-major 4x4 matrix, dividing by the resulting w.
    pub fn transform4(&mut self, start: usize, count: usize, m: &[[f32; 4]; 4]) -> &mut Self {
        let m = m.map(|row| row.map(f64::from));
        self.map_vertices(start, count, |x, y, z| {
            let w = m[3][0] * x + m[3][1] * y + m[3][2] * z + m[3][3];
            [
                (m[0][0] * x + m[0][1] * y + m[0][2] * z + m[0][3]) / w,
                (m[1][0] * x + m[1][1] * y + m[1][2] * z + m[1][3]) / w,
                (m[2][0] * x + m[2][1] * y + m[2][2] * z + m[2][3]) / w,
            ]
        })
    }

    fn map_vertices(&mut self, start: usize, count: usize, f: impl Fn(f64, f64, f64) -> [f64; 3]) -> &mut Self {
        let from = start * POSITION_WIDTH;
        let to = (start + count) * POSITION_WIDTH;
        for vertex in self.position[from..to].chunks_exact_mut(3) {
            let [x, y, z] = f(vertex[0] as f64, vertex[1] as f64, vertex[2] as f64);
            vertex[0] = x as f32;
            vertex[1] = y as f32;
            vertex[2] = z as f32;
        }
        self
    }
}
