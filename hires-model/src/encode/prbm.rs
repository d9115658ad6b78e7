//! Binary tile format.
//!
//! Layout, little endian throughout:
//! - byte 0: format version
//! - byte 1: header bits (indexed, index type, endianness, attribute count)
//! - bytes 2-4: vertex count, bytes 5-7: index count (0, not indexed)
//! - attribute records: name, NUL, type tag, padding, values, padding
//! - material groups: `(material, start, count)` in vertices, then `-1`
//!
//! Every value block starts and ends on a 4 byte boundary.

use std::io::Write;

use crate::encode::{face_normal, material_groups};
use crate::tile::{TileModel, VERTICES_PER_FACE};

pub const FORMAT_VERSION: u8 = 1;
pub const ATTRIBUTE_COUNT: u8 = 7;

/// Largest vertex count the 24-bit header field holds.
pub const MAX_VERTICES: usize = 0xFF_FFFF;

// type tag bits
pub const FLOAT: u8 = 0;
pub const INTEGER: u8 = 1 << 7;
pub const NORMALIZED: u8 = 1 << 6;
pub const SCALAR: u8 = 0;
pub const VEC2: u8 = 1 << 4;
pub const VEC3: u8 = 2 << 4;
pub const VEC4: u8 = 3 << 4;
pub const F32: u8 = 1;
pub const I8: u8 = 3;
pub const I16: u8 = 4;
pub const I32: u8 = 5;
pub const U8: u8 = 6;
pub const U16: u8 = 7;
pub const U32: u8 = 8;

struct PrbmWriter<W: Write> {
    out: W,
    written: u64,
}

impl<W: Write> PrbmWriter<W> {
    fn bytes(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.out.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    fn byte(&mut self, value: u8) -> std::io::Result<()> {
        self.bytes(&[value])
    }

    fn u24(&mut self, value: usize) -> std::io::Result<()> {
        let value = value as u32;
        self.bytes(&value.to_le_bytes()[..3])
    }

    fn i32(&mut self, value: i32) -> std::io::Result<()> {
        self.bytes(&value.to_le_bytes())
    }

    fn f32(&mut self, value: f32) -> std::io::Result<()> {
        self.bytes(&value.to_le_bytes())
    }

    fn pad(&mut self) -> std::io::Result<()> {
        let padding = (4 - self.written % 4) % 4;
        for _ in 0..padding {
            self.byte(0)?;
        }
        Ok(())
    }

    fn attribute(&mut self, name: &str, tag: u8) -> std::io::Result<()> {
        self.bytes(name.as_bytes())?;
        self.byte(0)?;
        self.byte(tag)?;
        self.pad()
    }
}

/// Normalized signed byte, rounding down.
pub fn normalized_i8(value: f32) -> i8 {
    (value as f64 * 127.0).floor().clamp(-128.0, 127.0) as i8
}

/// Normalized unsigned byte, rounding to nearest.
pub fn normalized_u8(value: f32) -> u8 {
    (value as f64 * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Vertices written for `faces` faces, checked against the header field.
pub fn vertex_count(faces: usize) -> anyhow::Result<usize> {
    match faces.checked_mul(VERTICES_PER_FACE) {
        Some(vertices) if vertices <= MAX_VERTICES => Ok(vertices),
        _ => anyhow::bail!("Tile has {} faces, more than a PRBM file can hold ({} vertices)", faces, MAX_VERTICES),
    }
}

pub fn write<W: Write>(model: &TileModel, out: W) -> anyhow::Result<u64> {
    let size = model.size();
    let vertices = vertex_count(size)?;
    let mut w = PrbmWriter { out, written: 0 };

    w.byte(FORMAT_VERSION)?;
    // not indexed, little endian
    w.byte(ATTRIBUTE_COUNT & 0x1F)?;
    w.u24(vertices)?;
    w.u24(0)?;

    w.attribute("position", FLOAT | VEC3 | F32)?;
    for face in 0..size {
        for &v in model.positions(face) {
            w.f32(v)?;
        }
    }
    w.pad()?;

    w.attribute("normal", INTEGER | NORMALIZED | VEC3 | I8)?;
    for face in 0..size {
        let normal = face_normal(model, face).map(|v| normalized_i8(v) as u8);
        for _ in 0..VERTICES_PER_FACE {
            w.bytes(&normal)?;
        }
    }
    w.pad()?;

    w.attribute("color", INTEGER | NORMALIZED | VEC3 | U8)?;
    for face in 0..size {
        let color = model.color(face);
        let rgb = [normalized_u8(color[0]), normalized_u8(color[1]), normalized_u8(color[2])];
        for _ in 0..VERTICES_PER_FACE {
            w.bytes(&rgb)?;
        }
    }
    w.pad()?;

    w.attribute("uv", FLOAT | VEC2 | F32)?;
    for face in 0..size {
        for &v in model.uvs(face) {
            w.f32(v)?;
        }
    }
    w.pad()?;

    w.attribute("ao", INTEGER | NORMALIZED | SCALAR | U8)?;
    for face in 0..size {
        for &v in model.ao(face) {
            w.byte(normalized_u8(v))?;
        }
    }
    w.pad()?;

    w.attribute("blocklight", INTEGER | SCALAR | I8)?;
    for face in 0..size {
        let light = model.block_light(face);
        w.bytes(&[light; VERTICES_PER_FACE])?;
    }
    w.pad()?;

    w.attribute("sunlight", INTEGER | SCALAR | I8)?;
    for face in 0..size {
        let light = model.sky_light(face);
        w.bytes(&[light; VERTICES_PER_FACE])?;
    }
    w.pad()?;

    for group in material_groups(model) {
        w.i32(group.material_index)?;
        w.i32((group.start * VERTICES_PER_FACE) as i32)?;
        w.i32((group.count * VERTICES_PER_FACE) as i32)?;
    }
    w.i32(-1)?;

    w.out.flush()?;
    Ok(w.written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_rounding() {
        assert_eq!(normalized_i8(1.0), 127);
        assert_eq!(normalized_i8(-1.0), -127);
        assert_eq!(normalized_i8(0.0), 0);
        assert_eq!(normalized_i8(0.5), 63);
        assert_eq!(normalized_i8(-0.5), -64);
    }

    #[test]
    fn test_color_rounding() {
        assert_eq!(normalized_u8(1.0), 255);
        assert_eq!(normalized_u8(0.5), 128);
        assert_eq!(normalized_u8(-0.2), 0);
        assert_eq!(normalized_u8(1.7), 255);
    }

    #[test]
    fn test_empty_model() {
        let mut bytes = Vec::new();
        let written = write(&TileModel::new(0), &mut bytes).unwrap();
        assert_eq!(written as usize, bytes.len());
        assert_eq!(&bytes[..8], &[1, 7, 0, 0, 0, 0, 0, 0]);
        // "position" NUL tag -> 10 bytes, padded to 12
        assert_eq!(&bytes[8..16], b"position");
        assert_eq!(bytes[16], 0);
        assert_eq!(bytes[17], FLOAT | VEC3 | F32);
        assert_eq!(&bytes[bytes.len() - 4..], &(-1i32).to_le_bytes());
        assert_eq!(bytes.len() % 4, 0);
    }

    #[test]
    fn test_vertex_count_limit() {
        assert_eq!(vertex_count(0).unwrap(), 0);
        assert_eq!(vertex_count(MAX_VERTICES / 3).unwrap(), 0xFF_FFFF);
        assert!(vertex_count(MAX_VERTICES / 3 + 1).is_err());
        assert!(vertex_count(usize::MAX).is_err());
    }

    #[test]
    fn test_vertex_count_and_groups() {
        let mut model = TileModel::new(3);
        model.add(3);
        model.set_material_index(0, 4).set_material_index(1, 4).set_material_index(2, 9);
        let mut bytes = Vec::new();
        write(&model, &mut bytes).unwrap();

        assert_eq!(&bytes[2..5], &[9, 0, 0]);
        let tail: Vec<i32> = bytes[bytes.len() - 28..]
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(tail, vec![4, 0, 6, 9, 6, 3, -1]);
    }
}
