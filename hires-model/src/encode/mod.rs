//! Tile model encoders.
//!
//! Both formats write one vertex per face corner (non-indexed) and share the
//! material grouping from [`material_groups`].

pub mod json;
pub mod prbm;

use std::io::Write;

use crate::tile::TileModel;

/// A run of consecutive faces with the same material, in face units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialGroup {
    pub material_index: i32,
    pub start: usize,
    pub count: usize,
}

/// Runs of equal material over the model's faces. Sort the model first to
/// get one group per material.
pub fn material_groups(model: &TileModel) -> Vec<MaterialGroup> {
    let mut groups: Vec<MaterialGroup> = Vec::new();
    for face in 0..model.size() {
        let material_index = model.material_index(face);
        match groups.last_mut() {
            Some(group) if group.material_index == material_index => group.count += 1,
            _ => groups.push(MaterialGroup { material_index, start: face, count: 1 }),
        }
    }
    groups
}

/// Unit normal of a face from the cross product of its edges. Degenerate
/// faces get a zero normal.
pub fn face_normal(model: &TileModel, face: usize) -> [f32; 3] {
    let p = model.positions(face);
    let (ax, ay, az) = ((p[3] - p[0]) as f64, (p[4] - p[1]) as f64, (p[5] - p[2]) as f64);
    let (bx, by, bz) = ((p[6] - p[0]) as f64, (p[7] - p[1]) as f64, (p[8] - p[2]) as f64);

    let nx = ay * bz - az * by;
    let ny = az * bx - ax * bz;
    let nz = ax * by - ay * bx;

    let length = (nx * nx + ny * ny + nz * nz).sqrt();
    if length == 0.0 || !length.is_finite() {
        return [0.0; 3];
    }
    [(nx / length) as f32, (ny / length) as f32, (nz / length) as f32]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileFormat {
    Prbm,
    Json,
}

impl TileFormat {
    pub fn extension(self) -> &'static str {
        match self {
            TileFormat::Prbm => "prbm",
            TileFormat::Json => "json",
        }
    }

    /// Write the model, returning the number of bytes written.
    pub fn encode<W: Write>(self, model: &TileModel, out: W) -> anyhow::Result<u64> {
        match self {
            TileFormat::Prbm => prbm::write(model, out),
            TileFormat::Json => json::write(model, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_groups() {
        let mut model = TileModel::new(6);
        model.add(6);
        for (face, material) in [1, 1, 2, 2, 2, 1].into_iter().enumerate() {
            model.set_material_index(face, material);
        }
        let groups = material_groups(&model);
        assert_eq!(
            groups,
            vec![
                MaterialGroup { material_index: 1, start: 0, count: 2 },
                MaterialGroup { material_index: 2, start: 2, count: 3 },
                MaterialGroup { material_index: 1, start: 5, count: 1 },
            ]
        );
        assert!(material_groups(&TileModel::new(1)).is_empty());
    }

    #[test]
    fn test_face_normal() {
        let mut model = TileModel::new(2);
        model.add(2);
        model.set_positions(0, [0.0, 0.0, 0.0], [0.0, 0.0, 2.0], [2.0, 0.0, 0.0]);
        model.set_positions(1, [1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]);
        assert_eq!(face_normal(&model, 0), [0.0, 1.0, 0.0]);
        assert_eq!(face_normal(&model, 1), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_extensions() {
        assert_eq!(TileFormat::Prbm.extension(), "prbm");
        assert_eq!(TileFormat::Json.extension(), "json");
    }
}
