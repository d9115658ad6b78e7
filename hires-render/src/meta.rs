use hires_model::Color;
use serde::Serialize;

/// Per-column results of a tile render: the highest block that contributed
/// color and the accumulated straight color of the column.
#[derive(Debug, Clone)]
pub struct TileMeta {
    min_x: i32,
    min_z: i32,
    size_x: usize,
    size_z: usize,
    heights: Vec<Option<i32>>,
    colors: Vec<Color>,
}

/// One column of a [`TileMeta`], ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMeta {
    pub x: i32,
    pub z: i32,
    pub height: Option<i32>,
    /// `0xAARRGGBB`
    pub color: u32,
}

impl TileMeta {
    pub fn new(min_x: i32, min_z: i32, size_x: usize, size_z: usize) -> Self {
        Self {
            min_x,
            min_z,
            size_x,
            size_z,
            heights: vec![None; size_x * size_z],
            colors: vec![Color::TRANSPARENT; size_x * size_z],
        }
    }

    pub fn size_x(&self) -> usize {
        self.size_x
    }

    pub fn size_z(&self) -> usize {
        self.size_z
    }

    fn index(&self, x: i32, z: i32) -> Option<usize> {
        let (dx, dz) = (x - self.min_x, z - self.min_z);
        if dx < 0 || dz < 0 || dx as usize >= self.size_x || dz as usize >= self.size_z {
            return None;
        }
        Some(dz as usize * self.size_x + dx as usize)
    }

    pub fn set(&mut self, x: i32, z: i32, height: Option<i32>, color: Color) {
        if let Some(i) = self.index(x, z) {
            self.heights[i] = height;
            self.colors[i] = color.to_straight();
        }
    }

    /// World y of the highest colored block at `(x, z)`.
    pub fn height(&self, x: i32, z: i32) -> Option<i32> {
        self.index(x, z).and_then(|i| self.heights[i])
    }

    /// Straight-alpha color of the column at `(x, z)`.
    pub fn color(&self, x: i32, z: i32) -> Color {
        self.index(x, z).map(|i| self.colors[i]).unwrap_or_default().to_straight()
    }

    pub fn columns(&self) -> impl Iterator<Item = ColumnMeta> + '_ {
        (0..self.size_z).flat_map(move |dz| {
            (0..self.size_x).map(move |dx| {
                let i = dz * self.size_x + dx;
                ColumnMeta {
                    x: self.min_x + dx as i32,
                    z: self.min_z + dz as i32,
                    height: self.heights[i],
                    color: self.colors[i].to_argb(),
                }
            })
        })
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "min": [self.min_x, self.min_z],
            "size": [self.size_x, self.size_z],
            "columns": self.columns().collect::<Vec<_>>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_by_world_coordinates() {
        let mut meta = TileMeta::new(-2, 10, 2, 3);
        meta.set(-1, 12, Some(64), Color::premultiplied(0.5, 0.0, 0.0, 0.5));
        meta.set(5, 5, Some(1), Color::from_rgb(0xFFFFFF));

        assert_eq!(meta.height(-1, 12), Some(64));
        assert_eq!(meta.height(-2, 10), None);
        assert_eq!(meta.height(5, 5), None);
        assert_eq!(meta.color(-1, 12), Color::straight(1.0, 0.0, 0.0, 0.5));

        let columns: Vec<ColumnMeta> = meta.columns().collect();
        assert_eq!(columns.len(), 6);
        assert_eq!(columns[5], ColumnMeta { x: -1, z: 12, height: Some(64), color: 0x80FF0000 });

        let json = meta.to_json();
        assert_eq!(json["columns"][5]["height"], 64);
        assert!(json["columns"][0]["height"].is_null());
    }
}
