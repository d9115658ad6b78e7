//! JSON tile format, a three.js `BufferGeometry` document.

use std::io::Write;

use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::encode::{face_normal, material_groups};
use crate::tile::{TileModel, VERTICES_PER_FACE};

/// Round to 4 decimals; whole numbers become integers.
pub fn round_number(value: f64) -> Value {
    let rounded = (value * 10000.0).round() / 10000.0;
    if rounded.fract() == 0.0 && rounded.abs() < i64::MAX as f64 {
        Value::from(rounded as i64)
    } else {
        Value::from(rounded)
    }
}

fn attribute(item_size: usize, normalized: bool, values: Vec<Value>) -> Value {
    json!({
        "type": "Float32Array",
        "itemSize": item_size,
        "normalized": normalized,
        "array": values,
    })
}

/// Per-face values repeated for each vertex.
fn per_vertex(size: usize, item: impl Fn(usize) -> Vec<f64>) -> Vec<Value> {
    let mut values = Vec::new();
    for face in 0..size {
        let face_values: Vec<Value> = item(face).into_iter().map(round_number).collect();
        for _ in 0..VERTICES_PER_FACE {
            values.extend(face_values.iter().cloned());
        }
    }
    values
}

fn flat(size: usize, item: impl Fn(usize) -> Vec<f64>) -> Vec<Value> {
    (0..size).flat_map(&item).map(round_number).collect()
}

/// Build the JSON document for a model.
pub fn document(model: &TileModel) -> Value {
    let size = model.size();
    let floats = |values: &[f32]| values.iter().map(|&v| v as f64).collect::<Vec<_>>();

    let mut attributes = Map::new();
    attributes.insert("position".into(), attribute(3, false, flat(size, |f| floats(model.positions(f)))));
    attributes.insert(
        "normal".into(),
        attribute(3, false, per_vertex(size, |f| floats(&face_normal(model, f)[..]))),
    );
    attributes.insert("color".into(), attribute(3, false, per_vertex(size, |f| floats(model.color(f)))));
    attributes.insert("uv".into(), attribute(2, false, flat(size, |f| floats(model.uvs(f)))));
    attributes.insert("ao".into(), attribute(1, false, flat(size, |f| floats(model.ao(f)))));
    attributes.insert(
        "blocklight".into(),
        attribute(1, false, per_vertex(size, |f| vec![model.block_light(f) as f64])),
    );
    attributes.insert(
        "sunlight".into(),
        attribute(1, false, per_vertex(size, |f| vec![model.sky_light(f) as f64])),
    );

    let groups: Vec<Value> = material_groups(model)
        .into_iter()
        .map(|g| {
            json!({
                "materialIndex": g.material_index,
                "start": g.start * VERTICES_PER_FACE,
                "count": g.count * VERTICES_PER_FACE,
            })
        })
        .collect();

    json!({
        "tileGeometry": {
            "type": "BufferGeometry",
            "uuid": Uuid::new_v4().to_string().to_uppercase(),
            "data": {
                "attributes": attributes,
                "groups": groups,
            }
        }
    })
}

pub fn write<W: Write>(model: &TileModel, out: W) -> anyhow::Result<u64> {
    let mut out = CountingWriter { inner: out, written: 0 };
    serde_json::to_writer(&mut out, &document(model))?;
    out.flush()?;
    Ok(out.written)
}

struct CountingWriter<W: Write> {
    inner: W,
    written: u64,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_number() {
        assert_eq!(round_number(1.0).to_string(), "1");
        assert_eq!(round_number(-3.0).to_string(), "-3");
        assert_eq!(round_number(0.123456).to_string(), "0.1235");
        assert_eq!(round_number(2.00001).to_string(), "2");
        assert_eq!(round_number(0.5).to_string(), "0.5");
    }

    #[test]
    fn test_document_shape() {
        let mut model = TileModel::new(2);
        model.add(2);
        model
            .set_positions(0, [0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0])
            .set_color(0, 1.0, 0.5, 0.25)
            .set_sky_light(0, 15)
            .set_material_index(0, 2);
        model.set_material_index(1, 3);

        let doc = document(&model);
        let geometry = &doc["tileGeometry"];
        assert_eq!(geometry["type"], "BufferGeometry");
        assert_eq!(geometry["uuid"].as_str().unwrap().len(), 36);

        let attributes = &geometry["data"]["attributes"];
        assert_eq!(attributes["position"]["array"].as_array().unwrap().len(), 18);
        assert_eq!(attributes["uv"]["itemSize"], 2);
        assert_eq!(attributes["normal"]["array"][1], 1);
        assert_eq!(attributes["color"]["array"].as_array().unwrap().len(), 18);
        assert_eq!(attributes["color"]["array"][4], 0.5);
        assert_eq!(attributes["sunlight"]["array"][2], 15);
        assert_eq!(attributes["ao"]["array"].as_array().unwrap().len(), 6);

        let groups = geometry["data"]["groups"].as_array().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1]["materialIndex"], 3);
        assert_eq!(groups[1]["start"], 3);
        assert_eq!(groups[1]["count"], 3);
    }
}
