use hires_model::encode::{json, prbm};
use hires_model::{BlockModelView, TileFormat, TileModel, material_groups};

/// Quad made of two faces, spread out by `seed` so faces differ.
fn add_quad(model: &mut TileModel, seed: usize, material: i32) {
    let mut view = BlockModelView::new(model);
    let start = view.add(2);
    let s = seed as f32;
    let model = view.model();
    for face in start..start + 2 {
        let offset = (face - start) as f32;
        model
            .set_positions(face, [s, offset, 0.0], [s, offset, 1.0], [s + 1.0, offset, 0.0])
            .set_uvs(face, [0.0, 0.0], [0.0, 1.0], [1.0, 0.0])
            .set_ao(face, 1.0, 0.8, 0.6)
            .set_color(face, 0.1 * offset, 0.5, s / 100.0)
            .set_sky_light(face, (seed % 16) as u8)
            .set_block_light(face, ((seed + 3) % 16) as u8)
            .set_material_index(face, material);
    }
}

fn build_model(faces: usize) -> TileModel {
    let mut model = TileModel::new(8);
    for seed in 0..faces / 2 {
        add_quad(&mut model, seed, ((seed * 31) % 5) as i32);
    }
    model
}

type FaceTuple = (Vec<u32>, Vec<u32>, Vec<u32>, Vec<u32>, u8, u8, i32);

fn face_tuples(model: &TileModel) -> Vec<FaceTuple> {
    let bits = |values: &[f32]| values.iter().map(|v| v.to_bits()).collect::<Vec<_>>();
    (0..model.size())
        .map(|f| {
            (
                bits(model.positions(f)),
                bits(model.uvs(f)),
                bits(model.ao(f)),
                bits(model.color(f)),
                model.sky_light(f),
                model.block_light(f),
                model.material_index(f),
            )
        })
        .collect()
}

#[test]
fn test_sort_is_a_stable_permutation() {
    let mut model = build_model(400);
    let before = face_tuples(&model);
    model.sort();
    let after = face_tuples(&model);

    let mut expected = before.clone();
    expected.sort_by_key(|t| t.6);
    assert_eq!(after, expected);

    let groups = material_groups(&model);
    assert_eq!(groups.len(), 5);
    assert_eq!(groups.iter().map(|g| g.count).sum::<usize>(), 400);
}

#[test]
fn test_transform_round_trips() {
    let mut model = build_model(20);
    let original = face_tuples(&model);
    let size = model.size();

    let close = |model: &TileModel| {
        for face in 0..size {
            let expected = &original[face].0;
            for (a, e) in model.positions(face).iter().zip(expected) {
                assert!((a - f32::from_bits(*e)).abs() < 1e-4);
            }
        }
    };

    model.translate(0, size, 3.5, -2.0, 100.0).translate(0, size, -3.5, 2.0, -100.0);
    close(&model);
    model.scale(0, size, 2.0, 0.5, 4.0).scale(0, size, 0.5, 2.0, 0.25);
    close(&model);
    model.rotate(0, size, 33.0, 1.0, 2.0, 3.0).rotate(0, size, -33.0, 1.0, 2.0, 3.0);
    close(&model);
    model.rotate_euler(0, size, 10.0, 20.0, 30.0);
    model.rotate_by_quaternion(0, size, hires_model::transform::Quaternion::from_euler(10.0, 20.0, 30.0).inverse());
    close(&model);
}

/// Vertex count and `(material, start, count)` groups of a binary tile.
fn read_prbm(bytes: &[u8]) -> (usize, Vec<(i32, i32, i32)>) {
    let vertices = u32::from_le_bytes([bytes[2], bytes[3], bytes[4], 0]) as usize;
    let attribute_count = (bytes[1] & 0x1F) as usize;
    let align = |at: usize| at.div_ceil(4) * 4;

    let mut at = 8;
    for _ in 0..attribute_count {
        while bytes[at] != 0 {
            at += 1;
        }
        let tag = bytes[at + 1];
        at = align(at + 2);
        let cardinality = ((tag >> 4) & 0b11) as usize + 1;
        let width = match tag & 0x0F {
            prbm::F32 | prbm::I32 | prbm::U32 => 4,
            prbm::I16 | prbm::U16 => 2,
            _ => 1,
        };
        at = align(at + vertices * cardinality * width);
    }

    let int = |at: usize| i32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
    let mut groups = Vec::new();
    while int(at) != -1 {
        groups.push((int(at), int(at + 4), int(at + 8)));
        at += 12;
    }
    assert_eq!(at + 4, bytes.len());
    (vertices, groups)
}

#[test]
fn test_encoders_agree() {
    let mut model = build_model(60);
    model.sort();

    let mut binary = Vec::new();
    let written = TileFormat::Prbm.encode(&model, &mut binary).unwrap();
    assert_eq!(written as usize, binary.len());
    let (vertices, binary_groups) = read_prbm(&binary);

    let mut text = Vec::new();
    TileFormat::Json.encode(&model, &mut text).unwrap();
    let doc: serde_json::Value = serde_json::from_slice(&text).unwrap();
    let data = &doc["tileGeometry"]["data"];
    let json_groups: Vec<(i32, i32, i32)> = data["groups"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| {
            (
                g["materialIndex"].as_i64().unwrap() as i32,
                g["start"].as_i64().unwrap() as i32,
                g["count"].as_i64().unwrap() as i32,
            )
        })
        .collect();

    assert_eq!(vertices, 180);
    assert_eq!(data["attributes"]["position"]["array"].as_array().unwrap().len(), vertices * 3);
    assert_eq!(binary_groups, json_groups);
    assert!(json_groups.iter().all(|g| g.2 % 3 == 0));
    assert_eq!(json_groups.iter().map(|g| g.2).sum::<i32>(), 180);

    // same document structure when built directly
    assert_eq!(
        json::document(&model)["tileGeometry"]["data"]["groups"],
        data["groups"]
    );
}
