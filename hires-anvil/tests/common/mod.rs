//! Chunk NBT builders for integration tests.
#![allow(dead_code)]

use std::path::PathBuf;

use fastnbt::{ByteArray, IntArray, LongArray, Value};
use hires_anvil::packed::{ceil_log2, pack_aligned, pack_straddled};

pub const V1_18: i32 = 3465;
pub const V1_16: i32 = 2586;
pub const V1_15: i32 = 2230;
pub const V1_13: i32 = 1631;

pub fn compound(entries: Vec<(&str, Value)>) -> Value {
    Value::Compound(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

pub fn block(name: &str) -> Value {
    compound(vec![("Name", Value::String(name.to_string()))])
}

/// Light nibbles with every block set to `level`.
pub fn full_light(level: u8) -> Value {
    let byte = (level << 4 | level) as i8;
    Value::ByteArray(ByteArray::new(vec![byte; 2048]))
}

/// Section in the 1.18+ layout. `indices` is one palette index per block.
pub fn modern_section(y: i8, palette: &[&str], indices: Option<&[u64]>) -> Value {
    let mut states = vec![(
        "palette",
        Value::List(palette.iter().map(|name| block(name)).collect()),
    )];
    if let Some(indices) = indices {
        let bits = ceil_log2(palette.len()).max(4);
        states.push(("data", Value::LongArray(LongArray::new(pack_aligned(indices, bits)))));
    }
    compound(vec![
        ("Y", Value::Byte(y)),
        ("block_states", compound(states)),
        ("SkyLight", full_light(15)),
        ("BlockLight", full_light(0)),
    ])
}

/// 1.18+ section with a raw block data array.
pub fn modern_section_raw(y: i8, palette: &[&str], data: Vec<i64>) -> Value {
    compound(vec![
        ("Y", Value::Byte(y)),
        (
            "block_states",
            compound(vec![
                ("palette", Value::List(palette.iter().map(|name| block(name)).collect())),
                ("data", Value::LongArray(LongArray::new(data))),
            ]),
        ),
    ])
}

pub fn modern_chunk(data_version: i32, y_pos: i32, status: &str, light_on: bool, sections: Vec<Value>) -> Vec<u8> {
    modern_chunk_with(data_version, y_pos, status, light_on, sections, Vec::new())
}

pub fn modern_chunk_with(
    data_version: i32,
    y_pos: i32,
    status: &str,
    light_on: bool,
    sections: Vec<Value>,
    extra: Vec<(&str, Value)>,
) -> Vec<u8> {
    let mut entries = vec![
        ("DataVersion", Value::Int(data_version)),
        ("Status", Value::String(status.to_string())),
        ("isLightOn", Value::Byte(light_on as i8)),
        ("yPos", Value::Int(y_pos)),
        ("InhabitedTime", Value::Long(1200)),
        ("sections", Value::List(sections)),
    ];
    entries.extend(extra);
    fastnbt::to_bytes(&compound(entries)).unwrap()
}

/// Section in the `Level` layout. Straddled below 1.16, aligned from 1.16.
pub fn level_section(y: i8, palette: &[&str], indices: &[u64], aligned: bool) -> Value {
    let bits = ceil_log2(palette.len()).max(4);
    let packed = if aligned {
        pack_aligned(indices, bits)
    } else {
        pack_straddled(indices, bits)
    };
    compound(vec![
        ("Y", Value::Byte(y)),
        ("Palette", Value::List(palette.iter().map(|name| block(name)).collect())),
        ("BlockStates", Value::LongArray(LongArray::new(packed))),
        ("SkyLight", full_light(15)),
        ("BlockLight", full_light(0)),
    ])
}

pub fn level_chunk(data_version: i32, status: &str, sections: Vec<Value>, biomes: Option<Value>) -> Vec<u8> {
    level_chunk_lit(data_version, status, true, sections, biomes)
}

/// `Level` chunk with an explicit `isLightOn` flag (read from 1.16 on).
pub fn level_chunk_lit(
    data_version: i32,
    status: &str,
    light_on: bool,
    sections: Vec<Value>,
    biomes: Option<Value>,
) -> Vec<u8> {
    let mut level = vec![
        ("Status", Value::String(status.to_string())),
        ("isLightOn", Value::Byte(light_on as i8)),
        ("InhabitedTime", Value::Long(40)),
        ("Sections", Value::List(sections)),
    ];
    if let Some(biomes) = biomes {
        level.push(("Biomes", biomes));
    }
    let root = compound(vec![
        ("DataVersion", Value::Int(data_version)),
        ("Level", compound(level)),
    ]);
    fastnbt::to_bytes(&root).unwrap()
}

pub fn int_biomes(ids: Vec<i32>) -> Value {
    Value::IntArray(IntArray::new(ids))
}

pub fn byte_biomes(ids: Vec<i8>) -> Value {
    Value::ByteArray(ByteArray::new(ids))
}

pub fn block_index(x: usize, y: usize, z: usize) -> usize {
    y << 8 | z << 4 | x
}

/// Fresh directory under the system temp dir.
pub fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("hires-anvil-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
