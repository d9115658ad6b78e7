//! Namespaced identifiers and block states.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// A namespaced id like `minecraft:stone`.
///
/// Cloning is cheap, equality and hashing use the formatted string.
#[derive(Clone)]
pub struct Key {
    formatted: Arc<str>,
    split: usize,
}

impl Key {
    pub fn new(namespace: &str, value: &str) -> Self {
        let formatted: Arc<str> = format!("{}:{}", namespace, value).into();
        Self { formatted, split: namespace.len() }
    }

    /// Parse `namespace:value`, falling back to the `minecraft` namespace.
    pub fn parse(id: &str) -> Self {
        match id.split_once(':') {
            Some((namespace, value)) => Self::new(namespace, value),
            None => Self::new(DEFAULT_NAMESPACE, id),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.formatted[..self.split]
    }

    pub fn value(&self) -> &str {
        &self.formatted[self.split + 1..]
    }

    pub fn formatted(&self) -> &str {
        &self.formatted
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.formatted == other.formatted
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.formatted.hash(state);
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.formatted)
    }
}

static AIR: LazyLock<BlockState> = LazyLock::new(|| BlockState::new(Key::new(DEFAULT_NAMESPACE, "air")));
static MISSING: LazyLock<BlockState> = LazyLock::new(|| BlockState::new(Key::new("hires", "missing")));

/// A block id together with its properties, e.g. `minecraft:oak_log[axis=y]`.
#[derive(Clone)]
pub struct BlockState {
    key: Key,
    properties: Arc<BTreeMap<String, String>>,
    formatted: Arc<str>,
}

impl BlockState {
    pub fn new(key: Key) -> Self {
        Self::with_properties(key, BTreeMap::new())
    }

    pub fn with_properties(key: Key, properties: BTreeMap<String, String>) -> Self {
        let formatted: Arc<str> = if properties.is_empty() {
            key.formatted.clone()
        } else {
            let props: Vec<String> = properties.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            format!("{}[{}]", key, props.join(",")).into()
        };
        Self { key, properties: Arc::new(properties), formatted }
    }

    pub fn air() -> &'static BlockState {
        &AIR
    }

    /// Placeholder used for corrupt palette references and failed block models.
    pub fn missing() -> &'static BlockState {
        &MISSING
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub fn is_air(&self) -> bool {
        self.key.namespace() == DEFAULT_NAMESPACE
            && matches!(self.key.value(), "air" | "cave_air" | "void_air")
    }

    pub fn is_missing(&self) -> bool {
        self.formatted == MISSING.formatted
    }

    pub fn formatted(&self) -> &str {
        &self.formatted
    }
}

impl PartialEq for BlockState {
    fn eq(&self, other: &Self) -> bool {
        self.formatted == other.formatted
    }
}

impl Eq for BlockState {}

impl Hash for BlockState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.formatted.hash(state);
    }
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted)
    }
}

impl fmt::Debug for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockState({})", self.formatted)
    }
}
