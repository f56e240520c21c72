use std::fmt;

use bytemuck::{Pod, Zeroable};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Index into a [`BlockPalette`].
#[repr(transparent)]
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Pod,
    Zeroable,
)]
pub struct BlockId(pub u16);

impl BlockId {
    /// Palette slot reserved for air. Also used to fill halo cells with no neighbour data.
    pub const AIR: Self = Self(0);

    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Namespaced block name, e.g. `minecraft:stone`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockKey(String);

impl BlockKey {
    pub const AIR: &'static str = "minecraft:air";

    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.contains(':') {
            Self(name)
        } else {
            Self(format!("minecraft:{name}"))
        }
    }

    pub fn air() -> Self {
        Self(Self::AIR.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Maps the small integer ids stored in block volumes to block keys.
///
/// Slot 0 is always air so that zero-filled volumes and halos read as empty space.
#[derive(Debug, Clone)]
pub struct BlockPalette {
    entries: Vec<BlockKey>,
    by_key: FxHashMap<BlockKey, BlockId>,
}

impl BlockPalette {
    pub fn new() -> Self {
        let mut palette = Self {
            entries: Vec::new(),
            by_key: FxHashMap::default(),
        };
        palette.insert_new(BlockKey::air());
        palette
    }

    /// Returns the id for `key`, registering it if the palette has not seen it yet.
    /// Returns `None` once the palette is full.
    pub fn get_add_block(&mut self, key: impl Into<BlockKey>) -> Option<BlockId> {
        let key = key.into();
        if let Some(existing) = self.by_key.get(&key) {
            return Some(*existing);
        }
        self.insert_new(key)
    }

    fn insert_new(&mut self, key: BlockKey) -> Option<BlockId> {
        let id = BlockId(u16::try_from(self.entries.len()).ok()?);
        self.by_key.insert(key.clone(), id);
        self.entries.push(key);
        Some(id)
    }

    pub fn get(&self, id: BlockId) -> Option<&BlockKey> {
        self.entries.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for BlockPalette {
    fn default() -> Self {
        Self::new()
    }
}
