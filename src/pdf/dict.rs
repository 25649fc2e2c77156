//! PDF dictionary implementation

use std::collections::HashMap;
use super::NodeId;

/// PDF dictionary mapping keys to graph nodes
///
/// Keys keep the order in which they were first inserted; that order is the
/// order they are written in.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: HashMap<Vec<u8>, NodeId>,
    order: Vec<Vec<u8>>,
}

impl Dictionary {
    /// Create new dictionary
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Get value by key
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<NodeId> {
        self.entries.get(key.as_ref()).copied()
    }

    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.entries.contains_key(key.as_ref())
    }

    /// Set value; an existing key keeps its position
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: NodeId) {
        let key = key.into();
        if self.entries.insert(key.clone(), value).is_none() {
            self.order.push(key);
        }
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], NodeId)> + '_ {
        self.order
            .iter()
            .filter_map(|key| self.entries.get(key).map(|&value| (key.as_slice(), value)))
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.order.iter().map(Vec::as_slice)
    }
}
