//! Ordered route collection with a normalized-path index.

use std::collections::HashMap;

use super::entry::RouteEntry;

/// Ordered list of route entries plus a map from normalized path string to
/// slot for O(1) existence checks.
///
/// Insertion order is preserved but is *not* the match-priority order; the
/// dispatcher ranks flattened contexts separately before testing them.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    index: HashMap<String, usize>,
}

impl RouteTable {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a normalized key is registered.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Look up an entry by its normalized key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RouteEntry> {
        self.index.get(key).map(|&slot| &self.entries[slot])
    }

    /// Mutable lookup by normalized key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut RouteEntry> {
        let slot = *self.index.get(key)?;
        self.entries.get_mut(slot)
    }

    /// Insert an entry, appending by default or at the front when
    /// `prepend` is set. The caller is responsible for having checked that
    /// the key is not already present.
    pub fn add(&mut self, entry: RouteEntry, prepend: bool) {
        if prepend {
            self.entries.insert(0, entry);
            self.rebuild_index();
        } else {
            self.index
                .insert(entry.key().to_string(), self.entries.len());
            self.entries.push(entry);
        }
    }

    /// Remove and return the entry registered under a normalized key.
    pub fn remove(&mut self, key: &str) -> Option<RouteEntry> {
        let slot = self.index.remove(key)?;
        let entry = self.entries.remove(slot);
        self.rebuild_index();
        Some(entry)
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Mutable view of the entries, for delegation rewiring.
    pub fn entries_mut(&mut self) -> &mut [RouteEntry] {
        &mut self.entries
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(slot, entry)| (entry.key().to_string(), slot))
            .collect();
    }
}
