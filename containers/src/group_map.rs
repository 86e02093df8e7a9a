use crate::error::ContainerErrors;
use std::collections::HashMap;
use std::hash::Hash;

/// Two-level map from `(group, key)` to a value
///
/// Entries are scoped under a group so an entire group can be removed at once.
/// Inserting into a missing group creates it; removing the last entry of a
/// group does not delete the group, only [`GroupMap::remove_group`] does.
#[derive(Debug, Clone)]
pub struct GroupMap<G, K, V> {
    groups: HashMap<G, HashMap<K, V>>,
}

impl<G, K, V> Default for GroupMap<G, K, V> {
    fn default() -> Self {
        Self {
            groups: HashMap::new(),
        }
    }
}

impl<G: Hash + Eq + Clone, K: Hash + Eq + Clone, V> GroupMap<G, K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` under `(group, key)`, returning `true` if it was added
    ///
    /// An already-occupied pair keeps its existing value and returns `false`.
    pub fn insert(&mut self, group: G, key: K, value: V) -> bool {
        let entries = self.groups.entry(group).or_default();
        if entries.contains_key(&key) {
            false
        } else {
            entries.insert(key, value);
            true
        }
    }

    pub fn get(&self, group: &G, key: &K) -> Option<&V> {
        self.groups.get(group).and_then(|entries| entries.get(key))
    }

    pub fn contains(&self, group: &G, key: &K) -> bool {
        self.get(group, key).is_some()
    }

    pub fn contains_group(&self, group: &G) -> bool {
        self.groups.contains_key(group)
    }

    /// Remove and return the value under `(group, key)`
    pub fn remove(&mut self, group: &G, key: &K) -> Result<V, ContainerErrors> {
        let entries = self
            .groups
            .get_mut(group)
            .ok_or(ContainerErrors::NonexistentGroup)?;
        entries.remove(key).ok_or(ContainerErrors::NonexistentEntry)
    }

    /// Remove an entire group, returning its entries
    pub fn remove_group(&mut self, group: &G) -> Result<HashMap<K, V>, ContainerErrors> {
        self.groups
            .remove(group)
            .ok_or(ContainerErrors::NonexistentGroup)
    }

    /// Values registered under `key` across all groups
    pub fn values_for_key(&self, key: &K) -> Vec<&V> {
        self.groups
            .values()
            .filter_map(|entries| entries.get(key))
            .collect()
    }

    pub fn group_keys(&self) -> Vec<G> {
        self.groups.keys().cloned().collect()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total entry count across all groups
    pub fn len(&self) -> usize {
        self.groups.values().map(|entries| entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }
}
