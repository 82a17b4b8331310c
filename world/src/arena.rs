//! Entity arena used for enemies and shells.

use slotmap::{Key, SlotMap};

/// Slot map storage plus a dense list of live keys.
///
/// The slot map owns the values and versions the keys, so a removed entry's
/// key goes stale. The live list fixes the update order and is compacted with
/// swap-remove, so iteration order is not stable across removals.
#[derive(Clone, Debug)]
pub(crate) struct Arena<K: Key, T> {
    entries: SlotMap<K, T>,
    live: Vec<K>,
}

impl<K: Key, T> Default for Arena<K, T> {
    fn default() -> Self {
        Self {
            entries: SlotMap::with_key(),
            live: Vec::new(),
        }
    }
}

impl<K: Key, T> Arena<K, T> {
    /// Stores `value` and appends its key to the update order.
    pub(crate) fn insert(&mut self, value: T) -> K {
        let key = self.entries.insert(value);
        self.live.push(key);
        key
    }

    pub(crate) fn get(&self, key: K) -> Option<&T> {
        self.entries.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.entries.get_mut(key)
    }

    /// Runs `keep` over every live entry and removes those it rejects.
    ///
    /// A rejected entry is replaced by the last live entry, which is then
    /// visited at the same position during this pass.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(K, &mut T) -> bool) {
        let mut cursor = 0;
        while cursor < self.live.len() {
            let key = self.live[cursor];
            let kept = match self.entries.get_mut(key) {
                Some(value) => keep(key, value),
                None => false,
            };
            if kept {
                cursor += 1;
                continue;
            }

            let _ = self.live.swap_remove(cursor);
            let _ = self.entries.remove(key);
        }
    }

    /// Iterates live entries in the current update order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (K, &T)> {
        self.live
            .iter()
            .filter_map(|&key| self.entries.get(key).map(|value| (key, value)))
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Removes every entry, leaving all outstanding keys stale.
    pub(crate) fn clear(&mut self) {
        self.live.clear();
        self.entries.clear();
    }
}
