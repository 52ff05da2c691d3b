//! Item collection with identity-keyed mutations and ordered snapshots.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::geo::CoordError;

use super::{ClusterItem, ItemId};

/// Errors that can occur when mutating the item store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The item's position cannot be projected; the store is unchanged.
    #[error("Invalid item {id}: {source}")]
    InvalidItem {
        /// Identity of the rejected item.
        id: ItemId,
        /// The underlying coordinate problem.
        source: CoordError,
    },

    /// An item with the same identity is already present.
    #[error("Duplicate item {0}")]
    DuplicateItem(ItemId),
}

/// Holds the full, unclustered set of input items.
///
/// Mutations are amortized O(1); snapshots are insertion-ordered and
/// stable, so two clustering passes over an unchanged store see the same
/// items in the same order.
///
/// The store is not thread-safe on its own; the cluster manager wraps it
/// in a `Mutex` to enforce the single-writer model.
pub struct ItemStore<T: ClusterItem> {
    items: HashMap<ItemId, StoredItem<T>>,
    next_seq: u64,
}

struct StoredItem<T> {
    seq: u64,
    item: Arc<T>,
}

impl<T: ClusterItem> ItemStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Add one item.
    ///
    /// The item's position is validated first; an item that cannot be
    /// projected is rejected with [`StoreError::InvalidItem`] and the
    /// store is left unchanged. Adding an identity that is already
    /// present is rejected with [`StoreError::DuplicateItem`].
    pub fn add(&mut self, item: T) -> Result<(), StoreError> {
        let id = item.id();
        if let Err(source) = item.position().validate() {
            return Err(StoreError::InvalidItem { id, source });
        }
        if self.items.contains_key(&id) {
            return Err(StoreError::DuplicateItem(id));
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.items.insert(
            id,
            StoredItem {
                seq,
                item: Arc::new(item),
            },
        );
        Ok(())
    }

    /// Add a batch of items.
    ///
    /// Items are added in iteration order; the first rejected item stops
    /// the batch and its error is returned. Items added before the
    /// rejection remain in the store.
    ///
    /// # Returns
    ///
    /// The number of items added when the whole batch is accepted.
    pub fn add_all(&mut self, items: impl IntoIterator<Item = T>) -> Result<usize, StoreError> {
        let mut added = 0;
        for item in items {
            self.add(item)?;
            added += 1;
        }
        Ok(added)
    }

    /// Remove an item by identity.
    ///
    /// Idempotent: removing an absent identity is a no-op, not an error.
    ///
    /// # Returns
    ///
    /// `true` if the item was present and removed.
    pub fn remove(&mut self, id: ItemId) -> bool {
        self.items.remove(&id).is_some()
    }

    /// Remove all items.
    pub fn clear(&mut self) {
        let removed = self.items.len();
        self.items.clear();
        debug!(removed, "Item store cleared");
    }

    /// Number of items currently stored.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether an identity is present.
    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    /// Take an insertion-ordered snapshot of the current contents.
    ///
    /// The snapshot is what a clustering pass iterates; taking it under
    /// the store lock guarantees the pass never observes a partial
    /// mutation.
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        let mut entries: Vec<(u64, Arc<T>)> = self
            .items
            .values()
            .map(|stored| (stored.seq, Arc::clone(&stored.item)))
            .collect();
        entries.sort_unstable_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, item)| item).collect()
    }
}

impl<T: ClusterItem> Default for ItemStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LatLng;
    use crate::item::PointItem;

    fn poi(id: u64, lat: f64, lng: f64) -> PointItem {
        PointItem::new(id, LatLng::new(lat, lng), format!("poi-{id}"))
    }

    #[test]
    fn test_add_and_snapshot_preserves_insertion_order() {
        let mut store = ItemStore::new();
        store.add(poi(3, 10.0, 10.0)).unwrap();
        store.add(poi(1, 11.0, 11.0)).unwrap();
        store.add(poi(2, 12.0, 12.0)).unwrap();

        let ids: Vec<u64> = store.snapshot().iter().map(|i| i.id().0).collect();
        assert_eq!(ids, vec![3, 1, 2], "Snapshot must follow insertion order");
    }

    #[test]
    fn test_add_rejects_invalid_coordinate_and_leaves_store_unchanged() {
        let mut store = ItemStore::new();
        let err = store.add(poi(1, 90.0, 0.0)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidItem { id: ItemId(1), .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_rejects_duplicate_identity() {
        let mut store = ItemStore::new();
        store.add(poi(5, 10.0, 10.0)).unwrap();
        let err = store.add(poi(5, 20.0, 20.0)).unwrap_err();
        assert_eq!(err, StoreError::DuplicateItem(ItemId(5)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_absent_item_is_noop() {
        let mut store = ItemStore::new();
        store.add(poi(1, 10.0, 10.0)).unwrap();
        assert!(!store.remove(ItemId(99)), "Absent id removes nothing");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_then_readd_keeps_order_stable() {
        let mut store = ItemStore::new();
        store.add(poi(1, 10.0, 10.0)).unwrap();
        store.add(poi(2, 11.0, 11.0)).unwrap();
        assert!(store.remove(ItemId(1)));
        store.add(poi(1, 10.0, 10.0)).unwrap();

        let ids: Vec<u64> = store.snapshot().iter().map(|i| i.id().0).collect();
        assert_eq!(ids, vec![2, 1], "Re-added item goes to the end");
    }

    #[test]
    fn test_add_all_stops_at_first_invalid_item() {
        let mut store = ItemStore::new();
        let result = store.add_all(vec![poi(1, 10.0, 10.0), poi(2, 95.0, 0.0), poi(3, 12.0, 12.0)]);
        assert!(result.is_err());
        assert_eq!(store.len(), 1, "Items before the rejection remain");
        assert!(!store.contains(ItemId(3)));
    }

    #[test]
    fn test_clear_empties_store() {
        let mut store = ItemStore::new();
        store.add_all((0..10).map(|i| poi(i, 10.0 + i as f64 * 0.01, 10.0))).unwrap();
        store.clear();
        assert!(store.is_empty());
        assert!(store.snapshot().is_empty());
    }
}
