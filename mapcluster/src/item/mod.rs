//! Cluster item model and the item store
//!
//! A [`ClusterItem`] is a single geo-located input entity: a fixed position
//! plus an opaque identity used for equality and application-level lookup.
//! Items are immutable once added and removed by identity.
//!
//! The [`ItemStore`] holds the full, unclustered item set and hands out the
//! insertion-ordered snapshots that every clustering pass works from.

mod store;

pub use store::{ItemStore, StoreError};

use crate::geo::LatLng;

/// Opaque identity of a cluster item.
///
/// Identity is what `remove` and the renderer's marker keys are based on;
/// two items with the same id are the same item as far as the pipeline is
/// concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// A single geo-located entity that can participate in clustering.
///
/// Implementations must return a stable position and identity for the
/// lifetime of the item; the store treats both as fixed once the item has
/// been added.
pub trait ClusterItem: Send + Sync + 'static {
    /// The item's identity, used for equality and removal.
    fn id(&self) -> ItemId;

    /// The item's geographic position.
    fn position(&self) -> LatLng;
}

/// A plain point-of-interest item.
///
/// The simplest [`ClusterItem`] implementation: an id, a position, and a
/// display name. Applications with richer payloads implement the trait on
/// their own types instead.
#[derive(Debug, Clone, PartialEq)]
pub struct PointItem {
    id: ItemId,
    position: LatLng,
    name: String,
}

impl PointItem {
    /// Create a new point item.
    pub fn new(id: u64, position: LatLng, name: impl Into<String>) -> Self {
        Self {
            id: ItemId(id),
            position,
            name: name.into(),
        }
    }

    /// The item's display name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ClusterItem for PointItem {
    fn id(&self) -> ItemId {
        self.id
    }

    fn position(&self) -> LatLng {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_item_accessors() {
        let item = PointItem::new(7, LatLng::new(16.07333, 108.225862), "Da Nang");
        assert_eq!(item.id(), ItemId(7));
        assert_eq!(item.name(), "Da Nang");
        assert!((item.position().lat - 16.07333).abs() < 1e-12);
    }

    #[test]
    fn test_item_id_display() {
        assert_eq!(ItemId(42).to_string(), "item#42");
    }
}
