//! Map surface interface
//!
//! The rendering surface — camera projection, tiles, gestures — is an
//! external collaborator supplied by the hosting map component. This
//! module defines the narrow interface the clustering core consumes from
//! it: the camera zoom level, the visible region, and the primitives to
//! place, move, and remove visual markers.
//!
//! The manager and renderer hold the surface as a shared handle
//! (`Arc<dyn MapSurface>`); neither side owns the other's lifetime.

use crate::algo::ClusterKey;
use crate::geo::{LatLng, VisibleRegion};
use crate::item::ItemId;

/// Identity of one displayed marker.
///
/// The unit the renderer diffs by: a cluster marker keyed by the
/// cluster's stability key, or an individual item marker keyed by the
/// item's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKey {
    /// Marker representing a whole cluster.
    Cluster(ClusterKey),
    /// Marker representing a single item.
    Item(ItemId),
}

impl std::fmt::Display for MarkerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkerKey::Cluster(key) => write!(f, "{key}"),
            MarkerKey::Item(id) => write!(f, "{id}"),
        }
    }
}

/// Visual representation a marker should take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerIcon {
    /// A cluster badge showing the member count.
    Cluster {
        /// Number of items the marker stands for.
        size: usize,
    },
    /// A plain item marker.
    Item,
}

/// Everything the surface needs to draw one marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDescriptor {
    /// Diff identity of the marker.
    pub key: MarkerKey,
    /// Where to place it.
    pub position: LatLng,
    /// How to draw it.
    pub icon: MarkerIcon,
}

/// The interface the clustering core consumes from the hosting map.
///
/// Implementations are expected to be cheap to call; the renderer issues
/// one call per marker mutation during reconciliation, on the thread the
/// clustering pass runs on.
pub trait MapSurface: Send + Sync {
    /// Current camera zoom level.
    fn zoom(&self) -> f64;

    /// Current visible ground trapezoid.
    fn visible_region(&self) -> VisibleRegion;

    /// Place a new marker.
    fn place_marker(&self, marker: &MarkerDescriptor);

    /// Move an existing marker from `from` to the descriptor's position,
    /// updating its icon. Surfaces may animate the transition.
    fn move_marker(&self, from: LatLng, marker: &MarkerDescriptor);

    /// Remove an existing marker.
    fn remove_marker(&self, key: &MarkerKey);
}
