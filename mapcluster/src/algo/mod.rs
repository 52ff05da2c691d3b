//! Clustering algorithms
//!
//! An algorithm consumes an insertion-ordered item snapshot and the current
//! camera zoom level and partitions the items into clusters: every item
//! lands in exactly one cluster, and an unchanged snapshot at an unchanged
//! zoom always produces an identical cluster set. That determinism is what
//! makes the renderer's diffing meaningful.
//!
//! Algorithms are pluggable strategies selected when the cluster manager is
//! constructed:
//!
//! - [`DistanceBasedAlgorithm`] (default): seed-and-sweep grouping over a
//!   quad-tree, radius scaled from screen pixels to ground distance by zoom.
//! - [`GridBasedAlgorithm`]: buckets items into zoom-scaled screen cells;
//!   coarser groupings, no radius queries.

mod distance_based;
mod grid_based;

pub use distance_based::{DistanceBasedAlgorithm, DistanceBasedConfig};
pub use grid_based::{GridBasedAlgorithm, GridBasedConfig};

use std::sync::Arc;

use serde::Serialize;

use crate::geo::LatLng;
use crate::item::ClusterItem;

/// Default clustering distance in screen pixels.
///
/// Two items closer than this many pixels at the current zoom level are
/// candidates for the same cluster.
pub const DEFAULT_CLUSTER_DISTANCE_POINTS: f64 = 100.0;

/// Stability key of a cluster.
///
/// Keys survive re-clustering as long as the grouping's anchor survives:
/// the distance-based algorithm keys a cluster by its seed item, the
/// grid-based algorithm by its cell. The renderer matches old and new
/// clusters by this key so a cluster that merely grows or shrinks is moved
/// rather than destroyed and recreated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClusterKey(pub u64);

impl std::fmt::Display for ClusterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cluster#{}", self.0)
    }
}

/// A computed grouping of nearby items.
///
/// Clusters are ephemeral: rebuilt every pass and discarded once the
/// renderer has consumed them, except the most recent set, which the
/// renderer retains to diff the next pass against.
#[derive(Debug, Clone)]
pub struct Cluster<T> {
    key: ClusterKey,
    position: LatLng,
    items: Vec<Arc<T>>,
}

impl<T: ClusterItem> Cluster<T> {
    /// Create a cluster from its stability key, centroid, and members.
    pub fn new(key: ClusterKey, position: LatLng, items: Vec<Arc<T>>) -> Self {
        debug_assert!(!items.is_empty(), "A cluster has at least one member");
        Self {
            key,
            position,
            items,
        }
    }

    /// The cluster's stability key.
    pub fn key(&self) -> ClusterKey {
        self.key
    }

    /// The cluster's centroid coordinate.
    pub fn position(&self) -> LatLng {
        self.position
    }

    /// The member items.
    pub fn items(&self) -> &[Arc<T>] {
        &self.items
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this is a degenerate single-member cluster.
    pub fn is_singleton(&self) -> bool {
        self.items.len() == 1
    }

    /// A serializable summary of this cluster.
    pub fn summary(&self) -> ClusterSummary {
        ClusterSummary {
            key: self.key.0,
            position: self.position,
            size: self.items.len(),
        }
    }
}

/// Serializable description of one cluster, for logs and CLI output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    /// Stability key value.
    pub key: u64,
    /// Centroid coordinate.
    pub position: LatLng,
    /// Member count.
    pub size: usize,
}

/// A pluggable clustering strategy.
///
/// Implementations must partition the input (every item in exactly one
/// returned cluster) and be deterministic (identical input and zoom yield
/// an identical cluster set, membership and centroids included).
pub trait ClusterAlgorithm<T: ClusterItem>: Send + Sync {
    /// Partition `items` into clusters at the given zoom level.
    ///
    /// `items` is an insertion-ordered store snapshot; implementations
    /// iterate it in order so output is reproducible.
    fn cluster(&self, items: &[Arc<T>], zoom: f64) -> Vec<Cluster<T>>;

    /// Human-readable strategy name for logs.
    fn name(&self) -> &'static str;
}
