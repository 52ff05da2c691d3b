//! Non-hierarchical distance-based clustering.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::geo::{self, pixels_to_world_units};
use crate::index::QuadTree;
use crate::item::{ClusterItem, ItemId};

use super::{Cluster, ClusterAlgorithm, ClusterKey, DEFAULT_CLUSTER_DISTANCE_POINTS};

/// Configuration for [`DistanceBasedAlgorithm`].
#[derive(Debug, Clone)]
pub struct DistanceBasedConfig {
    /// Clustering distance in screen pixels.
    ///
    /// Converted to a ground-distance radius per pass as a function of the
    /// zoom level; higher zoom means a smaller ground radius for the same
    /// pixel distance.
    pub cluster_distance_points: f64,
}

impl Default for DistanceBasedConfig {
    fn default() -> Self {
        Self {
            cluster_distance_points: DEFAULT_CLUSTER_DISTANCE_POINTS,
        }
    }
}

/// Seed-and-sweep distance clustering over a quad-tree.
///
/// Items are visited in snapshot (insertion) order. Each not-yet-clustered
/// item seeds a new cluster and sweeps every still-unclustered item within
/// the zoom-scaled radius into it. Visiting order is the tie-break: an item
/// in range of two seeds joins the earlier one.
///
/// The cluster centroid is the seed item's coordinate. This is cheap,
/// deterministic, and anchors the cluster's stability key — the seed's
/// identity — so a cluster whose fringe members change between passes keeps
/// its key and is moved, not recreated, by the renderer.
pub struct DistanceBasedAlgorithm {
    config: DistanceBasedConfig,
}

impl DistanceBasedAlgorithm {
    /// Create the algorithm with default configuration.
    pub fn new() -> Self {
        Self::with_config(DistanceBasedConfig::default())
    }

    /// Create the algorithm with an explicit configuration.
    pub fn with_config(config: DistanceBasedConfig) -> Self {
        Self { config }
    }
}

impl Default for DistanceBasedAlgorithm {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ClusterItem> ClusterAlgorithm<T> for DistanceBasedAlgorithm {
    fn cluster(&self, items: &[Arc<T>], zoom: f64) -> Vec<Cluster<T>> {
        if items.is_empty() {
            return Vec::new();
        }

        let tree = QuadTree::build(items);
        let radius = pixels_to_world_units(self.config.cluster_distance_points, zoom);
        debug!(
            items = items.len(),
            zoom,
            radius,
            "Running distance-based clustering pass"
        );

        let mut clustered: HashSet<ItemId> = HashSet::with_capacity(items.len());
        let mut clusters = Vec::new();

        for seed in items {
            let seed_id = seed.id();
            if !clustered.insert(seed_id) {
                continue;
            }

            let seed_point = geo::project(seed.position());
            let mut members = vec![Arc::clone(seed)];
            for candidate in tree.nearest_within(seed_point, radius) {
                let id = candidate.id();
                if id != seed_id && clustered.insert(id) {
                    members.push(candidate);
                }
            }

            clusters.push(Cluster::new(ClusterKey(seed_id.0), seed.position(), members));
        }

        clusters
    }

    fn name(&self) -> &'static str {
        "distance-based"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LatLng;
    use crate::item::PointItem;

    fn poi(id: u64, lat: f64, lng: f64) -> Arc<PointItem> {
        Arc::new(PointItem::new(id, LatLng::new(lat, lng), format!("poi-{id}")))
    }

    /// Three items ~100 m apart: one cluster while the zoom-scaled radius
    /// covers the spread, three singletons once it shrinks below the
    /// inter-item spacing (around zoom 17 with the default distance).
    fn three_nearby_items() -> Vec<Arc<PointItem>> {
        vec![
            poi(1, 16.073330, 108.225862),
            poi(2, 16.074330, 108.226862),
            poi(3, 16.075330, 108.224862),
        ]
    }

    #[test]
    fn test_three_nearby_items_merge_at_low_zoom() {
        let algorithm = DistanceBasedAlgorithm::new();
        let clusters = algorithm.cluster(&three_nearby_items(), 10.0);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 3);
        assert_eq!(clusters[0].key(), ClusterKey(1), "Seed anchors the key");
    }

    #[test]
    fn test_three_nearby_items_split_at_high_zoom() {
        let algorithm = DistanceBasedAlgorithm::new();
        let clusters = algorithm.cluster(&three_nearby_items(), 20.0);
        assert_eq!(clusters.len(), 3);
        assert!(clusters.iter().all(|c| c.is_singleton()));
    }

    #[test]
    fn test_centroid_is_seed_position() {
        let items = three_nearby_items();
        let algorithm = DistanceBasedAlgorithm::new();
        let clusters = algorithm.cluster(&items, 10.0);
        assert_eq!(clusters[0].position(), items[0].position());
    }

    #[test]
    fn test_partition_invariant_no_duplicates_no_omissions() {
        let items: Vec<_> = (0..200)
            .map(|i| {
                poi(
                    i,
                    16.0 + ((i * 37) % 100) as f64 * 0.004,
                    108.0 + ((i * 61) % 100) as f64 * 0.004,
                )
            })
            .collect();
        let algorithm = DistanceBasedAlgorithm::new();

        for zoom in [0.0, 6.0, 12.0, 18.0, 22.0] {
            let clusters = algorithm.cluster(&items, zoom);
            let mut seen = HashSet::new();
            for cluster in &clusters {
                for member in cluster.items() {
                    assert!(
                        seen.insert(member.id()),
                        "Item {} appears in more than one cluster at zoom {zoom}",
                        member.id()
                    );
                }
            }
            assert_eq!(seen.len(), items.len(), "No item may be omitted at zoom {zoom}");
        }
    }

    #[test]
    fn test_identical_input_yields_identical_output() {
        let items: Vec<_> = (0..80)
            .map(|i| poi(i, 40.0 + (i % 9) as f64 * 0.02, -74.0 + (i % 7) as f64 * 0.02))
            .collect();
        let algorithm = DistanceBasedAlgorithm::new();

        let first = algorithm.cluster(&items, 11.0);
        let second = algorithm.cluster(&items, 11.0);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.key(), b.key());
            assert_eq!(a.position(), b.position());
            let ids_a: Vec<ItemId> = a.items().iter().map(|i| i.id()).collect();
            let ids_b: Vec<ItemId> = b.items().iter().map(|i| i.id()).collect();
            assert_eq!(ids_a, ids_b, "Membership order must be reproducible");
        }
    }

    #[test]
    fn test_minimum_zoom_collapses_everything() {
        // At zoom 0 the default 100px radius covers a large share of the
        // world; items scattered across one country all collapse.
        let items: Vec<_> = (0..30)
            .map(|i| poi(i, 47.0 + (i % 6) as f64 * 0.5, 6.0 + (i % 5) as f64 * 0.5))
            .collect();
        let algorithm = DistanceBasedAlgorithm::new();
        let clusters = algorithm.cluster(&items, 0.0);
        assert_eq!(clusters.len(), 1, "World-scale radius collapses all items");
        assert_eq!(clusters[0].len(), 30);
    }

    #[test]
    fn test_empty_input_is_a_noop() {
        let algorithm = DistanceBasedAlgorithm::new();
        let clusters: Vec<Cluster<PointItem>> = algorithm.cluster(&[], 12.0);
        assert!(clusters.is_empty());
    }

    #[test]
    fn test_earlier_seed_wins_contested_item() {
        // Middle item is in range of both outer items; the first seed in
        // insertion order claims it.
        let items = vec![
            poi(1, 0.0, 0.0),
            poi(2, 0.0, 0.02),
            poi(3, 0.0, 0.04),
        ];
        let config = DistanceBasedConfig {
            cluster_distance_points: 100.0,
        };
        let algorithm = DistanceBasedAlgorithm::with_config(config);

        // Pick a zoom whose radius sits between the 0.02 deg spacing and
        // twice that, so a seed reaches its neighbor but not the far item.
        let spacing: f64 = 0.02 / 360.0;
        let zoom = (100.0 / (256.0 * spacing)).log2() - 0.5;
        let clusters = algorithm.cluster(&items, zoom);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].key(), ClusterKey(1));
        assert_eq!(clusters[0].len(), 2, "Seed 1 claims the contested middle item");
        assert_eq!(clusters[1].key(), ClusterKey(3));
        assert!(clusters[1].is_singleton());
    }
}
