//! Property tests for the clustering algorithms.
//!
//! Exercises the contract every algorithm implementation must honor:
//! the output partitions the input, and identical input at identical
//! zoom yields identical output.
//!
//! Run with: `cargo test --test algorithm_properties`

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use proptest::prelude::*;

use mapcluster::algo::{
    Cluster, ClusterAlgorithm, DistanceBasedAlgorithm, GridBasedAlgorithm,
};
use mapcluster::geo::LatLng;
use mapcluster::item::{ClusterItem, ItemId, PointItem};

// ============================================================================
// Helper Functions
// ============================================================================

fn items_from(coords: &[(f64, f64)]) -> Vec<Arc<PointItem>> {
    coords
        .iter()
        .enumerate()
        .map(|(i, (lat, lng))| {
            Arc::new(PointItem::new(
                i as u64,
                LatLng::new(*lat, *lng),
                format!("poi-{i}"),
            ))
        })
        .collect()
}

fn assert_partitions(clusters: &[Cluster<PointItem>], expected: usize, context: &str) {
    let mut seen: HashSet<ItemId> = HashSet::new();
    for cluster in clusters {
        assert!(!cluster.items().is_empty(), "{context}: empty cluster");
        for member in cluster.items() {
            assert!(
                seen.insert(member.id()),
                "{context}: {} in more than one cluster",
                member.id()
            );
        }
    }
    assert_eq!(seen.len(), expected, "{context}: items omitted");
}

fn membership(clusters: &[Cluster<PointItem>]) -> Vec<Vec<u64>> {
    clusters
        .iter()
        .map(|c| c.items().iter().map(|i| i.id().0).collect())
        .collect()
}

fn coordinate() -> impl Strategy<Value = (f64, f64)> {
    (-80.0_f64..80.0, -179.0_f64..179.0)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Every item lands in exactly one cluster, at any zoom.
    #[test]
    fn prop_distance_based_partitions_input(
        coords in prop::collection::vec(coordinate(), 0..150),
        zoom in 0.0_f64..22.0,
    ) {
        let items = items_from(&coords);
        let clusters = DistanceBasedAlgorithm::new().cluster(&items, zoom);
        assert_partitions(&clusters, items.len(), "distance-based");
    }

    #[test]
    fn prop_grid_based_partitions_input(
        coords in prop::collection::vec(coordinate(), 0..150),
        zoom in 0.0_f64..22.0,
    ) {
        let items = items_from(&coords);
        let clusters = GridBasedAlgorithm::new().cluster(&items, zoom);
        assert_partitions(&clusters, items.len(), "grid-based");
    }

    /// Clustering an unchanged item set twice at the same zoom yields an
    /// identical cluster set: same keys, centroids, and membership order.
    #[test]
    fn prop_distance_based_is_deterministic(
        coords in prop::collection::vec(coordinate(), 0..100),
        zoom in 0.0_f64..22.0,
    ) {
        let items = items_from(&coords);
        let algorithm = DistanceBasedAlgorithm::new();
        let first = algorithm.cluster(&items, zoom);
        let second = algorithm.cluster(&items, zoom);

        prop_assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            prop_assert_eq!(a.key(), b.key());
            prop_assert_eq!(a.position(), b.position());
        }
        prop_assert_eq!(membership(&first), membership(&second));
    }

    #[test]
    fn prop_grid_based_is_deterministic(
        coords in prop::collection::vec(coordinate(), 0..100),
        zoom in 0.0_f64..22.0,
    ) {
        let items = items_from(&coords);
        let algorithm = GridBasedAlgorithm::new();
        let first = algorithm.cluster(&items, zoom);
        let second = algorithm.cluster(&items, zoom);
        prop_assert_eq!(membership(&first), membership(&second));
    }
}

// ============================================================================
// Monotonic Granularity
// ============================================================================

/// Four tight clumps of three items each, separated by continental gaps.
fn clumped_items() -> Vec<Arc<PointItem>> {
    let centers = [(0.0, 0.0), (0.0, 90.0), (45.0, 0.0), (45.0, 90.0)];
    let mut coords = Vec::new();
    for (lat, lng) in centers {
        coords.push((lat, lng));
        coords.push((lat + 0.001, lng + 0.001));
        coords.push((lat + 0.002, lng - 0.001));
    }
    items_from(&coords)
}

/// Increasing zoom only splits clusters, never merges them: each cluster
/// at the higher zoom is a subset of exactly one cluster at the lower.
#[test]
fn test_zoom_increase_only_refines_clusters() {
    let items = clumped_items();
    let algorithm = DistanceBasedAlgorithm::new();

    // Radii at these zooms sit either above every clump diameter or
    // below every intra-clump spacing, so groupings nest cleanly.
    let sweep = [0.0, 4.0, 22.0];
    let runs: Vec<Vec<Cluster<PointItem>>> = sweep
        .iter()
        .map(|zoom| algorithm.cluster(&items, *zoom))
        .collect();

    assert_eq!(runs[0].len(), 1, "Zoom 0 collapses the world");
    assert_eq!(runs[1].len(), 4, "Zoom 4 resolves the four clumps");
    assert_eq!(runs[2].len(), items.len(), "Zoom 22 resolves singletons");

    for window in runs.windows(2) {
        let coarse: HashMap<u64, usize> = window[0]
            .iter()
            .enumerate()
            .flat_map(|(index, cluster)| {
                cluster.items().iter().map(move |item| (item.id().0, index))
            })
            .collect();

        for cluster in &window[1] {
            let owners: HashSet<usize> = cluster
                .items()
                .iter()
                .map(|item| coarse[&item.id().0])
                .collect();
            assert_eq!(
                owners.len(),
                1,
                "A finer cluster must not span two coarser clusters"
            );
        }
    }
}
