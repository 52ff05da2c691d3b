//! Grid-cell clustering.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::geo::{self, LatLng, TILE_SIZE};
use crate::item::ClusterItem;

use super::{Cluster, ClusterAlgorithm, ClusterKey, DEFAULT_CLUSTER_DISTANCE_POINTS};

/// Configuration for [`GridBasedAlgorithm`].
#[derive(Debug, Clone)]
pub struct GridBasedConfig {
    /// Grid cell size in screen pixels.
    pub cluster_distance_points: f64,
}

impl Default for GridBasedConfig {
    fn default() -> Self {
        Self {
            cluster_distance_points: DEFAULT_CLUSTER_DISTANCE_POINTS,
        }
    }
}

/// Buckets items into fixed screen-space grid cells.
///
/// The world is divided into cells of `cluster_distance_points` pixels at
/// the current zoom; every occupied cell becomes one cluster. Cheaper and
/// coarser than the distance-based strategy: no spatial index and no
/// radius queries, but items just across a cell edge never merge.
///
/// The centroid is the arithmetic mean of the members and the stability
/// key is the cell index, so a cell whose population changes between
/// passes keeps its key.
pub struct GridBasedAlgorithm {
    config: GridBasedConfig,
}

impl GridBasedAlgorithm {
    /// Create the algorithm with default configuration.
    pub fn new() -> Self {
        Self::with_config(GridBasedConfig::default())
    }

    /// Create the algorithm with an explicit configuration.
    pub fn with_config(config: GridBasedConfig) -> Self {
        Self { config }
    }

    /// Cell coordinates of a projected point at the given zoom.
    fn cell_of(&self, point: geo::MapPoint, zoom: f64) -> (u32, u32) {
        let world_pixels = TILE_SIZE * 2.0_f64.powf(zoom);
        let cell_x = (point.x * world_pixels / self.config.cluster_distance_points) as u32;
        let cell_y = (point.y * world_pixels / self.config.cluster_distance_points) as u32;
        (cell_x, cell_y)
    }
}

impl Default for GridBasedAlgorithm {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ClusterItem> ClusterAlgorithm<T> for GridBasedAlgorithm {
    fn cluster(&self, items: &[Arc<T>], zoom: f64) -> Vec<Cluster<T>> {
        if items.is_empty() {
            return Vec::new();
        }
        debug!(items = items.len(), zoom, "Running grid-based clustering pass");

        // Groups ordered by first occupancy so output follows insertion order.
        let mut groups: Vec<((u32, u32), Vec<Arc<T>>)> = Vec::new();
        let mut group_index: HashMap<(u32, u32), usize> = HashMap::new();

        for item in items {
            let cell = self.cell_of(geo::project(item.position()), zoom);
            let index = *group_index.entry(cell).or_insert_with(|| {
                groups.push((cell, Vec::new()));
                groups.len() - 1
            });
            groups[index].1.push(Arc::clone(item));
        }

        groups
            .into_iter()
            .map(|(cell, members)| {
                let count = members.len() as f64;
                let centroid = members.iter().fold(LatLng::new(0.0, 0.0), |acc, m| {
                    let p = m.position();
                    LatLng::new(acc.lat + p.lat / count, acc.lng + p.lng / count)
                });
                let key = ClusterKey(((cell.0 as u64) << 32) | cell.1 as u64);
                Cluster::new(key, centroid, members)
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "grid-based"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemId, PointItem};
    use std::collections::HashSet;

    fn poi(id: u64, lat: f64, lng: f64) -> Arc<PointItem> {
        Arc::new(PointItem::new(id, LatLng::new(lat, lng), format!("poi-{id}")))
    }

    #[test]
    fn test_partition_invariant_holds() {
        let items: Vec<_> = (0..120)
            .map(|i| poi(i, 50.0 + (i % 11) as f64 * 0.03, 8.0 + (i % 13) as f64 * 0.03))
            .collect();
        let algorithm = GridBasedAlgorithm::new();

        for zoom in [2.0, 8.0, 14.0, 20.0] {
            let clusters = algorithm.cluster(&items, zoom);
            let mut seen: HashSet<ItemId> = HashSet::new();
            for cluster in &clusters {
                for member in cluster.items() {
                    assert!(seen.insert(member.id()));
                }
            }
            assert_eq!(seen.len(), items.len());
        }
    }

    #[test]
    fn test_identical_input_yields_identical_output() {
        let items: Vec<_> = (0..60)
            .map(|i| poi(i, 50.0 + (i % 5) as f64 * 0.1, 8.0 + (i % 7) as f64 * 0.1))
            .collect();
        let algorithm = GridBasedAlgorithm::new();

        let first = algorithm.cluster(&items, 9.0);
        let second = algorithm.cluster(&items, 9.0);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.key(), b.key());
            assert_eq!(a.position(), b.position());
        }
    }

    #[test]
    fn test_centroid_is_member_mean() {
        let items = vec![poi(1, 10.0, 20.0), poi(2, 12.0, 22.0)];
        let algorithm = GridBasedAlgorithm::new();
        // Zoom 0: 100px cells over a 256px world, both items share a cell
        let clusters = algorithm.cluster(&items, 0.0);
        assert_eq!(clusters.len(), 1);
        let centroid = clusters[0].position();
        assert!((centroid.lat - 11.0).abs() < 1e-9);
        assert!((centroid.lng - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_distant_items_occupy_distinct_cells_at_high_zoom() {
        let items = vec![poi(1, 10.0, 20.0), poi(2, 10.0, 21.0)];
        let algorithm = GridBasedAlgorithm::new();
        let clusters = algorithm.cluster(&items, 12.0);
        assert_eq!(clusters.len(), 2);
        assert_ne!(clusters[0].key(), clusters[1].key());
    }

    #[test]
    fn test_empty_input_is_a_noop() {
        let algorithm = GridBasedAlgorithm::new();
        let clusters: Vec<Cluster<PointItem>> = algorithm.cluster(&[], 5.0);
        assert!(clusters.is_empty());
    }
}
