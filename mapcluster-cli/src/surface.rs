//! In-process map surface for the CLI.
//!
//! Stands in for a real map component: tracks the camera zoom the
//! simulation sets, records the displayed marker set, and logs every
//! marker mutation through `tracing`.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

use mapcluster::prelude::*;

/// Map surface that records markers and logs mutations.
pub struct ConsoleSurface {
    zoom: Mutex<f64>,
    markers: Mutex<HashMap<MarkerKey, MarkerDescriptor>>,
}

impl ConsoleSurface {
    /// Create a surface with the camera at the given zoom.
    pub fn new(zoom: f64) -> Self {
        Self {
            zoom: Mutex::new(zoom),
            markers: Mutex::new(HashMap::new()),
        }
    }

    /// Move the camera to a new zoom level.
    pub fn set_zoom(&self, zoom: f64) {
        *self.zoom.lock() = zoom;
    }

    /// Number of markers currently displayed.
    pub fn marker_count(&self) -> usize {
        self.markers.lock().len()
    }

    /// Number of displayed cluster badges (as opposed to item pins).
    pub fn cluster_marker_count(&self) -> usize {
        self.markers
            .lock()
            .values()
            .filter(|m| matches!(m.icon, MarkerIcon::Cluster { .. }))
            .count()
    }

    /// Snapshot of the displayed markers, ordered by key for stable output.
    pub fn markers(&self) -> Vec<MarkerDescriptor> {
        let mut markers: Vec<MarkerDescriptor> = self
            .markers
            .lock()
            .values()
            .cloned()
            .collect();
        markers.sort_by_key(|m| m.key.to_string());
        markers
    }
}

impl MapSurface for ConsoleSurface {
    fn zoom(&self) -> f64 {
        *self.zoom.lock()
    }

    fn visible_region(&self) -> VisibleRegion {
        VisibleRegion::world()
    }

    fn place_marker(&self, marker: &MarkerDescriptor) {
        debug!(key = %marker.key, position = %marker.position, "place marker");
        self.markers
            .lock()
            .insert(marker.key, marker.clone());
    }

    fn move_marker(&self, from: LatLng, marker: &MarkerDescriptor) {
        debug!(key = %marker.key, %from, to = %marker.position, "move marker");
        self.markers
            .lock()
            .insert(marker.key, marker.clone());
    }

    fn remove_marker(&self, key: &MarkerKey) {
        debug!(%key, "remove marker");
        self.markers.lock().remove(key);
    }
}
