//! MapCluster - Viewport clustering for interactive maps
//!
//! This library groups a large, dynamic set of geo-located items into
//! visually coherent clusters for display on an interactive map,
//! recomputing the grouping whenever the camera's zoom level changes and
//! reconciling the displayed marker set against the previous one with
//! minimal churn.
//!
//! # Architecture
//!
//! - [`item`] — the cluster item model and the item store
//! - [`geo`] — coordinates, the unit-square Web Mercator projection, and
//!   zoom-scaled distance conversion
//! - [`index`] — the quad-tree spatial index built per clustering pass
//! - [`algo`] — pluggable clustering strategies (distance-based, grid-based)
//! - [`render`] — the reconciler that diffs successive cluster sets into
//!   minimal marker operations, and the default renderer
//! - [`surface`] — the narrow interface consumed from the hosting map
//! - [`manager`] — the orchestrator tying the pipeline together and
//!   routing tap events
//! - [`watcher`] — debounced camera-change triggering
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mapcluster::prelude::*;
//!
//! let surface: Arc<dyn MapSurface> = my_map_adapter();
//! let renderer = Arc::new(DefaultClusterRenderer::new(surface.clone()));
//! let manager = Arc::new(ClusterManager::new(
//!     surface,
//!     DistanceBasedAlgorithm::new(),
//!     renderer,
//! ));
//!
//! manager.add_items(points_of_interest)?;
//! manager.cluster();
//! ```

pub mod algo;
pub mod geo;
pub mod index;
pub mod item;
pub mod log;
pub mod manager;
pub mod render;
pub mod surface;
pub mod watcher;

/// Convenience re-exports of the types most embedders need.
pub mod prelude {
    pub use crate::algo::{
        Cluster, ClusterAlgorithm, ClusterKey, ClusterSummary, DistanceBasedAlgorithm,
        GridBasedAlgorithm,
    };
    pub use crate::geo::{LatLng, VisibleRegion};
    pub use crate::item::{ClusterItem, ItemId, PointItem, StoreError};
    pub use crate::manager::{
        ClusterManager, ClusterManagerDelegate, EventOutcome, ManagerConfig, MapEvent,
        MapEventListener,
    };
    pub use crate::render::{
        ClusterRenderer, DefaultClusterRenderer, RenderOutcome, RenderSummary, RendererConfig,
    };
    pub use crate::surface::{MapSurface, MarkerDescriptor, MarkerIcon, MarkerKey};
    pub use crate::watcher::{CameraEvent, CameraWatcher};
}
