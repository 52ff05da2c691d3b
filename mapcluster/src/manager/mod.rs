//! Cluster manager
//!
//! The orchestrator of the clustering pipeline. The manager owns the item
//! store, holds the pluggable clustering algorithm and renderer chosen at
//! construction time, triggers re-clustering on camera changes or explicit
//! request, and routes tap events to the cluster- or item-level delegate
//! before falling back to the general map listener.
//!
//! # Pipeline
//!
//! ```text
//! mutations ──► ItemStore ──snapshot──► ClusterAlgorithm ──clusters──►
//!     ClusterRenderer ──diff against previous set──► MapSurface markers
//! ```
//!
//! # Concurrency
//!
//! Item mutations and snapshots are serialized through the store lock, so
//! a pass always reads a consistent item set. Passes themselves run
//! lock-free on the caller's thread; each carries a monotonic generation
//! and the renderer commits passes atomically, discarding any that arrive
//! after a newer one has committed. Rapid camera changes are coalesced by
//! the [`CameraWatcher`](crate::watcher::CameraWatcher) so only the most
//! recent zoom level is clustered.
//!
//! # Example
//!
//! ```ignore
//! use mapcluster::prelude::*;
//!
//! let surface: Arc<dyn MapSurface> = host_map_handle();
//! let renderer = Arc::new(DefaultClusterRenderer::new(surface.clone()));
//! let manager = ClusterManager::new(surface, DistanceBasedAlgorithm::new(), renderer);
//!
//! manager.add_items(points)?;
//! manager.cluster();
//! ```

mod events;

pub use events::{ClusterManagerDelegate, EventOutcome, MapEvent, MapEventListener};

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::algo::{Cluster, ClusterAlgorithm};
use crate::item::{ClusterItem, ItemId, ItemStore, StoreError};
use crate::render::{ClusterPass, ClusterRenderer, RenderOutcome, TapTarget};
use crate::surface::{MapSurface, MarkerKey};

/// Configuration for [`ClusterManager`].
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// When enabled, only items inside the expanded visible region
    /// participate in clustering. Off by default: culling trades complete
    /// marker coverage for pass speed on very large item sets.
    pub viewport_culling: bool,

    /// How far beyond the visible region to include items when culling,
    /// as a fraction of the region's size. Padding keeps markers from
    /// popping at the viewport edge mid-pan.
    pub viewport_padding: f64,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            viewport_culling: false,
            viewport_padding: 0.25,
        }
    }
}

/// Orchestrates the item store, clustering algorithm, and renderer.
///
/// Construction wires the three roles together with the hosting map
/// surface; the manager's lifetime is independent of the surface — both
/// are shared handles and neither destroys the other.
pub struct ClusterManager<T: ClusterItem> {
    store: Mutex<ItemStore<T>>,
    algorithm: Box<dyn ClusterAlgorithm<T>>,
    renderer: Arc<dyn ClusterRenderer<T>>,
    surface: Arc<dyn MapSurface>,
    config: ManagerConfig,

    /// Monotonic pass counter; the renderer uses it to refuse stale passes.
    generation: AtomicU64,

    /// Set by mutations, cleared by a pass; lets camera events skip
    /// redundant passes when neither items nor integral zoom changed.
    dirty: AtomicBool,

    /// Integral zoom of the most recent pass, if any.
    last_integral_zoom: Mutex<Option<i64>>,

    delegate: Mutex<Option<Arc<dyn ClusterManagerDelegate<T>>>>,
    listener: Mutex<Option<Arc<dyn MapEventListener>>>,
}

impl<T: ClusterItem> ClusterManager<T> {
    /// Create a manager with default configuration.
    pub fn new(
        surface: Arc<dyn MapSurface>,
        algorithm: impl ClusterAlgorithm<T> + 'static,
        renderer: Arc<dyn ClusterRenderer<T>>,
    ) -> Self {
        Self::with_config(surface, algorithm, renderer, ManagerConfig::default())
    }

    /// Create a manager with an explicit configuration.
    pub fn with_config(
        surface: Arc<dyn MapSurface>,
        algorithm: impl ClusterAlgorithm<T> + 'static,
        renderer: Arc<dyn ClusterRenderer<T>>,
        config: ManagerConfig,
    ) -> Self {
        info!(algorithm = algorithm.name(), "Cluster manager created");
        Self {
            store: Mutex::new(ItemStore::new()),
            algorithm: Box::new(algorithm),
            renderer,
            surface,
            config,
            generation: AtomicU64::new(0),
            dirty: AtomicBool::new(false),
            last_integral_zoom: Mutex::new(None),
            delegate: Mutex::new(None),
            listener: Mutex::new(None),
        }
    }

    /// Register the typed tap delegate.
    pub fn set_delegate(&self, delegate: Arc<dyn ClusterManagerDelegate<T>>) {
        *self.delegate.lock() = Some(delegate);
    }

    /// Register the general listener that receives forwarded map events.
    pub fn set_map_listener(&self, listener: Arc<dyn MapEventListener>) {
        *self.listener.lock() = Some(listener);
    }

    /// Register both the tap delegate and the forwarding listener.
    pub fn set_delegate_with_listener(
        &self,
        delegate: Arc<dyn ClusterManagerDelegate<T>>,
        listener: Arc<dyn MapEventListener>,
    ) {
        self.set_delegate(delegate);
        self.set_map_listener(listener);
    }

    /// Add a cluster item to the collection.
    ///
    /// Items with an unprojectable position are rejected synchronously
    /// and the collection is unchanged. Call [`ClusterManager::cluster`]
    /// after adding items to rearrange the markers.
    pub fn add_item(&self, item: T) -> Result<(), StoreError> {
        self.store.lock().add(item)?;
        self.dirty.store(true, Ordering::Release);
        Ok(())
    }

    /// Add multiple cluster items to the collection.
    ///
    /// Stops at the first rejected item; items added before it remain.
    pub fn add_items(&self, items: impl IntoIterator<Item = T>) -> Result<usize, StoreError> {
        let added = self.store.lock().add_all(items)?;
        if added > 0 {
            self.dirty.store(true, Ordering::Release);
        }
        Ok(added)
    }

    /// Remove a cluster item by identity.
    ///
    /// Removing an identity that is not present is a no-op.
    ///
    /// # Returns
    ///
    /// `true` if the item was present and removed.
    pub fn remove_item(&self, id: ItemId) -> bool {
        let removed = self.store.lock().remove(id);
        if removed {
            self.dirty.store(true, Ordering::Release);
        }
        removed
    }

    /// Remove all items from the collection.
    pub fn clear_items(&self) {
        self.store.lock().clear();
        self.dirty.store(true, Ordering::Release);
    }

    /// Number of items currently managed.
    pub fn item_count(&self) -> usize {
        self.store.lock().len()
    }

    /// Number of clustering passes started so far.
    pub fn pass_count(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Arrange items into groups and reconcile the displayed markers.
    ///
    /// Safe to call redundantly: a pass over unchanged items at an
    /// unchanged zoom reconciles to zero marker operations. Invoked
    /// automatically when the camera's integral zoom level changes; call
    /// it manually after adding or removing items.
    pub fn cluster(&self) -> RenderOutcome {
        let zoom = self.surface.zoom();

        // Snapshot under the store lock: the pass must never observe a
        // partial mutation.
        let snapshot = self.store.lock().snapshot();
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.dirty.store(false, Ordering::Release);
        *self.last_integral_zoom.lock() = Some(Self::integral_zoom(zoom));

        let items = if self.config.viewport_culling {
            let bounds = self
                .surface
                .visible_region()
                .to_bounds()
                .expanded(self.config.viewport_padding);
            snapshot
                .into_iter()
                .filter(|item| bounds.contains(&crate::geo::project(item.position())))
                .collect()
        } else {
            snapshot
        };

        debug!(
            generation,
            zoom,
            items = items.len(),
            algorithm = self.algorithm.name(),
            "Starting clustering pass"
        );
        let clusters: Vec<Arc<Cluster<T>>> = self
            .algorithm
            .cluster(&items, zoom)
            .into_iter()
            .map(Arc::new)
            .collect();
        debug!(generation, clusters = clusters.len(), "Clustering pass computed");

        self.renderer.render(ClusterPass {
            generation,
            zoom,
            clusters,
        })
    }

    /// Report that the camera settled at a zoom level.
    ///
    /// Re-clusters when the integral zoom changed since the last pass or
    /// items changed since then; otherwise the report is ignored. The
    /// camera watcher calls this after debouncing rapid camera movement.
    ///
    /// # Returns
    ///
    /// The render outcome when a pass ran, `None` when it was skipped.
    pub fn camera_idle(&self, zoom: f64) -> Option<RenderOutcome> {
        let integral = Self::integral_zoom(zoom);
        let zoom_changed = *self.last_integral_zoom.lock() != Some(integral);
        if zoom_changed || self.dirty.load(Ordering::Acquire) {
            Some(self.cluster())
        } else {
            debug!(zoom, "Camera idle without zoom change; skipping pass");
            None
        }
    }

    /// Dispatch a map event.
    ///
    /// Marker taps are resolved against the displayed marker set and
    /// offered to the typed delegate first; a tap the delegate declines,
    /// and every other event kind, is forwarded unmodified to the general
    /// listener. Exactly one disposition occurs per event.
    pub fn handle_event(&self, event: MapEvent) -> EventOutcome {
        match event {
            MapEvent::MarkerTap(key) => {
                if let Some(outcome) = self.dispatch_tap(&key) {
                    return outcome;
                }
            }
            MapEvent::CameraIdle { zoom } => {
                self.camera_idle(zoom);
            }
            MapEvent::MapTap(_) => {}
        }
        self.forward(&event)
    }

    /// Offer a marker tap to the typed delegate.
    ///
    /// Returns `None` when the delegate declines (or none is registered),
    /// letting the event fall through to the general listener.
    fn dispatch_tap(&self, key: &MarkerKey) -> Option<EventOutcome> {
        let delegate = self.delegate.lock().clone()?;
        match self.renderer.resolve(key)? {
            TapTarget::Cluster(cluster) => {
                debug!(%key, size = cluster.len(), "Cluster marker tapped");
                delegate
                    .on_cluster_tap(&cluster)
                    .then_some(EventOutcome::HandledCluster)
            }
            TapTarget::Item(item) => {
                debug!(%key, "Item marker tapped");
                delegate
                    .on_item_tap(&item)
                    .then_some(EventOutcome::HandledItem)
            }
        }
    }

    fn forward(&self, event: &MapEvent) -> EventOutcome {
        match self.listener.lock().clone() {
            Some(listener) => {
                listener.on_event(event);
                EventOutcome::Forwarded
            }
            None => EventOutcome::Unhandled,
        }
    }

    fn integral_zoom(zoom: f64) -> i64 {
        zoom.round() as i64
    }
}
