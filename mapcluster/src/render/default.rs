//! Default marker renderer.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::algo::Cluster;
use crate::item::ClusterItem;
use crate::surface::{MapSurface, MarkerIcon, MarkerKey};

use super::{
    diff::reconcile, ClusterPass, ClusterRenderer, MarkerOp, RenderOutcome, RenderSummary,
    RenderUnit, TapTarget,
};

/// Default minimum member count for drawing a cluster badge.
///
/// Clusters smaller than this are expanded into individual item markers;
/// a badge reading "2" carries less information than two pins.
pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 4;

/// Configuration for [`DefaultClusterRenderer`].
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Clusters with fewer members than this render as individual item
    /// markers instead of one cluster badge.
    pub min_cluster_size: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
        }
    }
}

/// The committed marker set, superseded atomically by each applied pass.
struct RenderState<T> {
    generation: u64,
    units: Vec<RenderUnit<T>>,
    targets: HashMap<MarkerKey, TapTarget<T>>,
}

impl<T> RenderState<T> {
    fn empty() -> Self {
        Self {
            generation: 0,
            units: Vec::new(),
            targets: HashMap::new(),
        }
    }
}

/// Renders cluster sets as markers on a map surface.
///
/// Keeps the previously committed cluster set solely to diff new passes
/// against it; the diff is applied to the surface and the new set replaces
/// the state in one step under the state lock, so no observer ever sees a
/// partially applied pass.
pub struct DefaultClusterRenderer<T: ClusterItem> {
    surface: Arc<dyn MapSurface>,
    config: RendererConfig,
    state: Mutex<RenderState<T>>,
}

impl<T: ClusterItem> DefaultClusterRenderer<T> {
    /// Create a renderer over the given surface with default configuration.
    pub fn new(surface: Arc<dyn MapSurface>) -> Self {
        Self::with_config(surface, RendererConfig::default())
    }

    /// Create a renderer with an explicit configuration.
    pub fn with_config(surface: Arc<dyn MapSurface>, config: RendererConfig) -> Self {
        Self {
            surface,
            config,
            state: Mutex::new(RenderState::empty()),
        }
    }

    /// Expand a cluster set into the marker units it should display.
    fn expand(&self, clusters: &[Arc<Cluster<T>>]) -> Vec<RenderUnit<T>> {
        let mut units = Vec::with_capacity(clusters.len());
        for cluster in clusters {
            if cluster.len() >= self.config.min_cluster_size {
                units.push(RenderUnit {
                    key: MarkerKey::Cluster(cluster.key()),
                    position: cluster.position(),
                    icon: MarkerIcon::Cluster {
                        size: cluster.len(),
                    },
                    cluster: Arc::clone(cluster),
                });
            } else {
                for item in cluster.items() {
                    units.push(RenderUnit {
                        key: MarkerKey::Item(item.id()),
                        position: item.position(),
                        icon: MarkerIcon::Item,
                        cluster: Arc::clone(cluster),
                    });
                }
            }
        }
        units
    }

    fn targets_of(units: &[RenderUnit<T>]) -> HashMap<MarkerKey, TapTarget<T>> {
        let mut targets = HashMap::with_capacity(units.len());
        for unit in units {
            let target = match unit.key {
                MarkerKey::Cluster(_) => TapTarget::Cluster(Arc::clone(&unit.cluster)),
                MarkerKey::Item(id) => {
                    let item = unit
                        .cluster
                        .items()
                        .iter()
                        .find(|item| item.id() == id)
                        .map(Arc::clone);
                    match item {
                        Some(item) => TapTarget::Item(item),
                        None => continue,
                    }
                }
            };
            targets.insert(unit.key, target);
        }
        targets
    }
}

impl<T: ClusterItem> ClusterRenderer<T> for DefaultClusterRenderer<T> {
    fn render(&self, pass: ClusterPass<T>) -> RenderOutcome {
        let mut state = self.state.lock();

        if pass.generation <= state.generation {
            debug!(
                generation = pass.generation,
                committed = state.generation,
                "Discarding stale clustering pass"
            );
            return RenderOutcome::Stale {
                generation: pass.generation,
                committed: state.generation,
            };
        }

        let next = self.expand(&pass.clusters);
        let ops = reconcile(&state.units, &next);

        let mut summary = RenderSummary {
            total_displayed: next.len(),
            ..RenderSummary::default()
        };
        for op in &ops {
            match op {
                MarkerOp::Show(unit) => {
                    self.surface.place_marker(&unit.descriptor());
                    summary.shown += 1;
                }
                MarkerOp::Move { from, unit } => {
                    self.surface.move_marker(*from, &unit.descriptor());
                    summary.moved += 1;
                }
                MarkerOp::Hide { key, .. } => {
                    self.surface.remove_marker(key);
                    summary.hidden += 1;
                }
            }
        }

        state.targets = Self::targets_of(&next);
        state.units = next;
        state.generation = pass.generation;
        debug!(
            generation = pass.generation,
            zoom = pass.zoom,
            %summary,
            "Clustering pass committed"
        );

        RenderOutcome::Applied(summary)
    }

    fn resolve(&self, key: &MarkerKey) -> Option<TapTarget<T>> {
        self.state.lock().targets.get(key).cloned()
    }

    fn clear(&self) {
        let mut state = self.state.lock();
        for unit in &state.units {
            self.surface.remove_marker(&unit.key);
        }
        let cleared = state.units.len();
        state.units.clear();
        state.targets.clear();
        debug!(cleared, "Renderer cleared");
    }
}
