//! Map events, tap delegates, and the forwarding listener.

use crate::algo::Cluster;
use crate::geo::LatLng;
use crate::item::ClusterItem;
use crate::surface::MarkerKey;

/// An event reported by the hosting map surface.
///
/// The cluster manager intercepts the events it wants to act on or
/// rebroadcast as typed tap callbacks; everything else is forwarded
/// unchanged to the registered [`MapEventListener`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    /// The user tapped a displayed marker.
    MarkerTap(MarkerKey),
    /// The user tapped the map away from any marker.
    MapTap(LatLng),
    /// The camera came to rest at a zoom level.
    CameraIdle {
        /// Zoom level the camera settled at.
        zoom: f64,
    },
}

/// How the manager disposed of one event.
///
/// Exactly one disposition occurs per event: a specific tap handler that
/// accepts the event stops propagation; everything else reaches the
/// general listener at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// The cluster tap delegate accepted the event.
    HandledCluster,
    /// The item tap delegate accepted the event.
    HandledItem,
    /// The event was forwarded to the general map listener.
    Forwarded,
    /// No delegate accepted it and no general listener is registered.
    Unhandled,
}

/// Typed tap callbacks for cluster and item markers.
///
/// Both methods default to declining, mirroring optional delegate
/// methods: a delegate that only cares about cluster taps implements one
/// method and lets item taps fall through to the general listener.
pub trait ClusterManagerDelegate<T: ClusterItem>: Send + Sync {
    /// Called when the user taps a cluster marker.
    ///
    /// # Returns
    ///
    /// `true` if this delegate handled the tap; `false` to pass the event
    /// on to the general listener.
    fn on_cluster_tap(&self, _cluster: &Cluster<T>) -> bool {
        false
    }

    /// Called when the user taps an individual item marker.
    ///
    /// # Returns
    ///
    /// `true` if this delegate handled the tap; `false` to pass the event
    /// on to the general listener.
    fn on_item_tap(&self, _item: &T) -> bool {
        false
    }
}

/// General-purpose listener receiving every event the manager did not
/// handle, unmodified.
pub trait MapEventListener: Send + Sync {
    /// Called once per forwarded event.
    fn on_event(&self, event: &MapEvent);
}
