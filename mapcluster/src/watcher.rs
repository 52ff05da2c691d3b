//! Camera event debouncing
//!
//! Interactive cameras emit a stream of zoom changes while the user
//! pinches or scrolls; re-clustering on every intermediate value wastes
//! work and makes markers churn. The [`CameraWatcher`] is a small tokio
//! task that coalesces that stream: it waits for the camera to stay quiet
//! for a debounce interval, then reports only the most recent position to
//! the manager. Superseded positions are never clustered.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::item::ClusterItem;
use crate::manager::ClusterManager;

/// How long the camera must stay quiet before a pass is triggered.
pub const DEFAULT_CLUSTER_WAIT_INTERVAL: Duration = Duration::from_millis(200);

/// A camera movement report from the hosting map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraEvent {
    /// Zoom level the camera reported.
    pub zoom: f64,
}

/// Debounces camera events into cluster-manager idle notifications.
pub struct CameraWatcher;

impl CameraWatcher {
    /// Spawn the watcher with the default debounce interval.
    pub fn spawn<T: ClusterItem>(
        manager: Arc<ClusterManager<T>>,
        events: mpsc::Receiver<CameraEvent>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        Self::spawn_with_interval(manager, events, cancel, DEFAULT_CLUSTER_WAIT_INTERVAL)
    }

    /// Spawn the watcher with an explicit debounce interval.
    ///
    /// The task runs until the cancellation token fires or the event
    /// channel closes. Each burst of events is coalesced: once the
    /// channel stays quiet for `interval`, only the latest event is
    /// forwarded to [`ClusterManager::camera_idle`].
    pub fn spawn_with_interval<T: ClusterItem>(
        manager: Arc<ClusterManager<T>>,
        mut events: mpsc::Receiver<CameraEvent>,
        cancel: CancellationToken,
        interval: Duration,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(interval_ms = interval.as_millis() as u64, "Camera watcher started");
            loop {
                // Wait for a burst to begin.
                let first = tokio::select! {
                    _ = cancel.cancelled() => break,
                    event = events.recv() => match event {
                        Some(event) => event,
                        None => break,
                    },
                };

                // Coalesce until the camera stays quiet for the interval.
                let mut latest = first;
                let mut coalesced = 0_u32;
                let mut closed = false;
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => return,
                        event = events.recv() => match event {
                            Some(event) => {
                                latest = event;
                                coalesced += 1;
                            }
                            None => {
                                closed = true;
                                break;
                            }
                        },
                        _ = tokio::time::sleep(interval) => break,
                    }
                }

                debug!(zoom = latest.zoom, coalesced, "Camera settled");
                manager.camera_idle(latest.zoom);
                if closed {
                    break;
                }
            }
            info!("Camera watcher stopped");
        })
    }
}
