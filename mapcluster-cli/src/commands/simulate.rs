//! The `simulate` subcommand.
//!
//! Scatters a deterministic synthetic item set around a center
//! coordinate, then sweeps the camera across a zoom range, re-clustering
//! at each level and reporting how the displayed marker set evolves.
//! Finishes by pushing a rapid burst of camera events through the
//! debouncing camera watcher to show coalescing in action.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use mapcluster::prelude::*;

use crate::surface::ConsoleSurface;

#[derive(Args)]
pub struct SimulateArgs {
    /// Number of synthetic items to generate
    #[arg(long, default_value_t = 200)]
    items: usize,

    /// Center of the generated item field, as "lat,lng"
    #[arg(long, default_value = "16.073330,108.225862", value_parser = parse_latlng)]
    center: LatLng,

    /// Scatter extent around the center, in degrees
    #[arg(long, default_value_t = 0.2)]
    extent: f64,

    /// First zoom level of the sweep
    #[arg(long, default_value_t = 4)]
    zoom_from: u32,

    /// Last zoom level of the sweep
    #[arg(long, default_value_t = 18)]
    zoom_to: u32,

    /// Seed for the deterministic item generator
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Use the grid-based algorithm instead of distance-based
    #[arg(long)]
    grid: bool,

    /// Clusters smaller than this render as individual item pins
    #[arg(long, default_value_t = 4)]
    min_cluster_size: usize,

    /// Emit the final marker sets as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn parse_latlng(value: &str) -> Result<LatLng, String> {
    let (lat, lng) = value
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lng\", got {value:?}"))?;
    let position = LatLng::new(
        lat.trim().parse::<f64>().map_err(|e| e.to_string())?,
        lng.trim().parse::<f64>().map_err(|e| e.to_string())?,
    );
    position.validate().map_err(|e| e.to_string())?;
    Ok(position)
}

/// Multiplicative congruential generator; good enough to scatter demo
/// items and fully reproducible from the seed.
struct Scatter {
    state: u64,
}

impl Scatter {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_mul(2862933555777941757).wrapping_add(3037000493),
        }
    }

    /// Next value in [-1.0, 1.0).
    fn next_scale(&mut self) -> f64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.state >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0
    }
}

pub async fn run(args: SimulateArgs) -> Result<(), Box<dyn Error>> {
    if args.zoom_to < args.zoom_from {
        return Err("--zoom-to must not be below --zoom-from".into());
    }

    let surface = Arc::new(ConsoleSurface::new(args.zoom_from as f64));
    let renderer: Arc<dyn ClusterRenderer<PointItem>> =
        Arc::new(DefaultClusterRenderer::with_config(
            surface.clone() as Arc<dyn MapSurface>,
            RendererConfig {
                min_cluster_size: args.min_cluster_size,
            },
        ));

    let manager = if args.grid {
        Arc::new(ClusterManager::new(
            surface.clone(),
            GridBasedAlgorithm::new(),
            renderer,
        ))
    } else {
        Arc::new(ClusterManager::new(
            surface.clone(),
            DistanceBasedAlgorithm::new(),
            renderer,
        ))
    };

    let mut scatter = Scatter::new(args.seed);
    let items = (0..args.items as u64).map(|id| {
        let lat = args.center.lat + args.extent * scatter.next_scale();
        let lng = args.center.lng + args.extent * scatter.next_scale();
        PointItem::new(id, LatLng::new(lat, lng), format!("poi-{id}"))
    });
    let added = manager.add_items(items)?;
    info!(added, center = %args.center, extent = args.extent, "Generated item field");

    let mut json_sweeps = Vec::new();
    if !args.json {
        println!("zoom  markers  clusters  shown  moved  hidden");
    }
    for zoom in args.zoom_from..=args.zoom_to {
        surface.set_zoom(zoom as f64);
        let outcome = if zoom == args.zoom_from {
            manager.cluster()
        } else {
            match manager.camera_idle(zoom as f64) {
                Some(outcome) => outcome,
                None => continue,
            }
        };

        let summary = match outcome {
            RenderOutcome::Applied(summary) => summary,
            RenderOutcome::Stale { .. } => continue,
        };

        if args.json {
            let markers: Vec<_> = surface
                .markers()
                .iter()
                .map(|marker| {
                    let size = match marker.icon {
                        MarkerIcon::Cluster { size } => size,
                        MarkerIcon::Item => 1,
                    };
                    json!({
                        "key": marker.key.to_string(),
                        "lat": marker.position.lat,
                        "lng": marker.position.lng,
                        "size": size,
                    })
                })
                .collect();
            json_sweeps.push(json!({ "zoom": zoom, "markers": markers }));
        } else {
            println!(
                "{zoom:>4}  {:>7}  {:>8}  {:>5}  {:>5}  {:>6}",
                surface.marker_count(),
                surface.cluster_marker_count(),
                summary.shown,
                summary.moved,
                summary.hidden,
            );
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&json_sweeps)?);
    }

    demonstrate_debouncing(&manager, args.zoom_from).await;
    Ok(())
}

/// Push a rapid burst of camera events through the watcher; the debounce
/// collapses them into a single clustering pass at the final zoom.
async fn demonstrate_debouncing(manager: &Arc<ClusterManager<PointItem>>, zoom_from: u32) {
    let passes_before = manager.pass_count();
    let (tx, rx) = mpsc::channel(64);
    let cancel = CancellationToken::new();
    let watcher = CameraWatcher::spawn_with_interval(
        manager.clone(),
        rx,
        cancel.clone(),
        Duration::from_millis(50),
    );

    for step in 0..10 {
        let zoom = zoom_from as f64 + step as f64 * 0.5;
        if tx.send(CameraEvent { zoom }).await.is_err() {
            break;
        }
    }
    tokio::time::sleep(Duration::from_millis(150)).await;
    cancel.cancel();
    let _ = watcher.await;

    info!(
        passes = manager.pass_count() - passes_before,
        "Debounce demo: 10 camera events coalesced"
    );
}
