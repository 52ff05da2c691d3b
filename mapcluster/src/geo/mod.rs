//! Geographic coordinate and projection module
//!
//! Provides conversions between WGS84 coordinates (latitude/longitude) and
//! the projected unit-square world space used by the spatial index and the
//! clustering algorithms, plus the screen-pixel to ground-distance scaling
//! that ties clustering thresholds to the camera zoom level.

mod types;

pub use types::{
    CoordError, LatLng, MapPoint, PointBounds, VisibleRegion, MAX_LAT, MAX_LNG, MAX_ZOOM, MIN_LAT,
    MIN_LNG, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Width of one map tile in screen pixels at integer zoom levels.
pub const TILE_SIZE: f64 = 256.0;

/// Projects a geographic coordinate onto the unit-square world.
///
/// Uses the Web Mercator projection normalized so that the whole world
/// spans `[0, 1)` on both axes, with (0, 0) at the northwest corner.
///
/// The coordinate is assumed to be valid (see [`LatLng::validate`]);
/// out-of-range latitudes saturate at the world edge rather than wrap.
#[inline]
pub fn project(pos: LatLng) -> MapPoint {
    let x = (pos.lng + 180.0) / 360.0;
    let lat_rad = pos.lat * PI / 180.0;
    let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0;
    MapPoint {
        x: x.clamp(0.0, 1.0),
        y: y.clamp(0.0, 1.0),
    }
}

/// Converts a unit-square world point back to a geographic coordinate.
///
/// Inverse of [`project`].
#[inline]
pub fn unproject(point: MapPoint) -> LatLng {
    let lng = point.x * 360.0 - 180.0;
    let lat_rad = (PI * (1.0 - 2.0 * point.y)).sinh().atan();
    let lat = lat_rad * 180.0 / PI;
    LatLng::new(lat, lng)
}

/// Converts a screen-pixel distance to unit-square world units at a zoom
/// level.
///
/// At zoom `z` the world is `256 * 2^z` pixels wide, so a fixed pixel
/// threshold covers less ground as the camera zooms in. Fractional zoom
/// levels are supported.
///
/// # Arguments
///
/// * `pixels` - Distance in screen pixels
/// * `zoom` - Camera zoom level
#[inline]
pub fn pixels_to_world_units(pixels: f64, zoom: f64) -> f64 {
    pixels / (TILE_SIZE * 2.0_f64.powf(zoom))
}
