//! Core geographic and projected-space types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum latitude representable in Web Mercator (degrees).
pub const MIN_LAT: f64 = -85.05112878;
/// Maximum latitude representable in Web Mercator (degrees).
pub const MAX_LAT: f64 = 85.05112878;
/// Minimum longitude (degrees).
pub const MIN_LNG: f64 = -180.0;
/// Maximum longitude (degrees).
pub const MAX_LNG: f64 = 180.0;
/// Minimum supported camera zoom level.
pub const MIN_ZOOM: f64 = 0.0;
/// Maximum supported camera zoom level.
pub const MAX_ZOOM: f64 = 22.0;

/// Errors that can occur when validating or projecting coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordError {
    /// Latitude is outside the Web Mercator range or not finite.
    #[error("Invalid latitude: {0}")]
    InvalidLatitude(f64),

    /// Longitude is outside the valid range or not finite.
    #[error("Invalid longitude: {0}")]
    InvalidLongitude(f64),

    /// Zoom level is outside the supported range or not finite.
    #[error("Invalid zoom level: {0}")]
    InvalidZoom(f64),
}

/// A WGS84 geographic coordinate in degrees.
///
/// `LatLng` is a plain value type and does not validate on construction;
/// call [`LatLng::validate`] before feeding a coordinate into the
/// clustering pipeline. The item store rejects items whose positions fail
/// validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees (positive north).
    pub lat: f64,
    /// Longitude in degrees (positive east).
    pub lng: f64,
}

impl LatLng {
    /// Create a new coordinate from latitude and longitude in degrees.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Check that this coordinate is finite and inside the Web Mercator
    /// projectable range.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the coordinate can be projected, or the first
    /// [`CoordError`] encountered otherwise.
    pub fn validate(&self) -> Result<(), CoordError> {
        if !self.lat.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&self.lat) {
            return Err(CoordError::InvalidLatitude(self.lat));
        }
        if !self.lng.is_finite() || !(MIN_LNG..=MAX_LNG).contains(&self.lng) {
            return Err(CoordError::InvalidLongitude(self.lng));
        }
        Ok(())
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// A point in projected world space.
///
/// The world is the unit square: (0,0) is the northwest corner of the
/// Web Mercator world, (1,1) the southeast corner. All spatial index and
/// clustering distance math happens in this space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapPoint {
    /// Horizontal position, 0.0 (west) to 1.0 (east).
    pub x: f64,
    /// Vertical position, 0.0 (north) to 1.0 (south).
    pub y: f64,
}

impl MapPoint {
    /// Squared Euclidean distance to another point.
    ///
    /// Cheaper than [`MapPoint::distance`] when only comparing against a
    /// threshold; the clustering algorithm compares squared distances.
    #[inline]
    pub fn distance_squared(&self, other: &MapPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance to another point in unit-square units.
    #[inline]
    pub fn distance(&self, other: &MapPoint) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// An axis-aligned rectangle in projected world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointBounds {
    /// Western edge.
    pub min_x: f64,
    /// Northern edge.
    pub min_y: f64,
    /// Eastern edge.
    pub max_x: f64,
    /// Southern edge.
    pub max_y: f64,
}

impl PointBounds {
    /// The full world square.
    pub const WORLD: PointBounds = PointBounds {
        min_x: 0.0,
        min_y: 0.0,
        max_x: 1.0,
        max_y: 1.0,
    };

    /// Create bounds from explicit edges.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Create bounds covering a circle of `radius` around `center`,
    /// clamped to the world square.
    pub fn from_center_radius(center: MapPoint, radius: f64) -> Self {
        Self {
            min_x: (center.x - radius).max(0.0),
            min_y: (center.y - radius).max(0.0),
            max_x: (center.x + radius).min(1.0),
            max_y: (center.y + radius).min(1.0),
        }
    }

    /// Whether the point lies inside these bounds (edges inclusive).
    #[inline]
    pub fn contains(&self, point: &MapPoint) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    /// Whether two bounds overlap.
    #[inline]
    pub fn intersects(&self, other: &PointBounds) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Return these bounds grown by `fraction` of their width and height
    /// on every side, clamped to the world square.
    pub fn expanded(&self, fraction: f64) -> Self {
        let dx = (self.max_x - self.min_x) * fraction;
        let dy = (self.max_y - self.min_y) * fraction;
        Self {
            min_x: (self.min_x - dx).max(0.0),
            min_y: (self.min_y - dy).max(0.0),
            max_x: (self.max_x + dx).min(1.0),
            max_y: (self.max_y + dy).min(1.0),
        }
    }

    /// Center of these bounds.
    pub fn center(&self) -> MapPoint {
        MapPoint {
            x: (self.min_x + self.max_x) / 2.0,
            y: (self.min_y + self.max_y) / 2.0,
        }
    }

    /// Quadrant sub-bounds: northwest, northeast, southwest, southeast.
    pub(crate) fn quadrants(&self) -> [PointBounds; 4] {
        let c = self.center();
        [
            PointBounds::new(self.min_x, self.min_y, c.x, c.y),
            PointBounds::new(c.x, self.min_y, self.max_x, c.y),
            PointBounds::new(self.min_x, c.y, c.x, self.max_y),
            PointBounds::new(c.x, c.y, self.max_x, self.max_y),
        ]
    }
}

/// The four corner coordinates of the camera's visible ground polygon.
///
/// Supplied by the hosting map surface. The polygon can be a trapezoid
/// rather than a rectangle because the camera may be tilted; when the
/// camera is directly overhead the four corners form a rectangle.
///
/// The core reads this only to bound which items participate in
/// clustering when viewport culling is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibleRegion {
    /// Bottom left corner of the camera.
    pub near_left: LatLng,
    /// Bottom right corner of the camera.
    pub near_right: LatLng,
    /// Far left corner of the camera.
    pub far_left: LatLng,
    /// Far right corner of the camera.
    pub far_right: LatLng,
}

impl VisibleRegion {
    /// Create a visible region from its four corners.
    pub fn new(near_left: LatLng, near_right: LatLng, far_left: LatLng, far_right: LatLng) -> Self {
        Self {
            near_left,
            near_right,
            far_left,
            far_right,
        }
    }

    /// A region covering the entire world square.
    pub fn world() -> Self {
        Self {
            near_left: LatLng::new(MIN_LAT, MIN_LNG),
            near_right: LatLng::new(MIN_LAT, MAX_LNG),
            far_left: LatLng::new(MAX_LAT, MIN_LNG),
            far_right: LatLng::new(MAX_LAT, MAX_LNG),
        }
    }

    /// Project the four corners and return the enclosing axis-aligned
    /// bounds in world space.
    pub fn to_bounds(&self) -> PointBounds {
        let corners = [
            super::project(self.near_left),
            super::project(self.near_right),
            super::project(self.far_left),
            super::project(self.far_right),
        ];
        let mut bounds = PointBounds::new(corners[0].x, corners[0].y, corners[0].x, corners[0].y);
        for corner in &corners[1..] {
            bounds.min_x = bounds.min_x.min(corner.x);
            bounds.min_y = bounds.min_y.min(corner.y);
            bounds.max_x = bounds.max_x.max(corner.x);
            bounds.max_y = bounds.max_y.max(corner.y);
        }
        bounds
    }
}
