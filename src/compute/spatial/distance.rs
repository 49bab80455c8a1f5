//! Great-circle distance between trees.

use crate::config::EARTH_RADIUS_FT;
use geo::Point;

/// Haversine distance between two points, in the unit of `earth_radius`.
///
/// Coordinates are degrees (`x` = longitude, `y` = latitude):
///
/// ```text
/// a = sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlong/2)
/// c = 2·atan2(√a, √(1−a))
/// d = earth_radius · c
/// ```
///
/// # Examples
///
/// ```
/// use canopy::compute::spatial::haversine_distance;
/// use geo::Point;
///
/// let p = Point::new(-73.76, 40.66);
/// assert_eq!(haversine_distance(&p, &p, 20_888_000.0), 0.0);
/// ```
pub fn haversine_distance(p1: &Point<f64>, p2: &Point<f64>, earth_radius: f64) -> f64 {
    let lat1 = p1.y().to_radians();
    let lat2 = p2.y().to_radians();
    let d_lat = (p2.y() - p1.y()).to_radians();
    let d_long = (p2.x() - p1.x()).to_radians();

    let sin_lat = (d_lat / 2.0).sin();
    let sin_long = (d_long / 2.0).sin();
    // Clamp: rounding can push `a` a hair above 1 for antipodal points.
    let a = (sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_long * sin_long).clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    earth_radius * c
}

/// Haversine distance in feet using [`EARTH_RADIUS_FT`].
#[inline]
pub fn distance_ft(p1: &Point<f64>, p2: &Point<f64>) -> f64 {
    haversine_distance(p1, p2, EARTH_RADIUS_FT)
}

/// Distance oracle bound to one earth radius, as used by the counter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceOracle {
    earth_radius: f64,
}

impl DistanceOracle {
    pub fn new(earth_radius: f64) -> Self {
        Self { earth_radius }
    }

    pub fn earth_radius(&self) -> f64 {
        self.earth_radius
    }

    #[inline]
    pub fn distance(&self, p1: &Point<f64>, p2: &Point<f64>) -> f64 {
        haversine_distance(p1, p2, self.earth_radius)
    }

    /// True when the two points are strictly closer than `radius`.
    #[inline]
    pub fn within(&self, p1: &Point<f64>, p2: &Point<f64>, radius: f64) -> bool {
        self.distance(p1, p2) < radius
    }
}

impl Default for DistanceOracle {
    fn default() -> Self {
        Self::new(EARTH_RADIUS_FT)
    }
}
