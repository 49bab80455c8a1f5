//! Conversion of the search radius into per-axis thresholds in degrees.
//!
//! Window scans and zone geometry work in degrees while neighbours are
//! defined in feet. A pair of neighbours differs by at most `lat` degrees of
//! latitude and, when the thresholds cover the dataset, by at most `long`
//! degrees of longitude.

use crate::config::{Config, DegreeScale};

/// Relative slack added to exact thresholds to absorb rounding.
const ROUNDING_SLACK: f64 = 1e-9;

/// Axis thresholds derived from the search radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegreeThresholds {
    /// Latitude window half-width, in degrees
    pub lat: f64,
    /// Longitude window half-width, in degrees
    pub long: f64,
}

impl DegreeThresholds {
    pub fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }

    /// Derive thresholds for a dataset whose largest absolute latitude is
    /// `max_abs_lat`.
    pub fn derive(config: &Config, max_abs_lat: f64) -> Self {
        match config.degree_scale {
            DegreeScale::Fixed { degrees_per_foot } => {
                let thresholds = Self::fixed(config.search_radius_ft, degrees_per_foot);
                let exact =
                    Self::exact(config.search_radius_ft, config.earth_radius_ft, max_abs_lat);
                if !thresholds.covers(&exact) {
                    log::warn!(
                        "Fixed degree scale under-covers latitude band up to {:.4}°: \
                        thresholds ({:.8}°, {:.8}°) below exact ({:.8}°, {:.8}°); \
                        neighbours near the window edge may be missed",
                        max_abs_lat,
                        thresholds.lat,
                        thresholds.long,
                        exact.lat,
                        exact.long
                    );
                }
                thresholds
            }
            DegreeScale::LatitudeCorrected => {
                Self::exact(config.search_radius_ft, config.earth_radius_ft, max_abs_lat)
            }
        }
    }

    /// One degrees-per-foot constant for both axes.
    pub fn fixed(radius_ft: f64, degrees_per_foot: f64) -> Self {
        let degrees = radius_ft * degrees_per_foot;
        Self::new(degrees, degrees)
    }

    /// Smallest thresholds that never miss a neighbour for points with
    /// |latitude| ≤ `max_abs_lat`.
    ///
    /// A great-circle distance `d` bounds the latitude difference by `d/R`
    /// radians, and bounds the longitude difference through
    /// `sin(Δlong/2) ≤ sin(d/2R) / cos(max_abs_lat)`.
    pub fn exact(radius: f64, earth_radius: f64, max_abs_lat: f64) -> Self {
        let angle = radius / earth_radius;
        let lat = angle.to_degrees();

        let ratio = (angle / 2.0).sin() / max_abs_lat.to_radians().cos();
        let long = if ratio.is_finite() && ratio < 1.0 {
            (2.0 * ratio.asin()).to_degrees()
        } else {
            360.0
        };

        Self::new(lat * (1.0 + ROUNDING_SLACK), long * (1.0 + ROUNDING_SLACK))
    }

    /// True when both thresholds are at least as wide as `other`'s.
    pub fn covers(&self, other: &DegreeThresholds) -> bool {
        self.lat >= other.lat && self.long >= other.long
    }

    /// Side of a square zone along latitude: four times the threshold.
    #[inline]
    pub fn zone_lat_side(&self) -> f64 {
        4.0 * self.lat
    }

    #[inline]
    pub fn zone_long_side(&self) -> f64 {
        4.0 * self.long
    }

    /// Distance between neighbouring zone origins: half a zone side.
    #[inline]
    pub fn zone_lat_step(&self) -> f64 {
        2.0 * self.lat
    }

    #[inline]
    pub fn zone_long_step(&self) -> f64 {
        2.0 * self.long
    }
}
