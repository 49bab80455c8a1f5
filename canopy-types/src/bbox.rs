use geo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in latitude/longitude space.
///
/// Wraps `geo::Rect` (x = longitude, y = latitude). Bounds are inclusive on
/// every edge, so a point on the shared edge of two zones belongs to both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneBounds {
    /// The underlying geometric rectangle
    pub rect: Rect<f64>,
}

impl ZoneBounds {
    /// Create bounds from the four edges, in degrees.
    ///
    /// # Examples
    ///
    /// ```
    /// use canopy_types::bbox::ZoneBounds;
    ///
    /// let zone = ZoneBounds::new(40.0, 41.0, -74.0, -73.0);
    /// assert_eq!(zone.lat_span(), 1.0);
    /// assert_eq!(zone.long_span(), 1.0);
    /// ```
    pub fn new(bottom_lat: f64, top_lat: f64, left_long: f64, right_long: f64) -> Self {
        Self {
            rect: Rect::new(
                geo::coord! { x: left_long, y: bottom_lat },
                geo::coord! { x: right_long, y: top_lat },
            ),
        }
    }

    pub fn from_rect(rect: Rect<f64>) -> Self {
        Self { rect }
    }

    pub fn bottom_lat(&self) -> f64 {
        self.rect.min().y
    }

    pub fn top_lat(&self) -> f64 {
        self.rect.max().y
    }

    pub fn left_long(&self) -> f64 {
        self.rect.min().x
    }

    pub fn right_long(&self) -> f64 {
        self.rect.max().x
    }

    /// Height in degrees of latitude.
    pub fn lat_span(&self) -> f64 {
        self.top_lat() - self.bottom_lat()
    }

    /// Width in degrees of longitude.
    pub fn long_span(&self) -> f64 {
        self.right_long() - self.left_long()
    }

    pub fn center(&self) -> Point<f64> {
        Point::new(
            (self.left_long() + self.right_long()) / 2.0,
            (self.bottom_lat() + self.top_lat()) / 2.0,
        )
    }

    /// True when both spans are zero, i.e. the bounds are a single location.
    pub fn is_degenerate(&self) -> bool {
        self.lat_span() == 0.0 && self.long_span() == 0.0
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: &Point<f64>) -> bool {
        self.contains_lat(point.y()) && self.contains_long(point.x())
    }

    #[inline]
    pub fn contains_lat(&self, lat: f64) -> bool {
        lat >= self.bottom_lat() && lat <= self.top_lat()
    }

    #[inline]
    pub fn contains_long(&self, long: f64) -> bool {
        long >= self.left_long() && long <= self.right_long()
    }

    /// Grow the bounds outward on every edge.
    pub fn expand(&self, lat_amount: f64, long_amount: f64) -> Self {
        Self::new(
            self.bottom_lat() - lat_amount,
            self.top_lat() + lat_amount,
            self.left_long() - long_amount,
            self.right_long() + long_amount,
        )
    }
}
