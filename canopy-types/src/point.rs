use geo::Point;
use serde::{Deserialize, Serialize};

/// A single tree: an opaque identifier and a geographic location.
///
/// Identity is by `id`. Two trees may share coordinates and still be
/// distinct points.
///
/// # Examples
///
/// ```
/// use canopy_types::point::TreePoint;
///
/// let a = TreePoint::new("a", 40.7128, -74.0060);
/// let b = TreePoint::new("b", 40.7128, -74.0060);
/// assert_ne!(a, b);
/// assert_eq!(a.point(), b.point());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreePoint {
    /// Unique identifier of the tree
    pub id: String,
    /// Location, `x` = longitude and `y` = latitude
    pub point: Point<f64>,
}

impl TreePoint {
    /// Create a tree from latitude and longitude in degrees.
    ///
    /// Note the argument order: latitude first, as census rows list it.
    /// The stored `geo::Point` is `(x: longitude, y: latitude)`.
    pub fn new(id: impl Into<String>, lat: f64, long: f64) -> Self {
        Self {
            id: id.into(),
            point: Point::new(long, lat),
        }
    }

    /// Create a tree from an existing `geo::Point` (`x` = longitude).
    pub fn from_point(id: impl Into<String>, point: Point<f64>) -> Self {
        Self {
            id: id.into(),
            point,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Latitude in degrees.
    #[inline]
    pub fn lat(&self) -> f64 {
        self.point.y()
    }

    /// Longitude in degrees.
    #[inline]
    pub fn long(&self) -> f64 {
        self.point.x()
    }

    pub fn point(&self) -> &Point<f64> {
        &self.point
    }
}

/// Flat input record handed over by a dataset loader.
///
/// Records are already parsed and type-coerced but not yet validated;
/// the search core checks them before building a point set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeRecord {
    pub id: String,
    pub lat: f64,
    pub long: f64,
}

impl TreeRecord {
    pub fn new(id: impl Into<String>, lat: f64, long: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            long,
        }
    }
}

impl From<TreeRecord> for TreePoint {
    fn from(record: TreeRecord) -> Self {
        TreePoint::new(record.id, record.lat, record.long)
    }
}

impl From<&TreePoint> for TreeRecord {
    fn from(point: &TreePoint) -> Self {
        TreeRecord::new(point.id.clone(), point.lat(), point.long())
    }
}
