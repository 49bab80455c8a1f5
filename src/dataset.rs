//! The validated, immutable point collection a search runs over.

use crate::compute::validation::validate_trees;
use crate::error::Result;
use canopy_types::bbox::ZoneBounds;
use canopy_types::point::{TreePoint, TreeRecord};
use geo::BoundingRect;

/// A validated set of trees.
///
/// Every point has finite, in-range coordinates and a unique id. The set is
/// immutable once built; searches refer to points by their index in it.
///
/// # Examples
///
/// ```
/// use canopy::{PointSet, TreeRecord};
///
/// let set = PointSet::from_records(vec![
///     TreeRecord::new("1", 40.70, -74.00),
///     TreeRecord::new("2", 40.71, -74.01),
/// ])?;
/// assert_eq!(set.len(), 2);
/// # Ok::<(), canopy::CanopyError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PointSet {
    points: Vec<TreePoint>,
}

impl PointSet {
    pub fn new(points: Vec<TreePoint>) -> Result<Self> {
        validate_trees(&points)?;
        Ok(Self { points })
    }

    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = TreeRecord>,
    {
        Self::new(records.into_iter().map(TreePoint::from).collect())
    }

    /// Parse a JSON array of `{"id", "lat", "long"}` records.
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<TreeRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[TreePoint] {
        &self.points
    }

    pub fn get(&self, index: usize) -> Option<&TreePoint> {
        self.points.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TreePoint> {
        self.points.iter()
    }

    /// Bounding box of all points, or `None` for an empty set.
    pub fn bounds(&self) -> Option<ZoneBounds> {
        let multi_point: geo::MultiPoint<f64> =
            self.points.iter().map(|p| p.point).collect::<Vec<_>>().into();
        multi_point.bounding_rect().map(ZoneBounds::from_rect)
    }

    /// Largest absolute latitude in the set.
    pub fn max_abs_lat(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.lat().abs())
            .fold(0.0, f64::max)
    }

    pub fn into_inner(self) -> Vec<TreePoint> {
        self.points
    }
}

impl std::ops::Index<usize> for PointSet {
    type Output = TreePoint;

    fn index(&self, index: usize) -> &TreePoint {
        &self.points[index]
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a TreePoint;
    type IntoIter = std::slice::Iter<'a, TreePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CanopyError;

    #[test]
    fn test_bounds() {
        let set = PointSet::new(vec![
            TreePoint::new("a", 40.7, -74.0),
            TreePoint::new("b", 40.8, -73.9),
            TreePoint::new("c", 40.75, -73.95),
        ])
        .unwrap();

        let bounds = set.bounds().unwrap();
        assert_eq!(bounds.bottom_lat(), 40.7);
        assert_eq!(bounds.top_lat(), 40.8);
        assert_eq!(bounds.left_long(), -74.0);
        assert_eq!(bounds.right_long(), -73.9);
        assert_eq!(set.max_abs_lat(), 40.8);
    }

    #[test]
    fn test_from_json() {
        let set = PointSet::from_json(
            r#"[{"id": "1", "lat": 40.7, "long": -74.0}, {"id": "2", "lat": 40.8, "long": -73.9}]"#,
        )
        .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set[1].id, "2");

        let malformed = PointSet::from_json(r#"[{"id": "1", "lat": 40.7}]"#);
        assert!(matches!(malformed, Err(CanopyError::Serialization(_))));

        let out_of_range = PointSet::from_json(r#"[{"id": "1", "lat": 95.0, "long": 0.0}]"#);
        assert!(matches!(out_of_range, Err(CanopyError::InvalidPoint { .. })));
    }

    #[test]
    fn test_empty_set_has_no_bounds() {
        let set = PointSet::empty();
        assert!(set.is_empty());
        assert!(set.bounds().is_none());
    }

    #[test]
    fn test_single_point_bounds_are_degenerate() {
        let set = PointSet::new(vec![TreePoint::new("a", 1.0, 2.0)]).unwrap();
        assert!(set.bounds().unwrap().is_degenerate());
    }

    #[test]
    fn test_rejects_invalid_records() {
        let result = PointSet::from_records(vec![TreeRecord::new("a", 100.0, 0.0)]);
        assert!(matches!(result, Err(CanopyError::InvalidPoint { .. })));
    }
}
