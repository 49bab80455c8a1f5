//! Validation for tree records at the ingestion boundary.

use crate::error::{CanopyError, Result};
use canopy_types::point::TreePoint;
use rustc_hash::FxHashSet;

/// Validates a single tree: non-empty id, finite coordinates, latitude in
/// [-90.0, 90.0] and longitude in [-180.0, 180.0].
///
/// # Examples
///
/// ```
/// use canopy::compute::validation::validate_tree_point;
/// use canopy::TreePoint;
///
/// assert!(validate_tree_point(&TreePoint::new("a", 40.7128, -74.0060)).is_ok());
/// assert!(validate_tree_point(&TreePoint::new("b", 95.0, -74.0)).is_err());
/// assert!(validate_tree_point(&TreePoint::new("c", f64::NAN, -74.0)).is_err());
/// ```
pub fn validate_tree_point(tree: &TreePoint) -> Result<()> {
    let invalid = |reason: String| CanopyError::InvalidPoint {
        id: tree.id.clone(),
        reason,
    };

    if tree.id.is_empty() {
        return Err(invalid("Identifier must not be empty".to_string()));
    }

    let (lat, long) = (tree.lat(), tree.long());

    if !lat.is_finite() {
        return Err(invalid(format!("Latitude must be finite, got: {}", lat)));
    }

    if !long.is_finite() {
        return Err(invalid(format!("Longitude must be finite, got: {}", long)));
    }

    if !(-90.0..=90.0).contains(&lat) {
        return Err(invalid(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            lat
        )));
    }

    if !(-180.0..=180.0).contains(&long) {
        return Err(invalid(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            long
        )));
    }

    Ok(())
}

/// Validates every tree and checks that identifiers are unique.
///
/// Fails on the first offending tree, in input order.
pub fn validate_trees(trees: &[TreePoint]) -> Result<()> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    seen.reserve(trees.len());

    for tree in trees {
        validate_tree_point(tree)?;
        if !seen.insert(tree.id.as_str()) {
            return Err(CanopyError::DuplicateId(tree.id.clone()));
        }
    }

    Ok(())
}
