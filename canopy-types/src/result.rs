use crate::point::TreePoint;
use serde::{Deserialize, Serialize};

/// Outcome of a neighbour search: the highest neighbour count and every
/// point that attains it.
///
/// `max_points` holds each point at most once, ordered as the points were
/// supplied to the search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NeighborResult {
    pub max_count: usize,
    pub max_points: Vec<TreePoint>,
}

impl NeighborResult {
    pub fn new(max_count: usize, max_points: Vec<TreePoint>) -> Self {
        Self {
            max_count,
            max_points,
        }
    }

    /// The result of searching a dataset in which no point has a neighbour.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.max_points.is_empty()
    }

    /// Identifiers of the winning points, in result order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.max_points.iter().map(|p| p.id.as_str())
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.max_points.iter().any(|p| p.id == id)
    }
}
