pub mod counter;
pub mod distance;
pub mod grid;
pub mod thresholds;
pub mod window;

pub use counter::{NeighborCounter, Observation, SearchStats, Tally};
pub use distance::{DistanceOracle, distance_ft, haversine_distance};
pub use grid::{Zone, ZoneGrid, ZoneId, ZoneMembership, ZoneRow};
pub use thresholds::DegreeThresholds;
pub use window::{window, window_slice};
