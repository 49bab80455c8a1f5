//! Fixed-radius neighbour density search over static geographic point sets.
//!
//! Given trees with latitude/longitude coordinates, find the tree(s) with the
//! most other trees strictly within a radius measured in feet along the
//! great circle. Candidate pairs are pruned before the exact haversine check
//! by either a latitude window scan, or an overlapping zone grid with a
//! longitude window scan inside each zone.
//!
//! ```rust
//! use canopy::{AnalyzerBuilder, PointSet, TreeRecord};
//!
//! let points = PointSet::from_records(vec![
//!     TreeRecord::new("1", 40.66022876, -73.76108933),
//!     TreeRecord::new("2", 40.66023100, -73.76109000),
//!     TreeRecord::new("3", 40.70000000, -73.90000000),
//! ])?;
//!
//! let analyzer = AnalyzerBuilder::new().radius_ft(50.0).build()?;
//! let result = analyzer.analyze(&points)?;
//! assert_eq!(result.max_count, 1);
//! assert!(result.contains_id("1") && result.contains_id("2"));
//! # Ok::<(), canopy::CanopyError>(())
//! ```

pub mod analyzer;
pub mod builder;
pub mod cancel;
pub mod compute;
pub mod config;
pub mod dataset;
pub mod error;

pub use analyzer::{Analyzer, most_neighbors};
pub use builder::AnalyzerBuilder;
pub use cancel::CancelToken;
pub use config::{Config, DegreeScale, EARTH_RADIUS_FT, FT_DEGREES, Strategy};
pub use dataset::PointSet;
pub use error::{CanopyError, Result};

pub use compute::spatial::{DegreeThresholds, SearchStats, ZoneGrid, distance_ft};

pub use canopy_types::bbox::ZoneBounds;
pub use canopy_types::point::{TreePoint, TreeRecord};
pub use canopy_types::result::NeighborResult;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::{Analyzer, AnalyzerBuilder, CanopyError, Result};

    pub use crate::{Config, DegreeScale, Strategy};

    pub use crate::{NeighborResult, PointSet, TreePoint, TreeRecord};

    pub use crate::CancelToken;
}
