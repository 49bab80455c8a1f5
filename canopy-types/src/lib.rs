//! # canopy-types
//!
//! Core data types for the canopy neighbour search.
//!
//! - **Point types**: `TreePoint`, `TreeRecord`
//! - **Zone geometry**: `ZoneBounds`
//! - **Results**: `NeighborResult`
//!
//! All types are serializable with Serde and built on top of the `geo` crate's
//! geometric primitives. Coordinates follow the `geo` convention: `x` is
//! longitude and `y` is latitude, both in degrees.
//!
//! ## Examples
//!
//! ```rust
//! use canopy_types::point::TreePoint;
//!
//! let tree = TreePoint::new("544201", 40.66022876, -73.76108933);
//! assert_eq!(tree.lat(), 40.66022876);
//! assert_eq!(tree.long(), -73.76108933);
//! ```

pub mod bbox;
pub mod point;
pub mod result;
