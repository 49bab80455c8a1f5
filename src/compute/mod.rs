//! Compute layer for the neighbour search.
//!
//! This module separates the search algorithms from configuration and the
//! public facade. It provides:
//! - Ingestion-boundary validation of point records
//! - The distance oracle and the sorted window scanner
//! - The overlapping zone grid and the neighbour counter built on it

pub mod spatial;
pub mod validation;
