//! Test fixtures for bike-rebalancer.
//!
//! Provides:
//! - A synthetic road grid laid over central Nancy
//! - Real Nancy landmarks for station placement
//! - Builders for stations and feed records

pub mod nancy_grid;
pub mod nancy_places;

pub use nancy_grid::*;
pub use nancy_places::*;
