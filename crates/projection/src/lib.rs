//! Coordinate reference system transformations.
//!
//! Implements the projections GeoCubes rasters use from scratch, without
//! binding to PROJ.

pub mod crs;
pub mod transverse_mercator;

pub use crs::{raster_bounds, Crs, ProjectionError, DEFAULT_DENSIFY_POINTS};
pub use transverse_mercator::TransverseMercator;
