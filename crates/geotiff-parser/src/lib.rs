//! Minimal GeoTIFF header reader.
//!
//! Extracts what a catalog needs from a (Cloud Optimized) GeoTIFF without
//! decoding pixels: image size, the pixel-to-CRS affine transform and the
//! EPSG code from the GeoKey directory. Parsing works on a prefix of the
//! file so remote rasters can be read with HTTP range requests.

pub mod error;
pub mod geokeys;
pub mod ifd;
pub mod raster;

pub use error::{GeoTiffError, GeoTiffResult};
pub use raster::{read_raster_header, RasterHeader};
