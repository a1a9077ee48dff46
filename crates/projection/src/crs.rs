//! Coordinate reference systems used by GeoCubes rasters.

use std::fmt;

use stac_common::BoundingBox;
use thiserror::Error;

use crate::transverse_mercator::TransverseMercator;

/// Points sampled along each edge when reprojecting a bbox.
pub const DEFAULT_DENSIFY_POINTS: usize = 21;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Unsupported CRS: EPSG:{0}")]
    UnsupportedCrs(u32),

    #[error("Degenerate raster footprint: {0}")]
    DegenerateFootprint(String),
}

/// Source CRS of a raster.
#[derive(Debug, Clone)]
pub enum Crs {
    /// ETRS89 / TM35FIN(E,N), EPSG:3067
    Etrs89Tm35Fin(TransverseMercator),
    /// WGS84 geographic, EPSG:4326 (lon/lat)
    Wgs84,
}

impl Crs {
    pub fn from_epsg(code: u32) -> Result<Self, ProjectionError> {
        match code {
            3067 => Ok(Crs::Etrs89Tm35Fin(TransverseMercator::etrs_tm35fin())),
            4326 => Ok(Crs::Wgs84),
            other => Err(ProjectionError::UnsupportedCrs(other)),
        }
    }

    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Etrs89Tm35Fin(_) => 3067,
            Crs::Wgs84 => 4326,
        }
    }

    /// Convert a coordinate in this CRS to WGS84 (lon, lat).
    pub fn to_wgs84(&self, x: f64, y: f64) -> (f64, f64) {
        match self {
            Crs::Etrs89Tm35Fin(tm) => tm.inverse(x, y),
            Crs::Wgs84 => (x, y),
        }
    }

    /// Reproject a bbox to WGS84.
    ///
    /// Each edge is densified with `densify_pts` points so that curved
    /// edges in the target CRS are enclosed.
    pub fn transform_bounds(&self, bbox: &BoundingBox, densify_pts: usize) -> BoundingBox {
        let steps = densify_pts.max(2) - 1;
        let mut points = Vec::with_capacity(4 * (steps + 1));

        for t in 0..=steps {
            let frac = t as f64 / steps as f64;
            let x = bbox.min_x + frac * bbox.width();
            let y = bbox.min_y + frac * bbox.height();

            points.push(self.to_wgs84(x, bbox.min_y)); // Bottom
            points.push(self.to_wgs84(x, bbox.max_y)); // Top
            points.push(self.to_wgs84(bbox.min_x, y)); // Left
            points.push(self.to_wgs84(bbox.max_x, y)); // Right
        }

        // At least the four corners were pushed, so this never falls back.
        BoundingBox::from_points(points).unwrap_or(*bbox)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

/// Native-CRS bounds of a raster from its `[rows, columns]` shape and
/// affine transform `[a, b, c, d, e, f, 0, 0, 1]`.
pub fn raster_bounds(shape: [u32; 2], transform: &[f64; 9]) -> Result<BoundingBox, ProjectionError> {
    let [rows, cols] = shape;
    if rows == 0 || cols == 0 {
        return Err(ProjectionError::DegenerateFootprint(format!(
            "shape {}x{}",
            rows, cols
        )));
    }

    let [a, b, c, d, e, f, ..] = *transform;
    let apply = |col: f64, row: f64| (a * col + b * row + c, d * col + e * row + f);

    let (w, h) = (cols as f64, rows as f64);
    let corners = [apply(0.0, 0.0), apply(w, 0.0), apply(0.0, h), apply(w, h)];

    let bbox = BoundingBox::from_points(corners)
        .ok_or_else(|| ProjectionError::DegenerateFootprint("no corners".to_string()))?;
    if bbox.width() <= 0.0 || bbox.height() <= 0.0 {
        return Err(ProjectionError::DegenerateFootprint(format!(
            "zero-area transform {:?}",
            transform
        )));
    }
    Ok(bbox)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSFORM: [f64; 9] = [2.0, 0.0, 380_000.0, 0.0, -2.0, 6_680_000.0, 0.0, 0.0, 1.0];

    #[test]
    fn test_from_epsg() {
        assert_eq!(Crs::from_epsg(3067).unwrap().epsg(), 3067);
        assert_eq!(Crs::from_epsg(4326).unwrap().to_string(), "EPSG:4326");
        assert!(matches!(
            Crs::from_epsg(3857),
            Err(ProjectionError::UnsupportedCrs(3857))
        ));
    }

    #[test]
    fn test_raster_bounds_north_up() {
        let bbox = raster_bounds([3000, 6000], &TRANSFORM).unwrap();
        assert_eq!(bbox, BoundingBox::new(380_000.0, 6_674_000.0, 392_000.0, 6_680_000.0));
    }

    #[test]
    fn test_raster_bounds_rejects_empty_shape() {
        assert!(raster_bounds([0, 10], &TRANSFORM).is_err());
    }

    #[test]
    fn test_wgs84_is_identity() {
        let bbox = BoundingBox::new(20.0, 60.0, 21.0, 61.0);
        assert_eq!(Crs::Wgs84.transform_bounds(&bbox, 21), bbox);
    }

    #[test]
    fn test_transform_bounds_tm35fin() {
        let crs = Crs::from_epsg(3067).unwrap();
        let native = raster_bounds([3000, 6000], &TRANSFORM).unwrap();
        let wgs = crs.transform_bounds(&native, DEFAULT_DENSIFY_POINTS);

        // Tile just south-west of central Helsinki
        assert!(wgs.min_x > 24.7 && wgs.max_x < 25.2, "lon range: {:?}", wgs);
        assert!(wgs.min_y > 60.1 && wgs.max_y < 60.3, "lat range: {:?}", wgs);
        assert!(wgs.width() > 0.0 && wgs.height() > 0.0);
    }

    #[test]
    fn test_densified_bounds_enclose_corners() {
        let crs = Crs::from_epsg(3067).unwrap();
        // Far from the central meridian, where edges curve the most.
        let native = BoundingBox::new(100_000.0, 6_900_000.0, 300_000.0, 7_100_000.0);
        let dense = crs.transform_bounds(&native, 21);
        let corners = crs.transform_bounds(&native, 2);

        assert!(dense.min_x <= corners.min_x + 1e-12);
        assert!(dense.min_y <= corners.min_y + 1e-12);
        assert!(dense.max_x >= corners.max_x - 1e-12);
        assert!(dense.max_y >= corners.max_y - 1e-12);
    }
}
