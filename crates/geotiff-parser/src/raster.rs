//! Georeferencing of the full-resolution image.

use tracing::debug;

use crate::error::{GeoTiffError, GeoTiffResult};
use crate::geokeys::GeoKeys;
use crate::ifd::{self, tags, Ifd, TiffHeader};

/// Size, affine transform and CRS of a GeoTIFF's main image.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterHeader {
    pub width: u32,
    pub height: u32,
    /// `[a, b, c, d, e, f, 0, 0, 1]` mapping (col, row) to CRS coordinates:
    /// `x = a*col + b*row + c`, `y = d*col + e*row + f`.
    pub transform: [f64; 9],
    pub epsg: Option<u32>,
}

impl RasterHeader {
    /// `[rows, columns]`
    pub fn shape(&self) -> [u32; 2] {
        [self.height, self.width]
    }

    /// Horizontal pixel size in CRS units.
    pub fn resolution(&self) -> f64 {
        self.transform[0].hypot(self.transform[3])
    }
}

/// Read the raster header from the leading bytes of a GeoTIFF.
///
/// Only the first IFD (the full-resolution image of a COG) is read. When
/// `data` is too short, [`GeoTiffError::Truncated`] reports how many
/// leading bytes are needed.
pub fn read_raster_header(data: &[u8]) -> GeoTiffResult<RasterHeader> {
    let header = ifd::parse_header(data)?;
    let ifd = ifd::parse_ifd(&header, data, header.first_ifd_offset)?;

    let width = single_uint(&header, &ifd, data, tags::IMAGE_WIDTH, "ImageWidth")?;
    let height = single_uint(&header, &ifd, data, tags::IMAGE_LENGTH, "ImageLength")?;
    let transform = geo_transform(&header, &ifd, data)?;

    let epsg = match ifd.get(tags::GEO_KEY_DIRECTORY) {
        Some(entry) => GeoKeys::parse(&ifd::read_uints(header.byte_order, entry, data)?).epsg(),
        None => None,
    };

    debug!(width, height, epsg = ?epsg, "Parsed GeoTIFF header");

    Ok(RasterHeader {
        width,
        height,
        transform,
        epsg,
    })
}

fn single_uint(
    header: &TiffHeader,
    ifd: &Ifd,
    data: &[u8],
    tag: u16,
    name: &'static str,
) -> GeoTiffResult<u32> {
    let entry = ifd.get(tag).ok_or(GeoTiffError::MissingTag(name))?;
    let value = ifd::read_uints(header.byte_order, entry, data)?
        .first()
        .copied()
        .ok_or(GeoTiffError::MissingTag(name))?;
    u32::try_from(value).map_err(|_| GeoTiffError::InvalidTiff(format!("{} = {}", name, value)))
}

/// Affine transform from ModelPixelScale + ModelTiepoint, or from the
/// ModelTransformation matrix.
fn geo_transform(header: &TiffHeader, ifd: &Ifd, data: &[u8]) -> GeoTiffResult<[f64; 9]> {
    let order = header.byte_order;

    if let (Some(scale), Some(tiepoint)) =
        (ifd.get(tags::MODEL_PIXEL_SCALE), ifd.get(tags::MODEL_TIEPOINT))
    {
        let scale = ifd::read_f64s(order, scale, data)?;
        let tiepoint = ifd::read_f64s(order, tiepoint, data)?;
        if scale.len() >= 2 && tiepoint.len() >= 6 {
            // Tiepoint maps raster (i, j) to model (x, y)
            let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
            let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
            return Ok([scale[0], 0.0, origin_x, 0.0, -scale[1], origin_y, 0.0, 0.0, 1.0]);
        }
    }

    if let Some(entry) = ifd.get(tags::MODEL_TRANSFORMATION) {
        let m = ifd::read_f64s(order, entry, data)?;
        if m.len() >= 16 {
            // Row-major 4x4
            return Ok([m[0], m[1], m[3], m[4], m[5], m[7], 0.0, 0.0, 1.0]);
        }
    }

    Err(GeoTiffError::MissingTag("ModelPixelScale/ModelTiepoint or ModelTransformation"))
}
