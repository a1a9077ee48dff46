//! Tests for reading raster headers from synthetic GeoTIFFs.

mod common;

use common::TiffBuilder;
use geotiff_parser::{read_raster_header, GeoTiffError};

// ============================================================================
// Georeferencing
// ============================================================================

#[test]
fn test_pixel_scale_and_tiepoint() {
    let data = TiffBuilder::tm35fin(3000, 3000, 2.0, 380_000.0, 6_680_000.0).build();
    let header = read_raster_header(&data).unwrap();

    assert_eq!(header.width, 3000);
    assert_eq!(header.height, 3000);
    assert_eq!(header.shape(), [3000, 3000]);
    assert_eq!(
        header.transform,
        [2.0, 0.0, 380_000.0, 0.0, -2.0, 6_680_000.0, 0.0, 0.0, 1.0]
    );
    assert_eq!(header.resolution(), 2.0);
    assert_eq!(header.epsg, Some(3067));
}

#[test]
fn test_non_square_shape_is_rows_then_columns() {
    let data = TiffBuilder::tm35fin(600, 400, 10.0, 300_000.0, 7_000_000.0).build();
    let header = read_raster_header(&data).unwrap();
    assert_eq!(header.shape(), [400, 600]);
}

#[test]
fn test_model_transformation_matrix() {
    let matrix = [
        5.0, 0.0, 0.0, 500_000.0, //
        0.0, -5.0, 0.0, 6_900_000.0, //
        0.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ];
    let data = TiffBuilder::little_endian()
        .long(256, 100)
        .long(257, 50)
        .doubles(34264, &matrix)
        .build();
    let header = read_raster_header(&data).unwrap();

    assert_eq!(
        header.transform,
        [5.0, 0.0, 500_000.0, 0.0, -5.0, 6_900_000.0, 0.0, 0.0, 1.0]
    );
    assert_eq!(header.epsg, None);
}

#[test]
fn test_big_endian_file() {
    let data = TiffBuilder::big_endian()
        .long(256, 1000)
        .long(257, 1000)
        .doubles(33550, &[0.5, 0.5, 0.0])
        .doubles(33922, &[0.0, 0.0, 0.0, 400_000.0, 6_800_000.0, 0.0])
        .shorts(34735, &[1, 1, 0, 2, 1024, 0, 1, 1, 3072, 0, 1, 3067])
        .build();
    let header = read_raster_header(&data).unwrap();

    assert_eq!(header.resolution(), 0.5);
    assert_eq!(header.transform[2], 400_000.0);
    assert_eq!(header.epsg, Some(3067));
}

// ============================================================================
// Failure modes
// ============================================================================

#[test]
fn test_missing_georeferencing() {
    let data = TiffBuilder::little_endian().long(256, 10).long(257, 10).build();
    assert!(matches!(
        read_raster_header(&data),
        Err(GeoTiffError::MissingTag(_))
    ));
}

#[test]
fn test_missing_dimensions() {
    let data = TiffBuilder::little_endian()
        .doubles(33550, &[1.0, 1.0, 0.0])
        .doubles(33922, &[0.0; 6])
        .build();
    assert!(matches!(
        read_raster_header(&data),
        Err(GeoTiffError::MissingTag("ImageWidth"))
    ));
}

#[test]
fn test_truncated_prefix_reports_full_length() {
    let data = TiffBuilder::tm35fin(3000, 3000, 2.0, 380_000.0, 6_680_000.0).build();

    // Cut inside the out-of-line GeoKey directory
    let prefix = &data[..data.len() - 4];
    match read_raster_header(prefix) {
        Err(GeoTiffError::Truncated { needed, available }) => {
            assert_eq!(needed, data.len() as u64);
            assert_eq!(available, prefix.len() as u64);
        }
        other => panic!("expected truncation, got {:?}", other),
    }

    // Retrying with the requested length succeeds
    assert!(read_raster_header(&data).is_ok());
}

#[test]
fn test_not_a_tiff() {
    assert!(matches!(
        read_raster_header(b"<html><body>404</body></html>"),
        Err(GeoTiffError::InvalidTiff(_))
    ));
}
