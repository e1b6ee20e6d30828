//! Write-then-read tests for the TIFF builder

extern crate std;

use std::io::Cursor;
use ndarray::Array2;

use crate::compression::{AdobeDeflateHandler, LzwHandler, ZstdHandler};
use crate::coordinate::GeoTransform;
use crate::extractor::{BlockReader, Region, SampleType};
use crate::tiff::builder::TiffBuilder;
use crate::tiff::geo_key_parser::GeoKeyParser;
use crate::tiff::reader::TiffReader;

fn sample_grid(rows: usize, cols: usize) -> Array2<f64> {
    Array2::from_shape_fn((rows, cols), |(r, c)| (r * 100 + c) as f64 * 0.5 - 20.0)
}

fn read_back(bytes: Vec<u8>, fill: f64) -> (BlockReader, Array2<f64>) {
    let mut cursor = Cursor::new(bytes);
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = tiff.main_ifd().unwrap().clone();
    let blocks = BlockReader::open(&reader, Box::new(cursor), &ifd, fill).unwrap();
    let all = blocks.read_region(&Region::full(blocks.width(), blocks.height())).unwrap();
    (blocks, all)
}

#[test]
fn test_tiled_lzw_float_with_predictor() {
    let grid = sample_grid(37, 21);
    let bytes = TiffBuilder::new(SampleType::F32)
        .compression(Box::new(LzwHandler))
        .predictor(3)
        .tiles(16, 16)
        .to_bytes(&grid)
        .unwrap();

    let (blocks, all) = read_back(bytes, f64::NAN);
    std::assert!(blocks.layout().is_tiled());
    std::assert_eq!(blocks.layout().blocks_per_plane(), 6);
    std::assert_eq!(all, grid);
}

#[test]
fn test_deflate_int16_strips_with_predictor() {
    let grid = Array2::from_shape_fn((9, 7), |(r, c)| (r as f64 - 4.0) * 1000.0 + c as f64);
    let bytes = TiffBuilder::new(SampleType::I16)
        .compression(Box::new(AdobeDeflateHandler))
        .predictor(2)
        .strips(4)
        .to_bytes(&grid)
        .unwrap();

    let (blocks, all) = read_back(bytes, 0.0);
    std::assert_eq!(blocks.layout().blocks_down(), 3);
    std::assert_eq!(blocks.sample_type(), SampleType::I16);
    std::assert_eq!(all, grid);
}

#[test]
fn test_bigtiff_zstd_float64() {
    let grid = sample_grid(5, 5);
    let bytes = TiffBuilder::new(SampleType::F64)
        .big_tiff(true)
        .compression(Box::new(ZstdHandler::new()))
        .to_bytes(&grid)
        .unwrap();
    std::assert_eq!(&bytes[2..4], &[43, 0]);

    let (_, all) = read_back(bytes, 0.0);
    std::assert_eq!(all, grid);
}

#[test]
fn test_georeferencing_round_trip() {
    let transform = GeoTransform::from_origin(500000.0, 4_600_000.0, 30.0, 30.0);
    let bytes = TiffBuilder::new(SampleType::U8)
        .transform(transform)
        .epsg(32633)
        .pixel_is_point(true)
        .nodata(255.0)
        .to_bytes(&Array2::from_elem((2, 2), 1.0))
        .unwrap();

    let mut cursor = Cursor::new(bytes);
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = tiff.main_ifd().unwrap();

    let info = GeoKeyParser::extract_geo_info(&reader, &mut cursor, ifd).unwrap();
    std::assert_eq!(info.epsg_code(), Some(32633));
    std::assert_eq!(info.raster_type, 2);
    std::assert_eq!(info.geo_transform(), Some(transform));
}

#[test]
fn test_tile_size_must_be_multiple_of_16() {
    let result = TiffBuilder::new(SampleType::U8).tiles(10, 16).to_bytes(&Array2::zeros((2, 2)));
    std::assert!(result.is_err());
}
