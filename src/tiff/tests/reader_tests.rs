//! Tests for the TIFF reader and block access

extern crate std;

use std::io::Cursor;

use crate::extractor::{BlockReader, Region};
use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::tags;
use crate::tiff::reader::TiffReader;
use crate::tiff::errors::TiffError;
use super::test_utils::{create_big_endian_float_tiff, create_test_bigtiff_buffer, create_test_tiff_buffer};

#[test]
fn test_read_classic_tiff() {
    let mut cursor = create_test_tiff_buffer();
    let mut reader = TiffReader::new();

    let tiff = reader.read(&mut cursor).unwrap();
    std::assert!(!tiff.is_big_tiff);
    std::assert_eq!(tiff.byte_order, ByteOrder::LittleEndian);
    std::assert_eq!(tiff.ifd_count(), 1);
    std::assert_eq!(tiff.main_ifd().unwrap().get_dimensions(), Some((800, 600)));
}

#[test]
fn test_read_bigtiff() {
    let mut cursor = create_test_bigtiff_buffer();
    let mut reader = TiffReader::new();

    let tiff = reader.read(&mut cursor).unwrap();
    std::assert!(tiff.is_big_tiff);
    std::assert!(reader.is_big_tiff());
    std::assert_eq!(tiff.main_ifd().unwrap().get_dimensions(), Some((1024, 768)));
}

#[test]
fn test_invalid_header() {
    let mut cursor = Cursor::new(vec![0x49, 0x49, 41, 0, 8, 0, 0, 0]);
    let mut reader = TiffReader::new();
    std::assert!(reader.read(&mut cursor).is_err());

    let mut cursor = Cursor::new(vec![0x12, 0x34, 42, 0]);
    std::assert!(std::matches!(reader.read(&mut cursor), Err(TiffError::InvalidByteOrder(_))));
}

#[test]
fn test_big_endian_inline_and_external_tags() {
    let mut cursor = create_big_endian_float_tiff();
    let mut reader = TiffReader::new();

    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = tiff.main_ifd().unwrap();
    std::assert_eq!(tiff.byte_order, ByteOrder::BigEndian);
    std::assert_eq!(ifd.get_dimensions(), Some((3, 2)));
    std::assert_eq!(ifd.get_bits_per_sample(), 32);

    let counts = reader.read_tag_values(&mut cursor, ifd, tags::STRIP_BYTE_COUNTS).unwrap();
    std::assert_eq!(counts, vec![12, 0]);

    let nodata = reader.read_tag_ascii(&mut cursor, ifd, tags::GDAL_NODATA).unwrap();
    std::assert_eq!(nodata, "-9999");

    std::assert!(std::matches!(
        reader.read_tag_values(&mut cursor, ifd, tags::TILE_OFFSETS),
        Err(TiffError::TagNotFound(324))
    ));
}

#[test]
fn test_block_reader_big_endian_with_sparse_strip() {
    let mut cursor = create_big_endian_float_tiff();
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = tiff.main_ifd().unwrap();

    let blocks = BlockReader::open(&reader, Box::new(cursor), ifd, -9999.0).unwrap();
    std::assert_eq!(blocks.pixel(0, 2).unwrap(), 2.5);
    std::assert_eq!(blocks.pixel(1, 0).unwrap(), -9999.0);
    std::assert_eq!(blocks.pixel(5, 5).unwrap(), -9999.0);

    let region = blocks.read_region(&Region::new(1, 0, 2, 2)).unwrap();
    std::assert_eq!(region.dim(), (2, 2));
    std::assert_eq!(region[[0, 0]], 1.5);
    std::assert_eq!(region[[1, 1]], -9999.0);

    std::assert!(blocks.read_region(&Region::new(2, 0, 2, 1)).is_err());
}
