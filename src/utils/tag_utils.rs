//! TIFF tag utilities
//!
//! Naming helpers for tags and codes, plus decoding of raw tag payloads
//! into integers, floats and strings.

use crate::io::byte_order::ByteOrder;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFDEntry;
use crate::tiff::constants::{field_types, tags, compression, photometric};

/// Size in bytes of a single value of the given field type
pub fn field_type_size(field_type: u16) -> usize {
    match field_type {
        field_types::BYTE | field_types::ASCII | field_types::SBYTE | field_types::UNDEFINED => 1,
        field_types::SHORT | field_types::SSHORT => 2,
        field_types::LONG | field_types::SLONG | field_types::FLOAT => 4,
        field_types::RATIONAL | field_types::SRATIONAL | field_types::DOUBLE => 8,
        field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => 8,
        _ => 1,
    }
}

/// Decodes an integer-typed payload into unsigned values
///
/// # Arguments
/// * `bytes` - The raw payload, at least `entry.count` values long
/// * `entry` - The IFD entry describing the payload
/// * `byte_order` - Byte order of the file
///
/// # Returns
/// One u64 per value; rationals are packed as numerator << 32 | denominator
pub fn decode_integers(bytes: &[u8], entry: &IFDEntry, byte_order: ByteOrder) -> TiffResult<Vec<u64>> {
    let size = field_type_size(entry.field_type);
    check_payload(bytes, entry)?;

    (0..entry.count as usize)
        .map(|i| {
            let chunk = &bytes[i * size..];
            match entry.field_type {
                field_types::BYTE | field_types::SBYTE | field_types::UNDEFINED | field_types::ASCII |
                field_types::SHORT | field_types::SSHORT |
                field_types::LONG | field_types::SLONG | field_types::FLOAT |
                field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => {
                    Ok(byte_order.read_uint(chunk, size))
                }
                field_types::RATIONAL | field_types::SRATIONAL => {
                    let num = byte_order.read_uint(chunk, 4);
                    let den = byte_order.read_uint(&chunk[4..], 4);
                    Ok((num << 32) | den)
                }
                other => Err(TiffError::UnsupportedFieldType(other)),
            }
        })
        .collect()
}

/// Decodes a numeric payload into floating point values
///
/// Integer types are widened, signed types sign-extended and rationals divided.
pub fn decode_floats(bytes: &[u8], entry: &IFDEntry, byte_order: ByteOrder) -> TiffResult<Vec<f64>> {
    let size = field_type_size(entry.field_type);
    check_payload(bytes, entry)?;

    (0..entry.count as usize)
        .map(|i| {
            let chunk = &bytes[i * size..];
            let value = match entry.field_type {
                field_types::DOUBLE => f64::from_bits(byte_order.read_uint(chunk, 8)),
                field_types::FLOAT => f32::from_bits(byte_order.read_uint(chunk, 4) as u32) as f64,
                field_types::BYTE | field_types::UNDEFINED => chunk[0] as f64,
                field_types::SBYTE => chunk[0] as i8 as f64,
                field_types::SHORT => byte_order.read_uint(chunk, 2) as f64,
                field_types::SSHORT => byte_order.read_uint(chunk, 2) as u16 as i16 as f64,
                field_types::LONG | field_types::IFD8 | field_types::LONG8 => byte_order.read_uint(chunk, size) as f64,
                field_types::SLONG => byte_order.read_uint(chunk, 4) as u32 as i32 as f64,
                field_types::SLONG8 => byte_order.read_uint(chunk, 8) as i64 as f64,
                field_types::RATIONAL => {
                    let num = byte_order.read_uint(chunk, 4) as f64;
                    let den = byte_order.read_uint(&chunk[4..], 4) as f64;
                    num / den
                }
                field_types::SRATIONAL => {
                    let num = byte_order.read_uint(chunk, 4) as u32 as i32 as f64;
                    let den = byte_order.read_uint(&chunk[4..], 4) as u32 as i32 as f64;
                    num / den
                }
                other => return Err(TiffError::UnsupportedFieldType(other)),
            };
            Ok(value)
        })
        .collect()
}

/// Decodes an ASCII payload, dropping trailing NULs
pub fn decode_ascii(bytes: &[u8]) -> TiffResult<String> {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);

    String::from_utf8(bytes[..end].to_vec())
        .map_err(|e| TiffError::GenericError(format!("Invalid UTF-8 string: {}", e)))
}

fn check_payload(bytes: &[u8], entry: &IFDEntry) -> TiffResult<()> {
    if bytes.len() < entry.payload_size() {
        return Err(TiffError::GenericError(format!(
            "Tag {} payload truncated: {} of {} bytes",
            entry.tag, bytes.len(), entry.payload_size()
        )));
    }
    Ok(())
}

/// Get the name of a TIFF tag, or "Unknown"
pub fn get_tag_name(tag: u16) -> &'static str {
    match tag {
        tags::IMAGE_WIDTH => "ImageWidth",
        tags::IMAGE_LENGTH => "ImageLength",
        tags::BITS_PER_SAMPLE => "BitsPerSample",
        tags::COMPRESSION => "Compression",
        tags::PHOTOMETRIC_INTERPRETATION => "PhotometricInterpretation",
        tags::SAMPLES_PER_PIXEL => "SamplesPerPixel",
        tags::ROWS_PER_STRIP => "RowsPerStrip",
        tags::STRIP_OFFSETS => "StripOffsets",
        tags::STRIP_BYTE_COUNTS => "StripByteCounts",
        tags::PLANAR_CONFIGURATION => "PlanarConfiguration",
        tags::SAMPLE_FORMAT => "SampleFormat",
        tags::PREDICTOR => "Predictor",
        tags::SOFTWARE => "Software",
        tags::TILE_OFFSETS => "TileOffsets",
        tags::TILE_BYTE_COUNTS => "TileByteCounts",
        tags::TILE_WIDTH => "TileWidth",
        tags::TILE_LENGTH => "TileLength",
        tags::NEW_SUBFILE_TYPE => "NewSubfileType",
        tags::MODEL_PIXEL_SCALE_TAG => "ModelPixelScale",
        tags::MODEL_TIEPOINT_TAG => "ModelTiepoint",
        tags::GEO_KEY_DIRECTORY_TAG => "GeoKeyDirectory",
        tags::GEO_DOUBLE_PARAMS_TAG => "GeoDoubleParams",
        tags::GEO_ASCII_PARAMS_TAG => "GeoAsciiParams",
        tags::MODEL_TRANSFORMATION_TAG => "ModelTransformation",
        tags::GDAL_METADATA => "GDALMetadata",
        tags::GDAL_NODATA => "GDALNoData",
        _ => "Unknown",
    }
}

/// Get the name of a TIFF field type
pub fn get_field_type_name(field_type: u16) -> &'static str {
    match field_type {
        field_types::BYTE => "BYTE",
        field_types::ASCII => "ASCII",
        field_types::SHORT => "SHORT",
        field_types::LONG => "LONG",
        field_types::RATIONAL => "RATIONAL",
        field_types::SBYTE => "SBYTE",
        field_types::UNDEFINED => "UNDEFINED",
        field_types::SSHORT => "SSHORT",
        field_types::SLONG => "SLONG",
        field_types::SRATIONAL => "SRATIONAL",
        field_types::FLOAT => "FLOAT",
        field_types::DOUBLE => "DOUBLE",
        field_types::LONG8 => "LONG8",
        field_types::SLONG8 => "SLONG8",
        field_types::IFD8 => "IFD8",
        _ => "Unknown",
    }
}

/// Get the name of a compression method
///
/// Names follow the lower-case profile spelling used by GDAL ("lzw", "deflate").
pub fn get_compression_name(compression_code: u64) -> &'static str {
    match compression_code as u16 {
        compression::NONE => "none",
        compression::CCITT_RLE => "ccittrle",
        compression::CCITT_FAX3 => "ccittfax3",
        compression::CCITT_FAX4 => "ccittfax4",
        compression::LZW => "lzw",
        compression::JPEG_OLD => "ojpeg",
        compression::JPEG => "jpeg",
        compression::DEFLATE | compression::ADOBE_DEFLATE => "deflate",
        compression::ZSTD => "zstd",
        compression::PACKBITS => "packbits",
        _ => "unknown",
    }
}

/// Get the name of a photometric interpretation method
pub fn get_photometric_name(photometric_code: u64) -> &'static str {
    match photometric_code as u16 {
        photometric::WHITE_IS_ZERO => "WhiteIsZero",
        photometric::BLACK_IS_ZERO => "BlackIsZero",
        photometric::RGB => "RGB",
        photometric::PALETTE => "Palette",
        photometric::TRANSPARENCY_MASK => "TransparencyMask",
        photometric::CMYK => "CMYK",
        photometric::YCBCR => "YCbCr",
        photometric::CIELAB => "CIELAB",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_big_endian_shorts() {
        let entry = IFDEntry::new(tags::BITS_PER_SAMPLE, field_types::SHORT, 2, 0);
        let values = decode_integers(&[0x00, 0x10, 0x00, 0x20], &entry, ByteOrder::BigEndian).unwrap();
        assert_eq!(values, vec![16, 32]);
    }

    #[test]
    fn test_decode_doubles_and_rationals() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0.5f64.to_le_bytes());
        bytes.extend_from_slice(&(-2.25f64).to_le_bytes());
        let entry = IFDEntry::new(tags::MODEL_PIXEL_SCALE_TAG, field_types::DOUBLE, 2, 0);
        assert_eq!(decode_floats(&bytes, &entry, ByteOrder::LittleEndian).unwrap(), vec![0.5, -2.25]);

        let entry = IFDEntry::new(282, field_types::RATIONAL, 1, 0);
        let rational = [0, 0, 0, 3, 0, 0, 0, 4];
        assert_eq!(decode_floats(&rational, &entry, ByteOrder::BigEndian).unwrap(), vec![0.75]);
    }

    #[test]
    fn test_truncated_payload_is_rejected() {
        let entry = IFDEntry::new(tags::STRIP_OFFSETS, field_types::LONG, 4, 0);
        assert!(decode_integers(&[1, 2, 3], &entry, ByteOrder::LittleEndian).is_err());
    }

    #[test]
    fn test_decode_ascii_trims_nul() {
        assert_eq!(decode_ascii(b"-9999\0").unwrap(), "-9999");
    }
}
