//! Predictor reversal for decompressed blocks
//!
//! Predictor 2 stores each sample as the difference to the previous sample of
//! the same channel. Predictor 3 (floating point) differences the bytes of a
//! row and stores them split into byte planes, most significant plane first.

use log::trace;

use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::predictor;
use crate::tiff::errors::{TiffError, TiffResult};

use super::sample_type::SampleType;

/// Undo the predictor of one decompressed block in place
///
/// # Arguments
/// * `data` - Decompressed block bytes
/// * `predictor_code` - Value of the Predictor tag
/// * `sample_type` - Type of the samples in the block
/// * `byte_order` - Byte order of the file
/// * `row_width` - Pixels per block row
/// * `samples_per_pixel` - Interleaved samples per pixel (1 for planar data)
///
/// # Returns
/// The byte order the samples are in afterwards. The floating-point predictor
/// always leaves big-endian samples behind.
pub fn undo_predictor(
    data: &mut [u8],
    predictor_code: u16,
    sample_type: SampleType,
    byte_order: ByteOrder,
    row_width: usize,
    samples_per_pixel: usize,
) -> TiffResult<ByteOrder> {
    let bps = sample_type.bytes();
    let row_bytes = row_width * samples_per_pixel * bps;
    if row_bytes == 0 {
        return Ok(byte_order);
    }

    match predictor_code {
        predictor::NONE => Ok(byte_order),
        predictor::HORIZONTAL_DIFFERENCING => {
            if sample_type.is_float() {
                return Err(TiffError::UnsupportedPredictor(predictor_code));
            }
            for row in data.chunks_mut(row_bytes) {
                accumulate_samples(row, bps, samples_per_pixel, byte_order);
            }
            trace!("Reversed horizontal differencing over {} bytes", data.len());
            Ok(byte_order)
        }
        predictor::FLOATING_POINT => {
            if !sample_type.is_float() {
                return Err(TiffError::UnsupportedPredictor(predictor_code));
            }
            let mut planes = vec![0u8; row_bytes];
            for row in data.chunks_mut(row_bytes) {
                if row.len() < row_bytes {
                    // Trailing padding shorter than a row carries no samples.
                    break;
                }
                for i in samples_per_pixel..row.len() {
                    row[i] = row[i].wrapping_add(row[i - samples_per_pixel]);
                }
                planes.copy_from_slice(row);
                let values_per_row = row_bytes / bps;
                for i in 0..values_per_row {
                    for b in 0..bps {
                        row[bps * i + b] = planes[b * values_per_row + i];
                    }
                }
            }
            trace!("Reversed floating-point predictor over {} bytes", data.len());
            Ok(ByteOrder::BigEndian)
        }
        other => Err(TiffError::UnsupportedPredictor(other)),
    }
}

/// Apply a predictor to one little-endian block before compression
///
/// The inverse of `undo_predictor` for blocks written by this crate.
pub fn apply_predictor(
    data: &mut [u8],
    predictor_code: u16,
    sample_type: SampleType,
    row_width: usize,
    samples_per_pixel: usize,
) -> TiffResult<()> {
    let bps = sample_type.bytes();
    let row_bytes = row_width * samples_per_pixel * bps;
    if row_bytes == 0 || predictor_code == predictor::NONE {
        return Ok(());
    }

    match predictor_code {
        predictor::HORIZONTAL_DIFFERENCING if !sample_type.is_float() => {
            let order = ByteOrder::LittleEndian;
            let mask = if bps == 8 { u64::MAX } else { (1u64 << (bps * 8)) - 1 };
            for row in data.chunks_mut(row_bytes) {
                let count = row.len() / bps;
                for i in (samples_per_pixel..count).rev() {
                    let prev = order.read_uint(&row[(i - samples_per_pixel) * bps..], bps);
                    let curr = order.read_uint(&row[i * bps..], bps);
                    order.write_uint(&mut row[i * bps..(i + 1) * bps], bps, curr.wrapping_sub(prev) & mask);
                }
            }
            Ok(())
        }
        predictor::FLOATING_POINT if sample_type.is_float() => {
            let values_per_row = row_bytes / bps;
            let mut planes = vec![0u8; row_bytes];
            for row in data.chunks_mut(row_bytes) {
                if row.len() < row_bytes {
                    break;
                }
                for i in 0..values_per_row {
                    for b in 0..bps {
                        planes[b * values_per_row + i] = row[bps * i + (bps - 1 - b)];
                    }
                }
                for i in (samples_per_pixel..row_bytes).rev() {
                    planes[i] = planes[i].wrapping_sub(planes[i - samples_per_pixel]);
                }
                row.copy_from_slice(&planes);
            }
            Ok(())
        }
        other => Err(TiffError::UnsupportedPredictor(other)),
    }
}

/// Wrapping cumulative sum of integer samples with a stride of one pixel
fn accumulate_samples(row: &mut [u8], bps: usize, stride: usize, byte_order: ByteOrder) {
    let count = row.len() / bps;
    let mask = if bps == 8 { u64::MAX } else { (1u64 << (bps * 8)) - 1 };
    for i in stride..count {
        let prev = byte_order.read_uint(&row[(i - stride) * bps..], bps);
        let curr = byte_order.read_uint(&row[i * bps..], bps);
        let sum = curr.wrapping_add(prev) & mask;
        byte_order.write_uint(&mut row[i * bps..(i + 1) * bps], bps, sum);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_u16_little_endian() {
        // Row of 3 pixels: 100, +5, -3 (as wrapping u16)
        let mut data = Vec::new();
        for v in [100u16, 5, 0u16.wrapping_sub(3)] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let order = undo_predictor(&mut data, 2, SampleType::U16, ByteOrder::LittleEndian, 3, 1).unwrap();
        assert_eq!(order, ByteOrder::LittleEndian);
        assert_eq!(u16::from_le_bytes([data[2], data[3]]), 105);
        assert_eq!(u16::from_le_bytes([data[4], data[5]]), 102);
    }

    #[test]
    fn test_horizontal_resets_per_row() {
        let mut data = vec![10u8, 1, 1, 20, 2, 2];
        undo_predictor(&mut data, 2, SampleType::U8, ByteOrder::BigEndian, 3, 1).unwrap();
        assert_eq!(data, vec![10, 11, 12, 20, 22, 24]);
    }

    #[test]
    fn test_floating_point_predictor() {
        let values = [1.5f32, -2.25, 15.5];
        let row_width = values.len();
        // Encode: split into byte planes (MSB first), then difference bytes.
        let mut planes = vec![0u8; row_width * 4];
        for (i, v) in values.iter().enumerate() {
            let be = v.to_be_bytes();
            for b in 0..4 {
                planes[b * row_width + i] = be[b];
            }
        }
        for i in (1..planes.len()).rev() {
            planes[i] = planes[i].wrapping_sub(planes[i - 1]);
        }

        let order = undo_predictor(&mut planes, 3, SampleType::F32, ByteOrder::LittleEndian, row_width, 1).unwrap();
        assert_eq!(order, ByteOrder::BigEndian);
        for (i, v) in values.iter().enumerate() {
            assert_eq!(SampleType::F32.read(&planes[i * 4..], order), *v as f64);
        }
    }

    #[test]
    fn test_apply_then_undo() {
        let mut ints = Vec::new();
        for v in [7i16, -300, 12, 12] {
            ints.extend_from_slice(&v.to_le_bytes());
        }
        let original = ints.clone();
        apply_predictor(&mut ints, 2, SampleType::I16, 2, 1).unwrap();
        assert_ne!(ints, original);
        undo_predictor(&mut ints, 2, SampleType::I16, ByteOrder::LittleEndian, 2, 1).unwrap();
        assert_eq!(ints, original);

        let mut floats = Vec::new();
        for v in [0.25f64, -9999.0] {
            floats.extend_from_slice(&v.to_le_bytes());
        }
        apply_predictor(&mut floats, 3, SampleType::F64, 2, 1).unwrap();
        let order = undo_predictor(&mut floats, 3, SampleType::F64, ByteOrder::LittleEndian, 2, 1).unwrap();
        assert_eq!(SampleType::F64.read(&floats[8..], order), -9999.0);
    }

    #[test]
    fn test_invalid_combinations() {
        let mut data = vec![0u8; 8];
        assert!(undo_predictor(&mut data, 2, SampleType::F32, ByteOrder::LittleEndian, 2, 1).is_err());
        assert!(undo_predictor(&mut data, 3, SampleType::U16, ByteOrder::LittleEndian, 2, 1).is_err());
        assert!(matches!(
            undo_predictor(&mut data, 9, SampleType::U8, ByteOrder::LittleEndian, 2, 1),
            Err(TiffError::UnsupportedPredictor(9))
        ));
    }
}
