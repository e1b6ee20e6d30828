//! Sample data types
//!
//! Maps the `SampleFormat`/`BitsPerSample` pair of an IFD to a concrete numeric
//! type and decodes individual samples from block buffers.

use byteorder::{BigEndian, LittleEndian};

use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::sample_format;
use crate::tiff::errors::{TiffError, TiffResult};

/// Numeric type of one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl SampleType {
    /// Resolve the sample type from the SampleFormat and BitsPerSample tags
    pub fn from_tags(format: u16, bits: u16) -> TiffResult<Self> {
        match (format, bits) {
            (sample_format::UNSIGNED, 8) => Ok(SampleType::U8),
            (sample_format::SIGNED, 8) => Ok(SampleType::I8),
            (sample_format::UNSIGNED, 16) => Ok(SampleType::U16),
            (sample_format::SIGNED, 16) => Ok(SampleType::I16),
            (sample_format::UNSIGNED, 32) => Ok(SampleType::U32),
            (sample_format::SIGNED, 32) => Ok(SampleType::I32),
            (sample_format::IEEEFP, 32) => Ok(SampleType::F32),
            (sample_format::IEEEFP, 64) => Ok(SampleType::F64),
            _ => Err(TiffError::UnsupportedSampleFormat { format, bits }),
        }
    }

    /// Size of one sample in bytes
    pub fn bytes(&self) -> usize {
        match self {
            SampleType::U8 | SampleType::I8 => 1,
            SampleType::U16 | SampleType::I16 => 2,
            SampleType::U32 | SampleType::I32 | SampleType::F32 => 4,
            SampleType::F64 => 8,
        }
    }

    /// Data type name as shown in raster profiles
    pub fn name(&self) -> &'static str {
        match self {
            SampleType::U8 => "uint8",
            SampleType::I8 => "int8",
            SampleType::U16 => "uint16",
            SampleType::I16 => "int16",
            SampleType::U32 => "uint32",
            SampleType::I32 => "int32",
            SampleType::F32 => "float32",
            SampleType::F64 => "float64",
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, SampleType::F32 | SampleType::F64)
    }

    /// The (SampleFormat, BitsPerSample) pair written for this type
    pub fn tag_values(&self) -> (u16, u16) {
        let format = match self {
            SampleType::U8 | SampleType::U16 | SampleType::U32 => sample_format::UNSIGNED,
            SampleType::I8 | SampleType::I16 | SampleType::I32 => sample_format::SIGNED,
            SampleType::F32 | SampleType::F64 => sample_format::IEEEFP,
        };
        (format, (self.bytes() * 8) as u16)
    }

    /// Decode one sample from the start of `bytes`
    ///
    /// The slice must hold at least `self.bytes()` bytes.
    pub fn read(&self, bytes: &[u8], byte_order: ByteOrder) -> f64 {
        match byte_order {
            ByteOrder::LittleEndian => self.read_with::<LittleEndian>(bytes),
            ByteOrder::BigEndian => self.read_with::<BigEndian>(bytes),
        }
    }

    /// Append one sample in little-endian order, saturating to the type's range
    pub fn write_le(&self, value: f64, out: &mut Vec<u8>) {
        match self {
            SampleType::U8 => out.push(value as u8),
            SampleType::I8 => out.push(value as i8 as u8),
            SampleType::U16 => out.extend_from_slice(&(value as u16).to_le_bytes()),
            SampleType::I16 => out.extend_from_slice(&(value as i16).to_le_bytes()),
            SampleType::U32 => out.extend_from_slice(&(value as u32).to_le_bytes()),
            SampleType::I32 => out.extend_from_slice(&(value as i32).to_le_bytes()),
            SampleType::F32 => out.extend_from_slice(&(value as f32).to_le_bytes()),
            SampleType::F64 => out.extend_from_slice(&value.to_le_bytes()),
        }
    }

    fn read_with<B: byteorder::ByteOrder>(&self, bytes: &[u8]) -> f64 {
        match self {
            SampleType::U8 => bytes[0] as f64,
            SampleType::I8 => bytes[0] as i8 as f64,
            SampleType::U16 => B::read_u16(bytes) as f64,
            SampleType::I16 => B::read_i16(bytes) as f64,
            SampleType::U32 => B::read_u32(bytes) as f64,
            SampleType::I32 => B::read_i32(bytes) as f64,
            SampleType::F32 => B::read_f32(bytes) as f64,
            SampleType::F64 => B::read_f64(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tags() {
        assert_eq!(SampleType::from_tags(3, 32).unwrap(), SampleType::F32);
        assert_eq!(SampleType::from_tags(2, 16).unwrap(), SampleType::I16);
        assert!(matches!(
            SampleType::from_tags(3, 16),
            Err(TiffError::UnsupportedSampleFormat { format: 3, bits: 16 })
        ));
    }

    #[test]
    fn test_read_both_orders() {
        let value = -9999.0f32;
        assert_eq!(SampleType::F32.read(&value.to_le_bytes(), ByteOrder::LittleEndian), -9999.0);
        assert_eq!(SampleType::F32.read(&value.to_be_bytes(), ByteOrder::BigEndian), -9999.0);
        assert_eq!(SampleType::I8.read(&[0xFF], ByteOrder::BigEndian), -1.0);
        assert_eq!(SampleType::U16.read(&[0x01, 0x02], ByteOrder::BigEndian), 258.0);
    }

    #[test]
    fn test_tag_values() {
        assert_eq!(SampleType::F32.tag_values(), (3, 32));
        assert_eq!(SampleType::I16.tag_values(), (2, 16));
        assert_eq!(SampleType::F64.name(), "float64");
    }
}
