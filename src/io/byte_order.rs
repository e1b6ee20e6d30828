//! Byte order handling for TIFF files
//!
//! TIFF files declare their byte order in the first two bytes of the header.
//! Stream reads go through a `ByteOrderHandler` strategy, while already-buffered
//! block data is decoded with the slice helpers on `ByteOrder`.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use byteorder::ByteOrder as ByteOrderExt;
use std::io::Result;

use crate::io::seekable::SeekableReader;
use crate::tiff::errors::{TiffError, TiffResult};

/// Byte order of a TIFF file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian byte order (II)
    LittleEndian,
    /// Big-endian byte order (MM)
    BigEndian,
}

impl ByteOrder {
    /// Detects the byte order from the TIFF header marker
    pub fn detect(reader: &mut dyn SeekableReader) -> TiffResult<Self> {
        let marker = reader.read_u16::<LittleEndian>()?;
        match marker {
            0x4949 => Ok(ByteOrder::LittleEndian),
            0x4D4D => Ok(ByteOrder::BigEndian),
            _ => Err(TiffError::InvalidByteOrder(marker)),
        }
    }

    /// Human readable name
    pub fn name(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "Little Endian (II)",
            ByteOrder::BigEndian => "Big Endian (MM)",
        }
    }

    /// Creates the stream handler for this byte order
    pub fn create_handler(&self) -> Box<dyn ByteOrderHandler> {
        match self {
            ByteOrder::LittleEndian => Box::new(LittleEndianHandler),
            ByteOrder::BigEndian => Box::new(BigEndianHandler),
        }
    }

    /// Decodes an unsigned integer of `width` bytes (1, 2, 4 or 8) from the start of `bytes`
    pub fn read_uint(&self, bytes: &[u8], width: usize) -> u64 {
        match (self, width) {
            (_, 1) => bytes[0] as u64,
            (ByteOrder::LittleEndian, 2) => LittleEndian::read_u16(bytes) as u64,
            (ByteOrder::BigEndian, 2) => BigEndian::read_u16(bytes) as u64,
            (ByteOrder::LittleEndian, 4) => LittleEndian::read_u32(bytes) as u64,
            (ByteOrder::BigEndian, 4) => BigEndian::read_u32(bytes) as u64,
            (ByteOrder::LittleEndian, _) => LittleEndian::read_u64(bytes),
            (ByteOrder::BigEndian, _) => BigEndian::read_u64(bytes),
        }
    }

    /// Encodes the low `width` bytes of `value` into the start of `bytes`
    pub fn write_uint(&self, bytes: &mut [u8], width: usize, value: u64) {
        match (self, width) {
            (_, 1) => bytes[0] = value as u8,
            (ByteOrder::LittleEndian, 2) => LittleEndian::write_u16(bytes, value as u16),
            (ByteOrder::BigEndian, 2) => BigEndian::write_u16(bytes, value as u16),
            (ByteOrder::LittleEndian, 4) => LittleEndian::write_u32(bytes, value as u32),
            (ByteOrder::BigEndian, 4) => BigEndian::write_u32(bytes, value as u32),
            (ByteOrder::LittleEndian, _) => LittleEndian::write_u64(bytes, value),
            (ByteOrder::BigEndian, _) => BigEndian::write_u64(bytes, value),
        }
    }
}

/// Strategy for reading multi-byte values from a stream
pub trait ByteOrderHandler: Send + Sync {
    /// The byte order implemented by this handler
    fn byte_order(&self) -> ByteOrder;

    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16>;

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32>;

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64>;

    fn read_i16(&self, reader: &mut dyn SeekableReader) -> Result<i16>;

    fn read_i32(&self, reader: &mut dyn SeekableReader) -> Result<i32>;

    fn read_i64(&self, reader: &mut dyn SeekableReader) -> Result<i64>;

    fn read_f32(&self, reader: &mut dyn SeekableReader) -> Result<f32>;

    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64>;

    /// Read a rational value (numerator, denominator)
    fn read_rational(&self, reader: &mut dyn SeekableReader) -> Result<(u32, u32)> {
        let numerator = self.read_u32(reader)?;
        let denominator = self.read_u32(reader)?;
        Ok((numerator, denominator))
    }

    /// Read a signed rational value (numerator, denominator)
    fn read_srational(&self, reader: &mut dyn SeekableReader) -> Result<(i32, i32)> {
        let numerator = self.read_i32(reader)?;
        let denominator = self.read_i32(reader)?;
        Ok((numerator, denominator))
    }
}

/// Little-endian byte order handler
pub struct LittleEndianHandler;

impl ByteOrderHandler for LittleEndianHandler {
    fn byte_order(&self) -> ByteOrder {
        ByteOrder::LittleEndian
    }

    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<LittleEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<LittleEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<LittleEndian>()
    }

    fn read_i16(&self, reader: &mut dyn SeekableReader) -> Result<i16> {
        reader.read_i16::<LittleEndian>()
    }

    fn read_i32(&self, reader: &mut dyn SeekableReader) -> Result<i32> {
        reader.read_i32::<LittleEndian>()
    }

    fn read_i64(&self, reader: &mut dyn SeekableReader) -> Result<i64> {
        reader.read_i64::<LittleEndian>()
    }

    fn read_f32(&self, reader: &mut dyn SeekableReader) -> Result<f32> {
        reader.read_f32::<LittleEndian>()
    }

    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64> {
        reader.read_f64::<LittleEndian>()
    }
}

/// Big-endian byte order handler
pub struct BigEndianHandler;

impl ByteOrderHandler for BigEndianHandler {
    fn byte_order(&self) -> ByteOrder {
        ByteOrder::BigEndian
    }

    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<BigEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<BigEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<BigEndian>()
    }

    fn read_i16(&self, reader: &mut dyn SeekableReader) -> Result<i16> {
        reader.read_i16::<BigEndian>()
    }

    fn read_i32(&self, reader: &mut dyn SeekableReader) -> Result<i32> {
        reader.read_i32::<BigEndian>()
    }

    fn read_i64(&self, reader: &mut dyn SeekableReader) -> Result<i64> {
        reader.read_i64::<BigEndian>()
    }

    fn read_f32(&self, reader: &mut dyn SeekableReader) -> Result<f32> {
        reader.read_f32::<BigEndian>()
    }

    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64> {
        reader.read_f64::<BigEndian>()
    }
}
