//! IFD utilities
//!
//! Offset helpers for walking the IFD chain.

use crate::io::seekable::SeekableReader;
use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::errors::TiffResult;
use crate::tiff::ifd::IFD;

/// Reads the first IFD offset from a TIFF file header
///
/// # Arguments
/// * `reader` - The seekable reader, positioned after the version field
/// * `is_big_tiff` - Whether the file is in BigTIFF format
/// * `byte_order_handler` - Handler for the file's byte order
///
/// # Returns
/// The offset to the first IFD
pub fn read_first_ifd_offset(
    reader: &mut dyn SeekableReader,
    is_big_tiff: bool,
    byte_order_handler: &dyn ByteOrderHandler,
) -> TiffResult<u64> {
    read_offset(reader, is_big_tiff, byte_order_handler)
}

/// Reads the next IFD offset, 0 when the chain ends
pub fn read_next_ifd_offset(
    reader: &mut dyn SeekableReader,
    is_big_tiff: bool,
    byte_order_handler: &dyn ByteOrderHandler,
) -> TiffResult<u64> {
    read_offset(reader, is_big_tiff, byte_order_handler)
}

fn read_offset(
    reader: &mut dyn SeekableReader,
    is_big_tiff: bool,
    byte_order_handler: &dyn ByteOrderHandler,
) -> TiffResult<u64> {
    if is_big_tiff {
        Ok(byte_order_handler.read_u64(reader)?)
    } else {
        Ok(byte_order_handler.read_u32(reader)? as u64)
    }
}

/// Calculates the size of an IFD in bytes, including the next-IFD offset
pub fn calculate_ifd_size(ifd: &IFD, is_big_tiff: bool) -> u64 {
    calculate_ifd_size_for(ifd.entries.len(), is_big_tiff)
}

/// Size in bytes of an IFD with `entry_count` entries
pub fn calculate_ifd_size_for(entry_count: usize, is_big_tiff: bool) -> u64 {
    if is_big_tiff {
        // 8 (entry count) + 20 per entry + 8 (next IFD offset)
        8 + (20 * entry_count as u64) + 8
    } else {
        // 2 (entry count) + 12 per entry + 4 (next IFD offset)
        2 + (12 * entry_count as u64) + 4
    }
}
