//! TIFF writing utilities
//!
//! Word alignment helpers for laying out tag payloads and image blocks.

use crate::tiff::errors::TiffResult;
use std::io::Write;

/// Align an offset to the next 4-byte boundary
pub fn align_to_word(offset: u64) -> u64 {
    offset + calculate_padding(offset as usize) as u64
}

/// Write the padding that aligns data of `data_len` bytes to 4 bytes
pub fn write_padding(writer: &mut impl Write, data_len: usize) -> TiffResult<()> {
    let padding = calculate_padding(data_len);
    if padding > 0 {
        writer.write_all(&[0u8; 3][..padding])?;
    }
    Ok(())
}

/// Padding required to align to a 4-byte boundary
pub fn calculate_padding(data_len: usize) -> usize {
    (4 - (data_len % 4)) % 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment() {
        assert_eq!(align_to_word(8), 8);
        assert_eq!(align_to_word(9), 12);
        let mut out = Vec::new();
        write_padding(&mut out, 5).unwrap();
        assert_eq!(out.len(), 3);
    }
}
