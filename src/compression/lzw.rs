//! Handler for TIFF LZW compressed blocks
//!
//! TIFF LZW packs codes MSB first and switches code size one code early;
//! weezl's `with_tiff_size_switch` decoder implements exactly that variant.

use log::{trace, warn};
use weezl::{decode::Decoder, encode::Encoder, BitOrder};

use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;

/// LZW handler (code 5)
pub struct LzwHandler;

impl CompressionHandler for LzwHandler {
    fn decompress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let mut decoder = Decoder::with_tiff_size_switch(BitOrder::Msb, 8);
        match decoder.decode(data) {
            Ok(bytes) => {
                trace!("LZW: {} -> {} bytes", data.len(), bytes.len());
                Ok(bytes)
            }
            Err(e) => {
                warn!("LZW decode failure: {}", e);
                Err(TiffError::GenericError(format!("LZW decode failure: {}", e)))
            }
        }
    }

    fn compress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let mut encoder = Encoder::with_tiff_size_switch(BitOrder::Msb, 8);
        encoder.encode(data)
            .map_err(|e| TiffError::GenericError(format!("LZW encode failure: {}", e)))
    }

    fn name(&self) -> &'static str {
        "lzw"
    }

    fn code(&self) -> u64 {
        compression::LZW as u64
    }
}
