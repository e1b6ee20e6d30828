//! Handler for Adobe Deflate (zlib) compressed blocks

use std::io::{Read, Write};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use log::trace;

use crate::tiff::constants::compression;
use crate::tiff::errors::TiffResult;
use super::handler::CompressionHandler;

/// Adobe Deflate handler (code 8, legacy code 32946 decodes the same way)
pub struct AdobeDeflateHandler;

impl CompressionHandler for AdobeDeflateHandler {
    fn decompress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(data);
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed)?;
        trace!("Deflate: {} -> {} bytes", data.len(), decompressed.len());
        Ok(decompressed)
    }

    fn compress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }

    fn name(&self) -> &'static str {
        "deflate"
    }

    fn code(&self) -> u64 {
        compression::DEFLATE as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deflate_restores_input() {
        let data: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
        let handler = AdobeDeflateHandler;
        let packed = handler.compress(&data).unwrap();
        assert!(packed.len() < data.len());
        assert_eq!(handler.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn test_deflate_rejects_garbage() {
        assert!(AdobeDeflateHandler.decompress(&[0xde, 0xad, 0xbe, 0xef]).is_err());
    }
}
