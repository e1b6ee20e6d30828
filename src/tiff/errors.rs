//! Error types for GeoTIFF decoding

use std::io;
use thiserror::Error;

/// Errors raised while parsing or decoding a (Geo)TIFF file
#[derive(Debug, Error)]
pub enum TiffError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Invalid TIFF header")]
    InvalidHeader,

    #[error("Invalid byte order marker: {0:#06x}")]
    InvalidByteOrder(u16),

    #[error("Invalid BigTIFF header")]
    InvalidBigTIFFHeader,

    #[error("Unsupported TIFF version: {0}")]
    UnsupportedVersion(u16),

    #[error("Tag not found: {0}")]
    TagNotFound(u16),

    #[error("Unsupported field type: {0}")]
    UnsupportedFieldType(u16),

    #[error("Unsupported compression method: {0}")]
    UnsupportedCompression(u64),

    #[error("Unsupported sample format {format} with {bits} bits per sample")]
    UnsupportedSampleFormat { format: u16, bits: u16 },

    #[error("Unsupported predictor: {0}")]
    UnsupportedPredictor(u16),

    #[error("Image dimensions not found")]
    MissingDimensions,

    /// The file carries no usable affine georeferencing
    #[error("Raster has no geotransform")]
    NotGeoreferenced,

    /// A block could not be decompressed or had the wrong size
    #[error("Corrupt block {index}: {reason}")]
    CorruptBlock { index: usize, reason: String },

    #[error("TIFF error: {0}")]
    GenericError(String),
}

impl From<String> for TiffError {
    fn from(msg: String) -> Self {
        TiffError::GenericError(msg)
    }
}

/// Result type for TIFF operations
pub type TiffResult<T> = Result<T, TiffError>;
