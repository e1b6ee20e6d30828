//! Errors surfaced by lookups
//!
//! "Outside the raster" and "nodata" are not errors: lookups return `None`
//! for them. Everything here is a condition the caller has to act on.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::coordinate::CrsError;
use crate::geocode::GeocodeError;
use crate::tiff::errors::TiffError;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("File {} not found.", .0.display())]
    ResourceNotFound(PathBuf),

    #[error("Raster has no CRS – cannot locate coordinates. ({})", .0.display())]
    MissingCrs(PathBuf),

    #[error("Unsupported CRS EPSG:{epsg}: {reason}")]
    UnsupportedCrs { epsg: u32, reason: String },

    #[error("No geocoding backend is configured")]
    GeocoderUnavailable,

    #[error("Address not found: {0}")]
    AddressNotFound(String),

    #[error("Geocoding failed: {0}")]
    Geocoding(GeocodeError),

    #[error("Raster error: {0}")]
    Raster(#[from] TiffError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<CrsError> for LookupError {
    fn from(err: CrsError) -> Self {
        LookupError::UnsupportedCrs { epsg: err.epsg, reason: err.reason }
    }
}

impl From<GeocodeError> for LookupError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::NotFound(address) => LookupError::AddressNotFound(address),
            other => LookupError::Geocoding(other),
        }
    }
}

pub type LookupResult<T> = Result<T, LookupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_address_is_distinct() {
        let err: LookupError = GeocodeError::NotFound("Atlantis".to_string()).into();
        assert!(matches!(err, LookupError::AddressNotFound(ref a) if a == "Atlantis"));

        let err: LookupError = GeocodeError::Request("timed out".to_string()).into();
        assert!(matches!(err, LookupError::Geocoding(_)));
    }

    #[test]
    fn test_missing_crs_message() {
        let err = LookupError::MissingCrs(PathBuf::from("/data/x.tif"));
        assert!(err.to_string().starts_with("Raster has no CRS – cannot locate coordinates."));
    }
}
