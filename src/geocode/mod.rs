//! Address geocoding
//!
//! `Geocoder` resolves a free-form address to a lat/lon pair. The lookup
//! engine holds one as an optional dependency, so coordinate-only use needs
//! no backend at all.

mod memoized;
mod nominatim;

pub use self::memoized::MemoizedGeocoder;
pub use self::nominatim::NominatimGeocoder;

use std::fmt;
use thiserror::Error;

use crate::coordinate::Point;

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Coordinates { lat, lon }
    }

    /// The point in raster axis order (x = lon, y = lat)
    pub fn to_point(&self) -> Point {
        Point::from_lat_lon(self.lat, self.lon)
    }
}

impl From<(f64, f64)> for Coordinates {
    fn from((lat, lon): (f64, f64)) -> Self {
        Coordinates { lat, lon }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeocodeError {
    /// The service answered but matched nothing
    #[error("no location found for {0:?}")]
    NotFound(String),

    /// Transport, timeout or HTTP status failure
    #[error("request failed: {0}")]
    Request(String),

    /// The service answered with something unreadable
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Resolves addresses to coordinates
pub trait Geocoder: Send + Sync {
    fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

impl<G: Geocoder + ?Sized> Geocoder for Box<G> {
    fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        (**self).geocode(address)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
