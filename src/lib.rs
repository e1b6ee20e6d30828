//! Soil temperature lookup from GeoTIFF rasters
//!
//! `SoilTemp` answers point and bounding-box queries against a raster,
//! resolving addresses through an optional geocoder and reprojecting
//! non-geographic rasters to EPSG:4326 on the fly.

pub mod io;
pub mod tiff;
pub mod utils;
pub mod compression;
pub mod extractor;
pub mod coordinate;
pub mod raster;
pub mod cache;
pub mod geocode;
pub mod config;
pub mod errors;
pub mod commands;
pub mod api;

pub use crate::api::{Location, RegionValues, SoilTemp};
pub use crate::cache::DatasetCache;
pub use crate::errors::{LookupError, LookupResult};
pub use crate::geocode::{Coordinates, Geocoder};

pub use tiff::TiffReader;
pub use extractor::Region;
pub use raster::{MaskedArray, RasterHandle};
pub use coordinate::{BoundingBox, Point, CoordinateTransformer, CoordinateSystem};
