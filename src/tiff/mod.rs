//! TIFF file format module
//!
//! Reading of TIFF and BigTIFF structure, GeoTIFF georeferencing and
//! construction of single-band GeoTIFF files.

pub mod errors;
pub mod ifd;
pub(crate) mod types;
pub mod reader;
#[cfg(test)]
mod tests;
pub mod geotags;
pub mod builder;
mod builders;
pub(crate) mod constants;
pub mod geo_key_parser;
pub(crate) mod validation;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use errors::{TiffError, TiffResult};
pub use ifd::{IFD, IFDEntry};
pub use reader::TiffReader;
pub use types::TIFF;
pub use geotags::{GeoKeyEntry, get_cs_description, get_key_name};
pub use geo_key_parser::{GeoInfo, GeoKeyParser};
pub use builder::{BlockShape, TiffBuilder};
