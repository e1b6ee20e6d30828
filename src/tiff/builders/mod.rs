//! TIFF builder strategy modules
//!
//! Tag groups and the file writer used by `TiffBuilder`.

pub mod basic_tags;
pub mod geo_tags;
pub mod metadata_tags;
pub mod writer;
