//! Raster access
//!
//! `RasterHandle` is the capability every lookup runs against. It is
//! implemented by `GeoTiffRaster` for files read directly and by
//! `ReprojectedRaster` for rasters warped to EPSG:4326 on the fly.

mod array;
mod geotiff;
mod handle;
mod metadata;
mod nodata;
mod reprojected;
mod stats;

pub use self::array::MaskedArray;
pub use self::geotiff::GeoTiffRaster;
pub use self::handle::RasterHandle;
pub use self::metadata::{format_float, RasterMetadata};
pub use self::nodata::NodataPolicy;
pub use self::reprojected::ReprojectedRaster;
pub use self::stats::{block_rows, compute_stats, compute_stats_with, RasterStats};
