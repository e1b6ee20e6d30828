//! The raster access capability shared by native and warped rasters

use ndarray::Array2;

use crate::coordinate::BoundingBox;
use crate::extractor::Region;
use crate::tiff::errors::TiffResult;

use super::array::MaskedArray;
use super::metadata::RasterMetadata;
use super::nodata::NodataPolicy;

/// An open single-band raster
///
/// Implementations are shared between threads by the dataset cache, so all
/// reads take `&self`.
pub trait RasterHandle: Send + Sync {
    /// Profile of the raster as exposed to callers
    fn metadata(&self) -> &RasterMetadata;

    /// Value of band 1 at a world coordinate in the raster's CRS
    ///
    /// Points outside the raster read as the fill value (nodata, or NaN).
    fn sample(&self, x: f64, y: f64) -> TiffResult<f64>;

    /// Band 1 values of a pixel region inside the raster
    fn read_window(&self, region: &Region) -> TiffResult<Array2<f64>>;

    /// Short human-readable description for logs
    fn describe(&self) -> String;

    /// World extent (left, bottom, right, top)
    fn bounds(&self) -> BoundingBox {
        self.metadata().bounds()
    }

    /// Read a region with NaN and nodata pixels masked
    fn read_masked(&self, region: &Region, policy: &NodataPolicy) -> TiffResult<MaskedArray> {
        let data = self.read_window(region)?;
        Ok(MaskedArray::from_nodata(data, self.metadata().nodata, policy))
    }
}
