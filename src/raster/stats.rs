//! Streaming global statistics over unmasked pixels

use log::debug;

use crate::extractor::Region;
use crate::tiff::errors::TiffResult;
use crate::utils::progress::ProgressTracker;

use super::array::MaskedArray;
use super::handle::RasterHandle;
use super::nodata::NodataPolicy;

/// Minimum, mean and maximum of the valid pixels of band 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterStats {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    pub valid_count: u64,
}

impl RasterStats {
    /// Stats of a raster without a single valid pixel
    pub fn empty() -> Self {
        RasterStats { min: f64::NAN, mean: f64::NAN, max: f64::NAN, valid_count: 0 }
    }
}

/// Running accumulator for `RasterStats`
#[derive(Debug, Clone, Copy)]
struct Accumulator {
    min: f64,
    max: f64,
    sum: f64,
    count: u64,
}

impl Accumulator {
    fn new() -> Self {
        Accumulator { min: f64::INFINITY, max: f64::NEG_INFINITY, sum: 0.0, count: 0 }
    }

    fn push(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value;
        self.count += 1;
    }

    fn finish(self) -> RasterStats {
        if self.count == 0 {
            return RasterStats::empty();
        }
        RasterStats {
            min: self.min,
            mean: self.sum / self.count as f64,
            max: self.max,
            valid_count: self.count,
        }
    }
}

/// Compute statistics one block row at a time
///
/// Only one strip of `block_height` rows is held in memory; the progress
/// tracker, when given, advances by one per block row.
pub fn compute_stats(
    raster: &dyn RasterHandle,
    policy: &NodataPolicy,
    progress: Option<&ProgressTracker>,
) -> TiffResult<RasterStats> {
    compute_stats_with(raster, policy, progress, &mut |_, _| {})
}

/// `compute_stats`, also handing every chunk and its first row to `observer`
pub fn compute_stats_with(
    raster: &dyn RasterHandle,
    policy: &NodataPolicy,
    progress: Option<&ProgressTracker>,
    observer: &mut dyn FnMut(u32, &MaskedArray),
) -> TiffResult<RasterStats> {
    let meta = raster.metadata();
    let step = meta.block_height.max(1);
    let mut acc = Accumulator::new();

    let mut y = 0;
    while y < meta.height {
        let rows = step.min(meta.height - y);
        let masked = raster.read_masked(&Region::new(0, y, meta.width, rows), policy)?;
        for value in masked.compressed() {
            acc.push(value);
        }
        observer(y, &masked);
        if let Some(progress) = progress {
            progress.increment(1);
        }
        y += rows;
    }

    debug!("{} valid pixels in {}", acc.count, raster.describe());
    Ok(acc.finish())
}

/// Number of reads `compute_stats` performs on a raster
pub fn block_rows(raster: &dyn RasterHandle) -> u64 {
    let meta = raster.metadata();
    let step = meta.block_height.max(1) as u64;
    (meta.height as u64).div_ceil(step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::GeoTransform;
    use crate::raster::test_support::MemoryRaster;
    use ndarray::{array, Array2};

    #[test]
    fn test_stats_skip_nodata_and_nan() {
        let data = array![[1.0, -9999.0, 3.0], [f64::NAN, 8.0, -4.0]];
        let raster = MemoryRaster::new(data, GeoTransform::from_origin(0.0, 2.0, 1.0, 1.0), Some(4326), Some(-9999.0))
            .with_block_height(1);

        let stats = compute_stats(&raster, &NodataPolicy::default(), None).unwrap();
        assert_eq!(stats.min, -4.0);
        assert_eq!(stats.max, 8.0);
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.valid_count, 4);
        assert_eq!(block_rows(&raster), 2);
    }

    #[test]
    fn test_observer_sees_every_chunk() {
        let data = Array2::from_shape_fn((5, 2), |(r, _)| r as f64);
        let raster = MemoryRaster::new(data, GeoTransform::from_origin(0.0, 5.0, 1.0, 1.0), None, None)
            .with_block_height(2);

        let mut seen = Vec::new();
        let stats = compute_stats_with(&raster, &NodataPolicy::default(), None, &mut |row, chunk| {
            seen.push((row, chunk.dim().0));
        }).unwrap();

        assert_eq!(seen, vec![(0, 2), (2, 2), (4, 1)]);
        assert_eq!(stats.mean, 2.0);
    }

    #[test]
    fn test_stats_all_masked_is_nan() {
        let data = array![[-9999.0, -9999.0]];
        let raster = MemoryRaster::new(data, GeoTransform::from_origin(0.0, 1.0, 1.0, 1.0), None, Some(-9999.0));

        let stats = compute_stats(&raster, &NodataPolicy::default(), None).unwrap();
        assert!(stats.min.is_nan() && stats.mean.is_nan() && stats.max.is_nan());
        assert_eq!(stats.valid_count, 0);
    }
}
