//! On-the-fly warping of a raster into geographic coordinates
//!
//! The output grid follows GDAL's suggested warp output: the source pixel
//! edges are densified and projected to get the extent, and pixels are kept
//! square with a size that preserves the source pixel diagonal count.
//! Destination pixels are resampled by nearest neighbour.

use log::{debug, info};
use ndarray::Array2;

use crate::coordinate::{
    BoundingBox, CoordinateSystem, CoordinateSystemFactory, CoordinateTransformer, CrsError,
    GeoTransform, Point,
};
use crate::extractor::Region;
use crate::tiff::errors::{TiffError, TiffResult};

use super::handle::RasterHandle;
use super::metadata::RasterMetadata;

/// Points sampled along each source edge when computing the warped extent
const EDGE_SAMPLES: usize = 21;

/// A raster presented in EPSG:4326 over a source in another CRS
pub struct ReprojectedRaster {
    source: Box<dyn RasterHandle>,
    /// lon/lat to source CRS
    to_source: CoordinateTransformer,
    metadata: RasterMetadata,
}

impl ReprojectedRaster {
    /// Wrap a raster, computing the warped grid up front
    ///
    /// Fails when the source has no CRS, when its CRS is unknown to the
    /// projection database, or when none of its edges project to lon/lat.
    pub fn new(source: Box<dyn RasterHandle>) -> Result<Self, CrsError> {
        let src_meta = source.metadata();
        let epsg = src_meta.crs.ok_or_else(|| CrsError {
            epsg: 0,
            reason: "raster has no CRS".to_string(),
        })?;

        let to_geographic = CoordinateTransformer::new(
            CoordinateSystemFactory::from_epsg(epsg),
            CoordinateSystem::WGS84,
        )?;

        let extent = Self::geographic_extent(src_meta, &to_geographic)?;
        let (transform, width, height) = Self::warped_grid(&extent, src_meta.width, src_meta.height);

        info!("Warping {} from EPSG:{} to EPSG:4326 as {}x{} pixels of {:.6} degrees",
              source.describe(), epsg, width, height, transform.a);

        let metadata = RasterMetadata {
            driver: "VRT",
            crs: Some(4326),
            transform,
            width,
            height,
            block_width: width,
            block_height: src_meta.block_height.min(height),
            tiled: false,
            ..src_meta.clone()
        };

        Ok(ReprojectedRaster {
            to_source: to_geographic.inverse(),
            source,
            metadata,
        })
    }

    /// Lon/lat extent of the source pixel edges
    fn geographic_extent(meta: &RasterMetadata, to_geographic: &CoordinateTransformer) -> Result<BoundingBox, CrsError> {
        let (w, h) = (meta.width as f64, meta.height as f64);
        let mut edge_points = Vec::with_capacity(4 * EDGE_SAMPLES);
        for i in 0..EDGE_SAMPLES {
            let t = i as f64 / (EDGE_SAMPLES - 1) as f64;
            edge_points.push(meta.transform.forward(t * w, 0.0));
            edge_points.push(meta.transform.forward(t * w, h));
            edge_points.push(meta.transform.forward(0.0, t * h));
            edge_points.push(meta.transform.forward(w, t * h));
        }

        let projected = to_geographic.transform_points(&edge_points)?;
        BoundingBox::from_points(projected.into_iter().flatten()).ok_or_else(|| CrsError {
            epsg: to_geographic.source().epsg_code(),
            reason: "no part of the raster maps to EPSG:4326".to_string(),
        })
    }

    /// Square-pixel grid covering `extent`
    fn warped_grid(extent: &BoundingBox, src_width: u32, src_height: u32) -> (GeoTransform, u32, u32) {
        let geo_diagonal = extent.width().hypot(extent.height());
        let pixel_diagonal = (src_width as f64).hypot(src_height as f64);
        let res = geo_diagonal / pixel_diagonal;

        let width = ((extent.width() / res).ceil() as u32).max(1);
        let height = ((extent.height() / res).ceil() as u32).max(1);

        (GeoTransform::from_origin(extent.min_x, extent.max_y, res, res), width, height)
    }

    /// The wrapped raster
    pub fn source(&self) -> &dyn RasterHandle {
        self.source.as_ref()
    }

    fn sample_source(&self, lon_lat: &[Point]) -> TiffResult<Vec<f64>> {
        let fill = self.metadata.fill_value();
        self.to_source.transform_points(lon_lat)?
            .into_iter()
            .map(|p| match p {
                Some(p) => self.source.sample(p.x, p.y),
                None => Ok(fill),
            })
            .collect()
    }
}

impl RasterHandle for ReprojectedRaster {
    fn metadata(&self) -> &RasterMetadata {
        &self.metadata
    }

    fn sample(&self, x: f64, y: f64) -> TiffResult<f64> {
        let meta = &self.metadata;
        match meta.transform.index(x, y) {
            Some((row, col)) if row >= 0 && col >= 0 && row < meta.height as i64 && col < meta.width as i64 => {
                let center = meta.transform.pixel_center(row as usize, col as usize);
                Ok(self.sample_source(&[center])?[0])
            }
            _ => Ok(meta.fill_value()),
        }
    }

    fn read_window(&self, region: &Region) -> TiffResult<Array2<f64>> {
        if !region.fits_within(self.metadata.width, self.metadata.height) {
            return Err(TiffError::GenericError(format!(
                "Region {:?} exceeds the {}x{} warped grid", region, self.metadata.width, self.metadata.height
            )));
        }
        debug!("Warping window {:?} of {}", region, self.source.describe());

        let centers: Vec<Point> = (region.y..region.end_y())
            .flat_map(|row| (region.x..region.end_x()).map(move |col| (row, col)))
            .map(|(row, col)| self.metadata.transform.pixel_center(row as usize, col as usize))
            .collect();
        let values = self.sample_source(&centers)?;

        Array2::from_shape_vec((region.height as usize, region.width as usize), values)
            .map_err(|e| TiffError::GenericError(e.to_string()))
    }

    fn describe(&self) -> String {
        format!("{} warped to EPSG:4326", self.source.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::test_support::MemoryRaster;

    fn mercator_raster() -> MemoryRaster {
        // 10x10 pixels of 100 km starting at the equator and the meridian
        let data = Array2::from_shape_fn((10, 10), |(r, c)| (r * 10 + c) as f64);
        MemoryRaster::new(data, GeoTransform::from_origin(0.0, 1_000_000.0, 100_000.0, 100_000.0), Some(3857), Some(-9999.0))
    }

    #[test]
    fn test_warped_grid_is_geographic() {
        let warped = ReprojectedRaster::new(Box::new(mercator_raster())).unwrap();
        let meta = warped.metadata();

        assert_eq!(meta.crs, Some(4326));
        assert_eq!(meta.driver, "VRT");
        assert_eq!(meta.nodata, Some(-9999.0));
        assert!(!meta.tiled);

        let bounds = warped.bounds();
        assert!(bounds.min_x.abs() < 1e-6);
        assert!((bounds.max_x - 8.983).abs() < 0.01, "max_x = {}", bounds.max_x);
        assert!((bounds.max_y - 8.946).abs() < 0.01, "max_y = {}", bounds.max_y);
        assert_eq!(meta.transform.a, -meta.transform.e);
        assert!(meta.width >= 10 && meta.width <= 11);
    }

    #[test]
    fn test_sample_maps_back_to_source() {
        let warped = ReprojectedRaster::new(Box::new(mercator_raster())).unwrap();

        // Roughly the center of source pixel (row 4, col 5)
        let value = warped.sample(4.94, 4.93).unwrap();
        assert!((value - 45.0).abs() <= 11.0, "value = {}", value);

        assert_eq!(warped.sample(20.0, 20.0).unwrap(), -9999.0);
        assert_eq!(warped.sample(-1.0, 4.0).unwrap(), -9999.0);
    }

    #[test]
    fn test_read_window_matches_sample() {
        let warped = ReprojectedRaster::new(Box::new(mercator_raster())).unwrap();
        let meta = warped.metadata().clone();

        let window = warped.read_window(&Region::full(meta.width, meta.height)).unwrap();
        assert_eq!(window.dim(), (meta.height as usize, meta.width as usize));

        let center = meta.transform.pixel_center(3, 2);
        assert_eq!(window[[3, 2]], warped.sample(center.x, center.y).unwrap());

        let oversized = Region::new(0, 0, meta.width + 1, 1);
        assert!(warped.read_window(&oversized).is_err());
    }

    #[test]
    fn test_missing_crs_is_rejected() {
        let data = Array2::zeros((2, 2));
        let raster = MemoryRaster::new(data, GeoTransform::from_origin(0.0, 2.0, 1.0, 1.0), None, None);
        assert!(ReprojectedRaster::new(Box::new(raster)).is_err());
    }
}
