//! Lookup engine: soil temperature at a place or over a bounding box

use log::{debug, info};
use ndarray::Array2;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::DatasetCache;
use crate::config::{Settings, DEFAULT_RASTER};
use crate::coordinate::{BoundingBox, Window};
use crate::errors::{LookupError, LookupResult};
use crate::extractor::Region;
use crate::geocode::{Coordinates, Geocoder, MemoizedGeocoder, NominatimGeocoder};
use crate::raster::{MaskedArray, NodataPolicy, RasterHandle};

/// Where to look up a temperature
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    /// Free-form address, resolved by the geocoder
    Address(String),
    Coordinates(Coordinates),
}

impl From<&str> for Location {
    fn from(address: &str) -> Self {
        Location::Address(address.to_string())
    }
}

impl From<String> for Location {
    fn from(address: String) -> Self {
        Location::Address(address)
    }
}

impl From<Coordinates> for Location {
    fn from(coords: Coordinates) -> Self {
        Location::Coordinates(coords)
    }
}

/// (lat, lon) in degrees
impl From<(f64, f64)> for Location {
    fn from(lat_lon: (f64, f64)) -> Self {
        Location::Coordinates(lat_lon.into())
    }
}

/// Values of a bounding-box lookup, rows x cols, north up
#[derive(Debug, Clone, PartialEq)]
pub enum RegionValues {
    /// Nodata and NaN pixels under the mask
    Masked(MaskedArray),
    /// Nodata pixels replaced by NaN
    Filled(Array2<f64>),
}

impl RegionValues {
    pub fn dim(&self) -> (usize, usize) {
        match self {
            RegionValues::Masked(masked) => masked.dim(),
            RegionValues::Filled(filled) => filled.dim(),
        }
    }

    /// Plain values with masked pixels as NaN
    pub fn to_filled(&self) -> Array2<f64> {
        match self {
            RegionValues::Masked(masked) => masked.filled(f64::NAN),
            RegionValues::Filled(filled) => filled.clone(),
        }
    }
}

/// Soil temperature lookups against GeoTIFF rasters
///
/// Rasters are opened once per path through the dataset cache. The
/// geocoder is optional; without it only coordinate lookups work.
pub struct SoilTemp {
    cache: Arc<DatasetCache>,
    geocoder: Option<Box<dyn Geocoder>>,
    policy: NodataPolicy,
    default_path: PathBuf,
}

impl Default for SoilTemp {
    fn default() -> Self {
        SoilTemp::new()
    }
}

impl SoilTemp {
    /// Engine with no geocoder and the default raster path
    pub fn new() -> Self {
        SoilTemp {
            cache: Arc::new(DatasetCache::new()),
            geocoder: None,
            policy: NodataPolicy::default(),
            default_path: PathBuf::from(DEFAULT_RASTER),
        }
    }

    /// Engine configured from settings, with a memoized Nominatim geocoder when enabled
    pub fn from_settings(settings: &Settings) -> Self {
        let engine = SoilTemp::new()
            .with_default_path(&settings.raster.default_path)
            .with_policy(NodataPolicy::new(settings.lookup.nodata_rtol, settings.lookup.nodata_atol));

        if settings.geocoder.enabled {
            let nominatim = NominatimGeocoder::from_settings(&settings.geocoder);
            engine.with_geocoder(Box::new(MemoizedGeocoder::new(nominatim, settings.geocoder.cache_capacity)))
        } else {
            engine
        }
    }

    pub fn with_geocoder(mut self, geocoder: Box<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn with_policy(mut self, policy: NodataPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_default_path(mut self, path: &Path) -> Self {
        self.default_path = path.to_path_buf();
        self
    }

    /// Share a dataset cache between engines
    pub fn with_cache(mut self, cache: Arc<DatasetCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    pub fn default_path(&self) -> &Path {
        &self.default_path
    }

    pub fn policy(&self) -> &NodataPolicy {
        &self.policy
    }

    /// Coordinates of a location, geocoding addresses
    pub fn resolve(&self, location: &Location) -> LookupResult<Coordinates> {
        match location {
            Location::Coordinates(coords) => Ok(*coords),
            Location::Address(address) => {
                let geocoder = self.geocoder.as_ref().ok_or(LookupError::GeocoderUnavailable)?;
                let coords = geocoder.geocode(address)?;
                debug!("{:?} resolved to {} by {}", address, coords, geocoder.name());
                Ok(coords)
            }
        }
    }

    /// The cached EPSG:4326 handle for a raster, or the default raster
    pub fn dataset(&self, path: Option<&Path>) -> LookupResult<Arc<dyn RasterHandle>> {
        self.cache.acquire(path.unwrap_or(self.default_path.as_path()))
    }

    /// Soil temperature at one place
    ///
    /// Returns None when the place is outside the raster or the pixel is
    /// nodata or NaN.
    pub fn lookup(&self, location: impl Into<Location>, path: Option<&Path>) -> LookupResult<Option<f64>> {
        let coords = self.resolve(&location.into())?;
        let dataset = self.dataset(path)?;

        let point = coords.to_point();
        let value = dataset.sample(point.x, point.y)?;
        let nodata = dataset.metadata().nodata;
        if self.policy.is_masked(value, nodata) {
            debug!("No data at {} in {}", coords, dataset.describe());
            return Ok(None);
        }

        info!("Soil temperature at {}: {}", coords, value);
        Ok(Some(value))
    }

    /// Soil temperatures over a (south, west, north, east) box
    ///
    /// Returns None when the box misses the raster or every pixel in it is
    /// nodata.
    pub fn lookup_region(&self, bbox: &BoundingBox, path: Option<&Path>, masked: bool) -> LookupResult<Option<RegionValues>> {
        let dataset = self.dataset(path)?;
        self.region_values(dataset.as_ref(), bbox, masked)
    }

    /// Region lookup against an already acquired raster
    fn region_values(&self, dataset: &dyn RasterHandle, bbox: &BoundingBox, masked: bool) -> LookupResult<Option<RegionValues>> {
        let Some(region) = pixel_window(dataset, bbox) else {
            debug!("Box {:?} does not overlap {}", bbox.to_swne(), dataset.describe());
            return Ok(None);
        };

        let values = dataset.read_masked(&region, &self.policy)?;
        if values.all_masked() {
            debug!("Every pixel of {:?} is nodata", region);
            return Ok(None);
        }

        info!("Read {}x{} pixels at ({}, {})", region.width, region.height, region.x, region.y);
        Ok(Some(if masked {
            RegionValues::Masked(values)
        } else {
            RegionValues::Filled(values.filled(f64::NAN))
        }))
    }
}

/// Pixel region of a raster covered by a lon/lat box
///
/// None when the box lies outside the raster bounds or the window clipped to
/// the raster has no pixels.
pub fn pixel_window(dataset: &dyn RasterHandle, bbox: &BoundingBox) -> Option<Region> {
    let bounds = dataset.bounds();
    let [south, west, north, east] = bbox.to_swne();

    if east < bounds.min_x || west > bounds.max_x || north < bounds.min_y || south > bounds.max_y {
        return None;
    }

    let meta = dataset.metadata();
    let window = Window::from_bounds(west, south, east, north, &meta.transform)?
        .round_offsets()
        .round_lengths();
    let clipped = window.intersection(&Window::full(meta.width as usize, meta.height as usize));

    clipped.to_region()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::GeoTransform;
    use crate::raster::test_support::MemoryRaster;

    fn ten_degree_raster() -> MemoryRaster {
        let data = Array2::from_elem((10, 10), 1.0);
        MemoryRaster::new(data, GeoTransform::from_origin(0.0, 10.0, 1.0, 1.0), Some(4326), Some(-9999.0))
    }

    #[test]
    fn test_window_inside() {
        let raster = ten_degree_raster();
        let region = pixel_window(&raster, &BoundingBox::from_swne(2.0, 3.0, 5.0, 7.0)).unwrap();
        assert_eq!(region, Region::new(3, 5, 4, 3));
    }

    #[test]
    fn test_window_clipped_to_raster() {
        let raster = ten_degree_raster();
        let region = pixel_window(&raster, &BoundingBox::from_swne(5.0, 5.0, 15.0, 15.0)).unwrap();
        assert_eq!(region, Region::new(5, 0, 5, 5));

        let region = pixel_window(&raster, &BoundingBox::from_swne(-5.0, -5.0, 2.0, 3.0)).unwrap();
        assert_eq!(region, Region::new(0, 8, 3, 2));
    }

    #[test]
    fn test_window_outside() {
        let raster = ten_degree_raster();
        assert!(pixel_window(&raster, &BoundingBox::from_swne(20.0, 20.0, 30.0, 30.0)).is_none());
        assert!(pixel_window(&raster, &BoundingBox::from_swne(0.0, -20.0, 10.0, -11.0)).is_none());
        // Touching the east edge only
        assert!(pixel_window(&raster, &BoundingBox::from_swne(0.0, 10.0, 10.0, 12.0)).is_none());
    }

    #[test]
    fn test_region_outside_skips_the_read() {
        let engine = SoilTemp::new();
        let raster = ten_degree_raster();

        let result = engine.region_values(&raster, &BoundingBox::from_swne(20.0, 20.0, 30.0, 30.0), false).unwrap();
        assert!(result.is_none());
        assert_eq!(raster.window_reads(), 0);

        let result = engine.region_values(&raster, &BoundingBox::from_swne(2.0, 3.0, 5.0, 7.0), true).unwrap();
        assert_eq!(result.map(|values| values.dim()), Some((3, 4)));
        assert_eq!(raster.window_reads(), 1);
    }

    #[test]
    fn test_address_without_geocoder() {
        let engine = SoilTemp::new();
        let err = engine.resolve(&Location::from("Berlin")).unwrap_err();
        assert!(matches!(err, LookupError::GeocoderUnavailable));

        let coords = engine.resolve(&Location::from((5.5, 5.5))).unwrap();
        assert_eq!(coords, Coordinates::new(5.5, 5.5));
    }

    #[test]
    fn test_missing_raster() {
        let engine = SoilTemp::new();
        let err = engine.lookup((1.0, 1.0), Some(Path::new("/no/such/raster.tif"))).unwrap_err();
        assert!(matches!(err, LookupError::ResourceNotFound(_)));
    }
}
