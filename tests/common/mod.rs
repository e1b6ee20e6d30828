//! Fixtures shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use ndarray::Array2;
use soiltemp::coordinate::GeoTransform;
use soiltemp::extractor::SampleType;
use soiltemp::geocode::{Coordinates, GeocodeError, Geocoder};
use soiltemp::tiff::TiffBuilder;

pub const NODATA: f64 = -9999.0;

/// 10x10 one-degree grid over 0..10 E, 0..10 N; 15.5 at row 4, col 5, 10.0 elsewhere
pub fn ten_degree_grid() -> Array2<f64> {
    let mut data = Array2::from_elem((10, 10), 10.0);
    data[[4, 5]] = 15.5;
    data
}

pub fn ten_degree_transform() -> GeoTransform {
    GeoTransform::from_origin(0.0, 10.0, 1.0, 1.0)
}

/// Write the ten degree grid as an EPSG:4326 Float32 GeoTIFF
pub fn write_ten_degree_tif(dir: &Path, name: &str, data: &Array2<f64>) -> PathBuf {
    let path = dir.join(name);
    TiffBuilder::new(SampleType::F32)
        .transform(ten_degree_transform())
        .epsg(4326)
        .nodata(NODATA)
        .write(data, &path)
        .unwrap();
    path
}

/// A 20x20 km UTM 33N raster of constant 7.0 near 52.25 N, 15.1 E
pub fn write_utm_tif(dir: &Path) -> PathBuf {
    let path = dir.join("utm.tif");
    let data = Array2::from_elem((20, 20), 7.0);
    TiffBuilder::new(SampleType::F32)
        .transform(GeoTransform::from_origin(500_000.0, 5_800_000.0, 1000.0, 1000.0))
        .epsg(32633)
        .nodata(NODATA)
        .write(&data, &path)
        .unwrap();
    path
}

/// A georeferenced raster without any CRS key
pub fn write_no_crs_tif(dir: &Path) -> PathBuf {
    let path = dir.join("no_crs.tif");
    TiffBuilder::new(SampleType::F32)
        .transform(ten_degree_transform())
        .write(&ten_degree_grid(), &path)
        .unwrap();
    path
}

/// Geocoder answering from a fixed table
pub struct FakeGeocoder {
    places: HashMap<String, Coordinates>,
    pub calls: AtomicUsize,
}

impl FakeGeocoder {
    pub fn new(places: &[(&str, f64, f64)]) -> Self {
        FakeGeocoder {
            places: places.iter().map(|&(name, lat, lon)| (name.to_string(), Coordinates::new(lat, lon))).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Geocoder for FakeGeocoder {
    fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.places.get(address).copied().ok_or_else(|| GeocodeError::NotFound(address.to_string()))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
