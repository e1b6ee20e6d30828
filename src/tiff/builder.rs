//! GeoTIFF construction
//!
//! `TiffBuilder` collects the description of a single-band image and writes
//! it with its pixel data. The tag groups are assembled by the strategies in
//! `builders`.

use log::info;
use ndarray::Array2;
use std::collections::BTreeMap;
use std::path::Path;

use crate::compression::{CompressionHandler, UncompressedHandler};
use crate::coordinate::GeoTransform;
use crate::extractor::SampleType;
use crate::tiff::constants::predictor;
use crate::tiff::errors::{TiffError, TiffResult};

use crate::tiff::builders::basic_tags::BasicTagsBuilder;
use crate::tiff::builders::geo_tags::GeoTagsBuilder;
use crate::tiff::builders::metadata_tags::MetadataBuilder;
use crate::tiff::builders::writer::{TagValue, WriterBuilder};

pub use crate::tiff::builders::basic_tags::BlockShape;

/// Builder for single-band GeoTIFF files
pub struct TiffBuilder {
    is_big_tiff: bool,
    sample_type: SampleType,
    compression: Box<dyn CompressionHandler>,
    predictor: u16,
    shape: BlockShape,
    transform: Option<GeoTransform>,
    epsg: Option<u16>,
    pixel_is_point: bool,
    nodata: Option<f64>,
    software: Option<String>,
}

impl TiffBuilder {
    /// Create a builder for uncompressed single-strip images of the given type
    pub fn new(sample_type: SampleType) -> Self {
        TiffBuilder {
            is_big_tiff: false,
            sample_type,
            compression: Box::new(UncompressedHandler),
            predictor: predictor::NONE,
            shape: BlockShape::Strips { rows_per_strip: u32::MAX },
            transform: None,
            epsg: None,
            pixel_is_point: false,
            nodata: None,
            software: None,
        }
    }

    /// Write BigTIFF instead of classic TIFF
    pub fn big_tiff(mut self, is_big_tiff: bool) -> Self {
        self.is_big_tiff = is_big_tiff;
        self
    }

    pub fn compression(mut self, handler: Box<dyn CompressionHandler>) -> Self {
        self.compression = handler;
        self
    }

    /// Predictor applied before compression (2 for integers, 3 for floats)
    pub fn predictor(mut self, predictor_code: u16) -> Self {
        self.predictor = predictor_code;
        self
    }

    pub fn strips(mut self, rows_per_strip: u32) -> Self {
        self.shape = BlockShape::Strips { rows_per_strip };
        self
    }

    pub fn tiles(mut self, width: u32, height: u32) -> Self {
        self.shape = BlockShape::Tiles { width, height };
        self
    }

    /// Place the image with an affine transform of its pixel corners
    pub fn transform(mut self, transform: GeoTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Name the CRS in a GeoKey directory
    pub fn epsg(mut self, code: u16) -> Self {
        self.epsg = Some(code);
        self
    }

    /// Record the raster as PixelIsPoint
    pub fn pixel_is_point(mut self, pixel_is_point: bool) -> Self {
        self.pixel_is_point = pixel_is_point;
        self
    }

    pub fn nodata(mut self, nodata: f64) -> Self {
        self.nodata = Some(nodata);
        self
    }

    pub fn software(mut self, software: &str) -> Self {
        self.software = Some(software.to_string());
        self
    }

    /// Assemble all tags for an image of the given size
    fn build_tags(&self, width: u32, height: u32) -> BTreeMap<u16, TagValue> {
        let mut tag_map = BTreeMap::new();
        BasicTagsBuilder::add_image_structure(&mut tag_map, width, height, self.sample_type,
                                              self.compression.code(), self.predictor, self.shape);
        if let Some(transform) = &self.transform {
            GeoTagsBuilder::add_transform(&mut tag_map, transform, self.pixel_is_point);
        }
        if let Some(code) = self.epsg {
            GeoTagsBuilder::add_geo_keys(&mut tag_map, code, self.pixel_is_point);
        }
        if let Some(nodata) = self.nodata {
            MetadataBuilder::add_nodata_tag(&mut tag_map, nodata);
        }
        if let Some(software) = &self.software {
            MetadataBuilder::add_software_tag(&mut tag_map, software);
        }
        tag_map
    }

    fn validate(&self, data: &Array2<f64>) -> TiffResult<()> {
        if data.is_empty() {
            return Err(TiffError::MissingDimensions);
        }
        if let BlockShape::Tiles { width, height } = self.shape {
            if width == 0 || height == 0 || width % 16 != 0 || height % 16 != 0 {
                return Err(TiffError::GenericError(format!(
                    "Tile size {}x{} must be a positive multiple of 16", width, height
                )));
            }
        }
        Ok(())
    }

    /// Encode the image into an in-memory TIFF
    pub fn to_bytes(&self, data: &Array2<f64>) -> TiffResult<Vec<u8>> {
        self.validate(data)?;
        let (height, width) = (data.nrows() as u32, data.ncols() as u32);
        let blocks = BasicTagsBuilder::encode_blocks(data, self.sample_type, self.shape, self.predictor,
                                                     self.compression.as_ref(), self.nodata.unwrap_or(0.0))?;
        let (offsets_tag, counts_tag) = self.shape.offset_tags();

        let mut out = Vec::new();
        WriterBuilder::write_to(&mut out, self.is_big_tiff, &self.build_tags(width, height),
                                offsets_tag, counts_tag, &blocks)?;
        Ok(out)
    }

    /// Write the image to a file
    pub fn write(&self, data: &Array2<f64>, output_path: &Path) -> TiffResult<()> {
        self.validate(data)?;
        info!("Writing {}x{} {} GeoTIFF ({}) to {}", data.ncols(), data.nrows(), self.sample_type.name(),
              self.compression.name(), output_path.display());

        let (height, width) = (data.nrows() as u32, data.ncols() as u32);
        let blocks = BasicTagsBuilder::encode_blocks(data, self.sample_type, self.shape, self.predictor,
                                                     self.compression.as_ref(), self.nodata.unwrap_or(0.0))?;
        let (offsets_tag, counts_tag) = self.shape.offset_tags();

        WriterBuilder::write(output_path, self.is_big_tiff, &self.build_tags(width, height),
                             offsets_tag, counts_tag, &blocks)
    }
}
