//! Rasters backed directly by a GeoTIFF file

use log::{debug, info, warn};
use ndarray::Array2;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::compression::CompressionFactory;
use crate::coordinate::GeoTransform;
use crate::extractor::{BlockReader, Region};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{compression, planar_config, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::geo_key_parser::{GeoInfo, GeoKeyParser};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;

use super::handle::RasterHandle;
use super::metadata::RasterMetadata;

/// A GeoTIFF opened for reading
pub struct GeoTiffRaster {
    path: PathBuf,
    metadata: RasterMetadata,
    geo_info: GeoInfo,
    is_big_tiff: bool,
    blocks: BlockReader,
}

impl GeoTiffRaster {
    /// Open a GeoTIFF and prepare band 1 for reading
    ///
    /// A file without georeferencing opens with an identity transform and no
    /// CRS.
    pub fn open(path: &Path) -> TiffResult<Self> {
        let mut reader = TiffReader::new();
        let tiff = reader.load(path)?;
        let ifd = tiff.main_ifd().ok_or(TiffError::InvalidHeader)?;
        let overviews = tiff.overviews().len();
        if overviews > 0 {
            debug!("Ignoring {} overview level(s) of {}", overviews, path.display());
        }

        let file = File::open(path)?;
        let mut source: Box<dyn SeekableReader> = Box::new(BufReader::with_capacity(64 * 1024, file));

        let geo_info = GeoKeyParser::extract_geo_info(&reader, source.as_mut(), ifd)?;
        if !geo_info.is_georeferenced() {
            warn!("{} carries no georeferencing tags", path.display());
        }
        let nodata = Self::read_nodata(&reader, source.as_mut(), ifd);
        let transform = geo_info.geo_transform().unwrap_or_else(|| {
            warn!("{} has no geotransform, using pixel coordinates", path.display());
            GeoTransform::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0)
        });

        // Sparse blocks read as nodata, or 0 without one
        let blocks = BlockReader::open(&reader, source, ifd, nodata.unwrap_or(0.0))?;
        let metadata = Self::build_metadata(ifd, &blocks, &geo_info, transform, nodata);

        info!("Opened {} ({}x{} {}, crs {:?}, nodata {:?})", path.display(),
              metadata.width, metadata.height, metadata.dtype.name(), metadata.crs, metadata.nodata);

        Ok(GeoTiffRaster {
            path: path.to_path_buf(),
            metadata,
            geo_info,
            is_big_tiff: tiff.is_big_tiff,
            blocks,
        })
    }

    /// Parse GDAL_NODATA, ignoring values that are not numbers
    fn read_nodata(reader: &TiffReader, source: &mut dyn SeekableReader, ifd: &IFD) -> Option<f64> {
        if !ifd.has_tag(tags::GDAL_NODATA) {
            return None;
        }

        match reader.read_tag_ascii(source, ifd, tags::GDAL_NODATA) {
            Ok(text) => match text.trim().parse::<f64>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring unparseable GDAL_NODATA value {:?}", text);
                    None
                }
            },
            Err(e) => {
                warn!("Could not read GDAL_NODATA: {}", e);
                None
            }
        }
    }

    fn build_metadata(
        ifd: &IFD,
        blocks: &BlockReader,
        geo_info: &GeoInfo,
        transform: GeoTransform,
        nodata: Option<f64>,
    ) -> RasterMetadata {
        let (block_width, block_height) = blocks.layout().block_size();
        let code = ifd.get_compression();
        let compress = if code == compression::NONE as u64 {
            None
        } else {
            Some(CompressionFactory::create_handler(code)
                .map(|h| h.name().to_string())
                .unwrap_or_else(|_| format!("unknown ({})", code)))
        };
        let count = ifd.get_samples_per_pixel() as u32;
        let interleave = if count > 1 && ifd.get_planar_configuration() == planar_config::CHUNKY {
            "pixel"
        } else {
            "band"
        };

        RasterMetadata {
            driver: "GTiff",
            dtype: blocks.sample_type(),
            nodata,
            width: blocks.width(),
            height: blocks.height(),
            count,
            crs: geo_info.epsg_code(),
            transform,
            block_width,
            block_height: block_height.min(blocks.height()),
            tiled: blocks.layout().is_tiled(),
            compress,
            interleave,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Georeferencing tags as parsed from the file
    pub fn geo_info(&self) -> &GeoInfo {
        &self.geo_info
    }

    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }
}

impl RasterHandle for GeoTiffRaster {
    fn metadata(&self) -> &RasterMetadata {
        &self.metadata
    }

    fn sample(&self, x: f64, y: f64) -> TiffResult<f64> {
        let Some((row, col)) = self.metadata.transform.index(x, y) else {
            return Ok(self.metadata.fill_value());
        };
        if row < 0 || col < 0 || row >= self.metadata.height as i64 || col >= self.metadata.width as i64 {
            debug!("Point ({}, {}) is outside {}", x, y, self.path.display());
            return Ok(self.metadata.fill_value());
        }

        self.blocks.pixel(row as u32, col as u32)
    }

    fn read_window(&self, region: &Region) -> TiffResult<Array2<f64>> {
        self.blocks.read_region(region)
    }

    fn describe(&self) -> String {
        format!("GeoTIFF {}", self.path.display())
    }
}
