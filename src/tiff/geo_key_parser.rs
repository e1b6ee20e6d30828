//! GeoTIFF georeferencing and GeoKey parsing
//!
//! Reads the GeoKey directory and the model tags of an IFD and turns them into
//! an EPSG code and an affine geotransform.

use log::{debug, warn};

use crate::coordinate::GeoTransform;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{epsg, geo_keys, model_type, raster_type, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::geotags::{get_code_name, get_cs_description, get_key_name, GeoKeyEntry};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;

/// Parser for GeoTIFF geographic metadata
pub struct GeoKeyParser;

impl GeoKeyParser {
    /// Parse the GeoKey directory of an IFD
    ///
    /// The directory is an array of SHORTs: a 4 value header (version,
    /// revision, minor revision, key count) followed by 4 values per key.
    ///
    /// # Arguments
    /// * `tiff_reader` - Reader that parsed the file
    /// * `reader` - The open file
    /// * `ifd` - The IFD containing the GeoKey directory
    ///
    /// # Returns
    /// The key entries, empty when the IFD has no GeoKey directory
    pub fn parse_geo_key_directory(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
    ) -> TiffResult<Vec<GeoKeyEntry>> {
        if !ifd.has_tag(tags::GEO_KEY_DIRECTORY_TAG) {
            return Ok(Vec::new());
        }

        let values = tiff_reader.read_tag_values(reader, ifd, tags::GEO_KEY_DIRECTORY_TAG)?;
        if values.len() < 4 {
            return Err(TiffError::GenericError("Invalid GeoKey directory header".to_string()));
        }

        let num_keys = values[3] as usize;
        debug!("GeoKey directory: version={}, revision={}.{}, keys={}",
               values[0], values[1], values[2], num_keys);

        let available = (values.len() - 4) / 4;
        if available < num_keys {
            warn!("GeoKey directory declares {} keys but holds {}", num_keys, available);
        }

        let geo_keys = values[4..]
            .chunks_exact(4)
            .take(num_keys)
            .map(|k| {
                let entry = GeoKeyEntry::new(k[0] as u16, k[1] as u16, k[2] as u16, k[3] as u16);
                debug!("GeoKey: id={} ({}), location={}, count={}, offset={}",
                       entry.key_id, entry.get_name(), entry.tiff_tag_location, entry.count, entry.value_offset);
                entry
            })
            .collect();

        Ok(geo_keys)
    }

    /// Read the string value of a GeoKey stored in GeoAsciiParamsTag
    fn read_ascii_key(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
        key: &GeoKeyEntry,
    ) -> TiffResult<String> {
        let params = tiff_reader.read_tag_ascii(reader, ifd, tags::GEO_ASCII_PARAMS_TAG)?;
        let start = key.value_offset as usize;
        let end = (start + key.count as usize).min(params.len());
        let value = params.get(start..end).unwrap_or_default();
        Ok(value.trim_end_matches(['|', '\0']).to_string())
    }

    /// Extract geospatial information from an IFD
    ///
    /// Missing model tags are not an error: the returned `GeoInfo` then has
    /// no transform or no CRS and callers decide what that means.
    pub fn extract_geo_info(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
    ) -> TiffResult<GeoInfo> {
        let mut geo_info = GeoInfo::default();

        let keys = Self::parse_geo_key_directory(tiff_reader, reader, ifd)?;
        for key in &keys {
            let inline = key.tiff_tag_location == 0;
            match key.key_id {
                geo_keys::MODEL_TYPE if inline => geo_info.model_type = Some(key.value_offset),
                geo_keys::RASTER_TYPE if inline => geo_info.raster_type = key.value_offset,
                geo_keys::GEOGRAPHIC_TYPE if inline => geo_info.geographic_cs = Some(key.value_offset),
                geo_keys::PROJECTED_CS_TYPE if inline => geo_info.projected_cs = Some(key.value_offset),
                geo_keys::CITATION if key.tiff_tag_location == tags::GEO_ASCII_PARAMS_TAG => {
                    match Self::read_ascii_key(tiff_reader, reader, ifd, key) {
                        Ok(citation) => geo_info.citation = Some(citation),
                        Err(e) => warn!("Could not read {}: {}", get_key_name(key.key_id), e),
                    }
                }
                _ => {}
            }
        }
        geo_info.keys = keys;

        if ifd.has_tag(tags::MODEL_PIXEL_SCALE_TAG) {
            geo_info.pixel_scale = tiff_reader.read_tag_f64s(reader, ifd, tags::MODEL_PIXEL_SCALE_TAG)?;
        }
        if ifd.has_tag(tags::MODEL_TIEPOINT_TAG) {
            geo_info.tie_points = tiff_reader.read_tag_f64s(reader, ifd, tags::MODEL_TIEPOINT_TAG)?;
        }
        if ifd.has_tag(tags::MODEL_TRANSFORMATION_TAG) {
            geo_info.transformation = tiff_reader.read_tag_f64s(reader, ifd, tags::MODEL_TRANSFORMATION_TAG)?;
        }

        if geo_info.is_user_defined_crs() {
            warn!("User-defined CRS ({}) is not supported, treating the raster as having no CRS",
                  geo_info.citation.as_deref().unwrap_or("no citation"));
        }

        debug!("Georeferencing: model={}, raster={}, crs={}",
               geo_info.model_type.map(|m| get_code_name("model_type", m)).unwrap_or_else(|| "-".to_string()),
               get_code_name("raster_type", geo_info.raster_type),
               geo_info.epsg_code().map(get_cs_description).unwrap_or_else(|| "none".to_string()));

        Ok(geo_info)
    }
}

/// Geospatial information extracted from a GeoTIFF
#[derive(Debug, Clone)]
pub struct GeoInfo {
    /// GTModelTypeGeoKey
    pub model_type: Option<u16>,
    /// GTRasterTypeGeoKey (PixelIsArea unless stated)
    pub raster_type: u16,
    /// ProjectedCSTypeGeoKey
    pub projected_cs: Option<u16>,
    /// GeographicTypeGeoKey
    pub geographic_cs: Option<u16>,
    /// ModelPixelScaleTag values
    pub pixel_scale: Vec<f64>,
    /// ModelTiepointTag values (i, j, k, x, y, z, ...)
    pub tie_points: Vec<f64>,
    /// ModelTransformationTag values (row-major 4x4)
    pub transformation: Vec<f64>,
    /// GTCitationGeoKey
    pub citation: Option<String>,
    /// All keys of the directory
    pub keys: Vec<GeoKeyEntry>,
}

impl Default for GeoInfo {
    fn default() -> Self {
        GeoInfo {
            model_type: None,
            raster_type: raster_type::PIXEL_IS_AREA,
            projected_cs: None,
            geographic_cs: None,
            pixel_scale: Vec::new(),
            tie_points: Vec::new(),
            transformation: Vec::new(),
            citation: None,
            keys: Vec::new(),
        }
    }
}

impl GeoInfo {
    /// EPSG code of the raster's CRS
    ///
    /// Projected models use ProjectedCSTypeGeoKey, all others
    /// GeographicTypeGeoKey. User-defined codes count as no CRS.
    pub fn epsg_code(&self) -> Option<u32> {
        let code = self.cs_code()?;
        if code == 0 || code == epsg::USER_DEFINED {
            return None;
        }
        Some(code as u32)
    }

    /// Whether the CRS key is present but marked user-defined (32767)
    pub fn is_user_defined_crs(&self) -> bool {
        self.cs_code() == Some(epsg::USER_DEFINED)
    }

    fn cs_code(&self) -> Option<u16> {
        match self.model_type {
            Some(model_type::PROJECTED) => self.projected_cs,
            Some(_) => self.geographic_cs,
            None => self.projected_cs.or(self.geographic_cs),
        }
    }

    /// Affine transform describing pixel corners
    pub fn geo_transform(&self) -> Option<GeoTransform> {
        let transform = GeoTransform::from_model_transformation(&self.transformation)
            .or_else(|| GeoTransform::from_tiepoint_and_scale(&self.tie_points, &self.pixel_scale))?;

        if self.raster_type == raster_type::PIXEL_IS_POINT {
            return Some(transform.translated_pixels(-0.5, -0.5));
        }
        Some(transform)
    }

    /// Whether the raster carries any georeferencing
    pub fn is_georeferenced(&self) -> bool {
        self.geo_transform().is_some() || self.epsg_code().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epsg_selection() {
        let mut info = GeoInfo {
            model_type: Some(model_type::PROJECTED),
            projected_cs: Some(3857),
            geographic_cs: Some(4326),
            ..GeoInfo::default()
        };
        assert_eq!(info.epsg_code(), Some(3857));

        info.model_type = Some(model_type::GEOGRAPHIC);
        assert_eq!(info.epsg_code(), Some(4326));

        assert!(!info.is_user_defined_crs());

        info.geographic_cs = Some(32767);
        assert_eq!(info.epsg_code(), None);
        assert!(info.is_user_defined_crs());

        assert_eq!(GeoInfo::default().epsg_code(), None);
    }

    #[test]
    fn test_pixel_is_point_shifts_origin() {
        let mut info = GeoInfo {
            tie_points: vec![0.0, 0.0, 0.0, 10.0, 50.0, 0.0],
            pixel_scale: vec![1.0, 1.0, 0.0],
            ..GeoInfo::default()
        };
        let area = info.geo_transform().unwrap();
        assert_eq!((area.c, area.f), (10.0, 50.0));

        info.raster_type = raster_type::PIXEL_IS_POINT;
        let point = info.geo_transform().unwrap();
        assert_eq!((point.c, point.f), (9.5, 50.5));
    }

    #[test]
    fn test_transformation_matrix_wins() {
        let info = GeoInfo {
            tie_points: vec![0.0, 0.0, 0.0, 10.0, 50.0, 0.0],
            pixel_scale: vec![1.0, 1.0, 0.0],
            transformation: vec![
                2.0, 0.0, 0.0, 100.0,
                0.0, -2.0, 0.0, 200.0,
                0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
            ..GeoInfo::default()
        };
        assert_eq!(info.geo_transform(), Some(GeoTransform::new(2.0, 0.0, 100.0, 0.0, -2.0, 200.0)));
    }
}
