//! GeoTIFF tag construction
//!
//! Writes the model tags and the GeoKey directory that place an image on the
//! map and name its coordinate reference system.

use log::debug;
use std::collections::BTreeMap;

use crate::coordinate::{CoordinateSystemFactory, GeoTransform};
use crate::tiff::constants::{epsg, geo_keys, model_type, raster_type, tags};

use super::writer::TagValue;

/// Handles GeoTIFF tags
pub struct GeoTagsBuilder;

impl GeoTagsBuilder {
    /// Add the model tags for an affine transform
    ///
    /// North-up transforms are written as pixel scale plus tiepoint, anything
    /// with rotation as a ModelTransformationTag matrix.
    ///
    /// # Arguments
    /// * `tag_map` - Tags of the image
    /// * `transform` - Transform of the pixel corners
    /// * `pixel_is_point` - Anchor the tiepoint at the first pixel's center
    pub fn add_transform(tag_map: &mut BTreeMap<u16, TagValue>, transform: &GeoTransform, pixel_is_point: bool) {
        let anchored = if pixel_is_point { transform.translated_pixels(0.5, 0.5) } else { *transform };

        if anchored.is_rectilinear() && anchored.e < 0.0 {
            tag_map.insert(tags::MODEL_PIXEL_SCALE_TAG, TagValue::Double(vec![anchored.a, -anchored.e, 0.0]));
            tag_map.insert(tags::MODEL_TIEPOINT_TAG,
                           TagValue::Double(vec![0.0, 0.0, 0.0, anchored.c, anchored.f, 0.0]));
        } else {
            tag_map.insert(tags::MODEL_TRANSFORMATION_TAG, TagValue::Double(vec![
                anchored.a, anchored.b, 0.0, anchored.c,
                anchored.d, anchored.e, 0.0, anchored.f,
                0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ]));
        }
    }

    /// Add a GeoKey directory naming the CRS
    ///
    /// # Arguments
    /// * `tag_map` - Tags of the image
    /// * `epsg_code` - EPSG code of the CRS (32767 writes a user-defined CRS)
    /// * `pixel_is_point` - Raster type to record
    pub fn add_geo_keys(tag_map: &mut BTreeMap<u16, TagValue>, epsg_code: u16, pixel_is_point: bool) {
        let geographic = CoordinateSystemFactory::from_epsg(epsg_code as u32).is_geographic();
        let raster = if pixel_is_point { raster_type::PIXEL_IS_POINT } else { raster_type::PIXEL_IS_AREA };

        let mut keys: Vec<[u16; 4]> = vec![
            [geo_keys::MODEL_TYPE, 0, 1, if geographic { model_type::GEOGRAPHIC } else { model_type::PROJECTED }],
            [geo_keys::RASTER_TYPE, 0, 1, raster],
        ];
        if geographic {
            keys.push([geo_keys::GEOGRAPHIC_TYPE, 0, 1, epsg_code]);
            keys.push([geo_keys::GEOG_ANGULAR_UNITS, 0, 1, epsg::ANGULAR_DEGREE]);
        } else {
            keys.push([geo_keys::PROJECTED_CS_TYPE, 0, 1, epsg_code]);
            keys.push([geo_keys::PROJ_LINEAR_UNITS, 0, 1, epsg::LINEAR_METER]);
        }

        let mut directory = vec![1, 1, 0, keys.len() as u16];
        directory.extend(keys.iter().flatten());
        debug!("GeoKey directory with {} keys for EPSG:{}", keys.len(), epsg_code);

        tag_map.insert(tags::GEO_KEY_DIRECTORY_TAG, TagValue::Short(directory));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_north_up_uses_scale_and_tiepoint() {
        let mut map = BTreeMap::new();
        GeoTagsBuilder::add_transform(&mut map, &GeoTransform::from_origin(0.0, 10.0, 1.0, 1.0), false);
        assert_eq!(map.get(&tags::MODEL_PIXEL_SCALE_TAG), Some(&TagValue::Double(vec![1.0, 1.0, 0.0])));
        assert_eq!(map.get(&tags::MODEL_TIEPOINT_TAG),
                   Some(&TagValue::Double(vec![0.0, 0.0, 0.0, 0.0, 10.0, 0.0])));
        assert!(!map.contains_key(&tags::MODEL_TRANSFORMATION_TAG));
    }

    #[test]
    fn test_geo_keys_for_projected_crs() {
        let mut map = BTreeMap::new();
        GeoTagsBuilder::add_geo_keys(&mut map, 3857, false);
        match map.get(&tags::GEO_KEY_DIRECTORY_TAG) {
            Some(TagValue::Short(dir)) => {
                assert_eq!(dir[3], 4);
                assert_eq!(&dir[4..8], &[1024, 0, 1, 1]);
                assert!(dir.chunks(4).any(|k| k == [3072, 0, 1, 3857]));
            }
            other => panic!("unexpected directory {:?}", other),
        }
    }
}
