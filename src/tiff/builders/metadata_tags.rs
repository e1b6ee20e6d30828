//! GDAL metadata tags

use log::debug;
use std::collections::BTreeMap;

use crate::tiff::constants::tags;

use super::writer::TagValue;

/// Handles metadata tags
pub struct MetadataBuilder;

impl MetadataBuilder {
    /// Add a GDAL_NODATA tag
    ///
    /// GDAL stores the sentinel as ASCII text; NaN is written as "nan".
    pub fn add_nodata_tag(tag_map: &mut BTreeMap<u16, TagValue>, nodata: f64) {
        let text = Self::format_nodata(nodata);
        debug!("Adding GDAL NoData tag: {}", text);
        tag_map.insert(tags::GDAL_NODATA, TagValue::Ascii(text));
    }

    /// Add the Software tag
    pub fn add_software_tag(tag_map: &mut BTreeMap<u16, TagValue>, software: &str) {
        tag_map.insert(tags::SOFTWARE, TagValue::Ascii(software.to_string()));
    }

    /// Text form of a nodata value as GDAL writes it
    pub fn format_nodata(nodata: f64) -> String {
        if nodata.is_nan() {
            "nan".to_string()
        } else if nodata.is_infinite() {
            if nodata > 0.0 { "inf".to_string() } else { "-inf".to_string() }
        } else {
            format!("{}", nodata)
        }
    }
}
