//! GeoKey names and coordinate system descriptions
//!
//! Names come from `geokeys.toml`, compiled into the binary. They are only
//! used for log output and human-readable raster descriptions.

use std::collections::HashMap;
use lazy_static::lazy_static;
use log::warn;

use crate::tiff::errors::{TiffError, TiffResult};

lazy_static! {
    static ref GEOKEY_DEFINITIONS: GeoKeyDefinitions = {
        let content = include_str!("../../geokeys.toml");
        GeoKeyDefinitions::from_str(content).unwrap_or_else(|e| {
            warn!("Failed to parse GeoKey definitions: {}", e);
            GeoKeyDefinitions::default()
        })
    };
}

/// Lookup tables for GeoKey ids and their code values
#[derive(Debug, Default)]
pub struct GeoKeyDefinitions {
    pub key_names: HashMap<u16, String>,
    pub model_type_names: HashMap<u16, String>,
    pub raster_type_names: HashMap<u16, String>,
    pub linear_unit_names: HashMap<u16, String>,
    pub angular_unit_names: HashMap<u16, String>,
    pub geographic_cs_names: HashMap<u16, String>,
    pub projected_cs_names: HashMap<u16, String>,
}

impl GeoKeyDefinitions {
    /// Parse definitions from TOML text
    pub fn from_str(content: &str) -> TiffResult<Self> {
        let toml_value: toml::Value = content.parse()
            .map_err(|e| TiffError::GenericError(format!("Failed to parse TOML: {}", e)))?;

        let mut defs = GeoKeyDefinitions::default();
        Self::parse_code_table(&toml_value, "key_ids", &mut defs.key_names);
        Self::parse_code_table(&toml_value, "model_type_codes", &mut defs.model_type_names);
        Self::parse_code_table(&toml_value, "raster_type_codes", &mut defs.raster_type_names);
        Self::parse_code_table(&toml_value, "linear_unit_codes", &mut defs.linear_unit_names);
        Self::parse_code_table(&toml_value, "angular_unit_codes", &mut defs.angular_unit_names);
        Self::parse_code_table(&toml_value, "geographic_cs_codes", &mut defs.geographic_cs_names);
        Self::parse_code_table(&toml_value, "projected_cs_codes", &mut defs.projected_cs_names);
        Ok(defs)
    }

    fn parse_code_table(toml_value: &toml::Value, table_name: &str, target: &mut HashMap<u16, String>) {
        if let Some(table) = toml_value.get(table_name).and_then(|v| v.as_table()) {
            for (k, v) in table {
                if let (Ok(id), Some(name)) = (k.parse::<u16>(), v.as_str()) {
                    target.insert(id, name.to_string());
                }
            }
        }
    }

    /// Get a GeoKey name by ID
    pub fn get_key_name(&self, key_id: u16) -> String {
        self.key_names.get(&key_id)
            .cloned()
            .unwrap_or_else(|| format!("Unknown-{}", key_id))
    }

    /// Get a code name from one of the code tables
    pub fn get_code_name(&self, code_type: &str, code_id: u16) -> String {
        let lookup_result = match code_type {
            "model_type" => self.model_type_names.get(&code_id),
            "raster_type" => self.raster_type_names.get(&code_id),
            "linear_unit" => self.linear_unit_names.get(&code_id),
            "angular_unit" => self.angular_unit_names.get(&code_id),
            "geographic_cs" => self.geographic_cs_names.get(&code_id),
            "projected_cs" => self.projected_cs_names.get(&code_id),
            _ => None,
        };

        lookup_result.cloned().unwrap_or_else(|| code_id.to_string())
    }

    /// Describe a coordinate system EPSG code
    pub fn get_cs_description(&self, code: u32) -> String {
        match code {
            32601..=32660 => format!("WGS 84 / UTM zone {}N", code - 32600),
            32701..=32760 => format!("WGS 84 / UTM zone {}S", code - 32700),
            25828..=25838 => format!("ETRS89 / UTM zone {}N", code - 25800),
            _ => u16::try_from(code).ok()
                .and_then(|c| self.geographic_cs_names.get(&c).or_else(|| self.projected_cs_names.get(&c)))
                .cloned()
                .unwrap_or_else(|| format!("EPSG:{}", code)),
        }
    }
}

/// A GeoKey entry of the GeoKey directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoKeyEntry {
    pub key_id: u16,
    /// 0 for values stored in `value_offset`, otherwise the tag holding the value
    pub tiff_tag_location: u16,
    pub count: u16,
    pub value_offset: u16,
}

impl GeoKeyEntry {
    pub fn new(key_id: u16, tiff_tag_location: u16, count: u16, value_offset: u16) -> Self {
        GeoKeyEntry {
            key_id,
            tiff_tag_location,
            count,
            value_offset,
        }
    }

    /// Get the name of this key
    pub fn get_name(&self) -> String {
        get_key_name(self.key_id)
    }
}

/// Get a GeoKey name
pub fn get_key_name(key: u16) -> String {
    GEOKEY_DEFINITIONS.get_key_name(key)
}

/// Get a code name
pub fn get_code_name(code_type: &str, code: u16) -> String {
    GEOKEY_DEFINITIONS.get_code_name(code_type, code)
}

/// Describe a coordinate system EPSG code
pub fn get_cs_description(code: u32) -> String {
    GEOKEY_DEFINITIONS.get_cs_description(code)
}
