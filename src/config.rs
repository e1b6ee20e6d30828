//! TOML configuration
//!
//! Every key is optional. The file is taken from `--config`, else from
//! `./soiltemp.toml` when present, else the built-in defaults apply.

use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{LookupError, LookupResult};

/// Raster file looked up when no path is given
pub const DEFAULT_RASTER: &str = "SBIO1_Annual_Mean_Temperature_5_15cm.tif";

/// Config file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "soiltemp.toml";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub raster: RasterSettings,
    pub lookup: LookupSettings,
    pub geocoder: GeocoderSettings,
    pub logging: LoggingSettings,
    pub inspect: InspectSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RasterSettings {
    pub default_path: PathBuf,
}

impl Default for RasterSettings {
    fn default() -> Self {
        RasterSettings { default_path: PathBuf::from(DEFAULT_RASTER) }
    }
}

/// Tolerances of the nodata comparison
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LookupSettings {
    pub nodata_rtol: f64,
    pub nodata_atol: f64,
}

impl Default for LookupSettings {
    fn default() -> Self {
        LookupSettings { nodata_rtol: 1e-5, nodata_atol: 1e-8 }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GeocoderSettings {
    pub enabled: bool,
    pub endpoint: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub cache_capacity: usize,
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        GeocoderSettings {
            enabled: true,
            endpoint: "https://nominatim.openstreetmap.org/search".to_string(),
            user_agent: "soil-temp-lookup".to_string(),
            timeout_secs: 5,
            cache_capacity: 2048,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// env_logger filter, e.g. "info" or "soiltemp=debug"
    pub level: Option<String>,
    /// Operations log, one line per command
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct InspectSettings {
    pub plot_output: PathBuf,
    pub plot_max_width: u32,
}

impl Default for InspectSettings {
    fn default() -> Self {
        InspectSettings { plot_output: PathBuf::from("quicklook.png"), plot_max_width: 1200 }
    }
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml(text: &str) -> LookupResult<Self> {
        toml::from_str(text).map_err(|e| LookupError::Config(e.to_string()))
    }

    /// Read a config file
    pub fn from_file(path: &Path) -> LookupResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| LookupError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let settings = Self::from_toml(&text)
            .map_err(|e| LookupError::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded configuration from {}", path.display());
        Ok(settings)
    }

    /// Load the explicit file, the working directory default, or nothing
    pub fn load(explicit: Option<&Path>) -> LookupResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(local);
        }

        debug!("No configuration file, using defaults");
        Ok(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.raster.default_path, PathBuf::from(DEFAULT_RASTER));
        assert_eq!(settings.geocoder.timeout_secs, 5);
        assert_eq!(settings.geocoder.cache_capacity, 2048);
        assert_eq!(settings.inspect.plot_max_width, 1200);
        assert!(settings.logging.file.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = Settings::from_toml(r#"
            [raster]
            default_path = "/data/soil.tif"

            [geocoder]
            enabled = false
        "#).unwrap();

        assert_eq!(settings.raster.default_path, PathBuf::from("/data/soil.tif"));
        assert!(!settings.geocoder.enabled);
        assert_eq!(settings.geocoder.user_agent, "soil-temp-lookup");
        assert_eq!(settings.lookup, LookupSettings::default());
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        assert!(matches!(Settings::from_toml("[lookup]\nnodata_rtol = \"x\""), Err(LookupError::Config(_))));
        assert!(matches!(Settings::from_toml("[nope]"), Err(LookupError::Config(_))));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Settings::load(Some(Path::new("/nonexistent/soiltemp.toml"))).unwrap_err();
        assert!(matches!(err, LookupError::Config(_)));
    }
}
