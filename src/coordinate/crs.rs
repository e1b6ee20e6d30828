//! Coordinate Reference System handling

use std::fmt;

use crate::tiff::errors::{TiffError, TiffResult};

/// Identifier for a coordinate reference system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordinateSystem {
    /// WGS 84 (EPSG:4326)
    WGS84,
    /// Web Mercator (EPSG:3857)
    WebMercator,
    /// UTM Zone on WGS 84 (EPSG:326xx north, 327xx south)
    UTM(u8, bool),
    /// Other EPSG code
    Other(u32),
}

impl CoordinateSystem {
    /// Get the EPSG code for this coordinate system
    pub fn epsg_code(&self) -> u32 {
        match self {
            CoordinateSystem::WGS84 => 4326,
            CoordinateSystem::WebMercator => 3857,
            CoordinateSystem::UTM(zone, is_northern) => {
                if *is_northern {
                    32600 + *zone as u32
                } else {
                    32700 + *zone as u32
                }
            },
            CoordinateSystem::Other(code) => *code,
        }
    }

    /// PROJ.4 definition from the bundled EPSG database
    pub fn proj_string(&self) -> Option<&'static str> {
        u16::try_from(self.epsg_code()).ok()
            .and_then(crs_definitions::from_code)
            .map(|def| def.proj4)
    }

    /// Whether coordinates in this system are longitude/latitude degrees
    pub fn is_geographic(&self) -> bool {
        match self {
            CoordinateSystem::WGS84 => true,
            CoordinateSystem::WebMercator | CoordinateSystem::UTM(..) => false,
            CoordinateSystem::Other(code) => match self.proj_string() {
                Some(proj) => proj.contains("+proj=longlat"),
                None => (4000..5000).contains(code),
            },
        }
    }

    /// Get a description of this coordinate system
    pub fn description(&self) -> String {
        match self {
            CoordinateSystem::WGS84 => "WGS 84 (EPSG:4326)".to_string(),
            CoordinateSystem::WebMercator => "Web Mercator (EPSG:3857)".to_string(),
            CoordinateSystem::UTM(zone, is_northern) => {
                format!("UTM Zone {}{} (EPSG:{})", zone, if *is_northern { "N" } else { "S" }, self.epsg_code())
            },
            CoordinateSystem::Other(code) => format!("EPSG:{}", code),
        }
    }
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg_code())
    }
}

/// Factory for creating coordinate systems
pub struct CoordinateSystemFactory;

impl CoordinateSystemFactory {
    /// Create a coordinate system from an EPSG code
    pub fn from_epsg(epsg: u32) -> CoordinateSystem {
        match epsg {
            4326 => CoordinateSystem::WGS84,
            3857 => CoordinateSystem::WebMercator,
            32601..=32660 => CoordinateSystem::UTM((epsg - 32600) as u8, true),
            32701..=32760 => CoordinateSystem::UTM((epsg - 32700) as u8, false),
            _ => CoordinateSystem::Other(epsg),
        }
    }

    /// Parse a coordinate system from a string ("EPSG:4326" or "4326")
    pub fn from_string(crs_str: &str) -> TiffResult<CoordinateSystem> {
        let crs_str = crs_str.trim().to_uppercase();
        let code = crs_str.strip_prefix("EPSG:").unwrap_or(&crs_str);

        code.parse::<u32>()
            .map(Self::from_epsg)
            .map_err(|_| TiffError::GenericError(format!("Unsupported CRS format: {}", crs_str)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_epsg() {
        assert_eq!(CoordinateSystemFactory::from_epsg(4326), CoordinateSystem::WGS84);
        assert_eq!(CoordinateSystemFactory::from_epsg(32633), CoordinateSystem::UTM(33, true));
        assert_eq!(CoordinateSystemFactory::from_epsg(32733).epsg_code(), 32733);
        assert_eq!(CoordinateSystemFactory::from_epsg(2056), CoordinateSystem::Other(2056));
    }

    #[test]
    fn test_from_string() {
        assert_eq!(CoordinateSystemFactory::from_string("epsg:3857").unwrap(), CoordinateSystem::WebMercator);
        assert_eq!(CoordinateSystemFactory::from_string(" 4326 ").unwrap(), CoordinateSystem::WGS84);
        assert!(CoordinateSystemFactory::from_string("+proj=longlat").is_err());
    }

    #[test]
    fn test_is_geographic() {
        assert!(CoordinateSystem::WGS84.is_geographic());
        assert!(!CoordinateSystem::WebMercator.is_geographic());
        assert!(!CoordinateSystem::UTM(33, true).is_geographic());
    }
}
