//! Raster metadata and the printable profile

use std::fmt;

use crate::coordinate::{BoundingBox, GeoTransform};
use crate::extractor::SampleType;

/// Describes a raster the way a dataset profile does
#[derive(Debug, Clone, PartialEq)]
pub struct RasterMetadata {
    /// Format driver ("GTiff", or "VRT" for warped rasters)
    pub driver: &'static str,
    pub dtype: SampleType,
    pub nodata: Option<f64>,
    pub width: u32,
    pub height: u32,
    /// Number of bands
    pub count: u32,
    /// EPSG code of the CRS, None when the raster has none
    pub crs: Option<u32>,
    pub transform: GeoTransform,
    pub block_width: u32,
    pub block_height: u32,
    pub tiled: bool,
    /// Compression name, None when uncompressed
    pub compress: Option<String>,
    /// "band" for planar files, "pixel" for interleaved ones
    pub interleave: &'static str,
}

impl RasterMetadata {
    /// World extent of the raster
    pub fn bounds(&self) -> BoundingBox {
        let bounds = self.transform.bounds(self.width as usize, self.height as usize);
        BoundingBox { epsg: self.crs, ..bounds }
    }

    /// Value returned for pixels outside the raster: the sentinel, or NaN
    pub fn fill_value(&self) -> f64 {
        self.nodata.unwrap_or(f64::NAN)
    }

    /// Profile entries as (key, value) text pairs, in display order
    pub fn profile(&self) -> Vec<(&'static str, String)> {
        let mut entries = vec![
            ("driver", self.driver.to_string()),
            ("dtype", self.dtype.name().to_string()),
            ("nodata", self.nodata.map_or_else(|| "None".to_string(), format_float)),
            ("width", self.width.to_string()),
            ("height", self.height.to_string()),
            ("count", self.count.to_string()),
            ("crs", self.crs.map_or_else(|| "None".to_string(), |c| format!("EPSG:{}", c))),
            ("transform", self.transform.to_string()),
            ("blockxsize", self.block_width.to_string()),
            ("blockysize", self.block_height.to_string()),
            ("tiled", if self.tiled { "True" } else { "False" }.to_string()),
        ];
        if let Some(compress) = &self.compress {
            entries.push(("compress", compress.clone()));
        }
        entries.push(("interleave", self.interleave.to_string()));
        entries
    }
}

impl fmt::Display for RasterMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.profile() {
            writeln!(f, "{}: {}", key, value)?;
        }
        Ok(())
    }
}

/// Float text spelled the way Python's `repr` spells it
///
/// Integral values keep one decimal ("-9999.0"). Magnitudes from 1e16 up or
/// below 1e-4 switch to exponent form with a signed two-digit exponent
/// ("-3.4028234663852886e+38", "1e-05").
pub fn format_float(value: f64) -> String {
    if !value.is_finite() {
        return format!("{}", value);
    }
    let magnitude = value.abs();
    if value != 0.0 && (magnitude >= 1e16 || magnitude < 1e-4) {
        let text = format!("{:e}", value);
        return match text.split_once('e') {
            Some((mantissa, exponent)) => {
                let exponent: i32 = exponent.parse().unwrap_or(0);
                let sign = if exponent < 0 { '-' } else { '+' };
                format!("{}e{}{:02}", mantissa, sign, exponent.abs())
            }
            None => text,
        };
    }
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
