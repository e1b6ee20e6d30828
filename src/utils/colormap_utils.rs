//! Colormap utilities
//!
//! Continuous color ramps and the downsampled quicklook rendering used by
//! `inspect`.

use image::{Rgba, RgbaImage};
use log::{debug, info};
use std::path::Path;

use crate::errors::{LookupError, LookupResult};
use crate::raster::MaskedArray;

/// An RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        RgbColor { r, g, b }
    }

    /// Parse "#rrggbb" or "rrggbb"
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(RgbColor::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// A color stop at a position in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMapEntry {
    pub value: f64,
    pub color: RgbColor,
}

/// A linear color ramp
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    pub entries: Vec<ColorMapEntry>,
}

/// matplotlib's RdYlBu stops, red to blue
const RDYLBU: [&str; 11] = [
    "#a50026", "#d73027", "#f46d43", "#fdae61", "#fee090", "#ffffbf",
    "#e0f3f8", "#abd9e9", "#74add1", "#4575b4", "#313695",
];

impl ColorMap {
    /// Evenly spaced stops from a list of hex colors
    pub fn from_hex_stops(stops: &[&str]) -> Self {
        let last = stops.len().saturating_sub(1).max(1) as f64;
        let entries = stops.iter()
            .enumerate()
            .filter_map(|(i, hex)| RgbColor::from_hex(hex).map(|color| ColorMapEntry { value: i as f64 / last, color }))
            .collect();
        ColorMap { entries }
    }

    /// Reversed RdYlBu: blue for cold, red for warm
    pub fn rdylbu_r() -> Self {
        let mut stops = RDYLBU;
        stops.reverse();
        Self::from_hex_stops(&stops)
    }
}

/// Find the bracketing stops of a position
fn find_bracketing_entries(colormap: &ColorMap, t: f64) -> Option<(&ColorMapEntry, &ColorMapEntry)> {
    let first = colormap.entries.first()?;
    let mut lower = first;
    for entry in &colormap.entries {
        if entry.value >= t {
            return Some((lower, entry));
        }
        lower = entry;
    }
    Some((lower, lower))
}

/// Color of a position in [0, 1] on the ramp, clamped at both ends
pub fn interpolate_color(colormap: &ColorMap, t: f64) -> RgbColor {
    let Some((lower, upper)) = find_bracketing_entries(colormap, t.clamp(0.0, 1.0)) else {
        return RgbColor::new(0, 0, 0);
    };

    let range = upper.value - lower.value;
    if range <= 0.0 {
        return upper.color;
    }

    let f = (t - lower.value) / range;
    let mix = |a: u8, b: u8| (a as f64 * (1.0 - f) + b as f64 * f).round() as u8;
    RgbColor::new(mix(lower.color.r, upper.color.r), mix(lower.color.g, upper.color.g), mix(lower.color.b, upper.color.b))
}

/// Color for a value scaled linearly from [min, max] onto the ramp
pub fn find_color_for_value(colormap: &ColorMap, value: f64, min: f64, max: f64) -> RgbColor {
    let t = if max > min { (value - min) / (max - min) } else { 0.5 };
    interpolate_color(colormap, t)
}

/// Nearest-neighbour downsampled copy of a raster, filled block row by block row
pub struct QuicklookGrid {
    src_width: u32,
    src_height: u32,
    width: u32,
    height: u32,
    /// None for masked pixels
    values: Vec<Option<f64>>,
}

impl QuicklookGrid {
    /// Grid at most `max_width` pixels wide, keeping the aspect ratio
    pub fn new(src_width: u32, src_height: u32, max_width: u32) -> Self {
        let width = src_width.min(max_width.max(1)).max(1);
        let height = ((src_height as f64 * width as f64 / src_width.max(1) as f64).round() as u32).max(1);
        debug!("Quicklook grid {}x{} for a {}x{} raster", width, height, src_width, src_height);

        QuicklookGrid {
            src_width,
            src_height,
            width,
            height,
            values: vec![None; (width * height) as usize],
        }
    }

    fn source_index(out: u32, out_len: u32, src_len: u32) -> u32 {
        let src = ((out as f64 + 0.5) * src_len as f64 / out_len as f64).floor() as u32;
        src.min(src_len.saturating_sub(1))
    }

    /// Take the pixels this grid samples from a chunk of full-width rows
    pub fn absorb(&mut self, first_row: u32, chunk: &MaskedArray) {
        let (rows, cols) = chunk.dim();
        if cols as u32 != self.src_width {
            return;
        }
        let end_row = first_row + rows as u32;

        for out_row in 0..self.height {
            let src_row = Self::source_index(out_row, self.height, self.src_height);
            if src_row < first_row || src_row >= end_row {
                continue;
            }
            let r = (src_row - first_row) as usize;
            for out_col in 0..self.width {
                let c = Self::source_index(out_col, self.width, self.src_width) as usize;
                let value = (!chunk.mask[[r, c]]).then(|| chunk.data[[r, c]]);
                self.values[(out_row * self.width + out_col) as usize] = value;
            }
        }
    }

    /// Colorize with masked pixels transparent
    pub fn render(&self, colormap: &ColorMap, min: f64, max: f64) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            match self.values[(y * self.width + x) as usize] {
                Some(value) => {
                    let c = find_color_for_value(colormap, value, min, max);
                    Rgba([c.r, c.g, c.b, 255])
                }
                None => Rgba([0, 0, 0, 0]),
            }
        })
    }

    /// Render and write a PNG
    pub fn save(&self, colormap: &ColorMap, min: f64, max: f64, path: &Path) -> LookupResult<()> {
        self.render(colormap, min, max)
            .save(path)
            .map_err(|e| LookupError::Io(std::io::Error::other(e.to_string())))?;
        info!("Quicklook written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::NodataPolicy;
    use ndarray::Array2;

    #[test]
    fn test_ramp_ends() {
        let cmap = ColorMap::rdylbu_r();
        assert_eq!(cmap.entries.len(), 11);
        assert_eq!(interpolate_color(&cmap, 0.0), RgbColor::new(0x31, 0x36, 0x95));
        assert_eq!(interpolate_color(&cmap, 1.0), RgbColor::new(0xa5, 0x00, 0x26));
        assert_eq!(interpolate_color(&cmap, 0.5), RgbColor::new(0xff, 0xff, 0xbf));
        assert_eq!(interpolate_color(&cmap, 7.0), interpolate_color(&cmap, 1.0));
    }

    #[test]
    fn test_value_scaling() {
        let cmap = ColorMap::rdylbu_r();
        assert_eq!(find_color_for_value(&cmap, -10.0, -10.0, 30.0), interpolate_color(&cmap, 0.0));
        assert_eq!(find_color_for_value(&cmap, 10.0, -10.0, 30.0), interpolate_color(&cmap, 0.5));
        // Flat range lands mid-ramp
        assert_eq!(find_color_for_value(&cmap, 3.0, 3.0, 3.0), interpolate_color(&cmap, 0.5));
    }

    #[test]
    fn test_hex_parsing() {
        assert_eq!(RgbColor::from_hex("#4575b4"), Some(RgbColor::new(0x45, 0x75, 0xb4)));
        assert_eq!(RgbColor::from_hex("45zzb4"), None);
        assert_eq!(RgbColor::from_hex("#fff"), None);
    }

    #[test]
    fn test_quicklook_downsamples_and_masks() {
        let mut grid = QuicklookGrid::new(4000, 2000, 1200);
        assert_eq!((grid.width, grid.height), (1200, 600));

        let mut small = QuicklookGrid::new(4, 2, 1200);
        assert_eq!((small.width, small.height), (4, 2));

        let data = Array2::from_shape_vec((1, 4), vec![0.0, 1.0, -9999.0, 3.0]).unwrap();
        let chunk = MaskedArray::from_nodata(data, Some(-9999.0), &NodataPolicy::default());
        small.absorb(1, &chunk);

        let image = small.render(&ColorMap::rdylbu_r(), 0.0, 3.0);
        assert_eq!(image.get_pixel(0, 1)[3], 255);
        assert_eq!(image.get_pixel(2, 1)[3], 0);
        // Row 0 was never absorbed
        assert_eq!(image.get_pixel(0, 0)[3], 0);

        let wrong_width = MaskedArray::from_nodata(Array2::zeros((1, 3)), None, &NodataPolicy::default());
        grid.absorb(0, &wrong_width);
    }
}
