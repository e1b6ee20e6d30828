//! Pixel windows derived from world-coordinate bounds

use super::geotransform::GeoTransform;
use crate::extractor::Region;

/// Offsets within this many pixels of the next integer are snapped up before flooring
const PIXEL_PRECISION: f64 = 1e-3;

/// A rectangular, possibly fractional, region in pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub col_off: f64,
    pub row_off: f64,
    pub width: f64,
    pub height: f64,
}

impl Window {
    pub fn new(col_off: f64, row_off: f64, width: f64, height: f64) -> Self {
        Window { col_off, row_off, width, height }
    }

    /// The window covering a whole raster
    pub fn full(width: usize, height: usize) -> Self {
        Window::new(0.0, 0.0, width as f64, height as f64)
    }

    /// Window covering world bounds under an affine transform
    ///
    /// The four corners are mapped to pixel space and their envelope is taken,
    /// so the result does not depend on the sign of the pixel sizes.
    pub fn from_bounds(left: f64, bottom: f64, right: f64, top: f64, transform: &GeoTransform) -> Option<Self> {
        let inv = transform.invert()?;
        let corners = [
            inv.forward(left, top),
            inv.forward(right, top),
            inv.forward(left, bottom),
            inv.forward(right, bottom),
        ];

        let min_col = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_col = corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let min_row = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_row = corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        if !(min_col.is_finite() && max_col.is_finite() && min_row.is_finite() && max_row.is_finite()) {
            return None;
        }

        Some(Window::new(min_col, min_row, max_col - min_col, max_row - min_row))
    }

    /// Floors the offsets to whole pixels
    pub fn round_offsets(&self) -> Self {
        Window {
            col_off: (self.col_off + PIXEL_PRECISION).floor(),
            row_off: (self.row_off + PIXEL_PRECISION).floor(),
            ..*self
        }
    }

    /// Rounds the lengths to the nearest whole pixel
    pub fn round_lengths(&self) -> Self {
        Window {
            width: (self.width + 0.5).floor(),
            height: (self.height + 0.5).floor(),
            ..*self
        }
    }

    /// Overlap of two windows; width or height is zero or negative when they are disjoint
    pub fn intersection(&self, other: &Window) -> Window {
        let col_off = self.col_off.max(other.col_off);
        let row_off = self.row_off.max(other.row_off);
        let col_end = (self.col_off + self.width).min(other.col_off + other.width);
        let row_end = (self.row_off + self.height).min(other.row_off + other.height);

        Window::new(col_off, row_off, col_end - col_off, row_end - row_off)
    }

    /// Whether the window covers no pixel
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Integer pixel region, None when empty or when an offset is negative
    pub fn to_region(&self) -> Option<Region> {
        if self.is_empty() || self.col_off < 0.0 || self.row_off < 0.0 {
            return None;
        }

        Some(Region::new(
            self.col_off as u32,
            self.row_off as u32,
            self.width as u32,
            self.height as u32,
        ))
    }
}
