//! Affine mapping between pixel and world coordinates
//!
//! Coefficients follow the `Affine(a, b, c, d, e, f)` convention:
//! `x = a·col + b·row + c` and `y = d·col + e·row + f`, where (col, row) address
//! pixel corners. North-up rasters have `b = d = 0` and a negative `e`.

use std::fmt;

use super::bbox::BoundingBox;
use super::point::Point;

/// Affine pixel-to-world transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl GeoTransform {
    /// Creates a transform from its six coefficients
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        GeoTransform { a, b, c, d, e, f }
    }

    /// North-up transform from the top-left corner and pixel sizes
    ///
    /// # Arguments
    /// * `west` - X of the left edge
    /// * `north` - Y of the top edge
    /// * `x_res` - Pixel width (positive)
    /// * `y_res` - Pixel height (positive, rows run southwards)
    pub fn from_origin(west: f64, north: f64, x_res: f64, y_res: f64) -> Self {
        GeoTransform::new(x_res, 0.0, west, 0.0, -y_res, north)
    }

    /// Builds the transform from a tiepoint and pixel scale
    ///
    /// # Arguments
    /// * `tiepoint` - ModelTiepointTag values (i, j, k, x, y, z)
    /// * `scale` - ModelPixelScaleTag values (sx, sy, sz)
    ///
    /// # Returns
    /// The transform, or None when fewer than 6 tiepoint or 2 scale values are given
    pub fn from_tiepoint_and_scale(tiepoint: &[f64], scale: &[f64]) -> Option<Self> {
        if tiepoint.len() < 6 || scale.len() < 2 {
            return None;
        }

        let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
        let (sx, sy) = (scale[0], scale[1]);

        Some(GeoTransform::new(sx, 0.0, x - i * sx, 0.0, -sy, y + j * sy))
    }

    /// Builds the transform from a row-major 4x4 ModelTransformationTag matrix
    pub fn from_model_transformation(matrix: &[f64]) -> Option<Self> {
        if matrix.len() < 16 {
            return None;
        }

        Some(GeoTransform::new(matrix[0], matrix[1], matrix[3], matrix[4], matrix[5], matrix[7]))
    }

    /// The same transform with the origin moved by a pixel fraction
    pub fn translated_pixels(&self, dcol: f64, drow: f64) -> Self {
        let origin = self.forward(dcol, drow);
        GeoTransform { c: origin.x, f: origin.y, ..*self }
    }

    /// Maps pixel-space (col, row) to world coordinates
    pub fn forward(&self, col: f64, row: f64) -> Point {
        Point::new(
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }

    /// The inverse affine, or None for a degenerate transform
    pub fn invert(&self) -> Option<GeoTransform> {
        let det = self.a * self.e - self.b * self.d;
        if det == 0.0 || !det.is_finite() {
            return None;
        }

        let ia = self.e / det;
        let ib = -self.b / det;
        let id = -self.d / det;
        let ie = self.a / det;

        Some(GeoTransform::new(
            ia, ib, -ia * self.c - ib * self.f,
            id, ie, -id * self.c - ie * self.f,
        ))
    }

    /// Maps world coordinates to fractional pixel-space (col, row)
    pub fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let inv = self.invert()?;
        let p = inv.forward(x, y);
        Some((p.x, p.y))
    }

    /// Integer (row, col) of the pixel containing a world coordinate
    ///
    /// Uses floor on both axes; the result may lie outside the raster.
    pub fn index(&self, x: f64, y: f64) -> Option<(i64, i64)> {
        let (col, row) = self.inverse(x, y)?;
        if !col.is_finite() || !row.is_finite() {
            return None;
        }
        Some((row.floor() as i64, col.floor() as i64))
    }

    /// World coordinates of the center of pixel (row, col)
    pub fn pixel_center(&self, row: usize, col: usize) -> Point {
        self.forward(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// Pixel size as (x_res, y_res), both positive
    pub fn res(&self) -> (f64, f64) {
        ((self.a * self.a + self.d * self.d).sqrt(), (self.b * self.b + self.e * self.e).sqrt())
    }

    /// Whether the transform has no rotation or shear
    pub fn is_rectilinear(&self) -> bool {
        self.b == 0.0 && self.d == 0.0
    }

    /// World extent covered by a raster of the given size
    pub fn bounds(&self, width: usize, height: usize) -> BoundingBox {
        let (w, h) = (width as f64, height as f64);
        let corners = [
            self.forward(0.0, 0.0),
            self.forward(w, 0.0),
            self.forward(0.0, h),
            self.forward(w, h),
        ];

        BoundingBox::from_points(corners)
            .unwrap_or_else(|| BoundingBox::new(f64::NAN, f64::NAN, f64::NAN, f64::NAN))
    }
}

/// A coefficient with a leading space in place of the plus sign
fn signed_cell(value: f64) -> String {
    if value.is_sign_negative() {
        format!("{:.2}", value)
    } else {
        format!(" {:.2}", value)
    }
}

impl fmt::Display for GeoTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = [[self.a, self.b, self.c], [self.d, self.e, self.f], [0.0, 0.0, 1.0]];
        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let cells: Vec<String> = row.iter().map(|&v| signed_cell(v)).collect();
            write!(f, "|{}|", cells.join(","))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_degree_grid() -> GeoTransform {
        GeoTransform::from_origin(0.0, 10.0, 1.0, 1.0)
    }

    #[test]
    fn test_display_matrix() {
        let gt = GeoTransform::new(0.5, 0.0, -180.0, 0.0, -0.5, 90.0);
        assert_eq!(gt.to_string(), "| 0.50, 0.00,-180.00|\n| 0.00,-0.50, 90.00|\n| 0.00, 0.00, 1.00|");
    }

    #[test]
    fn test_index_uses_floor() {
        let gt = one_degree_grid();
        assert_eq!(gt.index(5.5, 5.5), Some((4, 5)));
        assert_eq!(gt.index(0.0, 10.0), Some((0, 0)));
        assert_eq!(gt.index(20.0, 20.0), Some((-10, 20)));
        assert_eq!(gt.index(-0.5, 5.0), Some((5, -1)));
    }

    #[test]
    fn test_from_tiepoint_and_scale() {
        let gt = GeoTransform::from_tiepoint_and_scale(&[0.0, 0.0, 0.0, -180.0, 90.0, 0.0], &[0.5, 0.25, 0.0]).unwrap();
        assert_eq!(gt, GeoTransform::new(0.5, 0.0, -180.0, 0.0, -0.25, 90.0));

        // Tiepoint at a pixel other than the origin
        let gt = GeoTransform::from_tiepoint_and_scale(&[2.0, 4.0, 0.0, 12.0, 6.0, 0.0], &[1.0, 1.0, 0.0]).unwrap();
        assert_eq!(gt.forward(0.0, 0.0), Point::new(10.0, 10.0));

        assert!(GeoTransform::from_tiepoint_and_scale(&[0.0; 5], &[1.0, 1.0]).is_none());
    }

    #[test]
    fn test_model_transformation() {
        let m = [2.0, 0.0, 0.0, 100.0, 0.0, -3.0, 0.0, 50.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        let gt = GeoTransform::from_model_transformation(&m).unwrap();
        assert_eq!(gt.forward(1.0, 1.0), Point::new(102.0, 47.0));
    }

    #[test]
    fn test_inverse_round_trip() {
        let gt = GeoTransform::new(0.5, 0.1, 100.0, 0.2, -0.5, 50.0);
        let p = gt.forward(3.0, 7.0);
        let (col, row) = gt.inverse(p.x, p.y).unwrap();
        assert!((col - 3.0).abs() < 1e-9);
        assert!((row - 7.0).abs() < 1e-9);

        assert!(GeoTransform::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0).invert().is_none());
    }

    #[test]
    fn test_bounds_and_half_pixel_shift() {
        let gt = one_degree_grid();
        let b = gt.bounds(10, 10);
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (0.0, 0.0, 10.0, 10.0));

        let shifted = gt.translated_pixels(-0.5, -0.5);
        assert_eq!(shifted.c, -0.5);
        assert_eq!(shifted.f, 10.5);
        assert_eq!(gt.pixel_center(0, 0), Point::new(0.5, 9.5));
    }
}
