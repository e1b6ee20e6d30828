//! Masked 2-D arrays

use ndarray::{Array2, Zip};

use super::nodata::NodataPolicy;

/// Pixel values with a mask of pixels that carry no measurement
///
/// `mask[[r, c]]` is true where the value is nodata. Values under the mask
/// keep whatever the raster stored there.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedArray {
    pub data: Array2<f64>,
    pub mask: Array2<bool>,
}

impl MaskedArray {
    /// Mask the NaN and nodata pixels of an array
    pub fn from_nodata(data: Array2<f64>, nodata: Option<f64>, policy: &NodataPolicy) -> Self {
        let mask = data.mapv(|v| policy.is_masked(v, nodata));
        MaskedArray { data, mask }
    }

    /// (rows, cols)
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Whether every pixel is masked (true for an empty array)
    pub fn all_masked(&self) -> bool {
        self.mask.iter().all(|&m| m)
    }

    pub fn count_valid(&self) -> usize {
        self.mask.iter().filter(|&&m| !m).count()
    }

    /// Plain array with masked pixels replaced by `fill`
    pub fn filled(&self, fill: f64) -> Array2<f64> {
        let mut out = self.data.clone();
        Zip::from(&mut out).and(&self.mask).for_each(|v, &m| {
            if m {
                *v = fill;
            }
        });
        out
    }

    /// Unmasked values in row-major order
    pub fn compressed(&self) -> Vec<f64> {
        self.data.iter()
            .zip(self.mask.iter())
            .filter(|(_, &m)| !m)
            .map(|(&v, _)| v)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_mask_and_fill() {
        let data = array![[1.0, -9999.0], [f64::NAN, 4.0]];
        let masked = MaskedArray::from_nodata(data, Some(-9999.0), &NodataPolicy::default());

        assert_eq!(masked.mask, array![[false, true], [true, false]]);
        assert_eq!(masked.count_valid(), 2);
        assert!(!masked.all_masked());
        assert_eq!(masked.compressed(), vec![1.0, 4.0]);

        let filled = masked.filled(f64::NAN);
        assert_eq!(filled[[0, 0]], 1.0);
        assert!(filled[[0, 1]].is_nan());
        assert!(filled[[1, 0]].is_nan());
    }

    #[test]
    fn test_all_masked() {
        let data = Array2::from_elem((2, 3), -9999.0);
        let masked = MaskedArray::from_nodata(data, Some(-9999.0), &NodataPolicy::default());
        assert!(masked.all_masked());
        assert_eq!(masked.dim(), (2, 3));
    }
}
