//! Nodata matching
//!
//! Sentinels are compared with a tolerance: float rasters often store a
//! sentinel such as -3.4e38 that does not survive an f32 round trip exactly.

/// Tolerance used to decide whether a value is the nodata sentinel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodataPolicy {
    /// Relative tolerance, scaled by the sentinel's magnitude
    pub rtol: f64,
    /// Absolute tolerance
    pub atol: f64,
}

impl Default for NodataPolicy {
    fn default() -> Self {
        NodataPolicy { rtol: 1e-5, atol: 1e-8 }
    }
}

impl NodataPolicy {
    pub fn new(rtol: f64, atol: f64) -> Self {
        NodataPolicy { rtol, atol }
    }

    /// Whether `value` matches the sentinel
    ///
    /// A NaN sentinel matches NaN values only.
    pub fn is_nodata(&self, value: f64, nodata: f64) -> bool {
        if nodata.is_nan() {
            return value.is_nan();
        }
        if value == nodata {
            return true;
        }
        (value - nodata).abs() <= self.atol + self.rtol * nodata.abs()
    }

    /// Whether a pixel carries no measurement: NaN, or the sentinel if any
    pub fn is_masked(&self, value: f64, nodata: Option<f64>) -> bool {
        value.is_nan() || nodata.map_or(false, |n| self.is_nodata(value, n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_tolerance() {
        let policy = NodataPolicy::default();
        assert!(policy.is_nodata(-9999.0, -9999.0));
        assert!(policy.is_nodata(-9999.05, -9999.0));
        assert!(!policy.is_nodata(-9998.0, -9999.0));
        assert!(policy.is_nodata(-3.4028234663852886e38, -3.4028235e38));
        assert!(!policy.is_nodata(0.0, 0.5));
    }

    #[test]
    fn test_nan_handling() {
        let policy = NodataPolicy::default();
        assert!(policy.is_nodata(f64::NAN, f64::NAN));
        assert!(!policy.is_nodata(1.0, f64::NAN));
        assert!(policy.is_masked(f64::NAN, None));
        assert!(policy.is_masked(f64::NAN, Some(-9999.0)));
        assert!(!policy.is_masked(15.5, Some(-9999.0)));
        assert!(!policy.is_masked(-9999.0, None));
    }
}
