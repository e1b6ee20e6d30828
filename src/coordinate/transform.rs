//! Coordinate transformation between EPSG coordinate systems
//!
//! Backed by proj4rs with definitions from crs-definitions. Only the static
//! definition strings are stored; `Proj` objects are built per call so the
//! transformer can be shared across threads.

use log::trace;
use proj4rs::proj::Proj;
use thiserror::Error;

use super::bbox::BoundingBox;
use super::crs::CoordinateSystem;
use super::point::Point;
use crate::tiff::errors::TiffError;

/// A CRS that cannot be used for transformation
#[derive(Debug, Clone, Error)]
#[error("Unsupported CRS EPSG:{epsg}: {reason}")]
pub struct CrsError {
    pub epsg: u32,
    pub reason: String,
}

impl From<CrsError> for TiffError {
    fn from(err: CrsError) -> Self {
        TiffError::GenericError(err.to_string())
    }
}

/// Transformer for converting points from one coordinate system to another
#[derive(Debug, Clone)]
pub struct CoordinateTransformer {
    source: CoordinateSystem,
    target: CoordinateSystem,
    source_def: &'static str,
    target_def: &'static str,
}

impl CoordinateTransformer {
    /// Create a transformer, failing when either code is missing from the EPSG database
    pub fn new(source: CoordinateSystem, target: CoordinateSystem) -> Result<Self, CrsError> {
        let source_def = Self::definition(&source)?;
        let target_def = Self::definition(&target)?;

        // Parse once up front so a malformed definition surfaces here, not mid-read.
        Self::build(&source, source_def)?;
        Self::build(&target, target_def)?;

        Ok(CoordinateTransformer { source, target, source_def, target_def })
    }

    fn definition(crs: &CoordinateSystem) -> Result<&'static str, CrsError> {
        crs.proj_string().ok_or_else(|| CrsError {
            epsg: crs.epsg_code(),
            reason: "not in the EPSG definition database".to_string(),
        })
    }

    fn build(crs: &CoordinateSystem, def: &str) -> Result<Proj, CrsError> {
        Proj::from_proj_string(def).map_err(|e| CrsError {
            epsg: crs.epsg_code(),
            reason: format!("invalid projection definition: {:?}", e),
        })
    }

    /// Source coordinate system
    pub fn source(&self) -> CoordinateSystem {
        self.source
    }

    /// Target coordinate system
    pub fn target(&self) -> CoordinateSystem {
        self.target
    }

    /// The transformer for the opposite direction
    pub fn inverse(&self) -> Self {
        CoordinateTransformer {
            source: self.target,
            target: self.source,
            source_def: self.target_def,
            target_def: self.source_def,
        }
    }

    /// Transform one point
    ///
    /// # Returns
    /// The transformed point, or None when the point is outside the projection's domain
    pub fn transform_point(&self, point: &Point) -> Result<Option<Point>, CrsError> {
        Ok(self.transform_points(std::slice::from_ref(point))?.pop().flatten())
    }

    /// Transform a batch of points, building the projections once
    ///
    /// Points that fail to project, or project to non-finite values, come back as None.
    pub fn transform_points(&self, points: &[Point]) -> Result<Vec<Option<Point>>, CrsError> {
        if self.source == self.target {
            return Ok(points.iter().map(|p| Some(*p)).collect());
        }

        let source_proj = Self::build(&self.source, self.source_def)?;
        let target_proj = Self::build(&self.target, self.target_def)?;
        let source_geographic = self.source.is_geographic();
        let target_geographic = self.target.is_geographic();

        let projected = points.iter()
            .map(|p| {
                let mut xyz = if source_geographic {
                    (p.x.to_radians(), p.y.to_radians(), 0.0)
                } else {
                    (p.x, p.y, 0.0)
                };

                if let Err(e) = proj4rs::transform::transform(&source_proj, &target_proj, &mut xyz) {
                    trace!("Point {} failed to project from {} to {}: {:?}", p, self.source, self.target, e);
                    return None;
                }

                let out = if target_geographic {
                    Point::new(xyz.0.to_degrees(), xyz.1.to_degrees())
                } else {
                    Point::new(xyz.0, xyz.1)
                };
                out.is_finite().then_some(out)
            })
            .collect();

        Ok(projected)
    }

    /// Transform a bounding box by densifying its edges
    ///
    /// Each edge is sampled at `points_per_edge` positions, so curved edges in the
    /// target system are covered. Returns None if no sample projects.
    pub fn transform_bbox(&self, bbox: &BoundingBox, points_per_edge: usize) -> Result<Option<BoundingBox>, CrsError> {
        let n = points_per_edge.max(2);
        let mut samples = Vec::with_capacity(4 * n);
        for i in 0..n {
            let t = i as f64 / (n - 1) as f64;
            let x = bbox.min_x + t * bbox.width();
            let y = bbox.min_y + t * bbox.height();
            samples.push(Point::new(x, bbox.min_y));
            samples.push(Point::new(x, bbox.max_y));
            samples.push(Point::new(bbox.min_x, y));
            samples.push(Point::new(bbox.max_x, y));
        }

        let projected = self.transform_points(&samples)?;
        Ok(BoundingBox::from_points(projected.into_iter().flatten())
            .map(|b| BoundingBox { epsg: Some(self.target.epsg_code()), ..b }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::CoordinateSystemFactory;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_identity_transform() {
        let t = CoordinateTransformer::new(CoordinateSystem::WGS84, CoordinateSystem::WGS84).unwrap();
        let p = t.transform_point(&Point::new(10.0, 51.5)).unwrap().unwrap();
        assert_eq!(p, Point::new(10.0, 51.5));
    }

    #[test]
    fn test_web_mercator_round_trip() {
        let t = CoordinateTransformer::new(CoordinateSystem::WGS84, CoordinateSystem::WebMercator).unwrap();
        let merc = t.transform_point(&Point::new(10.0, 51.5)).unwrap().unwrap();
        assert!(approx_eq(merc.x, 1_113_194.9, 1.0), "x = {}", merc.x);

        let back = t.inverse().transform_point(&merc).unwrap().unwrap();
        assert!(approx_eq(back.x, 10.0, 1e-6));
        assert!(approx_eq(back.y, 51.5, 1e-6));
    }

    #[test]
    fn test_utm_zone() {
        let utm = CoordinateSystemFactory::from_epsg(32633);
        let t = CoordinateTransformer::new(CoordinateSystem::WGS84, utm).unwrap();
        let p = t.transform_point(&Point::new(15.0, 52.0)).unwrap().unwrap();
        assert!(p.x > 400_000.0 && p.x < 600_000.0);
        assert!(p.y > 5_000_000.0 && p.y < 6_000_000.0);
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        let err = CoordinateTransformer::new(CoordinateSystem::Other(1), CoordinateSystem::WGS84).unwrap_err();
        assert_eq!(err.epsg, 1);
    }

    #[test]
    fn test_transform_bbox_contains_corners() {
        let t = CoordinateTransformer::new(CoordinateSystem::WebMercator, CoordinateSystem::WGS84).unwrap();
        let merc = BoundingBox::new(0.0, 0.0, 1_113_194.9, 1_118_890.0);
        let geo = t.transform_bbox(&merc, 21).unwrap().unwrap();
        assert!(approx_eq(geo.min_x, 0.0, 1e-6));
        assert!(approx_eq(geo.max_x, 10.0, 1e-4));
        assert!(approx_eq(geo.max_y, 10.0, 1e-3));
        assert_eq!(geo.epsg, Some(4326));
    }
}
