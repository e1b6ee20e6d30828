//! Coordinate handling for geospatial data
//!
//! Points and bounding boxes, the affine pixel/world mapping, pixel windows,
//! CRS identification and CRS-to-CRS point transformation.

mod bbox;
mod point;
mod transform;
mod crs;
mod geotransform;
mod window;

pub use self::bbox::BoundingBox;
pub use self::point::Point;
pub use self::transform::{CoordinateTransformer, CrsError};
pub use self::crs::{CoordinateSystem, CoordinateSystemFactory};
pub use self::geotransform::GeoTransform;
pub use self::window::Window;
