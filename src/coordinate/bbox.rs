//! Bounding box structure for spatial extents

use std::fmt;

use super::point::Point;

/// An axis-aligned bounding box in a coordinate system
///
/// Also used for raster bounds, where `min_x`/`min_y`/`max_x`/`max_y` are the
/// left/bottom/right/top edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum X coordinate (west / left)
    pub min_x: f64,
    /// Minimum Y coordinate (south / bottom)
    pub min_y: f64,
    /// Maximum X coordinate (east / right)
    pub max_x: f64,
    /// Maximum Y coordinate (north / top)
    pub max_y: f64,
    /// EPSG code of the coordinate system
    pub epsg: Option<u32>,
}

impl BoundingBox {
    /// Create a new bounding box
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
            epsg: None,
        }
    }

    /// Create a new bounding box with coordinate system
    pub fn new_with_crs(min_x: f64, min_y: f64, max_x: f64, max_y: f64, epsg: u32) -> Self {
        BoundingBox {
            epsg: Some(epsg),
            ..BoundingBox::new(min_x, min_y, max_x, max_y)
        }
    }

    /// Create a geographic box from (south, west, north, east) in degrees
    pub fn from_swne(south: f64, west: f64, north: f64, east: f64) -> Self {
        BoundingBox::new_with_crs(west, south, east, north, 4326)
    }

    /// Parse a geographic box from "south,west,north,east"
    pub fn parse_swne(bbox_str: &str) -> Result<Self, String> {
        let parts: Vec<&str> = bbox_str.split(',').collect();
        if parts.len() != 4 {
            return Err("Bounding box must have 4 comma-separated values: south,west,north,east".to_string());
        }

        let names = ["south", "west", "north", "east"];
        let mut values = [0.0f64; 4];
        for (i, part) in parts.iter().enumerate() {
            values[i] = part.trim().parse::<f64>()
                .map_err(|_| format!("Invalid {} value: {:?}", names[i], part.trim()))?;
        }

        Ok(BoundingBox::from_swne(values[0], values[1], values[2], values[3]))
    }

    /// The box as (south, west, north, east)
    pub fn to_swne(&self) -> [f64; 4] {
        [self.min_y, self.min_x, self.max_y, self.max_x]
    }

    /// Smallest box containing all the given points, None for no finite point
    pub fn from_points<I: IntoIterator<Item = Point>>(points: I) -> Option<Self> {
        let mut bbox: Option<BoundingBox> = None;
        for p in points.into_iter().filter(Point::is_finite) {
            bbox = Some(match bbox {
                None => BoundingBox::new(p.x, p.y, p.x, p.y),
                Some(b) => BoundingBox::new(b.min_x.min(p.x), b.min_y.min(p.y), b.max_x.max(p.x), b.max_y.max(p.y)),
            });
        }
        bbox
    }

    /// Get the width of the bounding box
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Get the height of the bounding box
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Get the center point of the bounding box
    pub fn center(&self) -> Point {
        Point::new(
            self.min_x + self.width() / 2.0,
            self.min_y + self.height() / 2.0,
        )
    }

    /// Check if this bounding box contains a point (edges included)
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.min_x && point.x <= self.max_x &&
            point.y >= self.min_y && point.y <= self.max_y
    }

    /// Whether two boxes touch or overlap
    ///
    /// Boxes sharing only an edge count as intersecting.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        !(other.max_x < self.min_x || other.min_x > self.max_x ||
            other.max_y < self.min_y || other.min_y > self.max_y)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoundingBox(left={}, bottom={}, right={}, top={})",
               self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_swne() {
        let bbox = BoundingBox::parse_swne("1.5, 2, 3.5, 4").unwrap();
        assert_eq!(bbox.min_y, 1.5);
        assert_eq!(bbox.min_x, 2.0);
        assert_eq!(bbox.max_y, 3.5);
        assert_eq!(bbox.max_x, 4.0);
        assert_eq!(bbox.to_swne(), [1.5, 2.0, 3.5, 4.0]);

        assert!(BoundingBox::parse_swne("1,2,3").is_err());
        assert!(BoundingBox::parse_swne("1,2,x,4").is_err());
    }

    #[test]
    fn test_intersects_edges() {
        let raster = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(raster.intersects(&BoundingBox::from_swne(2.0, 2.0, 3.0, 3.0)));
        assert!(raster.intersects(&BoundingBox::from_swne(10.0, 10.0, 12.0, 12.0)));
        assert!(!raster.intersects(&BoundingBox::from_swne(20.0, 20.0, 21.0, 21.0)));
        assert!(!raster.intersects(&BoundingBox::from_swne(-5.0, -5.0, -1.0, -1.0)));
    }

    #[test]
    fn test_from_points_skips_non_finite() {
        let pts = vec![Point::new(1.0, 5.0), Point::new(f64::NAN, 0.0), Point::new(-2.0, 3.0)];
        let bbox = BoundingBox::from_points(pts).unwrap();
        assert_eq!((bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y), (-2.0, 3.0, 1.0, 5.0));
        assert!(BoundingBox::from_points(Vec::new()).is_none());
    }
}
