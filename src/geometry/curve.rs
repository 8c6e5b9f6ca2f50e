//! Curve primitives - points, image sizes and the traced curve itself

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A point in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate (grows downward)
    pub y: f64,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// `(self.x - from.x, self.y - from.y)`
    #[must_use]
    pub fn delta(self, from: Self) -> (f64, f64) {
        (self.x - from.x, self.y - from.y)
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let (dx, dy) = other.delta(self);
        dx.hypot(dy)
    }

    /// Both coordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Pixel dimensions of the image a curve was drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl ImageSize {
    /// Create an image size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Longer side, used to normalize arc length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if either side is zero.
    pub fn max_side(&self) -> Result<u32> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidInput(format!(
                "image size {}x{} has a zero side",
                self.width, self.height
            )));
        }
        Ok(self.width.max(self.height))
    }
}

/// The four palm lines a curve can be labelled as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveType {
    /// Life line
    Life,
    /// Heart line
    Heart,
    /// Head line
    Head,
    /// Fate line
    Fate,
}

impl CurveType {
    /// Every curve type, in annotation-tool order.
    pub const ALL: [Self; 4] = [Self::Life, Self::Heart, Self::Head, Self::Fate];

    /// Lowercase name as used in annotations and requests.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Life => "life",
            Self::Heart => "heart",
            Self::Head => "head",
            Self::Fate => "fate",
        }
    }
}

impl fmt::Display for CurveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurveType {
    type Err = Error;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == name)
            .ok_or_else(|| Error::invalid_category("curve_type", s))
    }
}

/// An annotated palm-line trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    points: Vec<Point>,
    label: CurveType,
    image: ImageSize,
}

impl Curve {
    /// Create a curve from an ordered, non-empty point list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `points` is empty.
    pub fn new(points: Vec<Point>, label: CurveType, image: ImageSize) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::InvalidInput(format!(
                "{label} curve has no points"
            )));
        }
        Ok(Self {
            points,
            label,
            image,
        })
    }

    /// Degenerate two-point curve from a rectangle's corners.
    ///
    /// Used when an annotation carries only `[x, y, w, h]`.
    #[must_use]
    pub fn from_rect(rect: [f64; 4], label: CurveType, image: ImageSize) -> Self {
        let [x, y, w, h] = rect;
        Self {
            points: vec![Point::new(x, y), Point::new(x + w, y + h)],
            label,
            image,
        }
    }

    /// Ordered trace.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Curve label.
    #[must_use]
    pub const fn label(&self) -> CurveType {
        self.label
    }

    /// Source image size.
    #[must_use]
    pub const fn image(&self) -> ImageSize {
        self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_type_parse() {
        assert_eq!("life".parse::<CurveType>().unwrap(), CurveType::Life);
        assert_eq!(" Heart ".parse::<CurveType>().unwrap(), CurveType::Heart);
        assert_eq!("FATE".parse::<CurveType>().unwrap(), CurveType::Fate);
    }

    #[test]
    fn test_curve_type_rejects_unknown() {
        let err = "sun".parse::<CurveType>().unwrap_err();
        assert!(matches!(err, Error::InvalidCategory { ref value, .. } if value == "sun"));
    }

    #[test]
    fn test_curve_type_serde_lowercase() {
        let json = serde_json::to_string(&CurveType::Head).unwrap();
        assert_eq!(json, "\"head\"");
        let back: CurveType = serde_json::from_str("\"fate\"").unwrap();
        assert_eq!(back, CurveType::Fate);
    }

    #[test]
    fn test_curve_requires_points() {
        assert!(Curve::new(vec![], CurveType::Life, ImageSize::new(10, 10)).is_err());
    }

    #[test]
    fn test_curve_from_rect() {
        let curve = Curve::from_rect([2.0, 3.0, 10.0, 5.0], CurveType::Head, ImageSize::new(64, 64));
        assert_eq!(curve.points(), &[Point::new(2.0, 3.0), Point::new(12.0, 8.0)]);
        assert_eq!(curve.label(), CurveType::Head);
    }

    #[test]
    fn test_point_distance() {
        assert!((Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)) - 5.0).abs() < 1e-12);
    }
}
