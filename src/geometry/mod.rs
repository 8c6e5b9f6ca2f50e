//! Curve geometry: traced palm lines and the metrics measured from them
//!
//! A curve is an ordered trace in source-image pixel space. Three continuous
//! metrics are measured from it:
//!
//! - `length_norm`: polyline arc length divided by the longer image side
//! - `slope_deg`: mean direction angle of the non-degenerate segments
//! - `curv_deg`: mean turning angle at the interior vertices
//!
//! ## Example
//!
//! ```rust
//! use palmline::geometry::{GeometryExtractor, ImageSize, Point};
//!
//! # fn main() -> palmline::Result<()> {
//! let extractor = GeometryExtractor::default();
//! let points = [Point::new(0.0, 0.0), Point::new(40.0, 0.0)];
//! let shape = extractor.measure(&points, ImageSize::new(100, 100))?;
//! assert!((shape.length_norm - 0.40).abs() < 1e-12);
//! assert_eq!(shape.slope_deg, 0.0);
//! # Ok(())
//! # }
//! ```

mod bbox;
mod curve;

pub use bbox::BoundingBox;
pub use curve::{Curve, CurveType, ImageSize, Point};

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Continuous shape metrics of one curve, before the break count is known.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeMetrics {
    /// Arc length divided by `max(width, height)`
    pub length_norm: f64,
    /// Mean segment direction in degrees, `(-180, 180]`
    pub slope_deg: f64,
    /// Mean turning angle in degrees, `[0, 180]`
    pub curv_deg: f64,
}

/// Full metric set of one curve: shape plus the tallied break count.
///
/// Immutable once built; see [`crate::breaks::BreakTally`] for where `breaks`
/// comes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometricMetrics {
    length_norm: f64,
    slope_deg: f64,
    curv_deg: f64,
    breaks: u32,
}

impl GeometricMetrics {
    /// Combine shape metrics with a break count.
    #[must_use]
    pub const fn new(shape: ShapeMetrics, breaks: u32) -> Self {
        Self {
            length_norm: shape.length_norm,
            slope_deg: shape.slope_deg,
            curv_deg: shape.curv_deg,
            breaks,
        }
    }

    /// Normalized arc length.
    #[must_use]
    pub const fn length_norm(&self) -> f64 {
        self.length_norm
    }

    /// Mean direction angle in degrees.
    #[must_use]
    pub const fn slope_deg(&self) -> f64 {
        self.slope_deg
    }

    /// Mean turning angle in degrees.
    #[must_use]
    pub const fn curv_deg(&self) -> f64 {
        self.curv_deg
    }

    /// Number of breaks (extra segments sharing the label on the same image).
    #[must_use]
    pub const fn breaks(&self) -> u32 {
        self.breaks
    }
}

/// Measures [`ShapeMetrics`] and padded crop regions from point sequences.
///
/// Stateless apart from the padding fraction, so one extractor can be shared
/// across threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryExtractor {
    padding: f64,
}

impl Default for GeometryExtractor {
    fn default() -> Self {
        Self {
            padding: Self::DEFAULT_PADDING,
        }
    }
}

impl GeometryExtractor {
    /// Fraction of each bounding-box side added on both ends of that side.
    pub const DEFAULT_PADDING: f64 = 0.15;

    /// Create an extractor with a custom padding fraction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `padding` is negative or not finite.
    pub fn new(padding: f64) -> Result<Self> {
        if !padding.is_finite() || padding < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "padding must be a finite non-negative fraction, got {padding}"
            )));
        }
        Ok(Self { padding })
    }

    /// Padding fraction used by [`bounding_box`](Self::bounding_box).
    #[must_use]
    pub const fn padding(&self) -> f64 {
        self.padding
    }

    /// Measure length, slope and curvature of a point sequence.
    ///
    /// One point gives all-zero metrics; two points give zero curvature.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `points` is empty, contains a
    /// non-finite coordinate, or the image has a zero-sized side.
    pub fn measure(&self, points: &[Point], image: ImageSize) -> Result<ShapeMetrics> {
        validate_points(points)?;
        let max_side = image.max_side()?;

        let shape = ShapeMetrics {
            length_norm: polyline_length(points) / f64::from(max_side),
            slope_deg: average_slope_deg(points),
            curv_deg: average_curvature_deg(points),
        };
        debug!(
            points = points.len(),
            length_norm = shape.length_norm,
            slope_deg = shape.slope_deg,
            curv_deg = shape.curv_deg,
            "measured curve"
        );
        Ok(shape)
    }

    /// Measure a [`Curve`] against its own source image size.
    ///
    /// # Errors
    ///
    /// Same conditions as [`measure`](Self::measure).
    pub fn measure_curve(&self, curve: &Curve) -> Result<ShapeMetrics> {
        self.measure(curve.points(), curve.image())
    }

    /// Padded, image-clamped crop region around the points.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] under the same conditions as
    /// [`measure`](Self::measure).
    pub fn bounding_box(&self, points: &[Point], image: ImageSize) -> Result<BoundingBox> {
        validate_points(points)?;
        image.max_side()?;
        Ok(BoundingBox::around(points, image, self.padding))
    }
}

fn validate_points(points: &[Point]) -> Result<()> {
    if points.is_empty() {
        return Err(Error::InvalidInput(
            "point sequence is empty; supply a fallback rectangle instead".to_string(),
        ));
    }
    if let Some(p) = points.iter().find(|p| !p.is_finite()) {
        return Err(Error::InvalidInput(format!(
            "non-finite point coordinate ({}, {})",
            p.x, p.y
        )));
    }
    Ok(())
}

/// Sum of Euclidean distances between consecutive points.
#[must_use]
pub fn polyline_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Mean `atan2(dy, dx)` in degrees over segments with nonzero displacement.
///
/// Zero-length segments are left out of the mean; if every segment is
/// zero-length (or there is no segment) the result is `0.0`.
#[must_use]
pub fn average_slope_deg(points: &[Point]) -> f64 {
    mean(points.windows(2).filter_map(|w| {
        let (dx, dy) = w[1].delta(w[0]);
        if dx == 0.0 && dy == 0.0 {
            None
        } else {
            Some(dy.atan2(dx).to_degrees())
        }
    }))
}

/// Mean turning angle in degrees at interior vertices.
///
/// At vertex `b` between `a` and `c` the angle is taken between `b - a` and
/// `c - b`, so a straight run contributes 0 and a right-angle turn 90.
/// Vertices with a zero-length neighbouring segment are left out.
#[must_use]
pub fn average_curvature_deg(points: &[Point]) -> f64 {
    mean(points.windows(3).filter_map(|w| {
        let (v1x, v1y) = w[1].delta(w[0]);
        let (v2x, v2y) = w[2].delta(w[1]);
        let n1 = v1x.hypot(v1y);
        let n2 = v2x.hypot(v2y);
        if n1 == 0.0 || n2 == 0.0 {
            return None;
        }
        let cos = ((v1x * v2x + v1y * v2y) / (n1 * n2)).clamp(-1.0, 1.0);
        Some(cos.acos().to_degrees())
    }))
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
