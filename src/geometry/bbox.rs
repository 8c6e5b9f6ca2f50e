//! Padded crop region around a curve

use super::{ImageSize, Point};
use serde::{Deserialize, Serialize};

/// Half-open pixel rectangle `[x1, x2) x [y1, y2)` inside the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge (inclusive)
    pub x1: u32,
    /// Top edge (inclusive)
    pub y1: u32,
    /// Right edge (exclusive)
    pub x2: u32,
    /// Bottom edge (exclusive)
    pub y2: u32,
}

impl BoundingBox {
    /// Axis-aligned box around `points`, each side pushed out by `padding`
    /// times that axis' extent, clamped to the image and truncated to whole
    /// pixels.
    ///
    /// Callers guarantee `points` is non-empty and finite.
    #[must_use]
    pub(crate) fn around(points: &[Point], image: ImageSize, padding: f64) -> Self {
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        let pad_x = (max_x - min_x) * padding;
        let pad_y = (max_y - min_y) * padding;
        let width = f64::from(image.width);
        let height = f64::from(image.height);

        Self {
            x1: truncate((min_x - pad_x).clamp(0.0, width)),
            y1: truncate((min_y - pad_y).clamp(0.0, height)),
            x2: truncate((max_x + pad_x).clamp(0.0, width)),
            y2: truncate((max_y + pad_y).clamp(0.0, height)),
        }
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }

    /// True when the box covers no pixel.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

// value is already clamped into [0, u32::MAX]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn truncate(value: f64) -> u32 {
    value.trunc() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<Point> {
        raw.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn test_padding_expands_each_side() {
        let bbox = BoundingBox::around(
            &pts(&[(100.0, 100.0), (200.0, 140.0)]),
            ImageSize::new(500, 500),
            0.15,
        );
        // pad_x = 15, pad_y = 6
        assert_eq!(bbox, BoundingBox { x1: 85, y1: 94, x2: 215, y2: 146 });
    }

    #[test]
    fn test_clamped_to_image() {
        let bbox = BoundingBox::around(
            &pts(&[(2.0, 5.0), (98.0, 99.0)]),
            ImageSize::new(100, 100),
            0.15,
        );
        assert_eq!(bbox, BoundingBox { x1: 0, y1: 0, x2: 100, y2: 100 });
    }

    #[test]
    fn test_truncates_fractional_edges() {
        let bbox = BoundingBox::around(
            &pts(&[(10.7, 20.2), (30.9, 40.6)]),
            ImageSize::new(100, 100),
            0.0,
        );
        assert_eq!(bbox, BoundingBox { x1: 10, y1: 20, x2: 30, y2: 40 });
    }

    #[test]
    fn test_points_outside_image_stay_inside() {
        let bbox = BoundingBox::around(
            &pts(&[(-20.0, -5.0), (150.0, 300.0)]),
            ImageSize::new(120, 200),
            0.15,
        );
        assert_eq!(bbox, BoundingBox { x1: 0, y1: 0, x2: 120, y2: 200 });
        assert_eq!(bbox.width(), 120);
    }

    #[test]
    fn test_single_point_is_empty() {
        let bbox = BoundingBox::around(&pts(&[(7.0, 7.0)]), ImageSize::new(10, 10), 0.15);
        assert!(bbox.is_empty());
    }
}
