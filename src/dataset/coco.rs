//! COCO-style annotation export
//!
//! Only the fields the extractor reads are modelled; anything else in the file
//! is ignored.

use crate::breaks::ImageId;
use crate::geometry::{CurveType, ImageSize, Point};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Top-level annotation document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CocoDataset {
    /// Source images
    #[serde(default)]
    pub images: Vec<CocoImage>,
    /// Curve annotations
    #[serde(default)]
    pub annotations: Vec<CocoAnnotation>,
    /// Label categories
    #[serde(default)]
    pub categories: Vec<CocoCategory>,
}

impl CocoDataset {
    /// Parse an annotation document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] on malformed input.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load an annotation file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the file cannot be opened and
    /// [`crate::Error::Json`] on malformed input.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// One source image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CocoImage {
    /// Image id
    pub id: ImageId,
    /// File name relative to the export directory
    #[serde(default)]
    pub file_name: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl CocoImage {
    /// Pixel dimensions.
    #[must_use]
    pub const fn size(&self) -> ImageSize {
        ImageSize::new(self.width, self.height)
    }
}

/// One label category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CocoCategory {
    /// Category id
    pub id: u64,
    /// Category name (matched case-insensitively against curve types)
    pub name: String,
}

impl CocoCategory {
    /// Curve type named by this category, if any.
    #[must_use]
    pub fn curve_type(&self) -> Option<CurveType> {
        self.name.parse().ok()
    }
}

/// Polygon segmentation: either a list of flat polygons or one flat polygon.
/// Run-length masks are accepted but carry no usable trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segmentation {
    /// `[[x0, y0, x1, y1, ...], ...]`
    Polygons(Vec<Vec<f64>>),
    /// `[x0, y0, x1, y1, ...]`
    Flat(Vec<f64>),
    /// Anything else (e.g. RLE)
    Other(serde_json::Value),
}

impl Default for Segmentation {
    fn default() -> Self {
        Self::Flat(Vec::new())
    }
}

impl Segmentation {
    /// Ordered points of the first polygon; a trailing odd coordinate is
    /// dropped.
    #[must_use]
    pub fn points(&self) -> Vec<Point> {
        let flat: &[f64] = match self {
            Self::Polygons(polys) => polys.first().map(Vec::as_slice).unwrap_or(&[]),
            Self::Flat(coords) => coords,
            Self::Other(_) => &[],
        };
        flat.chunks_exact(2).map(|xy| Point::new(xy[0], xy[1])).collect()
    }
}

/// One annotated segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CocoAnnotation {
    /// Annotation id
    pub id: u64,
    /// Image this segment was drawn on
    pub image_id: ImageId,
    /// Category id
    pub category_id: u64,
    /// Traced polyline
    #[serde(default)]
    pub segmentation: Segmentation,
    /// `[x, y, w, h]` rectangle
    #[serde(default)]
    pub bbox: Option<[f64; 4]>,
}

impl CocoAnnotation {
    /// The traced points, or the rectangle's two corners when no trace exists.
    ///
    /// `None` if the annotation has neither.
    #[must_use]
    pub fn points(&self) -> Option<Vec<Point>> {
        let traced = self.segmentation.points();
        if !traced.is_empty() {
            return Some(traced);
        }
        self.bbox
            .map(|[x, y, w, h]| vec![Point::new(x, y), Point::new(x + w, y + h)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_polygon_points() {
        let seg: Segmentation = serde_json::from_str("[[1, 2, 3, 4, 5, 6], [9, 9]]").unwrap();
        assert_eq!(
            seg.points(),
            vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0), Point::new(5.0, 6.0)]
        );
    }

    #[test]
    fn test_flat_polygon_points() {
        let seg: Segmentation = serde_json::from_str("[1.5, 2.5, 3.5, 4.5, 7.0]").unwrap();
        assert_eq!(seg.points(), vec![Point::new(1.5, 2.5), Point::new(3.5, 4.5)]);
    }

    #[test]
    fn test_rle_has_no_points() {
        let seg: Segmentation =
            serde_json::from_str(r#"{ "counts": [1, 2], "size": [4, 4] }"#).unwrap();
        assert!(seg.points().is_empty());
    }

    #[test]
    fn test_bbox_fallback() {
        let ann: CocoAnnotation = serde_json::from_str(
            r#"{ "id": 1, "image_id": 2, "category_id": 3, "segmentation": [], "bbox": [10, 20, 30, 40] }"#,
        )
        .unwrap();
        assert_eq!(
            ann.points(),
            Some(vec![Point::new(10.0, 20.0), Point::new(40.0, 60.0)])
        );
    }

    #[test]
    fn test_no_geometry() {
        let ann: CocoAnnotation =
            serde_json::from_str(r#"{ "id": 1, "image_id": 2, "category_id": 3 }"#).unwrap();
        assert_eq!(ann.points(), None);
    }

    #[test]
    fn test_category_curve_type() {
        let cat = CocoCategory {
            id: 1,
            name: "Heart".to_string(),
        };
        assert_eq!(cat.curve_type(), Some(CurveType::Heart));
        let other = CocoCategory {
            id: 2,
            name: "palm".to_string(),
        };
        assert_eq!(other.curve_type(), None);
    }
}
