//! Offline attribute extraction over an annotation dataset
//!
//! ## Pipeline
//!
//! ```text
//! CocoDataset ──> pass 1: BreakTally over (image, label)
//!             ──> pass 2: per-annotation geometry (parallel) + tallied breaks
//!             ──> Vec<AttributeRecord>  ──> storage::AttributeTable (Parquet)
//!                                       ──> label_records (training targets)
//! ```
//!
//! The tally is complete before any record is produced, so the parallel pass
//! only reads shared state.

mod coco;

pub use coco::{CocoAnnotation, CocoCategory, CocoDataset, CocoImage, Segmentation};

use crate::breaks::{BreakTally, ImageId};
use crate::bucket::{AttributeBucketizer, AttributeBuckets};
use crate::geometry::{BoundingBox, CurveType, GeometricMetrics, GeometryExtractor, ShapeMetrics};
use crate::{Error, Result};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// One row of the attribute table: a cropped annotation and its metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeRecord {
    /// Reference to the crop, `"{label}/{image_id}_{annotation_id}.jpg"`
    pub crop_ref: String,
    /// Curve label
    pub label: CurveType,
    /// Normalized arc length
    pub length_norm: f64,
    /// Mean direction angle in degrees
    pub slope_deg: f64,
    /// Mean turning angle in degrees
    pub curv_deg: f64,
    /// Breaks of this (image, label) pair
    pub breaks: u32,
    /// Padded crop region
    pub crop: BoundingBox,
}

impl AttributeRecord {
    /// Crop reference for an annotation.
    #[must_use]
    pub fn crop_ref_for(label: CurveType, image_id: ImageId, annotation_id: u64) -> String {
        format!("{label}/{image_id}_{annotation_id}.jpg")
    }

    /// Metrics view of this record.
    #[must_use]
    pub const fn metrics(&self) -> GeometricMetrics {
        GeometricMetrics::new(
            ShapeMetrics {
                length_norm: self.length_norm,
                slope_deg: self.slope_deg,
                curv_deg: self.curv_deg,
            },
            self.breaks,
        )
    }
}

/// Training targets of one crop: its label and the four attribute buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingLabels {
    /// Crop reference
    pub crop_ref: String,
    /// Curve-type target
    pub label: CurveType,
    /// Attribute targets
    pub buckets: AttributeBuckets,
}

struct Labelled<'a> {
    annotation: &'a CocoAnnotation,
    label: CurveType,
}

/// Extract one [`AttributeRecord`] per usable annotation, in input order.
///
/// Annotations whose category is not a curve type are ignored. Every
/// remaining annotation counts toward the break tally; those without geometry
/// or with an unknown image are then skipped with a warning.
///
/// # Errors
///
/// Only configuration-level problems are errors; per-annotation problems are
/// logged and skipped.
pub fn extract_records(
    dataset: &CocoDataset,
    extractor: &GeometryExtractor,
) -> Result<Vec<AttributeRecord>> {
    let labels: FxHashMap<u64, CurveType> = dataset
        .categories
        .iter()
        .filter_map(|c| c.curve_type().map(|t| (c.id, t)))
        .collect();
    let images: FxHashMap<ImageId, &CocoImage> =
        dataset.images.iter().map(|im| (im.id, im)).collect();

    let labelled: Vec<Labelled<'_>> = dataset
        .annotations
        .iter()
        .filter_map(|annotation| {
            let label = labels.get(&annotation.category_id).copied();
            if label.is_none() {
                debug!(annotation = annotation.id, "category is not a curve type");
            }
            label.map(|label| Labelled { annotation, label })
        })
        .collect();

    // pass 1
    let tally =
        BreakTally::from_annotations(labelled.iter().map(|l| (l.annotation.image_id, l.label)));

    // pass 2
    let records: Vec<AttributeRecord> = labelled
        .par_iter()
        .filter_map(|l| match extract_one(l, &images, &tally, extractor) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(annotation = l.annotation.id, error = %e, "skipping annotation");
                None
            }
        })
        .collect();

    info!(
        annotations = dataset.annotations.len(),
        labelled = labelled.len(),
        records = records.len(),
        "extracted attribute records"
    );
    Ok(records)
}

fn extract_one(
    l: &Labelled<'_>,
    images: &FxHashMap<ImageId, &CocoImage>,
    tally: &BreakTally,
    extractor: &GeometryExtractor,
) -> Result<AttributeRecord> {
    let ann = l.annotation;
    let image = images
        .get(&ann.image_id)
        .ok_or_else(|| Error::InvalidInput(format!("unknown image id {}", ann.image_id)))?;
    let points = ann
        .points()
        .ok_or_else(|| Error::InvalidInput("no segmentation and no bbox".to_string()))?;

    let size = image.size();
    let shape = extractor.measure(&points, size)?;
    let crop = extractor.bounding_box(&points, size)?;
    let breaks = tally.breaks(ann.image_id, l.label).unwrap_or(0);

    Ok(AttributeRecord {
        crop_ref: AttributeRecord::crop_ref_for(l.label, ann.image_id, ann.id),
        label: l.label,
        length_norm: shape.length_norm,
        slope_deg: shape.slope_deg,
        curv_deg: shape.curv_deg,
        breaks,
        crop,
    })
}

/// Join crop references against the attribute table and bucket each match.
///
/// References with no record are skipped with a warning; the join is not
/// expected to be exhaustive.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if a joined record has a NaN metric.
pub fn label_records<S: AsRef<str>>(
    crop_refs: &[S],
    records: &[AttributeRecord],
    bucketizer: &AttributeBucketizer,
) -> Result<Vec<TrainingLabels>> {
    let by_ref: FxHashMap<&str, &AttributeRecord> =
        records.iter().map(|r| (r.crop_ref.as_str(), r)).collect();

    let mut labels = Vec::with_capacity(crop_refs.len());
    for crop_ref in crop_refs {
        let crop_ref = crop_ref.as_ref();
        let Some(record) = by_ref.get(crop_ref) else {
            warn!(crop_ref, "no attribute record for crop");
            continue;
        };
        labels.push(TrainingLabels {
            crop_ref: crop_ref.to_string(),
            label: record.label,
            buckets: bucketizer.bucketize(&record.metrics())?,
        });
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> CocoDataset {
        CocoDataset::from_json_str(
            r#"{
            "images": [
                { "id": 7, "file_name": "a.jpg", "width": 100, "height": 100 },
                { "id": 8, "file_name": "b.jpg", "width": 200, "height": 100 }
            ],
            "categories": [
                { "id": 1, "name": "Fate" },
                { "id": 2, "name": "life" },
                { "id": 3, "name": "palm" }
            ],
            "annotations": [
                { "id": 10, "image_id": 7, "category_id": 1, "segmentation": [[0, 0, 40, 0]] },
                { "id": 11, "image_id": 7, "category_id": 1, "segmentation": [[50, 0, 60, 0]] },
                { "id": 12, "image_id": 7, "category_id": 1, "segmentation": [[70, 0, 80, 0]] },
                { "id": 13, "image_id": 8, "category_id": 2, "segmentation": [], "bbox": [0, 0, 30, 40] },
                { "id": 14, "image_id": 8, "category_id": 3, "segmentation": [[0, 0, 1, 1]] },
                { "id": 15, "image_id": 99, "category_id": 2, "segmentation": [[0, 0, 1, 1]] }
            ]
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_extract_records_order_and_breaks() {
        let records = extract_records(&dataset(), &GeometryExtractor::default()).unwrap();
        let refs: Vec<&str> = records.iter().map(|r| r.crop_ref.as_str()).collect();
        assert_eq!(refs, ["fate/7_10.jpg", "fate/7_11.jpg", "fate/7_12.jpg", "life/8_13.jpg"]);
        assert!(records[..3].iter().all(|r| r.breaks == 2));
        assert_eq!(records[3].breaks, 0);
    }

    #[test]
    fn test_extract_records_metrics() {
        let records = extract_records(&dataset(), &GeometryExtractor::default()).unwrap();
        assert!((records[0].length_norm - 0.40).abs() < 1e-12);
        // bbox fallback: (0,0)-(30,40) is 50 long on a 200-wide image
        assert!((records[3].length_norm - 0.25).abs() < 1e-12);
        assert_eq!(records[3].crop, BoundingBox { x1: 0, y1: 0, x2: 34, y2: 46 });
    }

    #[test]
    fn test_label_records_skips_missing() {
        let records = extract_records(&dataset(), &GeometryExtractor::default()).unwrap();
        let labels = label_records(
            &["life/8_13.jpg", "life/8_999.jpg", "fate/7_10.jpg"],
            &records,
            &AttributeBucketizer::default(),
        )
        .unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].label, CurveType::Life);
        assert_eq!(labels[0].buckets, AttributeBuckets::new("short", "up", "low", "none"));
        assert_eq!(labels[1].buckets, AttributeBuckets::new("short", "flat", "low", "many"));
    }

    #[test]
    fn test_record_metrics_view() {
        let records = extract_records(&dataset(), &GeometryExtractor::default()).unwrap();
        let m = records[0].metrics();
        assert_eq!(m.breaks(), 2);
        assert!((m.length_norm() - records[0].length_norm).abs() < f64::EPSILON);
    }
}
