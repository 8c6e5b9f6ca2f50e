//! Classifier output decoding
//!
//! The external classifier emits one probability vector per head. Decoding
//! picks, per head, the vocabulary entry with the highest probability. Ties go
//! to the lowest index so the result never depends on how the vectors were
//! produced.

use crate::bucket::{Attribute, AttributeBuckets};
use crate::config::{PalmConfig, Vocabularies};
use crate::geometry::CurveType;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Raw per-head probability vectors from the classifier.
///
/// Field aliases accept the `*_cls` head names used by exported models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadProbabilities {
    /// Curve-type head (4 values)
    #[serde(alias = "line_type")]
    pub curve_type: Vec<f32>,
    /// Length head (3 values)
    #[serde(alias = "length_cls")]
    pub length: Vec<f32>,
    /// Slope head (3 values)
    #[serde(alias = "slope_cls")]
    pub slope: Vec<f32>,
    /// Curvature head (3 values)
    #[serde(alias = "curv_cls")]
    pub curvature: Vec<f32>,
    /// Breaks head (3 values)
    #[serde(alias = "breaks_cls")]
    pub breaks: Vec<f32>,
}

impl HeadProbabilities {
    /// Probability vector of an attribute head.
    #[must_use]
    pub fn attribute(&self, attribute: Attribute) -> &[f32] {
        match attribute {
            Attribute::Length => &self.length,
            Attribute::Slope => &self.slope,
            Attribute::Curvature => &self.curvature,
            Attribute::Breaks => &self.breaks,
        }
    }
}

/// Winning category of one head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Category name
    pub label: String,
    /// Position in the head's vocabulary
    pub index: usize,
    /// Probability of the winning category
    pub confidence: f32,
}

/// Decoded output of all five heads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Curve-type head
    pub curve_type: Prediction,
    /// Length head
    pub length: Prediction,
    /// Slope head
    pub slope: Prediction,
    /// Curvature head
    pub curvature: Prediction,
    /// Breaks head
    pub breaks: Prediction,
}

impl ClassificationResult {
    /// The four attribute categories, ready for interpretation.
    #[must_use]
    pub fn buckets(&self) -> AttributeBuckets {
        AttributeBuckets::new(
            self.length.label.clone(),
            self.slope.label.clone(),
            self.curvature.label.clone(),
            self.breaks.label.clone(),
        )
    }

    /// Curve type predicted by the classifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCategory`] if the label is not a curve type.
    pub fn predicted_curve_type(&self) -> Result<CurveType> {
        self.curve_type.label.parse()
    }
}

/// Index of the largest value; the lowest index wins ties.
///
/// Returns `None` for an empty slice or if any value is NaN.
#[must_use]
pub fn argmax(values: &[f32]) -> Option<usize> {
    if values.is_empty() || values.iter().any(|v| v.is_nan()) {
        return None;
    }
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    Some(best)
}

/// Turns [`HeadProbabilities`] into a [`ClassificationResult`].
#[derive(Debug, Clone, Default)]
pub struct LabelDecoder {
    vocabularies: Vocabularies,
}

impl LabelDecoder {
    /// Create a decoder over validated vocabularies.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the vocabularies are invalid.
    pub fn new(vocabularies: Vocabularies) -> Result<Self> {
        vocabularies.validate()?;
        Ok(Self { vocabularies })
    }

    /// Create from a [`PalmConfig`].
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn from_config(config: &PalmConfig) -> Result<Self> {
        Self::new(config.vocabularies.clone())
    }

    /// Vocabularies in use.
    #[must_use]
    pub const fn vocabularies(&self) -> &Vocabularies {
        &self.vocabularies
    }

    /// Decode all five heads.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if any vector's length differs from its
    /// vocabulary or contains NaN.
    pub fn decode(&self, probs: &HeadProbabilities) -> Result<ClassificationResult> {
        Ok(ClassificationResult {
            curve_type: decode_head("curve_type", &probs.curve_type, &self.vocabularies.curve_type)?,
            length: self.decode_attribute(Attribute::Length, probs)?,
            slope: self.decode_attribute(Attribute::Slope, probs)?,
            curvature: self.decode_attribute(Attribute::Curvature, probs)?,
            breaks: self.decode_attribute(Attribute::Breaks, probs)?,
        })
    }

    fn decode_attribute(&self, attribute: Attribute, probs: &HeadProbabilities) -> Result<Prediction> {
        decode_head(
            attribute.as_str(),
            probs.attribute(attribute),
            self.vocabularies.attribute(attribute),
        )
    }
}

fn decode_head(head: &str, probs: &[f32], vocabulary: &[String]) -> Result<Prediction> {
    if probs.len() != vocabulary.len() {
        return Err(Error::InvalidInput(format!(
            "{head} head expects {} probabilities, got {}",
            vocabulary.len(),
            probs.len()
        )));
    }
    let index = argmax(probs)
        .ok_or_else(|| Error::InvalidInput(format!("{head} probabilities contain NaN")))?;
    Ok(Prediction {
        label: vocabulary[index].clone(),
        index,
        confidence: probs[index],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probs() -> HeadProbabilities {
        HeadProbabilities {
            curve_type: vec![0.1, 0.2, 0.3, 0.4],
            length: vec![0.1, 0.2, 0.7],
            slope: vec![0.6, 0.3, 0.1],
            curvature: vec![0.2, 0.5, 0.3],
            breaks: vec![0.9, 0.05, 0.05],
        }
    }

    #[test]
    fn test_argmax_tie_lowest_index() {
        assert_eq!(argmax(&[0.5, 0.5, 0.0]), Some(0));
        assert_eq!(argmax(&[0.0, 0.5, 0.5]), Some(1));
        assert_eq!(argmax(&[0.25, 0.25, 0.25, 0.25]), Some(0));
    }

    #[test]
    fn test_argmax_rejects_empty_and_nan() {
        assert_eq!(argmax(&[]), None);
        assert_eq!(argmax(&[0.1, f32::NAN]), None);
    }

    #[test]
    fn test_decode_all_heads() {
        let result = LabelDecoder::default().decode(&probs()).unwrap();
        assert_eq!(result.curve_type.label, "life");
        assert_eq!(result.length.label, "long");
        assert_eq!(result.slope.label, "down");
        assert_eq!(result.curvature.label, "medium");
        assert_eq!(result.breaks.label, "none");
        assert_eq!(result.breaks.index, 0);
        assert!((result.length.confidence - 0.7).abs() < f32::EPSILON);
        assert_eq!(result.predicted_curve_type().unwrap(), CurveType::Life);
    }

    #[test]
    fn test_decode_shape_mismatch() {
        let mut p = probs();
        p.slope = vec![0.5, 0.5];
        let err = LabelDecoder::default().decode(&p).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref m) if m.contains("slope")));
    }

    #[test]
    fn test_decode_curve_type_shape_mismatch() {
        let mut p = probs();
        p.curve_type = vec![0.5, 0.2, 0.3];
        assert!(LabelDecoder::default().decode(&p).is_err());
    }

    #[test]
    fn test_buckets_from_result() {
        let result = LabelDecoder::default().decode(&probs()).unwrap();
        assert_eq!(result.buckets(), AttributeBuckets::new("long", "down", "medium", "none"));
    }

    #[test]
    fn test_model_head_aliases() {
        let json = r#"{
            "line_type": [1.0, 0.0, 0.0, 0.0],
            "length_cls": [0.0, 1.0, 0.0],
            "slope_cls": [0.0, 1.0, 0.0],
            "curv_cls": [0.0, 1.0, 0.0],
            "breaks_cls": [0.0, 0.0, 1.0]
        }"#;
        let p: HeadProbabilities = serde_json::from_str(json).unwrap();
        let result = LabelDecoder::default().decode(&p).unwrap();
        assert_eq!(result.curve_type.label, "fate");
        assert_eq!(result.breaks.label, "many");
    }
}
