//! Pipeline configuration
//!
//! Thresholds, per-head vocabularies, crop padding and the interpretation rule
//! table are policy rather than physics, so they live in one structure that is
//! loaded once (usually from JSON), validated, and then shared read-only by
//! every component.
//!
//! ## Example
//!
//! ```rust
//! use palmline::config::PalmConfig;
//!
//! # fn main() -> palmline::Result<()> {
//! let config = PalmConfig::from_json_str(r#"{
//!     "thresholds": { "length": { "low": 0.4, "high": 0.8 } }
//! }"#)?;
//! assert!((config.thresholds.length.low - 0.4).abs() < f64::EPSILON);
//! // unspecified sections keep their defaults
//! assert_eq!(config.vocabularies.breaks, ["none", "one", "many"]);
//! # Ok(())
//! # }
//! ```

use crate::bucket::Attribute;
use crate::geometry::{CurveType, GeometryExtractor};
use crate::interpret::RuleTable;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Ascending pair of cut-points splitting a metric into three buckets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutPoints {
    /// Lower cut-point
    pub low: f64,
    /// Upper cut-point
    pub high: f64,
}

impl CutPoints {
    /// Create a cut-point pair (unchecked; see [`validate`](Self::validate)).
    #[must_use]
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Both finite and `low <= high`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming `metric` otherwise.
    pub fn validate(&self, metric: &str) -> Result<()> {
        if !self.low.is_finite() || !self.high.is_finite() || self.low > self.high {
            return Err(Error::InvalidConfig(format!(
                "{metric} cut-points must be finite and ascending, got ({}, {})",
                self.low, self.high
            )));
        }
        Ok(())
    }
}

/// Cut-points for the three continuous metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// `length_norm` cut-points
    pub length: CutPoints,
    /// `slope_deg` cut-points
    pub slope: CutPoints,
    /// `curv_deg` cut-points
    pub curvature: CutPoints,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            length: CutPoints::new(0.45, 0.70),
            slope: CutPoints::new(-10.0, 10.0),
            curvature: CutPoints::new(8.0, 20.0),
        }
    }
}

impl ThresholdConfig {
    /// Validate every pair.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for the first invalid pair.
    pub fn validate(&self) -> Result<()> {
        self.length.validate("length")?;
        self.slope.validate("slope")?;
        self.curvature.validate("curvature")
    }
}

/// Ordered category names for each classifier head.
///
/// Index `i` of a head's list is both bucket `i` and probability slot `i`.
/// Field aliases accept the `*_cls` key names used by exported model configs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabularies {
    /// Curve-type head (4 entries)
    #[serde(alias = "line_type")]
    pub curve_type: Vec<String>,
    /// Length head (3 entries)
    #[serde(alias = "length_cls")]
    pub length: Vec<String>,
    /// Slope head (3 entries)
    #[serde(alias = "slope_cls")]
    pub slope: Vec<String>,
    /// Curvature head (3 entries)
    #[serde(alias = "curv_cls")]
    pub curvature: Vec<String>,
    /// Breaks head (3 entries)
    #[serde(alias = "breaks_cls")]
    pub breaks: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

impl Default for Vocabularies {
    fn default() -> Self {
        Self {
            curve_type: names(&["fate", "head", "heart", "life"]),
            length: names(&["short", "medium", "long"]),
            slope: names(&["down", "flat", "up"]),
            curvature: names(&["low", "medium", "high"]),
            breaks: names(&["none", "one", "many"]),
        }
    }
}

impl Vocabularies {
    /// Entries per attribute head.
    pub const ATTRIBUTE_HEAD_SIZE: usize = 3;

    /// Category list of an attribute head.
    #[must_use]
    pub fn attribute(&self, attribute: Attribute) -> &[String] {
        match attribute {
            Attribute::Length => &self.length,
            Attribute::Slope => &self.slope,
            Attribute::Curvature => &self.curvature,
            Attribute::Breaks => &self.breaks,
        }
    }

    /// Position of `value` in an attribute head, if present.
    #[must_use]
    pub fn index_of(&self, attribute: Attribute, value: &str) -> Option<usize> {
        self.attribute(attribute).iter().position(|v| v == value)
    }

    /// Check sizes, uniqueness, and that the curve-type head names exactly the
    /// four curve types.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.curve_type.len() != CurveType::ALL.len() {
            return Err(Error::InvalidConfig(format!(
                "curve_type vocabulary needs {} entries, got {}",
                CurveType::ALL.len(),
                self.curve_type.len()
            )));
        }
        for ty in CurveType::ALL {
            if !self.curve_type.iter().any(|name| name == ty.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "curve_type vocabulary is missing {ty:?}"
                )));
            }
        }

        for attribute in Attribute::ALL {
            let list = self.attribute(attribute);
            if list.len() != Self::ATTRIBUTE_HEAD_SIZE {
                return Err(Error::InvalidConfig(format!(
                    "{attribute} vocabulary needs {} entries, got {}",
                    Self::ATTRIBUTE_HEAD_SIZE,
                    list.len()
                )));
            }
            let mut seen = HashSet::new();
            for name in list {
                if name.is_empty() || !seen.insert(name.as_str()) {
                    return Err(Error::InvalidConfig(format!(
                        "{attribute} vocabulary has an empty or repeated entry {name:?}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Everything the pipeline reads but never mutates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PalmConfig {
    /// Bucket cut-points
    pub thresholds: ThresholdConfig,
    /// Per-head category names
    pub vocabularies: Vocabularies,
    /// Crop padding fraction
    pub padding: f64,
    /// Ordered interpretation rules
    pub rules: RuleTable,
}

impl Default for PalmConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdConfig::default(),
            vocabularies: Vocabularies::default(),
            padding: GeometryExtractor::DEFAULT_PADDING,
            rules: RuleTable::default(),
        }
    }
}

impl PalmConfig {
    /// Parse and validate a JSON document. Missing sections take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] on malformed JSON and
    /// [`Error::InvalidConfig`] if validation fails.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise the same
    /// conditions as [`from_json_str`](Self::from_json_str).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        info!(
            path = %path.display(),
            rules = config.rules.len(),
            "loaded configuration"
        );
        Ok(config)
    }

    /// Pretty JSON rendering, suitable for [`from_json_str`](Self::from_json_str).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate every section, including rule values against vocabularies.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        self.vocabularies.validate()?;
        GeometryExtractor::new(self.padding)?;
        self.rules.validate(&self.vocabularies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        PalmConfig::default().validate().unwrap();
    }

    #[test]
    fn test_default_thresholds() {
        let t = ThresholdConfig::default();
        assert_eq!(t.length, CutPoints::new(0.45, 0.70));
        assert_eq!(t.slope, CutPoints::new(-10.0, 10.0));
        assert_eq!(t.curvature, CutPoints::new(8.0, 20.0));
    }

    #[test]
    fn test_descending_cut_points_rejected() {
        let json = r#"{ "thresholds": { "curvature": { "low": 20.0, "high": 8.0 } } }"#;
        let err = PalmConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(ref m) if m.contains("curvature")));
    }

    #[test]
    fn test_equal_cut_points_allowed() {
        CutPoints::new(1.0, 1.0).validate("length").unwrap();
    }

    #[test]
    fn test_model_config_aliases() {
        let json = r#"{ "vocabularies": {
            "line_type": ["life", "heart", "head", "fate"],
            "length_cls": ["s", "m", "l"],
            "slope_cls": ["down", "flat", "up"],
            "curv_cls": ["low", "medium", "high"],
            "breaks_cls": ["none", "one", "many"]
        }, "rules": [] }"#;
        let config = PalmConfig::from_json_str(json).unwrap();
        assert_eq!(config.vocabularies.curve_type[0], "life");
        assert_eq!(config.vocabularies.length, ["s", "m", "l"]);
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_curve_type_vocabulary_must_cover_all_types() {
        let mut vocab = Vocabularies::default();
        vocab.curve_type[0] = "sun".to_string();
        assert!(vocab.validate().is_err());
    }

    #[test]
    fn test_attribute_vocabulary_size_enforced() {
        let mut vocab = Vocabularies::default();
        vocab.length.push("huge".to_string());
        assert!(vocab.validate().is_err());
    }

    #[test]
    fn test_repeated_entry_rejected() {
        let mut vocab = Vocabularies::default();
        vocab.breaks[2] = "one".to_string();
        assert!(vocab.validate().is_err());
    }

    #[test]
    fn test_negative_padding_rejected() {
        let err = PalmConfig::from_json_str(r#"{ "padding": -0.5 }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_json_roundtrip_preserves_config() {
        let config = PalmConfig::default();
        let json = config.to_json_pretty().unwrap();
        assert_eq!(PalmConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_index_of() {
        let vocab = Vocabularies::default();
        assert_eq!(vocab.index_of(Attribute::Slope, "up"), Some(2));
        assert_eq!(vocab.index_of(Attribute::Slope, "sideways"), None);
    }
}
