//! Attribute bucketization
//!
//! Continuous metrics become ordinal categories through a pair of cut-points
//! `(a, b)`. Two interval shapes are in use:
//!
//! ```text
//! one-sided (length, curvature):  (-inf, a)   [a, b)   [b, +inf)
//! two-sided (slope):              (-inf, a)   [a, b]   (b, +inf)
//! ```
//!
//! The two-sided middle band is closed on both ends, so a slope sitting exactly
//! on either cut-point still counts as flat. Break counts are discrete:
//! 0, 1, and 2 or more.

use crate::config::{CutPoints, PalmConfig, ThresholdConfig, Vocabularies};
use crate::geometry::GeometricMetrics;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four bucketized attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    /// Normalized arc length
    Length,
    /// Mean direction angle
    Slope,
    /// Mean turning angle
    Curvature,
    /// Break count
    Breaks,
}

impl Attribute {
    /// All attributes in head order.
    pub const ALL: [Self; 4] = [Self::Length, Self::Slope, Self::Curvature, Self::Breaks];

    /// Lowercase attribute name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Length => "length",
            Self::Slope => "slope",
            Self::Curvature => "curvature",
            Self::Breaks => "breaks",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interval shape used to split a continuous metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketPolicy {
    /// `[-inf, a)`, `[a, b)`, `[b, inf)`
    OneSided,
    /// `(-inf, a)`, `[a, b]`, `(b, inf)`
    TwoSided,
}

impl BucketPolicy {
    /// Bucket index (0, 1 or 2) of `value`.
    ///
    /// NaN is never a valid metric; callers reject it before this point.
    #[must_use]
    pub fn bucket(self, value: f64, cuts: CutPoints) -> usize {
        match self {
            Self::OneSided => {
                if value < cuts.low {
                    0
                } else if value < cuts.high {
                    1
                } else {
                    2
                }
            }
            Self::TwoSided => {
                if value < cuts.low {
                    0
                } else if value <= cuts.high {
                    1
                } else {
                    2
                }
            }
        }
    }
}

/// Bucket index of a break count: 0, 1, or "many".
#[must_use]
pub const fn break_bucket(breaks: u32) -> usize {
    match breaks {
        0 => 0,
        1 => 1,
        _ => 2,
    }
}

/// One category name per attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeBuckets {
    /// Length category
    pub length: String,
    /// Slope category
    pub slope: String,
    /// Curvature category
    pub curvature: String,
    /// Breaks category
    pub breaks: String,
}

impl AttributeBuckets {
    /// Build from category names.
    #[must_use]
    pub fn new(
        length: impl Into<String>,
        slope: impl Into<String>,
        curvature: impl Into<String>,
        breaks: impl Into<String>,
    ) -> Self {
        Self {
            length: length.into(),
            slope: slope.into(),
            curvature: curvature.into(),
            breaks: breaks.into(),
        }
    }

    /// Category of `attribute`.
    #[must_use]
    pub fn get(&self, attribute: Attribute) -> &str {
        match attribute {
            Attribute::Length => &self.length,
            Attribute::Slope => &self.slope,
            Attribute::Curvature => &self.curvature,
            Attribute::Breaks => &self.breaks,
        }
    }

    /// Fail with [`Error::InvalidCategory`] if any name is outside `vocabularies`.
    ///
    /// # Errors
    ///
    /// See above.
    pub fn validate(&self, vocabularies: &Vocabularies) -> Result<()> {
        for attribute in Attribute::ALL {
            let value = self.get(attribute);
            if vocabularies.index_of(attribute, value).is_none() {
                return Err(Error::invalid_category(attribute.as_str(), value));
            }
        }
        Ok(())
    }
}

/// Maps metrics to category names using shared thresholds and vocabularies.
#[derive(Debug, Clone)]
pub struct AttributeBucketizer {
    thresholds: ThresholdConfig,
    vocabularies: Vocabularies,
}

impl Default for AttributeBucketizer {
    fn default() -> Self {
        Self {
            thresholds: ThresholdConfig::default(),
            vocabularies: Vocabularies::default(),
        }
    }
}

impl AttributeBucketizer {
    /// Create a bucketizer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if thresholds or vocabularies are
    /// invalid.
    pub fn new(thresholds: ThresholdConfig, vocabularies: Vocabularies) -> Result<Self> {
        thresholds.validate()?;
        vocabularies.validate()?;
        Ok(Self {
            thresholds,
            vocabularies,
        })
    }

    /// Create from the relevant sections of a [`PalmConfig`].
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn from_config(config: &PalmConfig) -> Result<Self> {
        Self::new(config.thresholds, config.vocabularies.clone())
    }

    /// Thresholds in use.
    #[must_use]
    pub const fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    /// Policy and cut-points of a continuous attribute; `None` for breaks.
    #[must_use]
    pub const fn policy(&self, attribute: Attribute) -> Option<(BucketPolicy, CutPoints)> {
        match attribute {
            Attribute::Length => Some((BucketPolicy::OneSided, self.thresholds.length)),
            Attribute::Slope => Some((BucketPolicy::TwoSided, self.thresholds.slope)),
            Attribute::Curvature => Some((BucketPolicy::OneSided, self.thresholds.curvature)),
            Attribute::Breaks => None,
        }
    }

    /// Bucket index of a continuous metric value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for NaN, or when asked to threshold the
    /// discrete breaks attribute (use [`break_bucket`]).
    pub fn index(&self, attribute: Attribute, value: f64) -> Result<usize> {
        let (policy, cuts) = self.policy(attribute).ok_or_else(|| {
            Error::InvalidInput("breaks are bucketed by count, not by threshold".to_string())
        })?;
        if value.is_nan() {
            return Err(Error::InvalidInput(format!("{attribute} value is NaN")));
        }
        Ok(policy.bucket(value, cuts))
    }

    /// Category name of bucket `index` for `attribute`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `index` is outside the vocabulary.
    pub fn category(&self, attribute: Attribute, index: usize) -> Result<&str> {
        self.vocabularies
            .attribute(attribute)
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| Error::InvalidInput(format!("{attribute} has no bucket {index}")))
    }

    /// Category name of a continuous metric value.
    ///
    /// # Errors
    ///
    /// Same as [`index`](Self::index).
    pub fn categorize(&self, attribute: Attribute, value: f64) -> Result<&str> {
        self.category(attribute, self.index(attribute, value)?)
    }

    /// Bucket every attribute of a measured curve.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if any metric is NaN.
    pub fn bucketize(&self, metrics: &GeometricMetrics) -> Result<AttributeBuckets> {
        Ok(AttributeBuckets::new(
            self.categorize(Attribute::Length, metrics.length_norm())?,
            self.categorize(Attribute::Slope, metrics.slope_deg())?,
            self.categorize(Attribute::Curvature, metrics.curv_deg())?,
            self.category(Attribute::Breaks, break_bucket(metrics.breaks()))?,
        ))
    }
}
