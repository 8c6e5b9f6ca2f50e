//! Inference-time facade
//!
//! Wires the decoder and interpretation engine behind one call for request
//! handlers: validate the asserted curve type, decode the classifier output,
//! and interpret the decoded attributes under the asserted type.
//!
//! ## Example
//!
//! ```rust
//! use palmline::decode::HeadProbabilities;
//! use palmline::reader::PalmReader;
//!
//! # fn main() -> palmline::Result<()> {
//! let reader = PalmReader::default();
//! let probs = HeadProbabilities {
//!     curve_type: vec![0.7, 0.1, 0.1, 0.1],
//!     length: vec![0.1, 0.1, 0.8],
//!     slope: vec![0.2, 0.6, 0.2],
//!     curvature: vec![0.8, 0.1, 0.1],
//!     breaks: vec![0.9, 0.05, 0.05],
//! };
//! // the classifier says "fate" but the user asserted "life"
//! let reading = reader.read("life", &probs)?;
//! assert_eq!(reading.attributes.curve_type.label, "fate");
//! assert_eq!(reading.interpretation.len(), 3);
//! # Ok(())
//! # }
//! ```

use crate::bucket::AttributeBucketizer;
use crate::config::PalmConfig;
use crate::decode::{ClassificationResult, HeadProbabilities, LabelDecoder};
use crate::geometry::{CurveType, GeometricMetrics};
use crate::interpret::InterpretationEngine;
use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome of one inference request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Decoded classifier heads
    pub attributes: ClassificationResult,
    /// Curve type asserted by the caller
    #[serde(rename = "line_type_input")]
    pub asserted: CurveType,
    /// Matched statements in rule order
    pub interpretation: Vec<String>,
}

/// Decoder, bucketizer and engine built once from a [`PalmConfig`].
#[derive(Debug, Clone, Default)]
pub struct PalmReader {
    bucketizer: AttributeBucketizer,
    decoder: LabelDecoder,
    engine: InterpretationEngine,
}

impl PalmReader {
    /// Build every component from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfig`] if `config` fails validation.
    pub fn new(config: &PalmConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            bucketizer: AttributeBucketizer::from_config(config)?,
            decoder: LabelDecoder::from_config(config)?,
            engine: InterpretationEngine::from_config(config)?,
        })
    }

    /// Decode `probs` and interpret under the asserted curve type.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidCategory`] if `line_type` is not a curve
    /// type (checked before decoding), and [`crate::Error::InvalidInput`] if
    /// the probability vectors have the wrong shape.
    pub fn read(&self, line_type: &str, probs: &HeadProbabilities) -> Result<Reading> {
        let asserted: CurveType = line_type.parse()?;
        let attributes = self.decoder.decode(probs)?;
        let interpretation = self.engine.interpret(asserted, &attributes.buckets())?;
        debug!(
            %asserted,
            predicted = %attributes.curve_type.label,
            statements = interpretation.len(),
            "read palm line"
        );
        Ok(Reading {
            attributes,
            asserted,
            interpretation,
        })
    }

    /// Interpret measured geometry directly, without a classifier.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] if a metric is NaN.
    pub fn interpret_metrics(
        &self,
        curve_type: CurveType,
        metrics: &GeometricMetrics,
    ) -> Result<Vec<String>> {
        let buckets = self.bucketizer.bucketize(metrics)?;
        self.engine.interpret(curve_type, &buckets)
    }
}
