//! # palmline: Palm-Line Geometry and Interpretation
//!
//! palmline turns hand-annotated palm-line traces into categorical attributes
//! and renders those attributes into narrative statements through a fixed,
//! ordered rule table.
//!
//! ## Pipeline
//!
//! ```text
//! points ──> GeometryExtractor ─┐
//!                               ├─> GeometricMetrics ──> AttributeBucketizer ──┐
//! annotations ──> BreakTally ───┘        (offline: training labels)           │
//!                                                                             ├─> InterpretationEngine
//! classifier probabilities ──> LabelDecoder ──> ClassificationResult ─────────┘
//! ```
//!
//! ## Design Principles
//!
//! - **Pure components**: every stage is a function of its input and
//!   read-only configuration, safe to share across threads
//! - **Configuration as data**: thresholds, vocabularies and rules load from
//!   JSON ([`config::PalmConfig`])
//! - **No silent defaults**: out-of-vocabulary categories and malformed
//!   vectors are errors
//!
//! ## Example
//!
//! ```rust
//! use palmline::bucket::AttributeBucketizer;
//! use palmline::geometry::{CurveType, GeometricMetrics, GeometryExtractor, ImageSize, Point};
//! use palmline::interpret::InterpretationEngine;
//!
//! # fn main() -> palmline::Result<()> {
//! let points = [Point::new(10.0, 10.0), Point::new(60.0, 12.0), Point::new(85.0, 20.0)];
//! let shape = GeometryExtractor::default().measure(&points, ImageSize::new(100, 100))?;
//! let buckets = AttributeBucketizer::default().bucketize(&GeometricMetrics::new(shape, 0))?;
//! let statements = InterpretationEngine::default().interpret(CurveType::Life, &buckets)?;
//! assert!(!statements.is_empty());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod breaks;
pub mod bucket;
pub mod config;
pub mod dataset;
pub mod decode;
pub mod error;
pub mod geometry;
pub mod interpret;
pub mod reader;
pub mod storage;

pub use error::{Error, Result};
