//! Rule-based interpretation
//!
//! The engine walks an ordered [`RuleTable`] once, collects the statement of
//! every rule whose predicate holds, and drops repeats so each statement keeps
//! the position of its first matching rule. No match is a valid, empty
//! result.
//!
//! ## Example
//!
//! ```rust
//! use palmline::bucket::AttributeBuckets;
//! use palmline::geometry::CurveType;
//! use palmline::interpret::InterpretationEngine;
//!
//! # fn main() -> palmline::Result<()> {
//! let engine = InterpretationEngine::default();
//! let buckets = AttributeBuckets::new("long", "flat", "low", "none");
//! let statements = engine.interpret(CurveType::Life, &buckets)?;
//! assert_eq!(statements.len(), 3);
//! # Ok(())
//! # }
//! ```

mod rules;

pub use rules::{InterpretationRule, Predicate, RuleTable};

use crate::bucket::AttributeBuckets;
use crate::config::{PalmConfig, Vocabularies};
use crate::geometry::CurveType;
use crate::Result;
use std::collections::HashSet;
use tracing::debug;

/// Evaluates a rule table against (asserted curve type, buckets).
#[derive(Debug, Clone)]
pub struct InterpretationEngine {
    rules: RuleTable,
    vocabularies: Vocabularies,
}

impl Default for InterpretationEngine {
    fn default() -> Self {
        Self {
            rules: RuleTable::default(),
            vocabularies: Vocabularies::default(),
        }
    }
}

impl InterpretationEngine {
    /// Create an engine over a validated rule table.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfig`] if the vocabularies are invalid
    /// or a rule references a category they do not contain.
    pub fn new(rules: RuleTable, vocabularies: Vocabularies) -> Result<Self> {
        vocabularies.validate()?;
        rules.validate(&vocabularies)?;
        Ok(Self {
            rules,
            vocabularies,
        })
    }

    /// Create from a [`PalmConfig`].
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn from_config(config: &PalmConfig) -> Result<Self> {
        Self::new(config.rules.clone(), config.vocabularies.clone())
    }

    /// Rule table in use.
    #[must_use]
    pub const fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Matched statements in rule order, first occurrence kept.
    ///
    /// `curve_type` is the caller's assertion and is the only curve type the
    /// rules see.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidCategory`] if a bucket is not in its
    /// vocabulary.
    pub fn interpret(&self, curve_type: CurveType, buckets: &AttributeBuckets) -> Result<Vec<String>> {
        buckets.validate(&self.vocabularies)?;

        let mut seen = HashSet::new();
        let mut statements = Vec::new();
        for rule in self.rules.rules() {
            if !rule.when.evaluate(curve_type, buckets) {
                continue;
            }
            debug!(rule = %rule.name, %curve_type, "rule matched");
            if seen.insert(rule.statement.as_str()) {
                statements.push(rule.statement.clone());
            }
        }
        Ok(statements)
    }

    /// [`interpret`](Self::interpret) with the curve type given by name.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidCategory`] if `curve_type` is not one of
    /// the four curve types, or a bucket is outside its vocabulary.
    pub fn interpret_named(&self, curve_type: &str, buckets: &AttributeBuckets) -> Result<Vec<String>> {
        self.interpret(curve_type.parse()?, buckets)
    }
}
