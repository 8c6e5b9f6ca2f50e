//! Rule table - ordered predicate/statement pairs
//!
//! Predicates are plain data so the whole table can be written in a config
//! file:
//!
//! ```json
//! { "name": "dreamer",
//!   "when": { "op": "any", "of": [
//!       { "op": "all", "of": [
//!           { "op": "curve_is", "curve": "fate" },
//!           { "op": "is_not", "attribute": "breaks", "value": "many" } ] },
//!       { "op": "all", "of": [
//!           { "op": "curve_is", "curve": "life" },
//!           { "op": "is", "attribute": "length", "value": "long" } ] } ] },
//!   "statement": "Có nhiều ước mơ, tham vọng, tự tin" }
//! ```

use crate::bucket::{Attribute, AttributeBuckets};
use crate::config::Vocabularies;
use crate::geometry::CurveType;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Boolean test over (asserted curve type, attribute buckets).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// The asserted curve type equals `curve`
    CurveIs {
        /// Expected curve type
        curve: CurveType,
    },
    /// `attribute` bucket equals `value`
    Is {
        /// Tested attribute
        attribute: Attribute,
        /// Expected category
        value: String,
    },
    /// `attribute` bucket differs from `value`
    IsNot {
        /// Tested attribute
        attribute: Attribute,
        /// Excluded category
        value: String,
    },
    /// `attribute` bucket is one of `values`
    OneOf {
        /// Tested attribute
        attribute: Attribute,
        /// Accepted categories
        values: Vec<String>,
    },
    /// Every sub-predicate holds (true when empty)
    All {
        /// Conjuncts
        of: Vec<Predicate>,
    },
    /// At least one sub-predicate holds (false when empty)
    Any {
        /// Disjuncts
        of: Vec<Predicate>,
    },
    /// Negation
    Not {
        /// Negated predicate
        predicate: Box<Predicate>,
    },
}

impl Predicate {
    /// [`Predicate::CurveIs`]
    #[must_use]
    pub const fn curve(curve: CurveType) -> Self {
        Self::CurveIs { curve }
    }

    /// [`Predicate::Is`]
    #[must_use]
    pub fn is(attribute: Attribute, value: impl Into<String>) -> Self {
        Self::Is {
            attribute,
            value: value.into(),
        }
    }

    /// [`Predicate::IsNot`]
    #[must_use]
    pub fn is_not(attribute: Attribute, value: impl Into<String>) -> Self {
        Self::IsNot {
            attribute,
            value: value.into(),
        }
    }

    /// [`Predicate::OneOf`]
    #[must_use]
    pub fn one_of<S: Into<String>>(attribute: Attribute, values: impl IntoIterator<Item = S>) -> Self {
        Self::OneOf {
            attribute,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// [`Predicate::All`]
    #[must_use]
    pub fn all(of: impl IntoIterator<Item = Self>) -> Self {
        Self::All {
            of: of.into_iter().collect(),
        }
    }

    /// [`Predicate::Any`]
    #[must_use]
    pub fn any(of: impl IntoIterator<Item = Self>) -> Self {
        Self::Any {
            of: of.into_iter().collect(),
        }
    }

    /// [`Predicate::Not`]
    #[must_use]
    pub fn negate(predicate: Self) -> Self {
        Self::Not {
            predicate: Box::new(predicate),
        }
    }

    /// Evaluate against an asserted curve type and buckets.
    #[must_use]
    pub fn evaluate(&self, curve_type: CurveType, buckets: &AttributeBuckets) -> bool {
        match self {
            Self::CurveIs { curve } => *curve == curve_type,
            Self::Is { attribute, value } => buckets.get(*attribute) == value,
            Self::IsNot { attribute, value } => buckets.get(*attribute) != value,
            Self::OneOf { attribute, values } => {
                let actual = buckets.get(*attribute);
                values.iter().any(|v| v == actual)
            }
            Self::All { of } => of.iter().all(|p| p.evaluate(curve_type, buckets)),
            Self::Any { of } => of.iter().any(|p| p.evaluate(curve_type, buckets)),
            Self::Not { predicate } => !predicate.evaluate(curve_type, buckets),
        }
    }

    /// Every category referenced must exist in `vocabularies`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the unknown category.
    pub fn validate(&self, vocabularies: &Vocabularies) -> Result<()> {
        let check = |attribute: Attribute, value: &str| {
            if vocabularies.index_of(attribute, value).is_some() {
                Ok(())
            } else {
                Err(Error::InvalidConfig(format!(
                    "rule references unknown {attribute} category {value:?}"
                )))
            }
        };
        match self {
            Self::CurveIs { .. } => Ok(()),
            Self::Is { attribute, value } | Self::IsNot { attribute, value } => {
                check(*attribute, value.as_str())
            }
            Self::OneOf { attribute, values } => {
                values.iter().try_for_each(|v| check(*attribute, v.as_str()))
            }
            Self::All { of } | Self::Any { of } => {
                of.iter().try_for_each(|p| p.validate(vocabularies))
            }
            Self::Not { predicate } => predicate.validate(vocabularies),
        }
    }
}

/// A named predicate and the statement it contributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpretationRule {
    /// Short identifier used in logs
    pub name: String,
    /// Condition
    pub when: Predicate,
    /// Narrative statement emitted on match
    pub statement: String,
}

impl InterpretationRule {
    /// Create a rule.
    #[must_use]
    pub fn new(name: impl Into<String>, when: Predicate, statement: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            when,
            statement: statement.into(),
        }
    }
}

/// Ordered rule list. Evaluation order is declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable {
    rules: Vec<InterpretationRule>,
}

impl RuleTable {
    /// Wrap an ordered rule list.
    #[must_use]
    pub const fn new(rules: Vec<InterpretationRule>) -> Self {
        Self { rules }
    }

    /// Rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[InterpretationRule] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True for an empty table.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Validate every rule against `vocabularies`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for the first rule with an unknown
    /// category or an empty statement.
    pub fn validate(&self, vocabularies: &Vocabularies) -> Result<()> {
        for rule in &self.rules {
            if rule.statement.trim().is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "rule {:?} has an empty statement",
                    rule.name
                )));
            }
            rule.when.validate(vocabularies).map_err(|e| match e {
                Error::InvalidConfig(msg) => {
                    Error::InvalidConfig(format!("rule {:?}: {msg}", rule.name))
                }
                other => other,
            })?;
        }
        Ok(())
    }
}

impl Default for RuleTable {
    /// The built-in palm-reading table.
    fn default() -> Self {
        use Attribute::{Breaks, Curvature, Length, Slope};
        use CurveType::{Fate, Head, Heart, Life};
        let on = Predicate::curve;

        Self::new(vec![
            InterpretationRule::new(
                "vitality",
                Predicate::all([on(Life), Predicate::is(Length, "long"), Predicate::is(Breaks, "none")]),
                "Là người có sức sống, sức khỏe dồi dào, độ lượng, hào phóng",
            ),
            InterpretationRule::new(
                "sociable",
                Predicate::all([
                    on(Heart),
                    Predicate::is(Slope, "up"),
                    Predicate::is_not(Curvature, "high"),
                ]),
                "Tính tình rộng rãi, cởi mở, hòa đồng",
            ),
            InterpretationRule::new(
                "ambitious",
                Predicate::any([
                    Predicate::all([on(Fate), Predicate::is_not(Breaks, "many")]),
                    Predicate::all([on(Life), Predicate::is(Length, "long")]),
                ]),
                "Có nhiều ước mơ, tham vọng, tự tin",
            ),
            InterpretationRule::new(
                "clear_minded",
                Predicate::all([
                    on(Head),
                    Predicate::is(Breaks, "none"),
                    Predicate::is_not(Curvature, "high"),
                ]),
                "Thần kinh vững vàng, sáng suốt, ít bệnh tật",
            ),
            InterpretationRule::new(
                "dependent_youth",
                Predicate::any([
                    Predicate::all([on(Fate), Predicate::is_not(Breaks, "none")]),
                    Predicate::all([on(Life), Predicate::is(Length, "short")]),
                ]),
                "Thời nhỏ sống dựa vào cha mẹ nhiều, hơi kém phát triển",
            ),
            InterpretationRule::new(
                "irresolute",
                Predicate::all([
                    on(Head),
                    Predicate::any([
                        Predicate::is_not(Breaks, "none"),
                        Predicate::is(Curvature, "high"),
                    ]),
                ]),
                "Thiếu nghị lực, hơi nhẹ dạ",
            ),
            InterpretationRule::new(
                "devoted",
                Predicate::all([on(Heart), Predicate::one_of(Slope, ["flat", "up"])]),
                "Có lòng nhân tử, hảo tâm, tận tụy hết lòng vì gia đình, bè bạn",
            ),
            InterpretationRule::new(
                "materialistic",
                Predicate::all([
                    on(Heart),
                    Predicate::any([
                        Predicate::is(Slope, "down"),
                        Predicate::is_not(Breaks, "none"),
                    ]),
                ]),
                "Ít nhiệt tình, ưa vật chất",
            ),
            InterpretationRule::new(
                "smooth_life",
                Predicate::any([
                    Predicate::all([on(Fate), Predicate::is(Breaks, "none")]),
                    Predicate::all([on(Life), Predicate::is(Breaks, "none")]),
                ]),
                "Cuộc đời khá dễ dàng, phẳng lặng",
            ),
            InterpretationRule::new(
                "unsettled_life",
                Predicate::all([on(Fate), Predicate::is(Breaks, "many")]),
                "Cuộc đời bấp bênh, nhiều thay đổi",
            ),
        ])
    }
}
