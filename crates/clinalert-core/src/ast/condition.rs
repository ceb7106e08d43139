//! Condition descriptors attached to alert variables
//!
//! A [`ConditionSpec`] holds, for one variable key, the ordered list of
//! atomic tests parsed from the rule text and the way they combine: a
//! disjunction of AND-groups. Groups refer to tests by index so that a test
//! written once in the rule (e.g. the presence check of a range rule) appears
//! once in the atomic list even when several groups use it.

use super::operator::CompareOp;
use crate::error::{CoreError, Result};
use crate::types::parse_decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Per-alert map from variable key to its condition
pub type ConditionMap = BTreeMap<String, ConditionSpec>;

/// Separator used in synthetic keys of paired variables (`"varA,varB"`)
pub const PAIR_SEPARATOR: char = ',';

/// Build the synthetic key for a pair of variables
pub fn pair_key(left: &str, right: &str) -> String {
    format!("{}{}{}", left, PAIR_SEPARATOR, right)
}

/// A numeric literal that remembers how it was written
///
/// `12.0` and `12` compare equal but display differently, so interval
/// strings can echo what the rule author typed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumberLiteral {
    value: f64,
    raw: String,
}

impl NumberLiteral {
    /// Parse a literal from its source text
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let value = parse_decimal(raw).ok_or_else(|| CoreError::InvalidNumber(raw.to_string()))?;
        Ok(Self {
            value,
            raw: raw.to_string(),
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Source spelling
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl PartialEq for NumberLiteral {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.raw == other.raw
    }
}

impl fmt::Display for NumberLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Right-hand side of a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Number(NumberLiteral),
    Text(String),
}

impl Literal {
    pub fn text(s: impl Into<String>) -> Self {
        Literal::Text(s.into())
    }

    pub fn number(raw: &str) -> Result<Self> {
        NumberLiteral::parse(raw).map(Literal::Number)
    }

    pub fn as_number(&self) -> Option<&NumberLiteral> {
        match self {
            Literal::Number(n) => Some(n),
            Literal::Text(_) => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// A single comparison against a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AtomicTest {
    /// Value is present and not blank
    NotEmpty,
    /// Value compares against a literal
    Compare { op: CompareOp, literal: Literal },
    /// `|left - right| > threshold`
    AbsDifference {
        left: String,
        right: String,
        threshold: NumberLiteral,
    },
}

impl AtomicTest {
    pub fn compare(op: CompareOp, literal: Literal) -> Self {
        AtomicTest::Compare { op, literal }
    }

    pub fn abs_difference(
        left: impl Into<String>,
        right: impl Into<String>,
        threshold: NumberLiteral,
    ) -> Self {
        AtomicTest::AbsDifference {
            left: left.into(),
            right: right.into(),
            threshold,
        }
    }

    /// The numeric literal of an ordering comparison, if this is one
    pub fn bound(&self) -> Option<&NumberLiteral> {
        match self {
            AtomicTest::Compare { op, literal } if op.is_bound() => literal.as_number(),
            _ => None,
        }
    }
}

impl fmt::Display for AtomicTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtomicTest::NotEmpty => f.write_str("not empty"),
            AtomicTest::Compare { op, literal } => write!(f, "{} {}", op, literal),
            AtomicTest::AbsDifference {
                left,
                right,
                threshold,
            } => write!(f, "abs({} - {}) > {}", left, right, threshold),
        }
    }
}

/// Condition attached to one variable key of an alert
///
/// Tests are append-only: merging a second clause for the same key extends
/// `tests`, adds its groups and joins the description with `OR`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSpec {
    /// Variable key: a field name, or `"varA,varB"` for paired tests
    pub key: String,

    /// Atomic tests in parse order
    pub tests: Vec<AtomicTest>,

    /// OR-groups, each an AND of indices into `tests`
    pub groups: Vec<Vec<usize>>,

    /// Human-readable combined test, e.g. `not empty AND (< 3.5 OR > 12)`
    pub description: String,

    /// Display interval, e.g. `3.5 < x < 12`
    pub reference_interval: Option<String>,

    /// Partner variables of paired tests fanned out to this key
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paired_with: Vec<String>,
}

impl ConditionSpec {
    /// Create an empty condition for a key
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            tests: Vec::new(),
            groups: Vec::new(),
            description: String::new(),
            reference_interval: None,
            paired_with: Vec::new(),
        }
    }

    /// Append a clause.
    ///
    /// `groups` index into `tests` (local to this clause); they are shifted
    /// onto the end of the existing test list.
    pub fn push_clause(
        &mut self,
        tests: Vec<AtomicTest>,
        groups: Vec<Vec<usize>>,
        description: &str,
    ) {
        let offset = self.tests.len();
        self.tests.extend(tests);
        self.groups.extend(
            groups
                .into_iter()
                .map(|g| g.into_iter().map(|i| i + offset).collect()),
        );

        if self.description.is_empty() {
            self.description = description.to_string();
        } else {
            self.description.push_str(" OR ");
            self.description.push_str(description);
        }
    }

    /// Append a single-test clause
    pub fn push_test(&mut self, test: AtomicTest, description: &str) {
        self.push_clause(vec![test], vec![vec![0]], description);
    }

    /// Merge another condition into this one, keeping everything already here
    pub fn merge(&mut self, other: &ConditionSpec) {
        self.push_clause(other.tests.clone(), other.groups.clone(), &other.description);

        if self.reference_interval.is_none() {
            self.reference_interval = other.reference_interval.clone();
        }
        for partner in &other.paired_with {
            self.add_partner(partner);
        }
    }

    /// Record a partner variable (deduplicated)
    pub fn add_partner(&mut self, partner: &str) {
        if partner != self.key && !self.paired_with.iter().any(|p| p == partner) {
            self.paired_with.push(partner.to_string());
        }
    }

    /// Returns true if the key names a pair of variables
    pub fn is_paired(&self) -> bool {
        self.key.contains(PAIR_SEPARATOR)
    }

    /// Variables named by the key
    pub fn variables(&self) -> Vec<&str> {
        self.key.split(PAIR_SEPARATOR).map(str::trim).collect()
    }

    /// Iterate OR-groups, each yielding its AND-parts
    pub fn or_groups(&self) -> impl Iterator<Item = impl Iterator<Item = &AtomicTest> + '_> + '_ {
        self.groups
            .iter()
            .map(move |group| group.iter().filter_map(move |&i| self.tests.get(i)))
    }

    /// Numeric literals of all ordering comparisons, in parse order
    pub fn bounds(&self) -> impl Iterator<Item = &NumberLiteral> + '_ {
        self.tests.iter().filter_map(AtomicTest::bound)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl fmt::Display for ConditionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}
