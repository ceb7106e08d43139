//! Reference interval derivation
//!
//! Builds the display string `"<low> < x < <high>"` from the numeric bound
//! tests collected for a variable. The lowest literal becomes the lower bound
//! and the highest the upper bound, whichever operator produced them.

use clinalert_core::ast::{AtomicTest, ConditionSpec, NumberLiteral};

/// Reference interval deriver
pub struct ReferenceInterval;

impl ReferenceInterval {
    /// Derive an interval from bound literals.
    ///
    /// Needs at least two literals; literals are rendered as written.
    pub fn from_bounds<'a>(bounds: impl IntoIterator<Item = &'a NumberLiteral>) -> Option<String> {
        let mut count = 0usize;
        let mut low: Option<&NumberLiteral> = None;
        let mut high: Option<&NumberLiteral> = None;

        for bound in bounds {
            count += 1;
            if low.map_or(true, |l| bound.value() < l.value()) {
                low = Some(bound);
            }
            if high.map_or(true, |h| bound.value() > h.value()) {
                high = Some(bound);
            }
        }

        match (low, high) {
            (Some(low), Some(high)) if count >= 2 => Some(format!("{} < x < {}", low, high)),
            _ => None,
        }
    }

    /// Derive the interval displayed for a condition.
    ///
    /// Paired keys show their absolute-difference test; single variables use
    /// their bound tests. Equality and presence tests never yield one.
    pub fn for_condition(spec: &ConditionSpec) -> Option<String> {
        if spec.is_paired() {
            return spec.tests.iter().find_map(|test| match test {
                AtomicTest::AbsDifference { .. } => Some(test.to_string()),
                _ => None,
            });
        }
        Self::from_bounds(spec.bounds())
    }
}
