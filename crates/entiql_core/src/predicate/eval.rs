//! In-memory predicate evaluation.
//!
//! Evaluation follows SQL three-valued logic so that a predicate gives the
//! same answer whether it runs in the database or after the fetch: a `NULL`
//! column value makes every comparison unknown, and unknown never matches.

use crate::predicate::kind::PredicateKind;
use crate::predicate::model::Predicate;
use entiql_driver::Value;
use std::cmp::Ordering;

impl Predicate {
    /// Returns true if `value` satisfies the predicate.
    pub fn test(&self, value: &Value) -> bool {
        self.eval(value) == Some(true)
    }

    /// Evaluates the predicate; `None` is SQL's unknown.
    pub fn eval(&self, value: &Value) -> Option<bool> {
        use PredicateKind as K;
        match self.kind() {
            K::AlwaysTrue => Some(true),
            K::AlwaysFalse => Some(false),
            K::IsNull => Some(value.is_null()),
            K::IsNotNull => Some(!value.is_null()),
            K::Equal => ordering(value, self.single()).map(|o| o == Ordering::Equal),
            K::NotEqual => ordering(value, self.single()).map(|o| o != Ordering::Equal),
            K::LessThan => ordering(value, self.single()).map(|o| o == Ordering::Less),
            K::LessOrEqual => ordering(value, self.single()).map(|o| o != Ordering::Greater),
            K::GreaterThan => ordering(value, self.single()).map(|o| o == Ordering::Greater),
            K::GreaterOrEqual => ordering(value, self.single()).map(|o| o != Ordering::Less),
            K::Between => self.between(value),
            K::NotBetween => self.between(value).map(|b| !b),
            K::In => self.member(value),
            K::NotIn => {
                if self.set().is_empty() {
                    Some(true)
                } else {
                    self.member(value).map(|b| !b)
                }
            }
            K::EqualIgnoreCase => text_op(value, self.text(), true, |a, b| a == b),
            K::NotEqualIgnoreCase => text_op(value, self.text(), true, |a, b| a != b),
            K::StartsWith => text_op(value, self.text(), false, |a, b| a.starts_with(b)),
            K::NotStartsWith => text_op(value, self.text(), false, |a, b| !a.starts_with(b)),
            K::StartsWithIgnoreCase => text_op(value, self.text(), true, |a, b| a.starts_with(b)),
            K::NotStartsWithIgnoreCase => {
                text_op(value, self.text(), true, |a, b| !a.starts_with(b))
            }
            K::EndsWith => text_op(value, self.text(), false, |a, b| a.ends_with(b)),
            K::NotEndsWith => text_op(value, self.text(), false, |a, b| !a.ends_with(b)),
            K::EndsWithIgnoreCase => text_op(value, self.text(), true, |a, b| a.ends_with(b)),
            K::NotEndsWithIgnoreCase => text_op(value, self.text(), true, |a, b| !a.ends_with(b)),
            K::Contains => text_op(value, self.text(), false, |a, b| a.contains(b)),
            K::NotContains => text_op(value, self.text(), false, |a, b| !a.contains(b)),
            K::ContainsIgnoreCase => text_op(value, self.text(), true, |a, b| a.contains(b)),
            K::NotContainsIgnoreCase => text_op(value, self.text(), true, |a, b| !a.contains(b)),
            K::IsEmpty => value.as_text().map(str::is_empty),
            K::IsNotEmpty => value.as_text().map(|s| !s.is_empty()),
        }
    }

    fn between(&self, value: &Value) -> Option<bool> {
        let (start, end, inclusion) = self.range();
        let lower = ordering(value, start)?;
        let upper = ordering(value, end)?;
        let above = if inclusion.start_inclusive() {
            lower != Ordering::Less
        } else {
            lower == Ordering::Greater
        };
        let below = if inclusion.end_inclusive() {
            upper != Ordering::Greater
        } else {
            upper == Ordering::Less
        };
        Some(above && below)
    }

    fn member(&self, value: &Value) -> Option<bool> {
        let set = self.set();
        if set.is_empty() {
            return Some(false);
        }
        if value.is_null() {
            return None;
        }
        Some(set.iter().any(|candidate| value.sql_eq(candidate)))
    }
}

fn ordering(value: &Value, operand: &Value) -> Option<Ordering> {
    value.compare(operand)
}

fn text_op(
    value: &Value,
    operand: &str,
    ignore_case: bool,
    op: fn(&str, &str) -> bool,
) -> Option<bool> {
    let text = value.as_text()?;
    if ignore_case {
        Some(op(&text.to_lowercase(), &operand.to_lowercase()))
    } else {
        Some(op(text, operand))
    }
}
