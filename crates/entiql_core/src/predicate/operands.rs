//! Predicate operands.

use crate::predicate::kind::Inclusion;
use entiql_driver::Value;

/// An ordered, duplicate-free collection of values.
///
/// Iteration order is insertion order. Rendering an `IN` predicate binds the
/// values in exactly this order, so the same input always yields the same
/// SQL text and bind list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueSet(Vec<Value>);

impl ValueSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value unless an equal value is already present.
    ///
    /// Returns true if the value was added.
    pub fn insert(&mut self, value: Value) -> bool {
        if self.0.contains(&value) {
            return false;
        }
        self.0.push(value);
        true
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the set has no values.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    /// Returns the values as a slice, in insertion order.
    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    /// Returns true if any value is `NULL`.
    pub fn contains_null(&self) -> bool {
        self.0.iter().any(Value::is_null)
    }

    pub(crate) fn without_nulls(self) -> Self {
        Self(self.0.into_iter().filter(|v| !v.is_null()).collect())
    }
}

impl<V: Into<Value>> FromIterator<V> for ValueSet {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value.into());
        }
        set
    }
}

impl<'a> IntoIterator for &'a ValueSet {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The operands a predicate carries, shaped by its [`super::Arity`].
#[derive(Debug, Clone, PartialEq)]
pub enum Operands {
    /// No operands.
    None,
    /// One value.
    Single(Value),
    /// A range with its inclusion.
    Range {
        /// Lower bound.
        start: Value,
        /// Upper bound.
        end: Value,
        /// Which bounds are inclusive.
        inclusion: Inclusion,
    },
    /// A set of values.
    Set(ValueSet),
}

impl Operands {
    /// Number of bind values these operands produce when rendered.
    pub fn bind_count(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Single(_) => 1,
            Self::Range { .. } => 2,
            Self::Set(set) => set.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_set_keeps_first_occurrence_order() {
        let set: ValueSet = vec![3, 1, 3, 2, 1].into_iter().collect();
        assert_eq!(
            set.as_slice(),
            &[Value::Integer(3), Value::Integer(1), Value::Integer(2)]
        );
    }

    #[test]
    fn value_set_insert_reports_duplicates() {
        let mut set = ValueSet::new();
        assert!(set.insert(Value::from("a")));
        assert!(!set.insert(Value::from("a")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn without_nulls() {
        let set: ValueSet = vec![Value::Null, Value::Integer(1)].into_iter().collect();
        assert!(set.contains_null());
        let set = set.without_nulls();
        assert!(!set.contains_null());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn bind_counts() {
        assert_eq!(Operands::None.bind_count(), 0);
        assert_eq!(Operands::Single(Value::Integer(1)).bind_count(), 1);
        assert_eq!(
            Operands::Range {
                start: Value::Integer(1),
                end: Value::Integer(2),
                inclusion: Inclusion::default()
            }
            .bind_count(),
            2
        );
        let set: ValueSet = vec![1, 2, 3].into_iter().collect();
        assert_eq!(Operands::Set(set).bind_count(), 3);
    }
}
