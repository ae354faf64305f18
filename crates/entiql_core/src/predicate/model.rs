//! The predicate value type and its constructors.

use crate::error::{CoreError, CoreResult};
use crate::predicate::kind::{Arity, Inclusion, PredicateKind};
use crate::predicate::operands::{Operands, ValueSet};
use crate::types::FieldRef;
use entiql_driver::Value;

/// A single filterable condition on one field.
///
/// Predicates are immutable once built. [`Predicate::new`] validates the
/// operands against the kind; the typed helpers on [`FieldRef`] cannot
/// produce an invalid shape and never fail.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    kind: PredicateKind,
    field: FieldRef,
    operands: Operands,
}

impl Predicate {
    /// Creates a predicate, checking that `operands` fit `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPredicate`] if the operand shape does not
    /// match the kind's arity, an operand is `NULL`, or a text kind gets a
    /// non-text operand.
    pub fn new(kind: PredicateKind, field: FieldRef, operands: Operands) -> CoreResult<Self> {
        let name = kind.name();
        match (kind.arity(), &operands) {
            (Arity::Nullary, Operands::None) => {}
            (Arity::Unary, Operands::Single(value)) => {
                if value.is_null() {
                    return Err(CoreError::invalid_predicate(
                        name,
                        "operand is NULL; use IS_NULL / IS_NOT_NULL",
                    ));
                }
                if kind.is_text() && value.as_text().is_none() {
                    return Err(CoreError::invalid_predicate(
                        name,
                        format!("expected a text operand, got {}", value.type_name()),
                    ));
                }
            }
            (Arity::Range, Operands::Range { start, end, .. }) => {
                if start.is_null() || end.is_null() {
                    return Err(CoreError::invalid_predicate(name, "range bound is NULL"));
                }
            }
            (Arity::Set, Operands::Set(set)) => {
                if set.contains_null() {
                    return Err(CoreError::invalid_predicate(name, "set contains NULL"));
                }
            }
            (arity, operands) => {
                return Err(CoreError::invalid_predicate(
                    name,
                    format!("expected {arity:?} operands, got {operands:?}"),
                ));
            }
        }
        Ok(Self::unchecked(kind, field, operands))
    }

    const fn unchecked(kind: PredicateKind, field: FieldRef, operands: Operands) -> Self {
        Self {
            kind,
            field,
            operands,
        }
    }

    /// A predicate that matches every row.
    pub fn always_true(field: FieldRef) -> Self {
        Self::unchecked(PredicateKind::AlwaysTrue, field, Operands::None)
    }

    /// A predicate that matches no row.
    pub fn always_false(field: FieldRef) -> Self {
        Self::unchecked(PredicateKind::AlwaysFalse, field, Operands::None)
    }

    /// Returns the kind.
    pub fn kind(&self) -> PredicateKind {
        self.kind
    }

    /// Returns the field the predicate tests.
    pub fn field(&self) -> &FieldRef {
        &self.field
    }

    /// Returns the operands.
    pub fn operands(&self) -> &Operands {
        &self.operands
    }

    /// Number of bind values the rendered fragment will carry.
    pub fn bind_count(&self) -> usize {
        self.operands.bind_count()
    }

    /// Returns the predicate matching exactly the rows this one rejects.
    #[must_use]
    pub fn negate(&self) -> Self {
        Self::unchecked(self.kind.negate(), self.field.clone(), self.operands.clone())
    }

    pub(crate) fn single(&self) -> &Value {
        match &self.operands {
            Operands::Single(value) => value,
            other => unreachable!("{} validated with one operand, has {other:?}", self.kind),
        }
    }

    pub(crate) fn range(&self) -> (&Value, &Value, Inclusion) {
        match &self.operands {
            Operands::Range {
                start,
                end,
                inclusion,
            } => (start, end, *inclusion),
            other => unreachable!("{} validated with a range, has {other:?}", self.kind),
        }
    }

    pub(crate) fn set(&self) -> &ValueSet {
        match &self.operands {
            Operands::Set(set) => set,
            other => unreachable!("{} validated with a set, has {other:?}", self.kind),
        }
    }

    pub(crate) fn text(&self) -> &str {
        self.single().as_text().unwrap_or_else(|| {
            unreachable!("{} validated with a text operand", self.kind)
        })
    }
}

/// Typed predicate constructors.
///
/// `NULL` operands are folded into the predicate SQL would evaluate them as:
/// `equal(NULL)` is `IS NULL`, an ordering against `NULL` matches nothing.
impl FieldRef {
    fn unary(&self, kind: PredicateKind, value: Value) -> Predicate {
        Predicate::unchecked(kind, self.clone(), Operands::Single(value))
    }

    fn compare(&self, kind: PredicateKind, value: impl Into<Value>) -> Predicate {
        match value.into() {
            Value::Null => Predicate::always_false(self.clone()),
            value => self.unary(kind, value),
        }
    }

    fn text(&self, kind: PredicateKind, value: impl Into<String>) -> Predicate {
        self.unary(kind, Value::Text(value.into()))
    }

    fn nullary(&self, kind: PredicateKind) -> Predicate {
        Predicate::unchecked(kind, self.clone(), Operands::None)
    }

    /// `field IS NULL`
    pub fn is_null(&self) -> Predicate {
        self.nullary(PredicateKind::IsNull)
    }

    /// `field IS NOT NULL`
    pub fn is_not_null(&self) -> Predicate {
        self.nullary(PredicateKind::IsNotNull)
    }

    /// `field = value`
    pub fn equal(&self, value: impl Into<Value>) -> Predicate {
        match value.into() {
            Value::Null => self.is_null(),
            value => self.unary(PredicateKind::Equal, value),
        }
    }

    /// `field <> value`
    pub fn not_equal(&self, value: impl Into<Value>) -> Predicate {
        match value.into() {
            Value::Null => self.is_not_null(),
            value => self.unary(PredicateKind::NotEqual, value),
        }
    }

    /// `field < value`
    pub fn less_than(&self, value: impl Into<Value>) -> Predicate {
        self.compare(PredicateKind::LessThan, value)
    }

    /// `field <= value`
    pub fn less_or_equal(&self, value: impl Into<Value>) -> Predicate {
        self.compare(PredicateKind::LessOrEqual, value)
    }

    /// `field > value`
    pub fn greater_than(&self, value: impl Into<Value>) -> Predicate {
        self.compare(PredicateKind::GreaterThan, value)
    }

    /// `field >= value`
    pub fn greater_or_equal(&self, value: impl Into<Value>) -> Predicate {
        self.compare(PredicateKind::GreaterOrEqual, value)
    }

    /// `start <= field < end`
    pub fn between(&self, start: impl Into<Value>, end: impl Into<Value>) -> Predicate {
        self.between_with(start, end, Inclusion::default())
    }

    /// Range predicate with explicit inclusion.
    pub fn between_with(
        &self,
        start: impl Into<Value>,
        end: impl Into<Value>,
        inclusion: Inclusion,
    ) -> Predicate {
        self.range(PredicateKind::Between, start.into(), end.into(), inclusion)
    }

    /// Negated range predicate with explicit inclusion.
    pub fn not_between_with(
        &self,
        start: impl Into<Value>,
        end: impl Into<Value>,
        inclusion: Inclusion,
    ) -> Predicate {
        self.range(PredicateKind::NotBetween, start.into(), end.into(), inclusion)
    }

    fn range(
        &self,
        kind: PredicateKind,
        start: Value,
        end: Value,
        inclusion: Inclusion,
    ) -> Predicate {
        if start.is_null() || end.is_null() {
            return Predicate::always_false(self.clone());
        }
        Predicate::unchecked(
            kind,
            self.clone(),
            Operands::Range {
                start,
                end,
                inclusion,
            },
        )
    }

    /// `field IN (values...)`, values bound in the given order.
    pub fn is_in<I, V>(&self, values: I) -> Predicate
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let set: ValueSet = values.into_iter().collect();
        Predicate::unchecked(PredicateKind::In, self.clone(), Operands::Set(set.without_nulls()))
    }

    /// `field NOT IN (values...)`
    ///
    /// A `NULL` among the values makes SQL `NOT IN` match nothing, and the
    /// predicate is built that way.
    pub fn not_in<I, V>(&self, values: I) -> Predicate
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let set: ValueSet = values.into_iter().collect();
        if set.contains_null() {
            return Predicate::always_false(self.clone());
        }
        Predicate::unchecked(PredicateKind::NotIn, self.clone(), Operands::Set(set))
    }

    /// Case-insensitive equality.
    pub fn equal_ignore_case(&self, value: impl Into<String>) -> Predicate {
        self.text(PredicateKind::EqualIgnoreCase, value)
    }

    /// Text starts with `prefix`.
    pub fn starts_with(&self, prefix: impl Into<String>) -> Predicate {
        self.text(PredicateKind::StartsWith, prefix)
    }

    /// Text starts with `prefix`, ignoring case.
    pub fn starts_with_ignore_case(&self, prefix: impl Into<String>) -> Predicate {
        self.text(PredicateKind::StartsWithIgnoreCase, prefix)
    }

    /// Text ends with `suffix`.
    pub fn ends_with(&self, suffix: impl Into<String>) -> Predicate {
        self.text(PredicateKind::EndsWith, suffix)
    }

    /// Text ends with `suffix`, ignoring case.
    pub fn ends_with_ignore_case(&self, suffix: impl Into<String>) -> Predicate {
        self.text(PredicateKind::EndsWithIgnoreCase, suffix)
    }

    /// Text contains `needle`.
    pub fn contains(&self, needle: impl Into<String>) -> Predicate {
        self.text(PredicateKind::Contains, needle)
    }

    /// Text contains `needle`, ignoring case.
    pub fn contains_ignore_case(&self, needle: impl Into<String>) -> Predicate {
        self.text(PredicateKind::ContainsIgnoreCase, needle)
    }

    /// Text is `''`.
    pub fn is_empty(&self) -> Predicate {
        self.nullary(PredicateKind::IsEmpty)
    }

    /// Text is not `''`.
    pub fn is_not_empty(&self) -> Predicate {
        self.nullary(PredicateKind::IsNotEmpty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TableId;

    fn age() -> FieldRef {
        FieldRef::new(TableId::new("db", "users"), "age")
    }

    #[test]
    fn new_validates_arity() {
        assert!(Predicate::new(PredicateKind::IsNull, age(), Operands::None).is_ok());
        assert!(matches!(
            Predicate::new(PredicateKind::Between, age(), Operands::Single(Value::Integer(1))),
            Err(CoreError::InvalidPredicate {
                kind: "BETWEEN",
                ..
            })
        ));
        assert!(
            Predicate::new(PredicateKind::Equal, age(), Operands::None).is_err()
        );
        assert!(Predicate::new(PredicateKind::In, age(), Operands::Set(ValueSet::new())).is_ok());
    }

    #[test]
    fn new_rejects_null_and_non_text_operands() {
        assert!(
            Predicate::new(PredicateKind::Equal, age(), Operands::Single(Value::Null)).is_err()
        );
        assert!(Predicate::new(
            PredicateKind::StartsWith,
            age(),
            Operands::Single(Value::Integer(1))
        )
        .is_err());
        let with_null: ValueSet = vec![Value::Null].into_iter().collect();
        assert!(Predicate::new(PredicateKind::NotIn, age(), Operands::Set(with_null)).is_err());
    }

    #[test]
    fn null_operands_fold_to_sql_semantics() {
        assert_eq!(age().equal(Value::Null).kind(), PredicateKind::IsNull);
        assert_eq!(age().not_equal(Value::Null).kind(), PredicateKind::IsNotNull);
        assert_eq!(age().less_than(Value::Null).kind(), PredicateKind::AlwaysFalse);
        assert_eq!(
            age().between(Value::Null, 5).kind(),
            PredicateKind::AlwaysFalse
        );
        assert_eq!(
            age().not_in(vec![Value::Integer(1), Value::Null]).kind(),
            PredicateKind::AlwaysFalse
        );
        assert_eq!(age().is_in(vec![Value::Null, Value::Integer(2)]).bind_count(), 1);
    }

    #[test]
    fn negate_keeps_field_and_operands() {
        let p = age().between_with(10, 20, Inclusion::StartExclusiveEndInclusive);
        let n = p.negate();
        assert_eq!(n.kind(), PredicateKind::NotBetween);
        assert_eq!(n.field(), p.field());
        assert_eq!(n.operands(), p.operands());
        assert_eq!(n.negate(), p);
    }

    #[test]
    fn helpers_produce_valid_predicates() {
        let name = FieldRef::new(TableId::new("db", "users"), "name");
        let built = [
            age().equal(1),
            age().greater_or_equal(3),
            age().between(1, 2),
            age().is_in([1, 2, 3]),
            name.starts_with("A"),
            name.contains_ignore_case("b"),
            name.is_empty(),
        ];
        for p in built {
            let rebuilt = Predicate::new(p.kind(), p.field().clone(), p.operands().clone());
            assert_eq!(rebuilt.unwrap(), p);
        }
    }
}
