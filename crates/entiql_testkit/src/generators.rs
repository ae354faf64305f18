//! Property-based test generators using proptest.
//!
//! Every strategy produces values that satisfy the predicate model's
//! construction rules, so `Predicate::new` never rejects them.

use crate::fixtures::{users_table, User};
use entiql_core::{FieldRef, Inclusion, Operands, Predicate, PredicateKind, TableId, ValueSet};
use entiql_driver::Value;
use proptest::prelude::*;

/// Strategy for short text operands, including the empty string.
pub fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-cA-C]{0,3}").expect("Invalid regex")
}

/// Strategy for non-null scalar operands.
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        (-100i64..100).prop_map(Value::Integer),
        (-100.0f64..100.0).prop_map(Value::Real),
        text_strategy().prop_map(Value::Text),
    ]
}

/// Strategy for every range inclusion.
pub fn inclusion_strategy() -> impl Strategy<Value = Inclusion> {
    prop_oneof![
        Just(Inclusion::StartInclusiveEndInclusive),
        Just(Inclusion::StartInclusiveEndExclusive),
        Just(Inclusion::StartExclusiveEndInclusive),
        Just(Inclusion::StartExclusiveEndExclusive),
    ]
}

/// Strategy for any predicate kind.
pub fn kind_strategy() -> impl Strategy<Value = PredicateKind> {
    prop::sample::select(PredicateKind::ALL.to_vec())
}

/// Strategy for operands that fit `kind`.
pub fn operands_strategy(kind: PredicateKind) -> BoxedStrategy<Operands> {
    use entiql_core::Arity;
    let scalar = if kind.is_text() {
        text_strategy().prop_map(Value::Text).boxed()
    } else {
        scalar_strategy().boxed()
    };
    match kind.arity() {
        Arity::Nullary => Just(Operands::None).boxed(),
        Arity::Unary => scalar.prop_map(Operands::Single).boxed(),
        Arity::Range => (-100i64..100, -100i64..100, inclusion_strategy())
            .prop_map(|(start, end, inclusion)| Operands::Range {
                start: Value::Integer(start),
                end: Value::Integer(end),
                inclusion,
            })
            .boxed(),
        Arity::Set => prop::collection::vec(-20i64..20, 0..6)
            .prop_map(|values| Operands::Set(values.into_iter().collect::<ValueSet>()))
            .boxed(),
    }
}

/// Strategy for any valid predicate on `field`.
pub fn predicate_strategy(field: FieldRef) -> impl Strategy<Value = Predicate> {
    kind_strategy().prop_flat_map(move |kind| {
        let field = field.clone();
        operands_strategy(kind).prop_map(move |operands| {
            Predicate::new(kind, field.clone(), operands).expect("strategy yields valid operands")
        })
    })
}

/// Strategy for any valid predicate on a throwaway `t.col` field.
pub fn any_predicate_strategy() -> impl Strategy<Value = Predicate> {
    predicate_strategy(FieldRef::new(TableId::unqualified("t"), "col"))
}

/// Strategy for well-typed predicates on the `users` table.
///
/// Ages get numeric comparisons, ranges and sets; names get text
/// predicates; `active` gets equality.
pub fn user_predicate_strategy() -> impl Strategy<Value = Predicate> {
    let table = users_table();
    let age = table.field("age");
    let name = table.field("name");
    let active = table.field("active");
    let id = table.field("id");

    let numeric = prop_oneof![
        (0i64..80).prop_map({
            let age = age.clone();
            move |n| age.greater_than(n)
        }),
        (0i64..80).prop_map({
            let age = age.clone();
            move |n| age.less_or_equal(n)
        }),
        (0i64..80, 0i64..80, inclusion_strategy()).prop_map({
            let age = age.clone();
            move |(a, b, inclusion)| age.between_with(a.min(b), a.max(b), inclusion)
        }),
        (0i64..80, 0i64..80).prop_map({
            let age = age.clone();
            move |(a, b)| age.not_between_with(a.min(b), a.max(b), Inclusion::default())
        }),
        prop::collection::vec(0i64..10, 0..4).prop_map({
            let id = id.clone();
            move |ids| id.is_in(ids)
        }),
        prop::collection::vec(0i64..10, 0..4).prop_map(move |ids| id.not_in(ids)),
        Just(age.is_null()),
        Just(age.is_not_null()),
    ];
    let textual = prop_oneof![
        text_strategy().prop_map({
            let name = name.clone();
            move |s| name.starts_with(s)
        }),
        text_strategy().prop_map({
            let name = name.clone();
            move |s| name.starts_with_ignore_case(s)
        }),
        text_strategy().prop_map({
            let name = name.clone();
            move |s| name.contains(s).negate()
        }),
        text_strategy().prop_map({
            let name = name.clone();
            move |s| name.ends_with_ignore_case(s)
        }),
        Just(name.is_empty()),
        any::<bool>().prop_map(move |b| active.equal(b)),
    ];
    prop_oneof![numeric, textual]
}

/// Strategy for users with small ids, short names and optional ages.
pub fn user_strategy() -> impl Strategy<Value = User> {
    (
        0i64..10,
        text_strategy(),
        prop::option::of(0i64..80),
        any::<bool>(),
    )
        .prop_map(|(id, name, age, active)| User {
            id,
            name,
            age,
            active,
        })
}

/// Strategy for a small data set.
pub fn users_strategy() -> impl Strategy<Value = Vec<User>> {
    prop::collection::vec(user_strategy(), 0..12)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_predicates_have_matching_bind_counts(p in any_predicate_strategy()) {
            prop_assert_eq!(p.bind_count(), p.operands().bind_count());
        }

        #[test]
        fn user_predicates_reference_users(p in user_predicate_strategy()) {
            prop_assert!(users_table().resolve(p.field()).is_ok());
        }
    }
}
