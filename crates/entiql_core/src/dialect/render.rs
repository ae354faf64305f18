//! Predicate to SQL fragment rendering.

use super::{Dialect, SqlFragment};
use crate::predicate::{Inclusion, Predicate, PredicateKind};
use entiql_driver::Value;

/// Renders `predicate` against the already-quoted `column`.
///
/// The fragment's placeholders and binds correspond one to one, in order.
/// An empty `IN` renders as `(FALSE)` and an empty `NOT IN` as `(TRUE)`,
/// since `IN ()` is rejected by most products.
pub fn render(dialect: &dyn Dialect, predicate: &Predicate, column: &str) -> SqlFragment {
    use PredicateKind as K;
    match predicate.kind() {
        K::AlwaysTrue => SqlFragment::text("(TRUE)"),
        K::AlwaysFalse => SqlFragment::text("(FALSE)"),
        K::IsNull => SqlFragment::text(format!("({column} IS NULL)")),
        K::IsNotNull => SqlFragment::text(format!("({column} IS NOT NULL)")),
        K::Equal => compare(predicate, column, "="),
        K::NotEqual => compare(predicate, column, "<>"),
        K::LessThan => compare(predicate, column, "<"),
        K::LessOrEqual => compare(predicate, column, "<="),
        K::GreaterThan => compare(predicate, column, ">"),
        K::GreaterOrEqual => compare(predicate, column, ">="),
        K::Between => range(predicate, column),
        K::NotBetween => range(predicate, column).negate(),
        K::In => set(predicate, column, "IN", "(FALSE)"),
        K::NotIn => set(predicate, column, "NOT IN", "(TRUE)"),
        K::EqualIgnoreCase => hook(predicate, dialect.equal_ignore_case(column)),
        K::NotEqualIgnoreCase => hook(predicate, dialect.equal_ignore_case(column)).negate(),
        K::StartsWith => hook(predicate, dialect.starts_with(column)),
        K::NotStartsWith => hook(predicate, dialect.starts_with(column)).negate(),
        K::StartsWithIgnoreCase => hook(predicate, dialect.starts_with_ignore_case(column)),
        K::NotStartsWithIgnoreCase => {
            hook(predicate, dialect.starts_with_ignore_case(column)).negate()
        }
        K::EndsWith => hook(predicate, dialect.ends_with(column)),
        K::NotEndsWith => hook(predicate, dialect.ends_with(column)).negate(),
        K::EndsWithIgnoreCase => hook(predicate, dialect.ends_with_ignore_case(column)),
        K::NotEndsWithIgnoreCase => hook(predicate, dialect.ends_with_ignore_case(column)).negate(),
        K::Contains => hook(predicate, dialect.contains(column)),
        K::NotContains => hook(predicate, dialect.contains(column)).negate(),
        K::ContainsIgnoreCase => hook(predicate, dialect.contains_ignore_case(column)),
        K::NotContainsIgnoreCase => hook(predicate, dialect.contains_ignore_case(column)).negate(),
        K::IsEmpty => SqlFragment::text(format!("({column} = '')")),
        K::IsNotEmpty => SqlFragment::text(format!("({column} <> '')")),
    }
}

fn compare(predicate: &Predicate, column: &str, op: &str) -> SqlFragment {
    SqlFragment::new(
        format!("({column} {op} ?)"),
        vec![predicate.single().clone()],
    )
}

fn range(predicate: &Predicate, column: &str) -> SqlFragment {
    let (start, end, inclusion) = predicate.range();
    let (lower, upper) = match inclusion {
        Inclusion::StartInclusiveEndInclusive => (">=", "<="),
        Inclusion::StartInclusiveEndExclusive => (">=", "<"),
        Inclusion::StartExclusiveEndInclusive => (">", "<="),
        Inclusion::StartExclusiveEndExclusive => (">", "<"),
    };
    SqlFragment::new(
        format!("({column} {lower} ? AND {column} {upper} ?)"),
        vec![start.clone(), end.clone()],
    )
}

fn set(predicate: &Predicate, column: &str, op: &str, when_empty: &str) -> SqlFragment {
    let values = predicate.set();
    if values.is_empty() {
        return SqlFragment::text(when_empty);
    }
    let placeholders = vec!["?"; values.len()].join(",");
    SqlFragment::new(
        format!("({column} {op} ({placeholders}))"),
        values.iter().cloned().collect(),
    )
}

fn hook(predicate: &Predicate, sql: String) -> SqlFragment {
    SqlFragment::new(sql, vec![Value::from(predicate.text())])
}
