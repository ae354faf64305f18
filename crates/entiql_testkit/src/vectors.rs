//! Dialect render vectors.
//!
//! Each vector pins the exact fragment one predicate renders to in one
//! dialect. The vectors serialize to JSON so other drivers and tools can
//! check their SQL against the same expectations.

use entiql_core::{
    render, Arity, CoreError, CoreResult, DbmsType, FieldRef, Inclusion, Operands, Predicate,
    PredicateKind, SqlFragment, TableId,
};
use entiql_driver::Value;
use serde::{Deserialize, Serialize};

/// A render expectation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Dialect to render with.
    pub dbms: DbmsType,
    /// Predicate kind.
    pub kind: PredicateKind,
    /// Operands: one value, `[start, end]` for ranges, or the set members.
    pub operands: Vec<Value>,
    /// Range inclusion, when not the default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusion: Option<Inclusion>,
    /// Quoted column the predicate renders against.
    pub column: String,
    /// Expected fragment text.
    pub sql: String,
    /// Expected binds, in placeholder order.
    pub binds: Vec<Value>,
}

impl RenderVector {
    fn new(
        id: &str,
        dbms: DbmsType,
        kind: PredicateKind,
        operands: Vec<Value>,
        sql: &str,
        binds: Vec<Value>,
    ) -> Self {
        Self {
            id: id.to_string(),
            dbms,
            kind,
            operands,
            inclusion: None,
            column: "col".to_string(),
            sql: sql.to_string(),
            binds,
        }
    }

    fn inclusion(mut self, inclusion: Inclusion) -> Self {
        self.inclusion = Some(inclusion);
        self
    }

    fn column(mut self, column: &str) -> Self {
        self.column = column.to_string();
        self
    }

    /// Builds the predicate this vector describes.
    ///
    /// # Errors
    ///
    /// Fails if the operands do not fit the kind.
    pub fn predicate(&self) -> CoreResult<Predicate> {
        let field = FieldRef::new(TableId::unqualified("t"), "col");
        let operands = match (self.kind.arity(), self.operands.as_slice()) {
            (Arity::Nullary, []) => Operands::None,
            (Arity::Unary, [value]) => Operands::Single(value.clone()),
            (Arity::Range, [start, end]) => Operands::Range {
                start: start.clone(),
                end: end.clone(),
                inclusion: self.inclusion.unwrap_or_default(),
            },
            (Arity::Set, values) => Operands::Set(values.iter().cloned().collect()),
            (arity, values) => {
                return Err(CoreError::invalid_predicate(
                    self.kind.name(),
                    format!("{} operand(s) for {arity:?}", values.len()),
                ))
            }
        };
        Predicate::new(self.kind, field, operands)
    }

    /// Renders the vector's predicate with its dialect.
    ///
    /// # Errors
    ///
    /// Fails if the operands do not fit the kind.
    pub fn render(&self) -> CoreResult<SqlFragment> {
        let predicate = self.predicate()?;
        Ok(render(self.dbms.dialect().as_ref(), &predicate, &self.column))
    }
}

/// Render vectors covering every fragment shape and each dialect's string
/// idioms.
pub fn render_vectors() -> Vec<RenderVector> {
    use DbmsType::{Generic, MySql, PostgreSql, Sqlite};
    use PredicateKind as K;
    let i = |n: i64| Value::Integer(n);
    let s = |t: &str| Value::from(t);

    vec![
        RenderVector::new("always_true", Generic, K::AlwaysTrue, vec![], "(TRUE)", vec![]),
        RenderVector::new("always_false", Generic, K::AlwaysFalse, vec![], "(FALSE)", vec![]),
        RenderVector::new("is_null", Generic, K::IsNull, vec![], "(col IS NULL)", vec![]),
        RenderVector::new(
            "is_not_null",
            Generic,
            K::IsNotNull,
            vec![],
            "(col IS NOT NULL)",
            vec![],
        ),
        RenderVector::new("equal", Generic, K::Equal, vec![i(1)], "(col = ?)", vec![i(1)]),
        RenderVector::new("not_equal", Generic, K::NotEqual, vec![i(1)], "(col <> ?)", vec![i(1)]),
        RenderVector::new("less_than", Generic, K::LessThan, vec![i(1)], "(col < ?)", vec![i(1)]),
        RenderVector::new(
            "less_or_equal",
            Generic,
            K::LessOrEqual,
            vec![i(1)],
            "(col <= ?)",
            vec![i(1)],
        ),
        RenderVector::new(
            "greater_than",
            MySql,
            K::GreaterThan,
            vec![i(18)],
            "(age > ?)",
            vec![i(18)],
        )
        .column("age"),
        RenderVector::new(
            "greater_or_equal",
            Generic,
            K::GreaterOrEqual,
            vec![i(1)],
            "(col >= ?)",
            vec![i(1)],
        ),
        RenderVector::new(
            "between_ie",
            Generic,
            K::Between,
            vec![i(10), i(20)],
            "(col >= ? AND col < ?)",
            vec![i(10), i(20)],
        ),
        RenderVector::new(
            "between_ii",
            Generic,
            K::Between,
            vec![i(10), i(20)],
            "(col >= ? AND col <= ?)",
            vec![i(10), i(20)],
        )
        .inclusion(Inclusion::StartInclusiveEndInclusive),
        RenderVector::new(
            "between_ee",
            Generic,
            K::Between,
            vec![i(10), i(20)],
            "(col > ? AND col < ?)",
            vec![i(10), i(20)],
        )
        .inclusion(Inclusion::StartExclusiveEndExclusive),
        RenderVector::new(
            "not_between_ie",
            Generic,
            K::NotBetween,
            vec![i(10), i(20)],
            "(NOT((col >= ? AND col < ?)))",
            vec![i(10), i(20)],
        ),
        RenderVector::new(
            "not_between_ei",
            Generic,
            K::NotBetween,
            vec![i(10), i(20)],
            "(NOT((col > ? AND col <= ?)))",
            vec![i(10), i(20)],
        )
        .inclusion(Inclusion::StartExclusiveEndInclusive),
        RenderVector::new(
            "in",
            Generic,
            K::In,
            vec![i(1), i(2), i(3)],
            "(col IN (?,?,?))",
            vec![i(1), i(2), i(3)],
        ),
        RenderVector::new("in_empty", Generic, K::In, vec![], "(FALSE)", vec![]),
        RenderVector::new(
            "not_in",
            Generic,
            K::NotIn,
            vec![i(2), i(1)],
            "(col NOT IN (?,?))",
            vec![i(2), i(1)],
        ),
        RenderVector::new("not_in_empty", Generic, K::NotIn, vec![], "(TRUE)", vec![]),
        RenderVector::new("is_empty", Generic, K::IsEmpty, vec![], "(col = '')", vec![]),
        RenderVector::new("is_not_empty", Sqlite, K::IsNotEmpty, vec![], "(col <> '')", vec![]),
        RenderVector::new(
            "ansi_equal_ignore_case",
            Generic,
            K::EqualIgnoreCase,
            vec![s("a")],
            "(LOWER(col) = LOWER(?))",
            vec![s("a")],
        ),
        RenderVector::new(
            "ansi_not_equal_ignore_case",
            Generic,
            K::NotEqualIgnoreCase,
            vec![s("a")],
            "(NOT((LOWER(col) = LOWER(?))))",
            vec![s("a")],
        ),
        RenderVector::new(
            "ansi_ends_with",
            Generic,
            K::EndsWith,
            vec![s("a")],
            "(col LIKE ('%' || ?))",
            vec![s("a")],
        ),
        RenderVector::new(
            "ansi_contains_ignore_case",
            Generic,
            K::ContainsIgnoreCase,
            vec![s("a")],
            "(LOWER(col) LIKE LOWER('%' || ? || '%'))",
            vec![s("a")],
        ),
        RenderVector::new(
            "mysql_starts_with",
            MySql,
            K::StartsWith,
            vec![s("A")],
            "(name LIKE BINARY CONCAT(?, '%'))",
            vec![s("A")],
        )
        .column("name"),
        RenderVector::new(
            "mysql_starts_with_ignore_case",
            MySql,
            K::StartsWithIgnoreCase,
            vec![s("A")],
            "(col LIKE CONCAT(?, '%'))",
            vec![s("A")],
        ),
        RenderVector::new(
            "mysql_not_contains",
            MySql,
            K::NotContains,
            vec![s("x")],
            "(NOT((col LIKE BINARY CONCAT('%', ?, '%'))))",
            vec![s("x")],
        ),
        RenderVector::new(
            "postgres_ends_with_ignore_case",
            PostgreSql,
            K::EndsWithIgnoreCase,
            vec![s("x")],
            "(col ILIKE ('%' || ?))",
            vec![s("x")],
        ),
        RenderVector::new(
            "postgres_starts_with",
            PostgreSql,
            K::StartsWith,
            vec![s("x")],
            "(col LIKE (? || '%'))",
            vec![s("x")],
        ),
        RenderVector::new(
            "sqlite_equal_ignore_case",
            Sqlite,
            K::EqualIgnoreCase,
            vec![s("x")],
            "(col = ? COLLATE NOCASE)",
            vec![s("x")],
        ),
        RenderVector::new(
            "sqlite_starts_with",
            Sqlite,
            K::StartsWith,
            vec![s("x")],
            "(col GLOB (? || '*'))",
            vec![s("x")],
        ),
        RenderVector::new(
            "sqlite_contains",
            Sqlite,
            K::Contains,
            vec![s("x")],
            "(instr(col, ?) > 0)",
            vec![s("x")],
        ),
    ]
}

/// The render vectors as pretty-printed JSON.
pub fn render_vectors_json() -> String {
    serde_json::to_string_pretty(&render_vectors()).expect("vectors serialize")
}
