//! Predicate kinds and range inclusion.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which ends of a range predicate are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Inclusion {
    /// `start <= x <= end`
    StartInclusiveEndInclusive,
    /// `start <= x < end`
    #[default]
    StartInclusiveEndExclusive,
    /// `start < x <= end`
    StartExclusiveEndInclusive,
    /// `start < x < end`
    StartExclusiveEndExclusive,
}

impl Inclusion {
    /// Returns true if the start bound is inclusive.
    pub const fn start_inclusive(self) -> bool {
        matches!(
            self,
            Self::StartInclusiveEndInclusive | Self::StartInclusiveEndExclusive
        )
    }

    /// Returns true if the end bound is inclusive.
    pub const fn end_inclusive(self) -> bool {
        matches!(
            self,
            Self::StartInclusiveEndInclusive | Self::StartExclusiveEndInclusive
        )
    }
}

/// How many operands a predicate kind takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// No operands.
    Nullary,
    /// Exactly one value.
    Unary,
    /// A start value, an end value and an [`Inclusion`].
    Range,
    /// An ordered, duplicate-free set of values (possibly empty).
    Set,
}

/// The closed set of predicate kinds.
///
/// Kinds come in positive/negative pairs; [`PredicateKind::negate`] maps each
/// to its partner, so no separate negation flag is ever stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredicateKind {
    /// Matches every row.
    AlwaysTrue,
    /// Matches no row.
    AlwaysFalse,
    /// `IS NULL`
    IsNull,
    /// `IS NOT NULL`
    IsNotNull,
    /// `=`
    Equal,
    /// `<>`
    NotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessOrEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterOrEqual,
    /// Inside a range.
    Between,
    /// Outside a range.
    NotBetween,
    /// Member of a set.
    In,
    /// Not a member of a set.
    NotIn,
    /// Equal ignoring case.
    EqualIgnoreCase,
    /// Not equal ignoring case.
    NotEqualIgnoreCase,
    /// Text starts with the operand.
    StartsWith,
    /// Text does not start with the operand.
    NotStartsWith,
    /// Text starts with the operand, ignoring case.
    StartsWithIgnoreCase,
    /// Text does not start with the operand, ignoring case.
    NotStartsWithIgnoreCase,
    /// Text ends with the operand.
    EndsWith,
    /// Text does not end with the operand.
    NotEndsWith,
    /// Text ends with the operand, ignoring case.
    EndsWithIgnoreCase,
    /// Text does not end with the operand, ignoring case.
    NotEndsWithIgnoreCase,
    /// Text contains the operand.
    Contains,
    /// Text does not contain the operand.
    NotContains,
    /// Text contains the operand, ignoring case.
    ContainsIgnoreCase,
    /// Text does not contain the operand, ignoring case.
    NotContainsIgnoreCase,
    /// Text is the empty string.
    IsEmpty,
    /// Text is not the empty string.
    IsNotEmpty,
}

impl PredicateKind {
    /// Every kind, in declaration order.
    pub const ALL: [PredicateKind; 30] = [
        Self::AlwaysTrue,
        Self::AlwaysFalse,
        Self::IsNull,
        Self::IsNotNull,
        Self::Equal,
        Self::NotEqual,
        Self::LessThan,
        Self::LessOrEqual,
        Self::GreaterThan,
        Self::GreaterOrEqual,
        Self::Between,
        Self::NotBetween,
        Self::In,
        Self::NotIn,
        Self::EqualIgnoreCase,
        Self::NotEqualIgnoreCase,
        Self::StartsWith,
        Self::NotStartsWith,
        Self::StartsWithIgnoreCase,
        Self::NotStartsWithIgnoreCase,
        Self::EndsWith,
        Self::NotEndsWith,
        Self::EndsWithIgnoreCase,
        Self::NotEndsWithIgnoreCase,
        Self::Contains,
        Self::NotContains,
        Self::ContainsIgnoreCase,
        Self::NotContainsIgnoreCase,
        Self::IsEmpty,
        Self::IsNotEmpty,
    ];

    /// Returns the kind that matches exactly the rows this kind rejects.
    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            Self::AlwaysTrue => Self::AlwaysFalse,
            Self::AlwaysFalse => Self::AlwaysTrue,
            Self::IsNull => Self::IsNotNull,
            Self::IsNotNull => Self::IsNull,
            Self::Equal => Self::NotEqual,
            Self::NotEqual => Self::Equal,
            Self::LessThan => Self::GreaterOrEqual,
            Self::GreaterOrEqual => Self::LessThan,
            Self::LessOrEqual => Self::GreaterThan,
            Self::GreaterThan => Self::LessOrEqual,
            Self::Between => Self::NotBetween,
            Self::NotBetween => Self::Between,
            Self::In => Self::NotIn,
            Self::NotIn => Self::In,
            Self::EqualIgnoreCase => Self::NotEqualIgnoreCase,
            Self::NotEqualIgnoreCase => Self::EqualIgnoreCase,
            Self::StartsWith => Self::NotStartsWith,
            Self::NotStartsWith => Self::StartsWith,
            Self::StartsWithIgnoreCase => Self::NotStartsWithIgnoreCase,
            Self::NotStartsWithIgnoreCase => Self::StartsWithIgnoreCase,
            Self::EndsWith => Self::NotEndsWith,
            Self::NotEndsWith => Self::EndsWith,
            Self::EndsWithIgnoreCase => Self::NotEndsWithIgnoreCase,
            Self::NotEndsWithIgnoreCase => Self::EndsWithIgnoreCase,
            Self::Contains => Self::NotContains,
            Self::NotContains => Self::Contains,
            Self::ContainsIgnoreCase => Self::NotContainsIgnoreCase,
            Self::NotContainsIgnoreCase => Self::ContainsIgnoreCase,
            Self::IsEmpty => Self::IsNotEmpty,
            Self::IsNotEmpty => Self::IsEmpty,
        }
    }

    /// Returns the operand shape this kind requires.
    pub const fn arity(self) -> Arity {
        match self {
            Self::AlwaysTrue
            | Self::AlwaysFalse
            | Self::IsNull
            | Self::IsNotNull
            | Self::IsEmpty
            | Self::IsNotEmpty => Arity::Nullary,
            Self::Between | Self::NotBetween => Arity::Range,
            Self::In | Self::NotIn => Arity::Set,
            Self::Equal
            | Self::NotEqual
            | Self::LessThan
            | Self::LessOrEqual
            | Self::GreaterThan
            | Self::GreaterOrEqual
            | Self::EqualIgnoreCase
            | Self::NotEqualIgnoreCase
            | Self::StartsWith
            | Self::NotStartsWith
            | Self::StartsWithIgnoreCase
            | Self::NotStartsWithIgnoreCase
            | Self::EndsWith
            | Self::NotEndsWith
            | Self::EndsWithIgnoreCase
            | Self::NotEndsWithIgnoreCase
            | Self::Contains
            | Self::NotContains
            | Self::ContainsIgnoreCase
            | Self::NotContainsIgnoreCase => Arity::Unary,
        }
    }

    /// Returns true for kinds whose operand must be text.
    pub const fn is_text(self) -> bool {
        matches!(
            self,
            Self::EqualIgnoreCase
                | Self::NotEqualIgnoreCase
                | Self::StartsWith
                | Self::NotStartsWith
                | Self::StartsWithIgnoreCase
                | Self::NotStartsWithIgnoreCase
                | Self::EndsWith
                | Self::NotEndsWith
                | Self::EndsWithIgnoreCase
                | Self::NotEndsWithIgnoreCase
                | Self::Contains
                | Self::NotContains
                | Self::ContainsIgnoreCase
                | Self::NotContainsIgnoreCase
        )
    }

    /// Looks a kind up by its [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// SQL-style name, for diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::AlwaysTrue => "ALWAYS_TRUE",
            Self::AlwaysFalse => "ALWAYS_FALSE",
            Self::IsNull => "IS_NULL",
            Self::IsNotNull => "IS_NOT_NULL",
            Self::Equal => "EQUAL",
            Self::NotEqual => "NOT_EQUAL",
            Self::LessThan => "LESS_THAN",
            Self::LessOrEqual => "LESS_OR_EQUAL",
            Self::GreaterThan => "GREATER_THAN",
            Self::GreaterOrEqual => "GREATER_OR_EQUAL",
            Self::Between => "BETWEEN",
            Self::NotBetween => "NOT_BETWEEN",
            Self::In => "IN",
            Self::NotIn => "NOT_IN",
            Self::EqualIgnoreCase => "EQUAL_IGNORE_CASE",
            Self::NotEqualIgnoreCase => "NOT_EQUAL_IGNORE_CASE",
            Self::StartsWith => "STARTS_WITH",
            Self::NotStartsWith => "NOT_STARTS_WITH",
            Self::StartsWithIgnoreCase => "STARTS_WITH_IGNORE_CASE",
            Self::NotStartsWithIgnoreCase => "NOT_STARTS_WITH_IGNORE_CASE",
            Self::EndsWith => "ENDS_WITH",
            Self::NotEndsWith => "NOT_ENDS_WITH",
            Self::EndsWithIgnoreCase => "ENDS_WITH_IGNORE_CASE",
            Self::NotEndsWithIgnoreCase => "NOT_ENDS_WITH_IGNORE_CASE",
            Self::Contains => "CONTAINS",
            Self::NotContains => "NOT_CONTAINS",
            Self::ContainsIgnoreCase => "CONTAINS_IGNORE_CASE",
            Self::NotContainsIgnoreCase => "NOT_CONTAINS_IGNORE_CASE",
            Self::IsEmpty => "IS_EMPTY",
            Self::IsNotEmpty => "IS_NOT_EMPTY",
        }
    }
}

impl fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
