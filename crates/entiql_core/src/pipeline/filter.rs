//! Composite filters.

use crate::error::CoreResult;
use crate::predicate::Predicate;
use crate::schema::{Getter, Table};
use std::fmt;

/// Closure-backed filter condition.
pub type CustomFn<E> = Box<dyn Fn(&E) -> bool + Send>;

/// The condition a filter stage tests.
///
/// Only field predicates can become SQL; the optimizer pushes those that
/// sit in a top-level conjunction and leaves everything else in memory.
pub enum Filter<E> {
    /// A predicate on one column.
    Field(Predicate),
    /// All sub-filters match.
    And(Vec<Filter<E>>),
    /// At least one sub-filter matches.
    Or(Vec<Filter<E>>),
    /// The sub-filter does not match.
    Not(Box<Filter<E>>),
    /// Arbitrary condition, evaluated in memory.
    Custom(CustomFn<E>),
}

impl<E> Filter<E> {
    /// Wraps a closure.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&E) -> bool + Send + 'static,
    {
        Self::Custom(Box::new(f))
    }

    /// `self AND other`, flattening nested conjunctions.
    #[must_use]
    pub fn and(self, other: impl Into<Filter<E>>) -> Self {
        let mut parts = self.into_conjuncts();
        parts.extend(other.into().into_conjuncts());
        Self::And(parts)
    }

    /// `self OR other`
    #[must_use]
    pub fn or(self, other: impl Into<Filter<E>>) -> Self {
        match self {
            Self::Or(mut parts) => {
                parts.push(other.into());
                Self::Or(parts)
            }
            first => Self::Or(vec![first, other.into()]),
        }
    }

    /// `NOT self`
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }

    /// Splits top-level conjunctions into their parts.
    pub fn into_conjuncts(self) -> Vec<Filter<E>> {
        match self {
            Self::And(parts) => parts.into_iter().flat_map(Filter::into_conjuncts).collect(),
            other => vec![other],
        }
    }

    /// Binds every field predicate to its getter.
    pub(crate) fn compile(self, table: &Table<E>) -> CoreResult<CompiledFilter<E>> {
        Ok(match self {
            Self::Field(predicate) => {
                let (_, accessor) = table.resolve(predicate.field())?;
                CompiledFilter::Field {
                    getter: accessor.getter(),
                    predicate,
                }
            }
            Self::And(parts) => CompiledFilter::And(compile_all(parts, table)?),
            Self::Or(parts) => CompiledFilter::Or(compile_all(parts, table)?),
            Self::Not(inner) => CompiledFilter::Not(Box::new(inner.compile(table)?)),
            Self::Custom(f) => CompiledFilter::Custom(f),
        })
    }
}

fn compile_all<E>(parts: Vec<Filter<E>>, table: &Table<E>) -> CoreResult<Vec<CompiledFilter<E>>> {
    parts.into_iter().map(|part| part.compile(table)).collect()
}

impl<E> From<Predicate> for Filter<E> {
    fn from(predicate: Predicate) -> Self {
        Self::Field(predicate)
    }
}

impl<E> fmt::Debug for Filter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(p) => write!(f, "{} {}", p.field(), p.kind()),
            Self::And(parts) => f.debug_tuple("And").field(parts).finish(),
            Self::Or(parts) => f.debug_tuple("Or").field(parts).finish(),
            Self::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
            Self::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// A filter whose field predicates have been resolved to getters.
pub(crate) enum CompiledFilter<E> {
    Field { predicate: Predicate, getter: Getter<E> },
    And(Vec<CompiledFilter<E>>),
    Or(Vec<CompiledFilter<E>>),
    Not(Box<CompiledFilter<E>>),
    Custom(CustomFn<E>),
}

impl<E> CompiledFilter<E> {
    /// Conjunction of `parts`, unwrapped when there is only one.
    pub(crate) fn all(mut parts: Vec<Self>) -> Self {
        match parts.len() {
            1 => parts.remove(0),
            _ => Self::And(parts),
        }
    }

    pub(crate) fn test(&self, entity: &E) -> bool {
        self.eval(entity) == Some(true)
    }

    /// Three-valued evaluation, matching what the database would compute.
    fn eval(&self, entity: &E) -> Option<bool> {
        match self {
            Self::Field { predicate, getter } => predicate.eval(&getter(entity)),
            Self::And(parts) => {
                let mut result = Some(true);
                for part in parts {
                    match part.eval(entity) {
                        Some(false) => return Some(false),
                        None => result = None,
                        Some(true) => {}
                    }
                }
                result
            }
            Self::Or(parts) => {
                let mut result = Some(false);
                for part in parts {
                    match part.eval(entity) {
                        Some(true) => return Some(true),
                        None => result = None,
                        Some(false) => {}
                    }
                }
                result
            }
            Self::Not(inner) => inner.eval(entity).map(|b| !b),
            Self::Custom(f) => Some(f(entity)),
        }
    }
}
