//! Predicate model.
//!
//! A [`Predicate`] is one condition on one field: a [`PredicateKind`] from a
//! closed set plus zero to three operands. Predicates know nothing about SQL;
//! rendering lives in [`crate::render`].
//!
//! # Example
//!
//! ```rust
//! use entiql_core::{FieldRef, TableId, PredicateKind};
//!
//! let age = FieldRef::new(TableId::new("db", "users"), "age");
//! let adult = age.greater_or_equal(18);
//! assert_eq!(adult.kind(), PredicateKind::GreaterOrEqual);
//! assert_eq!(adult.negate().kind(), PredicateKind::LessThan);
//! ```

mod eval;
mod kind;
mod model;
mod operands;

pub use kind::{Arity, Inclusion, PredicateKind};
pub use model::Predicate;
pub use operands::{Operands, ValueSet};
