//! Table metadata supplied at schema-load time.
//!
//! A [`Table`] lists its columns in select-list order and carries a typed
//! accessor per column. Both are built once and shared for the lifetime of
//! a [`crate::Manager`]; nothing in the query path mutates them.

mod column;
mod table;

pub use column::{Column, IdentityMapper, IntegerBoolMapper, TypeMapper};
pub use table::{Accessor, Getter, Setter, Table, TableBuilder};
