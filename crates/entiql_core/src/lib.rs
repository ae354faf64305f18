//! # EntiQL Core
//!
//! Translates in-memory entity pipelines into SQL and runs them with
//! deterministic resource release.
//!
//! This crate provides:
//! - A closed predicate model with typed constructors and in-memory evaluation
//! - Dialect-specific rendering of predicates into SQL fragments with
//!   positional binds
//! - Per-table SQL text compiled once when a table is paired with a dialect
//! - Predicate pushdown from filter stages into one `SELECT ... WHERE`
//! - A lazy result stream that closes its cursor, statement and connection
//!   exactly once on every exit path
//! - A `COUNT(*)` fast path for pipelines that cannot change the count
//!
//! ## Example
//!
//! ```rust
//! use entiql_core::{Column, Config, DbmsType, Manager, Table, TableId};
//! use entiql_driver::ScriptedSource;
//! use std::sync::Arc;
//!
//! let table = Table::dynamic(
//!     TableId::new("db", "users"),
//!     vec![Column::new("id"), Column::new("name"), Column::new("age")],
//! )?;
//! let config = Config::new().dbms(DbmsType::MySql);
//! let users = Manager::new(table, Arc::new(ScriptedSource::new()), config);
//!
//! let explain = users
//!     .stream()
//!     .filter(users.field("age").greater_than(18))
//!     .filter(users.field("name").starts_with("A"))
//!     .explain()?;
//! assert_eq!(
//!     explain.sql,
//!     "SELECT `id`,`name`,`age` FROM `db`.`users` \
//!      WHERE (`age` > ?) AND (`name` LIKE BINARY CONCAT(?, '%'))"
//! );
//! assert_eq!(explain.binds.len(), 2);
//! # Ok::<(), entiql_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod compiler;
mod config;
mod count;
mod dialect;
mod error;
mod executor;
mod manager;
mod optimizer;
mod pipeline;
mod predicate;
mod query;
mod schema;
mod types;

pub use compiler::TableSql;
pub use config::Config;
pub use count::CountPlan;
pub use dialect::{
    render, AnsiDialect, DbmsType, Dialect, MySqlDialect, NamingConvention, PostgresDialect,
    QuotingNaming, SqlFragment, SqliteDialect,
};
pub use error::{CoreError, CoreResult};
pub use executor::{QueryState, ResultStream, RowMapper};
pub use manager::Manager;
pub use optimizer::{Optimizer, PendingQuery, Plan};
pub use pipeline::{CompareFn, CustomFn, Filter, MapFn, PeekFn, Pipeline, Residual, Stage};
pub use predicate::{Arity, Inclusion, Operands, Predicate, PredicateKind, ValueSet};
pub use query::{Explain, Query};
pub use schema::{
    Accessor, Column, Getter, IdentityMapper, IntegerBoolMapper, Setter, Table, TableBuilder,
    TypeMapper,
};
pub use types::{ColumnId, FieldRef, TableId};
