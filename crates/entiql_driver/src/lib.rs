//! # EntiQL Driver
//!
//! Driver seam for EntiQL.
//!
//! This crate is the lowest layer of EntiQL. It knows nothing about
//! predicates, dialects or entities; it only moves SQL text, positional bind
//! values and rows between EntiQL and a physical database driver.
//!
//! ## Design Principles
//!
//! - Every acquired resource (connection lease, prepared statement, cursor)
//!   has an explicit `close`
//! - Parameters are positional and 1-based, bound in textual `?` order
//! - Drivers are opaque: rows are returned as plain [`Value`] lists
//!
//! ## Available Drivers
//!
//! - [`ScriptedSource`] - Scripted, journaling driver for tests and dry runs
//!
//! ## Example
//!
//! ```rust
//! use entiql_driver::{ConnectionSource, Row, ScriptedSource, Value};
//!
//! let source = ScriptedSource::new();
//! source.respond_with("SELECT 1", vec![Row::new(vec![Value::Integer(1)])]);
//!
//! let mut conn = source.acquire().unwrap();
//! let mut stmt = conn.prepare("SELECT 1").unwrap();
//! let mut cursor = stmt.execute_query().unwrap();
//! assert_eq!(cursor.next_row().unwrap().unwrap().get(0), Some(&Value::Integer(1)));
//! cursor.close().unwrap();
//! stmt.close().unwrap();
//! conn.close().unwrap();
//! assert_eq!(source.journal().open_resources(), 0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod error;
mod row;
mod scripted;
mod value;

pub use connection::{Connection, ConnectionSource, Cursor, Statement};
pub use error::{DriverError, DriverResult};
pub use row::Row;
pub use scripted::{DriverEvent, Journal, ScriptedSource};
pub use value::Value;
