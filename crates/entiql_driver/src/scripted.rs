//! Scripted in-memory driver for testing.

use crate::connection::{Connection, ConnectionSource, Cursor, Statement};
use crate::error::{DriverError, DriverResult};
use crate::row::Row;
use crate::value::Value;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type Handler = dyn Fn(&str, &[Value]) -> DriverResult<Vec<Row>> + Send + Sync;

/// Something that happened to a scripted resource.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverEvent {
    /// A connection lease was handed out.
    Acquired {
        /// Connection id.
        connection: u64,
    },
    /// A statement was prepared.
    Prepared {
        /// Owning connection id.
        connection: u64,
        /// Statement id.
        statement: u64,
        /// SQL text as prepared.
        sql: String,
    },
    /// A statement was executed with its full bind list.
    Executed {
        /// Statement id.
        statement: u64,
        /// SQL text.
        sql: String,
        /// Bind values in placeholder order.
        binds: Vec<Value>,
    },
    /// A row was handed to the caller.
    Fetched {
        /// Statement id.
        statement: u64,
    },
    /// A cursor was closed.
    CursorClosed {
        /// Statement id the cursor belongs to.
        statement: u64,
    },
    /// A statement was closed.
    StatementClosed {
        /// Statement id.
        statement: u64,
    },
    /// A connection lease was released.
    ConnectionClosed {
        /// Connection id.
        connection: u64,
    },
}

/// Shared, append-only record of driver events.
///
/// Cloning a journal yields another handle onto the same record.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    events: Arc<Mutex<Vec<DriverEvent>>>,
}

impl Journal {
    fn record(&self, event: DriverEvent) {
        self.events.lock().push(event);
    }

    /// Returns a copy of every event recorded so far.
    pub fn events(&self) -> Vec<DriverEvent> {
        self.events.lock().clone()
    }

    /// Returns `(sql, binds)` for every executed statement, in order.
    pub fn executed(&self) -> Vec<(String, Vec<Value>)> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                DriverEvent::Executed { sql, binds, .. } => Some((sql.clone(), binds.clone())),
                _ => None,
            })
            .collect()
    }

    /// Number of rows handed out across all cursors.
    pub fn fetched_rows(&self) -> usize {
        self.count(|e| matches!(e, DriverEvent::Fetched { .. }))
    }

    /// Counts events matching a predicate.
    pub fn count(&self, pred: impl Fn(&DriverEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }

    /// Connections acquired but not yet closed.
    pub fn open_connections(&self) -> usize {
        self.count(|e| matches!(e, DriverEvent::Acquired { .. }))
            - self.count(|e| matches!(e, DriverEvent::ConnectionClosed { .. }))
    }

    /// Statements prepared but not yet closed.
    pub fn open_statements(&self) -> usize {
        self.count(|e| matches!(e, DriverEvent::Prepared { .. }))
            - self.count(|e| matches!(e, DriverEvent::StatementClosed { .. }))
    }

    /// Cursors opened but not yet closed.
    pub fn open_cursors(&self) -> usize {
        self.count(|e| matches!(e, DriverEvent::Executed { .. }))
            - self.count(|e| matches!(e, DriverEvent::CursorClosed { .. }))
    }

    /// Total resources of any kind still open.
    pub fn open_resources(&self) -> usize {
        self.open_connections() + self.open_statements() + self.open_cursors()
    }

    /// Clears the journal.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[derive(Clone)]
enum Response {
    Rows(Vec<Row>),
    FailAfter { rows: Vec<Row>, message: String },
    FailOnExecute(String),
}

#[derive(Default)]
struct Script {
    exact: HashMap<String, Response>,
    handler: Option<Arc<Handler>>,
}

/// A scripted, journaling driver.
///
/// Responses are registered per exact SQL text; a handler closure can serve
/// everything else. Every acquire, prepare, execute, fetch and close is
/// recorded in a [`Journal`], which makes resource leaks and double closes
/// observable in tests.
///
/// # Thread Safety
///
/// The source, its journal and its script are shared behind `parking_lot`
/// mutexes and may be used from several threads.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    script: Arc<Mutex<Script>>,
    journal: Journal,
    next_id: Arc<AtomicU64>,
}

impl std::fmt::Debug for ScriptedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedSource")
            .field("events", &self.journal.events.lock().len())
            .finish()
    }
}

impl ScriptedSource {
    /// Creates a driver with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle onto the event journal.
    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }

    /// Answers `sql` with `rows`.
    pub fn respond_with(&self, sql: impl Into<String>, rows: Vec<Row>) {
        self.script
            .lock()
            .exact
            .insert(sql.into(), Response::Rows(rows));
    }

    /// Answers `sql` with `rows`, then fails the next fetch with a protocol error.
    pub fn fail_after(&self, sql: impl Into<String>, rows: Vec<Row>, message: impl Into<String>) {
        self.script.lock().exact.insert(
            sql.into(),
            Response::FailAfter {
                rows,
                message: message.into(),
            },
        );
    }

    /// Makes executing `sql` fail before any cursor is opened.
    pub fn fail_on_execute(&self, sql: impl Into<String>, message: impl Into<String>) {
        self.script
            .lock()
            .exact
            .insert(sql.into(), Response::FailOnExecute(message.into()));
    }

    /// Serves any SQL without an exact response through `handler`.
    pub fn respond_with_handler<F>(&self, handler: F)
    where
        F: Fn(&str, &[Value]) -> DriverResult<Vec<Row>> + Send + Sync + 'static,
    {
        self.script.lock().handler = Some(Arc::new(handler));
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn resolve(&self, sql: &str, binds: &[Value]) -> DriverResult<Response> {
        let handler = {
            let script = self.script.lock();
            if let Some(response) = script.exact.get(sql) {
                return Ok(response.clone());
            }
            script.handler.clone()
        };
        match handler {
            Some(handler) => handler(sql, binds).map(Response::Rows),
            None => Err(DriverError::protocol(format!(
                "no scripted response for: {sql}"
            ))),
        }
    }
}

impl ConnectionSource for ScriptedSource {
    fn acquire(&self) -> DriverResult<Box<dyn Connection>> {
        let id = self.next_id();
        self.journal.record(DriverEvent::Acquired { connection: id });
        Ok(Box::new(ScriptedConnection {
            id,
            source: self.clone(),
            closed: false,
        }))
    }
}

struct ScriptedConnection {
    id: u64,
    source: ScriptedSource,
    closed: bool,
}

impl Connection for ScriptedConnection {
    fn prepare(&mut self, sql: &str) -> DriverResult<Box<dyn Statement>> {
        if self.closed {
            return Err(DriverError::closed("connection"));
        }
        let id = self.source.next_id();
        self.source.journal.record(DriverEvent::Prepared {
            connection: self.id,
            statement: id,
            sql: sql.to_string(),
        });
        let placeholders = sql.matches('?').count();
        Ok(Box::new(ScriptedStatement {
            id,
            sql: sql.to_string(),
            binds: vec![None; placeholders],
            source: self.source.clone(),
            closed: false,
        }))
    }

    fn close(&mut self) -> DriverResult<()> {
        if self.closed {
            return Err(DriverError::closed("connection"));
        }
        self.closed = true;
        self.source
            .journal
            .record(DriverEvent::ConnectionClosed { connection: self.id });
        Ok(())
    }
}

struct ScriptedStatement {
    id: u64,
    sql: String,
    binds: Vec<Option<Value>>,
    source: ScriptedSource,
    closed: bool,
}

impl Statement for ScriptedStatement {
    fn bind(&mut self, index: usize, value: &Value) -> DriverResult<()> {
        if self.closed {
            return Err(DriverError::closed("statement"));
        }
        let placeholders = self.binds.len();
        let slot = index
            .checked_sub(1)
            .and_then(|i| self.binds.get_mut(i))
            .ok_or(DriverError::BindOutOfRange {
                index,
                placeholders,
            })?;
        *slot = Some(value.clone());
        Ok(())
    }

    fn execute_query(&mut self) -> DriverResult<Box<dyn Cursor>> {
        if self.closed {
            return Err(DriverError::closed("statement"));
        }
        let binds = self
            .binds
            .iter()
            .enumerate()
            .map(|(i, b)| {
                b.clone()
                    .ok_or_else(|| DriverError::protocol(format!("parameter {} not bound", i + 1)))
            })
            .collect::<DriverResult<Vec<_>>>()?;

        let (rows, failure) = match self.source.resolve(&self.sql, &binds)? {
            Response::Rows(rows) => (rows, None),
            Response::FailAfter { rows, message } => (rows, Some(message)),
            Response::FailOnExecute(message) => return Err(DriverError::Protocol(message)),
        };

        self.source.journal.record(DriverEvent::Executed {
            statement: self.id,
            sql: self.sql.clone(),
            binds,
        });
        Ok(Box::new(ScriptedCursor {
            statement: self.id,
            rows: rows.into_iter(),
            failure,
            journal: self.source.journal.clone(),
            closed: false,
        }))
    }

    fn close(&mut self) -> DriverResult<()> {
        if self.closed {
            return Err(DriverError::closed("statement"));
        }
        self.closed = true;
        self.source
            .journal
            .record(DriverEvent::StatementClosed { statement: self.id });
        Ok(())
    }
}

struct ScriptedCursor {
    statement: u64,
    rows: std::vec::IntoIter<Row>,
    failure: Option<String>,
    journal: Journal,
    closed: bool,
}

impl Cursor for ScriptedCursor {
    fn next_row(&mut self) -> DriverResult<Option<Row>> {
        if self.closed {
            return Err(DriverError::closed("cursor"));
        }
        match self.rows.next() {
            Some(row) => {
                self.journal.record(DriverEvent::Fetched {
                    statement: self.statement,
                });
                Ok(Some(row))
            }
            None => match self.failure.take() {
                Some(message) => Err(DriverError::Protocol(message)),
                None => Ok(None),
            },
        }
    }

    fn close(&mut self) -> DriverResult<()> {
        if self.closed {
            return Err(DriverError::closed("cursor"));
        }
        self.closed = true;
        self.journal.record(DriverEvent::CursorClosed {
            statement: self.statement,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: i64) -> Vec<Row> {
        (0..n).map(|i| Row::new(vec![Value::Integer(i)])).collect()
    }

    #[test]
    fn scripted_rows_are_returned_in_order() {
        let source = ScriptedSource::new();
        source.respond_with("SELECT a FROM t", rows(3));

        let mut conn = source.acquire().unwrap();
        let mut stmt = conn.prepare("SELECT a FROM t").unwrap();
        let mut cursor = stmt.execute_query().unwrap();

        let mut seen = Vec::new();
        while let Some(row) = cursor.next_row().unwrap() {
            seen.push(row.get(0).cloned().unwrap());
        }
        assert_eq!(
            seen,
            vec![Value::Integer(0), Value::Integer(1), Value::Integer(2)]
        );
        assert_eq!(source.journal().fetched_rows(), 3);
    }

    #[test]
    fn binds_are_journaled_in_placeholder_order() {
        let source = ScriptedSource::new();
        source.respond_with("SELECT a FROM t WHERE (a > ?) AND (b = ?)", Vec::new());

        let mut conn = source.acquire().unwrap();
        let mut stmt = conn
            .prepare("SELECT a FROM t WHERE (a > ?) AND (b = ?)")
            .unwrap();
        stmt.bind(2, &Value::from("x")).unwrap();
        stmt.bind(1, &Value::Integer(5)).unwrap();
        stmt.execute_query().unwrap();

        let executed = source.journal().executed();
        assert_eq!(executed.len(), 1);
        assert_eq!(executed[0].1, vec![Value::Integer(5), Value::from("x")]);
    }

    #[test]
    fn unbound_parameter_fails_execution() {
        let source = ScriptedSource::new();
        source.respond_with("SELECT ?", Vec::new());
        let mut conn = source.acquire().unwrap();
        let mut stmt = conn.prepare("SELECT ?").unwrap();
        assert!(matches!(
            stmt.execute_query(),
            Err(DriverError::Protocol(_))
        ));
    }

    #[test]
    fn bind_out_of_range() {
        let source = ScriptedSource::new();
        let mut conn = source.acquire().unwrap();
        let mut stmt = conn.prepare("SELECT ?").unwrap();
        assert!(matches!(
            stmt.bind(2, &Value::Null),
            Err(DriverError::BindOutOfRange {
                index: 2,
                placeholders: 1
            })
        ));
        assert!(stmt.bind(0, &Value::Null).is_err());
    }

    #[test]
    fn fail_after_surfaces_error_mid_stream() {
        let source = ScriptedSource::new();
        source.fail_after("SELECT a FROM t", rows(1), "connection reset");

        let mut conn = source.acquire().unwrap();
        let mut stmt = conn.prepare("SELECT a FROM t").unwrap();
        let mut cursor = stmt.execute_query().unwrap();
        assert!(cursor.next_row().unwrap().is_some());
        assert!(matches!(cursor.next_row(), Err(DriverError::Protocol(_))));
    }

    #[test]
    fn double_close_is_an_error() {
        let source = ScriptedSource::new();
        let mut conn = source.acquire().unwrap();
        conn.close().unwrap();
        assert!(matches!(conn.close(), Err(DriverError::Closed { .. })));
        assert_eq!(source.journal().open_connections(), 0);
    }

    #[test]
    fn journal_tracks_open_resources() {
        let source = ScriptedSource::new();
        source.respond_with("SELECT 1", rows(1));
        let journal = source.journal();

        let mut conn = source.acquire().unwrap();
        let mut stmt = conn.prepare("SELECT 1").unwrap();
        let mut cursor = stmt.execute_query().unwrap();
        assert_eq!(journal.open_resources(), 3);

        cursor.close().unwrap();
        stmt.close().unwrap();
        conn.close().unwrap();
        assert_eq!(journal.open_resources(), 0);
    }

    #[test]
    fn handler_serves_unscripted_sql() {
        let source = ScriptedSource::new();
        source.respond_with_handler(|sql, binds| {
            assert!(sql.starts_with("SELECT"));
            Ok(vec![Row::new(binds.to_vec())])
        });

        let mut conn = source.acquire().unwrap();
        let mut stmt = conn.prepare("SELECT ?").unwrap();
        stmt.bind(1, &Value::Integer(9)).unwrap();
        let mut cursor = stmt.execute_query().unwrap();
        let row = cursor.next_row().unwrap().unwrap();
        assert_eq!(row.get(0), Some(&Value::Integer(9)));
    }

    #[test]
    fn unscripted_sql_without_handler_fails() {
        let source = ScriptedSource::new();
        let mut conn = source.acquire().unwrap();
        let mut stmt = conn.prepare("SELECT 1").unwrap();
        assert!(stmt.execute_query().is_err());
        assert_eq!(source.journal().open_cursors(), 0);
    }
}
