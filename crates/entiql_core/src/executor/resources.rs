//! Cursor, statement and connection owned by one query.

use super::QueryState;
use crate::optimizer::PendingQuery;
use entiql_driver::{Connection, ConnectionSource, Cursor, DriverResult, Row, Statement};
use tracing::{trace, warn};

/// The driver resources of one execution.
///
/// Each resource is closed at most once, cursor first, then statement, then
/// connection. Dropping releases anything still open.
pub(crate) struct Resources {
    connection: Option<Box<dyn Connection>>,
    statement: Option<Box<dyn Statement>>,
    cursor: Option<Box<dyn Cursor>>,
    state: QueryState,
}

impl Resources {
    pub(crate) fn new() -> Self {
        Self {
            connection: None,
            statement: None,
            cursor: None,
            state: QueryState::Optimized,
        }
    }

    pub(crate) fn state(&self) -> QueryState {
        self.state
    }

    /// Acquires a connection, prepares and binds the statement and opens a
    /// cursor. Whatever was acquired before a failure stays owned here and
    /// is released with the rest.
    pub(crate) fn open(
        &mut self,
        source: &dyn ConnectionSource,
        query: &PendingQuery,
        fetch_size: Option<u32>,
    ) -> DriverResult<()> {
        self.state.advance(QueryState::Executing);
        let connection = self.connection.insert(source.acquire()?);
        let statement = self.statement.insert(connection.prepare(query.sql())?);
        if let Some(rows) = fetch_size {
            statement.set_fetch_size(rows)?;
        }
        for (index, value) in query.binds().iter().enumerate() {
            statement.bind(index + 1, value)?;
        }
        self.cursor = Some(statement.execute_query()?);
        self.state.advance(QueryState::Streaming);
        trace!(sql = query.sql(), binds = query.binds().len(), "statement executed");
        Ok(())
    }

    /// Fetches the next row; `None` once exhausted or if nothing is open.
    pub(crate) fn next_row(&mut self) -> DriverResult<Option<Row>> {
        match self.cursor.as_mut() {
            Some(cursor) => cursor.next_row(),
            None => Ok(None),
        }
    }

    /// Closes cursor, statement and connection, in that order.
    ///
    /// Every resource is attempted even if an earlier close fails; the first
    /// failure is returned. Calling this again is a no-op.
    pub(crate) fn release(&mut self) -> DriverResult<()> {
        let mut first = None;
        if let Some(mut cursor) = self.cursor.take() {
            if let Err(err) = cursor.close() {
                first.get_or_insert(err);
            }
        }
        if let Some(mut statement) = self.statement.take() {
            if let Err(err) = statement.close() {
                first.get_or_insert(err);
            }
        }
        if let Some(mut connection) = self.connection.take() {
            if let Err(err) = connection.close() {
                first.get_or_insert(err);
            }
        }
        self.state.advance(QueryState::Closed);
        first.map_or(Ok(()), Err)
    }

    /// Releases and logs a failure instead of returning it.
    pub(crate) fn release_quietly(&mut self) {
        if let Err(err) = self.release() {
            warn!(error = %err, "failed to release query resources");
        }
    }
}

impl Drop for Resources {
    fn drop(&mut self) {
        self.release_quietly();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entiql_driver::{ScriptedSource, Value};

    #[test]
    fn release_closes_everything_once() {
        let source = ScriptedSource::new();
        source.respond_with("SELECT a FROM t", vec![Row::new(vec![Value::Integer(1)])]);
        let journal = source.journal();

        let mut resources = Resources::new();
        let mut query = PendingQuery::new("SELECT a FROM t");
        query.finalize(None).unwrap();
        resources.open(&source, &query, Some(10)).unwrap();
        assert_eq!(resources.state(), QueryState::Streaming);
        assert_eq!(journal.open_resources(), 3);

        resources.release().unwrap();
        resources.release().unwrap();
        assert_eq!(journal.open_resources(), 0);
        assert_eq!(resources.state(), QueryState::Closed);
    }

    #[test]
    fn failed_open_keeps_partial_resources_for_release() {
        let source = ScriptedSource::new();
        source.fail_on_execute("SELECT a FROM t", "boom");
        let journal = source.journal();

        let mut resources = Resources::new();
        let mut query = PendingQuery::new("SELECT a FROM t");
        query.finalize(None).unwrap();
        assert!(resources.open(&source, &query, None).is_err());
        assert_eq!(journal.open_resources(), 2);
        drop(resources);
        assert_eq!(journal.open_resources(), 0);
    }
}
