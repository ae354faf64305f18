//! Driver trait definitions.

use crate::error::DriverResult;
use crate::row::Row;
use crate::value::Value;

/// Hands out connection leases.
///
/// A lease returned by [`ConnectionSource::acquire`] is owned exclusively by
/// whoever acquired it until it is closed. Pooling, if any, lives behind this
/// trait.
pub trait ConnectionSource: Send + Sync {
    /// Acquires a connection lease.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be obtained.
    fn acquire(&self) -> DriverResult<Box<dyn Connection>>;
}

/// A leased database connection.
///
/// # Invariants
///
/// - `close` returns the lease; any use afterwards fails with
///   [`crate::DriverError::Closed`]
/// - Statements prepared on a connection are closed before the connection
pub trait Connection: Send {
    /// Prepares a statement with positional `?` placeholders.
    ///
    /// # Errors
    ///
    /// Returns an error if the SQL is rejected or the connection is closed.
    fn prepare(&mut self, sql: &str) -> DriverResult<Box<dyn Statement>>;

    /// Releases the connection lease.
    ///
    /// # Errors
    ///
    /// Returns an error if the lease was already released or the release
    /// itself failed.
    fn close(&mut self) -> DriverResult<()>;
}

/// A prepared statement.
pub trait Statement: Send {
    /// Binds a value to the 1-based placeholder `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range or the statement is closed.
    fn bind(&mut self, index: usize, value: &Value) -> DriverResult<()>;

    /// Hints how many rows the driver should fetch per round trip.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement is closed.
    fn set_fetch_size(&mut self, rows: u32) -> DriverResult<()> {
        let _ = rows;
        Ok(())
    }

    /// Executes the statement, opening a cursor over its result set.
    ///
    /// # Errors
    ///
    /// Returns an error if execution fails.
    fn execute_query(&mut self) -> DriverResult<Box<dyn Cursor>>;

    /// Closes the statement.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement was already closed.
    fn close(&mut self) -> DriverResult<()>;
}

/// A forward-only cursor over a result set.
pub trait Cursor: Send {
    /// Fetches the next row, or `None` when the result set is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O or protocol failure mid-stream.
    fn next_row(&mut self) -> DriverResult<Option<Row>>;

    /// Closes the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if the cursor was already closed.
    fn close(&mut self) -> DriverResult<()>;
}
