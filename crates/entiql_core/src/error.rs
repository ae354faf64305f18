//! Error types for EntiQL core.

use entiql_driver::{DriverError, Value};
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in EntiQL core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A field names a column the table does not have.
    #[error("unknown column {column} in table {table}")]
    UnknownColumn {
        /// Qualified table name.
        table: String,
        /// The column that was not found.
        column: String,
    },

    /// A field belongs to a different table than the one being queried.
    #[error("column {column} belongs to {actual_table}, not {expected_table}")]
    ColumnMismatch {
        /// The table being queried.
        expected_table: String,
        /// The table the field was declared on.
        actual_table: String,
        /// The column.
        column: String,
    },

    /// A field refers to a column that is disabled in the table metadata.
    #[error("column {column} in table {table} is disabled")]
    DisabledColumn {
        /// Qualified table name.
        table: String,
        /// The disabled column.
        column: String,
    },

    /// A predicate was constructed with operands that do not fit its kind.
    #[error("invalid {kind} predicate: {message}")]
    InvalidPredicate {
        /// Name of the predicate kind.
        kind: &'static str,
        /// What was wrong with the operands.
        message: String,
    },

    /// Invalid configuration value.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },

    /// Operation not permitted in the current query state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },

    /// The driver failed while executing a statement or fetching rows.
    #[error("execution of `{sql}` with {} bind(s) failed: {source}", binds.len())]
    Execution {
        /// The SQL text that was executing.
        sql: String,
        /// The bind values, in placeholder order.
        binds: Vec<Value>,
        /// The underlying driver error.
        #[source]
        source: DriverError,
    },

    /// A fetched row could not be mapped to an entity.
    #[error("row mapping failed: {message}")]
    RowMapping {
        /// Description of the failure.
        message: String,
    },

    /// Releasing a cursor, statement or connection failed.
    #[error("failed to release query resources: {source}")]
    Release {
        /// The first driver error raised while closing.
        #[source]
        source: DriverError,
    },
}

impl CoreError {
    /// Creates an invalid predicate error.
    pub fn invalid_predicate(kind: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidPredicate {
            kind,
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Creates an execution error carrying the statement for diagnostics.
    pub fn execution(sql: impl Into<String>, binds: Vec<Value>, source: DriverError) -> Self {
        Self::Execution {
            sql: sql.into(),
            binds,
            source,
        }
    }

    /// Creates a row mapping error.
    pub fn row_mapping(message: impl Into<String>) -> Self {
        Self::RowMapping {
            message: message.into(),
        }
    }

    /// Returns true for errors raised by the database rather than by the caller.
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Execution { .. } | Self::Release { .. })
    }
}
