//! Managed tables.

use crate::compiler::TableSql;
use crate::config::Config;
use crate::dialect::Dialect;
use crate::error::CoreResult;
use crate::executor::RowMapper;
use crate::optimizer::Optimizer;
use crate::query::Query;
use crate::schema::Table;
use crate::types::FieldRef;
use entiql_driver::{ConnectionSource, Row};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub(crate) struct ManagerInner<E> {
    pub(crate) table: Arc<Table<E>>,
    pub(crate) sql: TableSql,
    pub(crate) dialect: Arc<dyn Dialect>,
    pub(crate) source: Arc<dyn ConnectionSource>,
    pub(crate) config: Config,
    pub(crate) mapper: RowMapper<E>,
}

impl<E> ManagerInner<E> {
    pub(crate) fn optimizer(&self) -> Optimizer<'_, E> {
        Optimizer::new(
            &self.table,
            &self.sql,
            self.dialect.as_ref(),
            self.config.pushdown,
        )
    }
}

/// Entry point for querying one table.
///
/// A manager pairs a table with a dialect and a connection source. The
/// table's SQL text is compiled once, here, and shared by every query.
/// Cloning is cheap.
///
/// # Example
///
/// ```
/// use entiql_core::{Column, Config, DbmsType, Manager, Table, TableId};
/// use entiql_driver::{Row, ScriptedSource, Value};
/// use std::sync::Arc;
///
/// let table = Table::dynamic(
///     TableId::new("db", "users"),
///     vec![Column::new("id"), Column::new("age")],
/// )?;
/// let source = ScriptedSource::new();
/// source.respond_with(
///     "SELECT `id`,`age` FROM `db`.`users` WHERE (`age` > ?)",
///     vec![Row::new(vec![Value::Integer(1), Value::Integer(30)])],
/// );
///
/// let users = Manager::new(table, Arc::new(source), Config::new().dbms(DbmsType::MySql));
/// let age = users.field("age");
/// let adults = users.stream().filter(age.greater_than(18)).to_vec()?;
/// assert_eq!(adults.len(), 1);
/// # Ok::<(), entiql_core::CoreError>(())
/// ```
pub struct Manager<E> {
    inner: Arc<ManagerInner<E>>,
}

impl<E> Clone for Manager<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for Manager<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("table", self.inner.table.id())
            .field("dialect", &self.inner.dialect.name())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl<E: Default + 'static> Manager<E> {
    /// Creates a manager that maps rows with the table's setters.
    pub fn new(table: Table<E>, source: Arc<dyn ConnectionSource>, config: Config) -> Self {
        let table = Arc::new(table);
        let mapping = Arc::clone(&table);
        let mapper: RowMapper<E> = Arc::new(move |row: &Row| mapping.map_row(row));
        Self::build(table, source, config, mapper)
    }
}

impl<E: 'static> Manager<E> {
    /// Creates a manager with a caller-supplied row mapper.
    ///
    /// The mapper receives rows laid out in select-list order.
    pub fn with_row_mapper<F>(
        table: Table<E>,
        source: Arc<dyn ConnectionSource>,
        config: Config,
        mapper: F,
    ) -> Self
    where
        F: Fn(&Row) -> CoreResult<E> + Send + Sync + 'static,
    {
        Self::build(Arc::new(table), source, config, Arc::new(mapper))
    }

    fn build(
        table: Arc<Table<E>>,
        source: Arc<dyn ConnectionSource>,
        config: Config,
        mapper: RowMapper<E>,
    ) -> Self {
        let dialect = config.dbms.dialect();
        let sql = TableSql::compile(&table, dialect.naming());
        debug!(
            table = %table.id(),
            dialect = dialect.name(),
            select = sql.select(),
            "managed table compiled"
        );
        Self {
            inner: Arc::new(ManagerInner {
                table,
                sql,
                dialect,
                source,
                config,
                mapper,
            }),
        }
    }

    /// Starts a new query over every row of the table.
    pub fn stream(&self) -> Query<E> {
        Query::new(Arc::clone(&self.inner))
    }
}

impl<E> Manager<E> {
    /// The managed table.
    pub fn table(&self) -> &Table<E> {
        &self.inner.table
    }

    /// The table's compiled SQL.
    pub fn sql(&self) -> &TableSql {
        &self.inner.sql
    }

    /// The dialect every query renders with.
    pub fn dialect(&self) -> &dyn Dialect {
        self.inner.dialect.as_ref()
    }

    /// The configuration.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Returns a field reference to a column of the table.
    pub fn field(&self, column: &str) -> FieldRef {
        self.inner.table.field(column)
    }
}
