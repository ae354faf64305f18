//! Lazy, resource-scoped execution.
//!
//! A [`ResultStream`] owns the cursor, statement and connection of one query.
//! Nothing touches the database until the first pull. The resources are
//! released exactly once, whichever comes first:
//!
//! - the cursor is exhausted, or the produced sequence ends early (a `limit`)
//! - a fetch or mapping error is raised (the error is returned on that pull)
//! - [`ResultStream::close`] is called
//! - the stream is dropped

mod resources;
mod state;

pub use state::QueryState;

use crate::error::{CoreError, CoreResult};
use crate::optimizer::PendingQuery;
use crate::pipeline::{BoxedItems, Residual};
use entiql_driver::{ConnectionSource, DriverError, Row, Value};
use parking_lot::Mutex;
use resources::Resources;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Maps a fetched row to an entity.
pub type RowMapper<E> = Arc<dyn Fn(&Row) -> CoreResult<E> + Send + Sync>;

/// Everything needed to run one finalized statement.
pub(crate) struct Execution<E> {
    pub(crate) source: Arc<dyn ConnectionSource>,
    pub(crate) query: PendingQuery,
    pub(crate) mapper: RowMapper<E>,
    pub(crate) fetch_size: Option<u32>,
}

/// Pulls rows from the cursor and maps them, releasing on exhaustion and
/// on the first error.
struct Fetch<E> {
    resources: Arc<Mutex<Resources>>,
    source: Arc<dyn ConnectionSource>,
    query: Arc<PendingQuery>,
    mapper: RowMapper<E>,
    fetch_size: Option<u32>,
    done: bool,
}

impl<E> Fetch<E> {
    fn fail(&mut self, resources: &mut Resources, err: CoreError) -> Option<CoreResult<E>> {
        self.done = true;
        resources.release_quietly();
        Some(Err(err))
    }

    fn execution_error(&self, source: DriverError) -> CoreError {
        CoreError::execution(self.query.sql(), self.query.binds().to_vec(), source)
    }
}

impl<E> Iterator for Fetch<E> {
    type Item = CoreResult<E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let shared = Arc::clone(&self.resources);
        let mut resources = shared.lock();
        match resources.state() {
            QueryState::Closed => {
                self.done = true;
                return None;
            }
            QueryState::Building | QueryState::Optimized => {
                let opened = resources.open(self.source.as_ref(), &self.query, self.fetch_size);
                if let Err(err) = opened {
                    let err = self.execution_error(err);
                    return self.fail(&mut resources, err);
                }
            }
            QueryState::Executing | QueryState::Streaming => {}
        }
        match resources.next_row() {
            Ok(Some(row)) => {
                trace!(sql = self.query.sql(), columns = row.len(), "fetched row");
                match (self.mapper)(&row) {
                    Ok(entity) => Some(Ok(entity)),
                    Err(err) => self.fail(&mut resources, err),
                }
            }
            Ok(None) => {
                self.done = true;
                resources.release_quietly();
                None
            }
            Err(err) => {
                let err = self.execution_error(err);
                self.fail(&mut resources, err)
            }
        }
    }
}

/// The managed result of a query: a lazy sequence of entities that owns its
/// database resources.
///
/// Iterating yields `Ok` entities until the query is exhausted, or a single
/// `Err` after which the stream ends. Resources are released on exhaustion,
/// on error, on [`close`](Self::close) and on drop, exactly once in total.
///
/// A stream over `Send` entities is itself `Send` and may be drained on
/// another thread.
pub struct ResultStream<E> {
    resources: Arc<Mutex<Resources>>,
    query: Arc<PendingQuery>,
    items: BoxedItems<'static, E>,
}

impl<E: Send + 'static> ResultStream<E> {
    pub(crate) fn new(execution: Execution<E>, residual: Residual<E>) -> Self {
        let resources = Arc::new(Mutex::new(Resources::new()));
        let query = Arc::new(execution.query);
        let fetch = Fetch {
            resources: Arc::clone(&resources),
            source: execution.source,
            query: Arc::clone(&query),
            mapper: execution.mapper,
            fetch_size: execution.fetch_size,
            done: false,
        };
        Self {
            resources,
            query,
            items: residual.apply(fetch),
        }
    }
}

impl<E> ResultStream<E> {
    /// Releases the cursor, statement and connection.
    ///
    /// Idempotent: closing an already closed, exhausted or failed stream
    /// returns `Ok(())`. After closing, the stream yields nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Release`] if the driver fails to close a
    /// resource. Every resource is still attempted.
    pub fn close(&mut self) -> CoreResult<()> {
        self.resources
            .lock()
            .release()
            .map_err(|source| CoreError::Release { source })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> QueryState {
        self.resources.lock().state()
    }

    /// The SQL text this stream executes.
    pub fn sql(&self) -> &str {
        self.query.sql()
    }

    /// The bind values, in placeholder order.
    pub fn binds(&self) -> &[Value] {
        self.query.binds()
    }
}

impl<E> Iterator for ResultStream<E> {
    type Item = CoreResult<E>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.items.next();
        if item.is_none() {
            // A residual limit can end the sequence before the cursor is dry.
            self.resources.lock().release_quietly();
        }
        item
    }
}

impl<E> fmt::Debug for ResultStream<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultStream")
            .field("sql", &self.query.sql())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Runs a single-row, single-column integer query such as `COUNT(*)`.
pub(crate) fn query_scalar(
    source: &dyn ConnectionSource,
    query: &PendingQuery,
    fetch_size: Option<u32>,
) -> CoreResult<u64> {
    let execution_error =
        |source: DriverError| CoreError::execution(query.sql(), query.binds().to_vec(), source);
    let mut resources = Resources::new();
    resources
        .open(source, query, fetch_size)
        .map_err(execution_error)?;
    let row = resources.next_row().map_err(execution_error)?;
    resources
        .release()
        .map_err(|source| CoreError::Release { source })?;

    let value = row.as_ref().and_then(|row| row.get(0)).ok_or_else(|| {
        CoreError::row_mapping(format!("`{}` returned no value", query.sql()))
    })?;
    value
        .as_integer()
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(|| {
            CoreError::row_mapping(format!(
                "`{}` returned {} where a count was expected",
                query.sql(),
                value.type_name()
            ))
        })
}
