//! Query building and terminal operations.

use crate::count::{plan_count, CountPlan};
use crate::error::CoreResult;
use crate::executor::{query_scalar, Execution, QueryState, ResultStream};
use crate::manager::ManagerInner;
use crate::optimizer::PendingQuery;
use crate::pipeline::{Filter, Pipeline, Stage};
use entiql_driver::Value;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A lazily evaluated query over one managed table.
///
/// Builder methods append stages; nothing is compiled or executed until a
/// terminal operation (`stream`, `to_vec`, `count`, ...) consumes the query.
pub struct Query<E> {
    manager: Arc<ManagerInner<E>>,
    pipeline: Pipeline<E>,
}

impl<E> fmt::Debug for Query<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("table", self.manager.table.id())
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

/// What a query compiles to, without running it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explain {
    /// The statement text.
    pub sql: String,
    /// Bind values in placeholder order.
    pub binds: Vec<Value>,
    /// Stages that run in memory, in order.
    pub residual: Vec<&'static str>,
}

impl fmt::Display for Explain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.sql)?;
        let binds: Vec<String> = self.binds.iter().map(ToString::to_string).collect();
        write!(f, "binds: [{}]", binds.join(", "))?;
        if !self.residual.is_empty() {
            write!(f, "\nin memory: {}", self.residual.join(" -> "))?;
        }
        Ok(())
    }
}

impl<E> Query<E> {
    pub(crate) fn new(manager: Arc<ManagerInner<E>>) -> Self {
        Self {
            manager,
            pipeline: Pipeline::new(),
        }
    }

    fn push(mut self, stage: Stage<E>) -> Self {
        self.pipeline.push(stage);
        self
    }

    /// Keeps entities matching `filter`: a predicate or a composite filter.
    #[must_use]
    pub fn filter(self, filter: impl Into<Filter<E>>) -> Self {
        self.push(Stage::Filter(filter.into()))
    }

    /// Keeps entities for which `f` returns true. Always runs in memory.
    #[must_use]
    pub fn filter_with<F>(self, f: F) -> Self
    where
        F: Fn(&E) -> bool + Send + 'static,
    {
        self.push(Stage::Filter(Filter::custom(f)))
    }

    /// Transforms each entity.
    #[must_use]
    pub fn map<F>(self, f: F) -> Self
    where
        F: FnMut(E) -> E + Send + 'static,
    {
        self.push(Stage::Map(Box::new(f)))
    }

    /// Observes each entity as it passes.
    #[must_use]
    pub fn peek<F>(self, f: F) -> Self
    where
        F: FnMut(&E) + Send + 'static,
    {
        self.push(Stage::Peek(Box::new(f)))
    }

    /// Stable sort by `cmp`.
    #[must_use]
    pub fn sorted_by<F>(self, cmp: F) -> Self
    where
        F: Fn(&E, &E) -> Ordering + Send + 'static,
    {
        self.push(Stage::Sorted(Box::new(cmp)))
    }

    /// Keeps at most `n` entities.
    #[must_use]
    pub fn limit(self, n: usize) -> Self {
        self.push(Stage::Limit(n))
    }

    /// Drops the first `n` entities.
    #[must_use]
    pub fn skip(self, n: usize) -> Self {
        self.push(Stage::Skip(n))
    }

    /// Returns the stages attached so far.
    pub fn pipeline(&self) -> &Pipeline<E> {
        &self.pipeline
    }

    /// Always [`QueryState::Building`]: a query that still accepts stages
    /// has not been compiled. The [`ResultStream`] it turns into reports the
    /// later states.
    pub fn state(&self) -> QueryState {
        QueryState::Building
    }

    /// Compiles the query and returns its SQL, binds and in-memory stages
    /// without executing anything.
    ///
    /// # Errors
    ///
    /// Fails if a filter references a column the table cannot serve.
    pub fn explain(self) -> CoreResult<Explain> {
        let mut query = PendingQuery::new(self.manager.sql.select());
        let residual = self.manager.optimizer().optimize(self.pipeline, &mut query)?;
        Ok(Explain {
            residual: residual.stage_names(),
            sql: query.sql().to_string(),
            binds: query.binds().to_vec(),
        })
    }

    /// Like [`explain`](Self::explain), for the statement `count` would run.
    ///
    /// # Errors
    ///
    /// Fails if a filter references a column the table cannot serve.
    pub fn explain_count(self) -> CoreResult<Explain> {
        let plan = self.count_plan()?;
        let residual = match &plan {
            CountPlan::FastPath(_) => Vec::new(),
            CountPlan::Materialize(_, residual) => residual.stage_names(),
        };
        let query = plan.query();
        Ok(Explain {
            sql: query.sql().to_string(),
            binds: query.binds().to_vec(),
            residual,
        })
    }

    fn count_plan(self) -> CoreResult<CountPlan<E>> {
        let manager = &self.manager;
        plan_count(
            &manager.optimizer(),
            &manager.sql,
            self.pipeline,
            manager.config.count_fast_path,
        )
    }
}

impl<E: Send + 'static> Query<E> {
    /// Compiles and returns the managed result.
    ///
    /// The statement is issued on the first pull, not here.
    ///
    /// # Errors
    ///
    /// Fails if a filter references a column the table cannot serve. No
    /// database resource has been acquired when this fails.
    pub fn stream(self) -> CoreResult<ResultStream<E>> {
        let Self { manager, pipeline } = self;
        let mut query = PendingQuery::new(manager.sql.select());
        let residual = manager.optimizer().optimize(pipeline, &mut query)?;
        debug!(sql = query.sql(), binds = ?query.binds(), "query compiled");
        Ok(ResultStream::new(
            Execution {
                source: Arc::clone(&manager.source),
                query,
                mapper: Arc::clone(&manager.mapper),
                fetch_size: manager.config.fetch_size,
            },
            residual,
        ))
    }

    /// Collects every entity.
    ///
    /// # Errors
    ///
    /// Returns the first compile, execution, mapping or release error.
    pub fn collect<C: FromIterator<E>>(self) -> CoreResult<C> {
        let mut stream = self.stream()?;
        let collected = stream.by_ref().collect::<CoreResult<C>>()?;
        stream.close()?;
        Ok(collected)
    }

    /// Collects every entity into a `Vec`.
    ///
    /// # Errors
    ///
    /// See [`collect`](Self::collect).
    pub fn to_vec(self) -> CoreResult<Vec<E>> {
        self.collect()
    }

    /// Returns the first entity, if any, and releases the rest.
    ///
    /// # Errors
    ///
    /// See [`collect`](Self::collect).
    pub fn first(self) -> CoreResult<Option<E>> {
        let mut stream = self.limit(1).stream()?;
        let first = stream.next().transpose()?;
        stream.close()?;
        Ok(first)
    }

    /// Calls `f` on every entity.
    ///
    /// # Errors
    ///
    /// See [`collect`](Self::collect).
    pub fn for_each<F: FnMut(E)>(self, mut f: F) -> CoreResult<()> {
        let mut stream = self.stream()?;
        for entity in stream.by_ref() {
            f(entity?);
        }
        stream.close()
    }

    /// Counts the entities the query would produce.
    ///
    /// Uses `SELECT COUNT(*)` when nothing left in memory can change the
    /// count; otherwise fetches and counts. The result is the same either
    /// way.
    ///
    /// # Errors
    ///
    /// See [`collect`](Self::collect).
    pub fn count(self) -> CoreResult<u64> {
        let manager = Arc::clone(&self.manager);
        match self.count_plan()? {
            CountPlan::FastPath(query) => {
                query_scalar(manager.source.as_ref(), &query, manager.config.fetch_size)
            }
            CountPlan::Materialize(query, residual) => {
                let mut stream = ResultStream::new(
                    Execution {
                        source: Arc::clone(&manager.source),
                        query,
                        mapper: Arc::clone(&manager.mapper),
                        fetch_size: manager.config.fetch_size,
                    },
                    residual,
                );
                let mut count = 0u64;
                for entity in stream.by_ref() {
                    entity?;
                    count += 1;
                }
                stream.close()?;
                Ok(count)
            }
        }
    }
}
