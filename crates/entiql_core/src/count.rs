//! `COUNT(*)` fast path.
//!
//! A count never needs the rows themselves when nothing left in memory can
//! change how many there are. Three cases, cheapest first:
//!
//! 1. every stage preserves cardinality: `SELECT COUNT(*) FROM t`
//! 2. every filter was pushed and the rest preserves cardinality:
//!    `SELECT COUNT(*) FROM t WHERE ...` with the pushed binds
//! 3. otherwise: run the select and count the entities that come out

use crate::compiler::TableSql;
use crate::error::CoreResult;
use crate::optimizer::{Optimizer, PendingQuery};
use crate::pipeline::{Pipeline, Residual};
use tracing::debug;

/// How a count will be computed.
#[derive(Debug)]
pub enum CountPlan<E> {
    /// A single `COUNT(*)` statement.
    FastPath(PendingQuery),
    /// The full select, with the stages that must run over its rows.
    Materialize(PendingQuery, Residual<E>),
}

impl<E> CountPlan<E> {
    /// The statement the plan executes.
    pub fn query(&self) -> &PendingQuery {
        match self {
            Self::FastPath(query) | Self::Materialize(query, _) => query,
        }
    }

    /// Returns true if no rows will be fetched.
    pub fn is_fast_path(&self) -> bool {
        matches!(self, Self::FastPath(_))
    }
}

/// Chooses how to count `pipeline`.
///
/// With `fast_path` off the count always materializes.
pub(crate) fn plan_count<E>(
    optimizer: &Optimizer<'_, E>,
    sql: &TableSql,
    pipeline: Pipeline<E>,
    fast_path: bool,
) -> CoreResult<CountPlan<E>> {
    if fast_path && pipeline.preserves_cardinality() {
        let mut query = PendingQuery::new(sql.count());
        query.finalize(None)?;
        debug!(sql = query.sql(), "count fast path");
        return Ok(CountPlan::FastPath(query));
    }

    let plan = optimizer.plan(pipeline)?;
    if fast_path && plan.residual().preserves_cardinality() {
        let mut query = PendingQuery::new(sql.count());
        plan.apply(&mut query)?;
        debug!(sql = query.sql(), binds = query.binds().len(), "filtered count fast path");
        return Ok(CountPlan::FastPath(query));
    }

    let mut query = PendingQuery::new(sql.select());
    let residual = plan.apply(&mut query)?;
    debug!(sql = query.sql(), residual = ?residual, "count falls back to materialization");
    Ok(CountPlan::Materialize(query, residual))
}
