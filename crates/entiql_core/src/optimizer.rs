//! Predicate pushdown.
//!
//! The optimizer walks a pipeline once, from the start. Field predicates in
//! the top-level conjunction of a filter stage are rendered into the `WHERE`
//! clause; any other conjunct stays behind as an in-memory filter, and since
//! filters commute the walk carries on past it. `sorted` is transparent.
//! The walk stops pushing at the first `map`, `peek`, `limit` or `skip`,
//! because filtering after those stages is not equivalent to filtering
//! before them.
//!
//! Every field the pipeline references is resolved before any statement is
//! issued, so a bad column fails the query without touching the database.

use crate::compiler::TableSql;
use crate::dialect::{render, Dialect, SqlFragment};
use crate::error::{CoreError, CoreResult};
use crate::pipeline::{CompiledFilter, Filter, Pipeline, Residual, ResidualStage, Stage};
use crate::predicate::Predicate;
use crate::schema::Table;
use entiql_driver::Value;
use tracing::debug;

/// The statement a terminal operation will execute.
///
/// Starts as a base statement and is rewritten exactly once, when the
/// optimizer finalizes it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingQuery {
    sql: String,
    binds: Vec<Value>,
    optimized: bool,
}

impl PendingQuery {
    /// Creates a pending query for `base`, with no binds.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            sql: base.into(),
            binds: Vec::new(),
            optimized: false,
        }
    }

    /// Current SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Current bind values, in placeholder order.
    pub fn binds(&self) -> &[Value] {
        &self.binds
    }

    /// Returns true once the query has been finalized.
    pub fn is_optimized(&self) -> bool {
        self.optimized
    }

    /// Appends the `WHERE` clause, if any, and finalizes the query.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidOperation`] if the query was already
    /// finalized.
    pub fn finalize(&mut self, where_clause: Option<SqlFragment>) -> CoreResult<()> {
        if self.optimized {
            return Err(CoreError::invalid_operation(format!(
                "pending query already optimized: {}",
                self.sql
            )));
        }
        if let Some(clause) = where_clause {
            self.sql = TableSql::with_where(&self.sql, &clause);
            let (_, binds) = clause.into_parts();
            self.binds = binds;
        }
        self.optimized = true;
        Ok(())
    }
}

/// The outcome of planning a pipeline.
#[derive(Debug)]
pub struct Plan<E> {
    where_clause: Option<SqlFragment>,
    pushed: usize,
    residual: Residual<E>,
}

impl<E> Plan<E> {
    /// The joined `WHERE` fragment, if anything was pushed.
    pub fn where_clause(&self) -> Option<&SqlFragment> {
        self.where_clause.as_ref()
    }

    /// Number of predicates rendered into SQL.
    pub fn pushed(&self) -> usize {
        self.pushed
    }

    /// The stages left to run in memory.
    pub fn residual(&self) -> &Residual<E> {
        &self.residual
    }

    /// Finalizes `pending` with this plan's `WHERE` clause.
    ///
    /// # Errors
    ///
    /// Fails if `pending` was already finalized.
    pub fn apply(self, pending: &mut PendingQuery) -> CoreResult<Residual<E>> {
        pending.finalize(self.where_clause)?;
        Ok(self.residual)
    }
}

/// Splits pipelines into SQL and in-memory work for one table.
pub struct Optimizer<'a, E> {
    table: &'a Table<E>,
    sql: &'a TableSql,
    dialect: &'a dyn Dialect,
    pushdown: bool,
}

impl<'a, E> Optimizer<'a, E> {
    /// Creates an optimizer. With `pushdown` off nothing is rendered and
    /// every filter runs in memory.
    pub fn new(
        table: &'a Table<E>,
        sql: &'a TableSql,
        dialect: &'a dyn Dialect,
        pushdown: bool,
    ) -> Self {
        Self {
            table,
            sql,
            dialect,
            pushdown,
        }
    }

    /// Plans `pipeline` and finalizes `pending` with the result.
    ///
    /// # Errors
    ///
    /// Fails if a field is not an enabled column of the table, or if
    /// `pending` was already finalized.
    pub fn optimize(
        &self,
        pipeline: Pipeline<E>,
        pending: &mut PendingQuery,
    ) -> CoreResult<Residual<E>> {
        self.plan(pipeline)?.apply(pending)
    }

    /// Splits `pipeline` into a `WHERE` clause and a residual.
    ///
    /// # Errors
    ///
    /// Fails if a field is not an enabled column of the table.
    pub fn plan(&self, pipeline: Pipeline<E>) -> CoreResult<Plan<E>> {
        let mut fragments = Vec::new();
        let mut residual = Residual::default();
        let mut scanning = self.pushdown;

        for stage in pipeline.into_stages() {
            match stage {
                Stage::Filter(filter) => {
                    let mut kept = Vec::new();
                    for conjunct in filter.into_conjuncts() {
                        match conjunct {
                            Filter::Field(predicate) if scanning => {
                                fragments.push(self.render(&predicate)?);
                            }
                            other => kept.push(other.compile(self.table)?),
                        }
                    }
                    if !kept.is_empty() {
                        residual.push(ResidualStage::Filter(CompiledFilter::all(kept)));
                    }
                }
                Stage::Sorted(cmp) => residual.push(ResidualStage::Sorted(cmp)),
                Stage::Map(f) => {
                    scanning = false;
                    residual.push(ResidualStage::Map(f));
                }
                Stage::Peek(f) => {
                    scanning = false;
                    residual.push(ResidualStage::Peek(f));
                }
                Stage::Limit(n) => {
                    scanning = false;
                    residual.push(ResidualStage::Limit(n));
                }
                Stage::Skip(n) => {
                    scanning = false;
                    residual.push(ResidualStage::Skip(n));
                }
            }
        }

        let pushed = fragments.len();
        let where_clause = SqlFragment::join_and(fragments);
        debug!(
            table = %self.table.id(),
            pushed,
            residual = ?residual,
            clause = where_clause.as_ref().map_or("", SqlFragment::sql),
            "planned pipeline"
        );
        Ok(Plan {
            where_clause,
            pushed,
            residual,
        })
    }

    /// Renders one predicate against its quoted column, with operands in
    /// database representation.
    fn render(&self, predicate: &Predicate) -> CoreResult<SqlFragment> {
        let (column, _) = self.table.resolve(predicate.field())?;
        let quoted = self.sql.column(column.id()).ok_or_else(|| CoreError::UnknownColumn {
            table: self.table.id().to_string(),
            column: column.id().to_string(),
        })?;
        let mapper = column.type_mapper();
        Ok(render(self.dialect, predicate, quoted).map_binds(|value| mapper.to_database(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{AnsiDialect, MySqlDialect};
    use crate::schema::{Column, IntegerBoolMapper};
    use crate::types::TableId;
    use entiql_driver::Row;

    fn users() -> Table<Row> {
        Table::dynamic(
            TableId::new("db", "users"),
            vec![
                Column::new("id"),
                Column::new("name"),
                Column::new("age"),
                Column::new("active").mapper(IntegerBoolMapper),
            ],
        )
        .unwrap()
    }

    fn filter(pipeline: &mut Pipeline<Row>, f: impl Into<Filter<Row>>) {
        pipeline.push(Stage::Filter(f.into()));
    }

    #[test]
    fn two_filters_push_into_one_statement() {
        let table = users();
        let dialect = MySqlDialect;
        let sql = TableSql::compile(&table, dialect.naming());
        let optimizer = Optimizer::new(&table, &sql, &dialect, true);

        let mut pipeline = Pipeline::new();
        filter(&mut pipeline, table.field("age").greater_than(18));
        filter(&mut pipeline, table.field("name").starts_with("A"));

        let mut pending = PendingQuery::new(sql.select());
        let residual = optimizer.optimize(pipeline, &mut pending).unwrap();
        assert_eq!(
            pending.sql(),
            "SELECT `id`,`name`,`age`,`active` FROM `db`.`users` \
             WHERE (`age` > ?) AND (`name` LIKE BINARY CONCAT(?, '%'))"
        );
        assert_eq!(pending.binds(), &[Value::Integer(18), Value::from("A")]);
        assert!(residual.is_empty());
        assert!(pending.is_optimized());
    }

    #[test]
    fn no_pushable_filters_keeps_base_select() {
        let table = users();
        let sql = TableSql::compile(&table, AnsiDialect.naming());
        let optimizer = Optimizer::new(&table, &sql, &AnsiDialect, true);
        let mut pipeline = Pipeline::new();
        pipeline.push(Stage::Limit(3));
        let mut pending = PendingQuery::new(sql.select());
        let residual = optimizer.optimize(pipeline, &mut pending).unwrap();
        assert_eq!(pending.sql(), sql.select());
        assert!(pending.binds().is_empty());
        assert_eq!(residual.stage_names(), vec!["limit"]);
    }

    #[test]
    fn pushdown_stops_at_map_but_not_at_sorted() {
        let table = users();
        let sql = TableSql::compile(&table, AnsiDialect.naming());
        let optimizer = Optimizer::new(&table, &sql, &AnsiDialect, true);

        let mut pipeline = Pipeline::new();
        pipeline.push(Stage::Sorted(Box::new(|_: &Row, _: &Row| std::cmp::Ordering::Equal)));
        filter(&mut pipeline, table.field("age").greater_than(18));
        pipeline.push(Stage::Map(Box::new(|r: Row| r)));
        filter(&mut pipeline, table.field("age").less_than(65));

        let plan = optimizer.plan(pipeline).unwrap();
        assert_eq!(plan.pushed(), 1);
        assert_eq!(plan.where_clause().unwrap().sql(), "(\"age\" > ?)");
        assert_eq!(plan.residual().stage_names(), vec!["sorted", "map", "filter"]);
    }

    #[test]
    fn unpushable_conjuncts_stay_and_scanning_continues() {
        let table = users();
        let sql = TableSql::compile(&table, AnsiDialect.naming());
        let optimizer = Optimizer::new(&table, &sql, &AnsiDialect, true);

        let mut pipeline = Pipeline::new();
        filter(
            &mut pipeline,
            Filter::from(table.field("age").greater_than(18))
                .and(Filter::custom(|r: &Row| !r.is_empty()))
                .and(table.field("name").is_not_null()),
        );
        filter(
            &mut pipeline,
            Filter::from(table.field("id").equal(1)).or(table.field("id").equal(2)),
        );
        filter(&mut pipeline, table.field("id").less_than(100));

        let plan = optimizer.plan(pipeline).unwrap();
        assert_eq!(
            plan.where_clause().unwrap().sql(),
            "(\"age\" > ?) AND (\"name\" IS NOT NULL) AND (\"id\" < ?)"
        );
        assert_eq!(plan.residual().stage_names(), vec!["filter", "filter"]);
    }

    #[test]
    fn pushdown_disabled_keeps_every_filter_in_memory() {
        let table = users();
        let sql = TableSql::compile(&table, AnsiDialect.naming());
        let optimizer = Optimizer::new(&table, &sql, &AnsiDialect, false);
        let mut pipeline = Pipeline::new();
        filter(&mut pipeline, table.field("age").greater_than(18));
        let plan = optimizer.plan(pipeline).unwrap();
        assert!(plan.where_clause().is_none());
        assert_eq!(plan.residual().len(), 1);
    }

    #[test]
    fn binds_go_through_the_type_mapper() {
        let table = users();
        let sql = TableSql::compile(&table, AnsiDialect.naming());
        let optimizer = Optimizer::new(&table, &sql, &AnsiDialect, true);
        let mut pipeline = Pipeline::new();
        filter(&mut pipeline, table.field("active").equal(true));
        let plan = optimizer.plan(pipeline).unwrap();
        assert_eq!(plan.where_clause().unwrap().binds(), &[Value::Integer(1)]);
    }

    #[test]
    fn bad_fields_fail_before_execution() {
        let table = users();
        let sql = TableSql::compile(&table, AnsiDialect.naming());
        let optimizer = Optimizer::new(&table, &sql, &AnsiDialect, true);

        let mut pipeline = Pipeline::new();
        filter(&mut pipeline, table.field("missing").is_null());
        assert!(matches!(
            optimizer.plan(pipeline),
            Err(CoreError::UnknownColumn { .. })
        ));

        let other = crate::types::FieldRef::new(TableId::unqualified("orders"), "id");
        let mut pipeline = Pipeline::new();
        pipeline.push(Stage::Limit(1));
        filter(&mut pipeline, other.is_null());
        assert!(matches!(
            optimizer.plan(pipeline),
            Err(CoreError::ColumnMismatch { .. })
        ));
    }

    #[test]
    fn pending_query_is_finalized_once() {
        let mut pending = PendingQuery::new("SELECT a FROM t");
        pending
            .finalize(Some(SqlFragment::new("(a = ?)", vec![Value::Integer(1)])))
            .unwrap();
        assert_eq!(pending.sql(), "SELECT a FROM t WHERE (a = ?)");
        assert!(matches!(
            pending.finalize(None),
            Err(CoreError::InvalidOperation { .. })
        ));
    }
}
