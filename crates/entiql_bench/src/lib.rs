//! Benchmark utilities.

use entiql_core::{Column, Config, Manager, Predicate, Table, TableId};
use entiql_driver::{Row, ScriptedSource, Value};
use rand::Rng;
use std::sync::Arc;

/// Builds `bench.wide` with `columns` integer columns `c0..cN`.
pub fn wide_table(columns: usize) -> Table<Row> {
    Table::dynamic(
        TableId::new("bench", "wide"),
        (0..columns).map(|i| Column::new(format!("c{i}"))).collect(),
    )
    .expect("bench table has enabled columns")
}

/// Generates rows of random integers, one value per column.
pub fn random_rows(count: usize, columns: usize) -> Vec<Row> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            (0..columns)
                .map(|_| Value::Integer(rng.gen_range(0..1000)))
                .collect()
        })
        .collect()
}

/// Generates `count` predicates over the first `columns` columns of
/// [`wide_table`], cycling through comparisons, ranges and sets.
pub fn random_predicates(count: usize, columns: usize) -> Vec<Predicate> {
    let table = wide_table(columns);
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| {
            let field = table.field(&format!("c{}", i % columns));
            let n: i64 = rng.gen_range(0..1000);
            match i % 4 {
                0 => field.greater_than(n),
                1 => field.between(n, n + 100),
                2 => field.is_in((0..8).map(|k| n + k)),
                _ => field.not_equal(n),
            }
        })
        .collect()
}

/// A manager over `rows`, answering the base select and count.
pub fn scripted_manager(
    rows: Vec<Row>,
    columns: usize,
    config: Config,
) -> (Manager<Row>, ScriptedSource) {
    let source = ScriptedSource::new();
    let manager = Manager::new(wide_table(columns), Arc::new(source.clone()), config);
    let n = rows.len() as i64;
    source.respond_with(manager.sql().select(), rows);
    source.respond_with(manager.sql().count(), vec![Row::new(vec![Value::Integer(n)])]);
    (manager, source)
}
