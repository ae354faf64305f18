//! Query compilation and execution benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use entiql_bench::{random_predicates, random_rows, scripted_manager};
use entiql_core::{Config, DbmsType, Filter};
use entiql_driver::Row;

const COLUMNS: usize = 8;

/// Benchmark compiling pipelines of increasing filter count.
fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    let config = Config::new().dbms(DbmsType::MySql);
    let (manager, _source) = scripted_manager(Vec::new(), COLUMNS, config);

    for filters in [1, 4, 16].iter() {
        group.throughput(Throughput::Elements(*filters as u64));
        group.bench_with_input(BenchmarkId::from_parameter(filters), filters, |b, &filters| {
            let predicates = random_predicates(filters, COLUMNS);
            b.iter(|| {
                let query = predicates
                    .iter()
                    .cloned()
                    .fold(manager.stream(), |q, p| q.filter(p));
                black_box(query.explain().unwrap());
            });
        });
    }
    group.finish();
}

/// Benchmark fetching and mapping rows through the scripted driver.
fn bench_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream");

    for rows in [100, 1000, 10_000].iter() {
        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("all", rows), rows, |b, &rows| {
            let (manager, source) =
                scripted_manager(random_rows(rows, COLUMNS), COLUMNS, Config::default());
            let journal = source.journal();
            b.iter(|| {
                let rows: Vec<Row> = manager.stream().to_vec().unwrap();
                journal.clear();
                black_box(rows);
            });
        });
        group.bench_with_input(BenchmarkId::new("in_memory_filter", rows), rows, |b, &rows| {
            let (manager, source) =
                scripted_manager(random_rows(rows, COLUMNS), COLUMNS, Config::default());
            let journal = source.journal();
            let field = manager.field("c0");
            b.iter(|| {
                let kept = manager
                    .stream()
                    .filter(Filter::custom(|_: &Row| true).and(field.greater_than(500)).negate())
                    .count()
                    .unwrap();
                journal.clear();
                black_box(kept);
            });
        });
    }
    group.finish();
}

/// Benchmark `count()` on the fast path against materializing.
fn bench_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("count");
    let rows = random_rows(1000, COLUMNS);

    for (name, fast_path) in [("fast_path", true), ("materialize", false)] {
        let (manager, source) = scripted_manager(
            rows.clone(),
            COLUMNS,
            Config::new().count_fast_path(fast_path),
        );
        let journal = source.journal();
        group.bench_function(name, |b| {
            b.iter(|| {
                let n = manager.stream().count().unwrap();
                journal.clear();
                black_box(n);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compile, bench_stream, bench_count);

criterion_main!(benches);
