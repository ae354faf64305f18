//! Predicate rendering benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use entiql_bench::wide_table;
use entiql_core::{render, DbmsType, Predicate};

fn predicates() -> Vec<(&'static str, Predicate)> {
    let table = wide_table(1);
    let c = table.field("c0");
    vec![
        ("greater_than", c.greater_than(18)),
        ("between", c.between(18, 65)),
        ("not_between", c.between(18, 65).negate()),
        ("starts_with", c.starts_with("Al")),
        ("contains_ignore_case", c.contains_ignore_case("li")),
        ("is_null", c.is_null()),
    ]
}

/// Benchmark rendering each kind in each dialect.
fn bench_render_kinds(c: &mut Criterion) {
    for dbms in DbmsType::ALL {
        let mut group = c.benchmark_group(format!("render/{dbms}"));
        let dialect = dbms.dialect();
        let column = dialect.naming().quote_field("c0");
        for (name, predicate) in predicates() {
            group.bench_function(name, |b| {
                b.iter(|| {
                    let fragment = render(dialect.as_ref(), black_box(&predicate), &column);
                    black_box(fragment);
                });
            });
        }
        group.finish();
    }
}

/// Benchmark `IN` rendering by set size.
fn bench_render_in(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_in");
    let table = wide_table(1);
    let dialect = DbmsType::PostgreSql.dialect();
    let column = dialect.naming().quote_field("c0");

    for size in [1, 10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let predicate = table.field("c0").is_in(0..size as i64);
            b.iter(|| {
                let fragment = render(dialect.as_ref(), black_box(&predicate), &column);
                black_box(fragment);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_render_kinds, bench_render_in);

criterion_main!(benches);
