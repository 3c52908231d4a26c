use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use edit_core::engine::{apply, EditOp, Operation};

fn make_lines(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("line {i}")).collect()
}

fn bench_descending_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_apply");
    for size in [100usize, 1_000, 10_000] {
        let edits: Vec<EditOp> = (0..size.min(1000))
            .step_by(7)
            .map(|line| EditOp {
                line: line + 1,
                operation: Operation::Replace,
                content: Some("replaced".to_string()),
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let lines = make_lines(size);
                apply(lines, &edits, None, "bench.txt").unwrap();
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_descending_apply);
criterion_main!(benches);
