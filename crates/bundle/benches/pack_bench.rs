//! Benchmarks for bundle packing.
//!
//! Measures full multi-start solves at various wire counts and the
//! constraint evaluation hot path.

use cablepack_bundle::{BundlePacker, NlpProblem, PackConfig, PackingProblem, WireSet};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_pack(c: &mut Criterion) {
    let mut group = c.benchmark_group("bundle_pack");
    group.sample_size(10);

    for &n in &[4, 8, 16] {
        let mut wires = WireSet::new();
        wires.add_group(1.0, n / 2);
        wires.add_group(0.5, n - n / 2);
        let config = PackConfig::new()
            .with_restarts(4)
            .with_max_iterations(400)
            .with_seed(42);
        let packer = BundlePacker::new(config);

        group.bench_with_input(BenchmarkId::new("wires", n), &wires, |b, w| {
            b.iter(|| {
                let result = packer.pack(black_box(w), None);
                black_box(result)
            })
        });
    }
    group.finish();
}

fn bench_constraint_evaluation(c: &mut Criterion) {
    let radii: Vec<f64> = (0..32).map(|i| 0.5 + (i as f64 * 0.37) % 1.0).collect();
    let problem = PackingProblem::new(radii, Some(2.0));
    let x: Vec<f64> = (0..problem.dim())
        .map(|i| 10.0 + (i as f64 * 1.7) % 5.0)
        .collect();
    let mut out = vec![0.0; problem.num_constraints()];

    c.bench_function("constraints_32_wires", |b| {
        b.iter(|| {
            problem.constraints(black_box(&x), black_box(&mut out));
            black_box(&out);
        })
    });
}

criterion_group!(benches, bench_pack, bench_constraint_evaluation);
criterion_main!(benches);
