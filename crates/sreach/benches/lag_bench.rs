//! Criterion benchmarks for the backward recursion.
//! Focus: direction counts in {4, 8, 16} on a 2-state/1-input system.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::{DMatrix, DVector};
use sreach::prelude::*;

fn double_integrator() -> Dynamics {
    Dynamics::lti(
        DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 0.0, 1.0]),
        DMatrix::from_row_slice(2, 1, &[0.5, 1.0]),
        DMatrix::identity(2, 2),
        ConvexSet::interval(-0.1, 0.1),
    )
    .expect("dynamics")
}

fn bench_under(c: &mut Criterion) {
    let dynamics = double_integrator();
    let tube = Tube::constant(
        ConvexSet::box_nd(&[-1.0, -1.0], &[1.0, 1.0]).expect("box"),
        4,
    )
    .expect("tube");
    let w = DisturbanceList::single(Disturbance::SupportFn(SupportFnSet::Ball {
        center: DVector::zeros(2),
        radius: 0.02,
    }));
    let model = FixedDisturbance(w);
    let opts = LagOptions::default();

    let mut group = c.benchmark_group("lag_under");
    for &n in &[4usize, 8, 16] {
        let dirs = spread_directions(n, 3, 42).expect("dirs");
        group.bench_with_input(BenchmarkId::new("directions", n), &n, |b, _| {
            b.iter(|| {
                sreach_set_lag(
                    "under",
                    &dynamics,
                    &tube,
                    0.8,
                    &model,
                    &dirs,
                    &opts,
                    &DenseSimplex,
                )
                .expect("result")
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_under);
criterion_main!(benches);
