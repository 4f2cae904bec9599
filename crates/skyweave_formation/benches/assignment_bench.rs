// SPDX-License-Identifier: MIT OR Apache-2.0
//! Criterion benchmarks for formation pairing
//!
//! Run with: cargo bench -p skyweave_formation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use skyweave_formation::{cost_matrix, pair_greedy, solve, CostWeights, DEFAULT_MAX_POINTS};

/// Deterministic scattered positions
fn generate_points(count: usize, seed: u32) -> Vec<Vec3> {
    let mut state = seed.max(1);
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        (state as f32 / u32::MAX as f32) * 100.0
    };
    (0..count).map(|_| Vec3::new(next(), next(), next())).collect()
}

fn bench_optimal(c: &mut Criterion) {
    let mut group = c.benchmark_group("Assignment_Optimal");
    let weights = CostWeights::default();

    for size in [16, 64, 256, 512] {
        let prev = generate_points(size, 0x1234_5678);
        let next = generate_points(size, 0x9abc_def0);
        let matrix = cost_matrix(&prev, &next, &weights);

        group.bench_with_input(BenchmarkId::from_parameter(size), &matrix, |b, matrix| {
            b.iter(|| solve(black_box(matrix), DEFAULT_MAX_POINTS))
        });
    }

    group.finish();
}

fn bench_greedy(c: &mut Criterion) {
    let mut group = c.benchmark_group("Assignment_Greedy");

    for size in [64, 512, 4096] {
        let prev = generate_points(size, 0x1234_5678);
        let next = generate_points(size, 0x9abc_def0);

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| pair_greedy(black_box(&prev), black_box(&next)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_optimal, bench_greedy);
criterion_main!(benches);
