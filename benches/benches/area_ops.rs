// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Criterion benchmarks for the Boolean operations.
//! Polygon sizes: star points in {8, 32, 128}.

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use kurbo::Point;
use understory_area::Area;
use understory_area_benches::{disk, grid, star};

fn bench_polygons(c: &mut Criterion) {
    let mut group = c.benchmark_group("polygon");
    for &n in &[8_usize, 32, 128] {
        let a = star(Point::new(0.0, 0.0), n, 10.0, 4.0);
        let b = star(Point::new(3.1, 1.7), n, 10.0, 4.0);
        group.bench_with_input(BenchmarkId::new("union", n), &n, |bench, _| {
            bench.iter(|| a.union(&b));
        });
        group.bench_with_input(BenchmarkId::new("intersection", n), &n, |bench, _| {
            bench.iter(|| a.intersection(&b));
        });
        group.bench_with_input(BenchmarkId::new("exclusive_or", n), &n, |bench, _| {
            bench.iter_batched(
                || a.clone(),
                |mut area: Area| area.exclusive_or(&b),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_curves(c: &mut Criterion) {
    let mut group = c.benchmark_group("curve");
    let square = grid(1, 1);
    for &r in &[0.3_f64, 0.6, 0.9] {
        let circle = disk(Point::new(0.9, 0.8), r);
        group.bench_with_input(BenchmarkId::new("subtract_disk", r), &r, |bench, _| {
            bench.iter(|| square.difference(&circle));
        });
    }
    group.finish();
}

fn bench_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid");
    for &side in &[2_usize, 4, 8] {
        group.bench_with_input(BenchmarkId::new("build", side), &side, |bench, &side| {
            bench.iter(|| grid(side, side));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_polygons, bench_curves, bench_grid);
criterion_main!(benches);
