//! Benchmarks for displacement-table construction.
//!
//! Run with: cargo bench -p framebench-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use framebench_core::DisplacementTable;
use glam::Vec2;

fn bench_horizontal_flip(c: &mut Criterion) {
    // Grid for a 1280x800 output: 160x100 cells
    c.bench_function("hor_flip_160x100", |bencher| {
        bencher.iter(|| DisplacementTable::horizontal_flip(black_box(160), black_box(100)));
    });

    // Grid for a 4K output: 480x270 cells
    c.bench_function("hor_flip_480x270", |bencher| {
        bencher.iter(|| DisplacementTable::horizontal_flip(black_box(480), black_box(270)));
    });
}

fn bench_from_fn(c: &mut Criterion) {
    c.bench_function("from_fn_identity_160x100", |bencher| {
        bencher.iter(|| {
            DisplacementTable::from_fn(black_box(160), black_box(100), |x, y| {
                Vec2::new((x * 8) as f32, (y * 8) as f32)
            })
        });
    });
}

criterion_group!(benches, bench_horizontal_flip, bench_from_fn);
criterion_main!(benches);
