use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use geopcd_linalg::{estimate_rigid_transform, svd::svd3, RigidTransform};
use glam::{DMat3, DVec3};

fn bench_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("rigid");

    let r = DMat3::from_axis_angle(DVec3::new(1.0, 2.0, 3.0).normalize(), 0.7);
    let t = DVec3::new(690_000.0, 5_336_000.0, 0.0);

    for num_points in [4usize, 64] {
        let local: Vec<[f64; 3]> = (0..num_points)
            .map(|i| {
                let i = i as f64;
                [i.sin() * 100.0, i.cos() * 80.0, (i * 0.37).sin() * 5.0]
            })
            .collect();
        let global: Vec<[f64; 3]> = local
            .iter()
            .map(|p| (r * DVec3::from_array(*p) + t).to_array())
            .collect();

        group.bench_with_input(
            BenchmarkId::new("estimate_rigid_transform", num_points),
            &(local, global),
            |b, (local, global)| b.iter(|| black_box(estimate_rigid_transform(local, global))),
        );
    }

    let h = DMat3::from_cols(
        DVec3::new(4.0, -2.0, 1.0),
        DVec3::new(3.0, 6.0, -4.0),
        DVec3::new(2.0, 1.0, 8.0),
    );
    group.bench_function("svd3", |b| b.iter(|| black_box(svd3(black_box(&h)))));

    let transform = RigidTransform::new(
        [[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
        [10.0, 0.0, 0.0],
    );
    group.bench_function("apply", |b| {
        b.iter(|| black_box(transform.apply(black_box([1.0, 2.0, 3.0]))))
    });

    group.finish();
}

criterion_group!(benches, bench_estimate);
criterion_main!(benches);
