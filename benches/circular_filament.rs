#![allow(clippy::all)] // Clippy will attempt to remove black_box() internals

use magnetostatics::math::roots_legendre;
use magnetostatics::physics::{CircularWire, FieldSource};
use criterion::*;
use std::time::Duration;

fn bench_flux_density_circular_wire(c: &mut Criterion) {
    let mut group = c.benchmark_group("Flux Density of a Circular Wire");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(5));

    let obs = (2.0 / 7.0, -1.0 / 9.0, 2.0 / 11.0);

    for order in [10_usize, 30, 100, 300, 1000] {
        let wire =
            CircularWire::with_order((0.0, 0.6, 0.8), (0.0, 0.0, 1.0 / 11.0), 1.0 / 7.0, 0.5, order)
                .unwrap();
        let general = wire.to_general_wire();

        group.throughput(Throughput::Elements(order as u64));
        group.bench_with_input(
            BenchmarkId::new("Gauss-Legendre Quadrature", order),
            &order,
            |b, &_| {
                b.iter(|| black_box(wire.magnetic_field(black_box(obs))));
            },
        );
        group.bench_with_input(
            BenchmarkId::new("Segment Discretization", order),
            &order,
            |b, &n| {
                b.iter(|| black_box(general.magnetic_field_with_segments(black_box(obs), n)));
            },
        );
    }

    group.finish();
}

fn bench_roots_legendre(c: &mut Criterion) {
    let mut group = c.benchmark_group("Gauss-Legendre Nodes and Weights");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(5));

    for order in [10_usize, 100, 300, 1000] {
        group.throughput(Throughput::Elements(order as u64));
        group.bench_with_input(BenchmarkId::new("roots_legendre", order), &order, |b, &n| {
            b.iter(|| black_box(roots_legendre(black_box(n))));
        });
    }

    group.finish();
}

criterion_group!(group_flux_density, bench_flux_density_circular_wire);
criterion_group!(group_quadrature, bench_roots_legendre);
criterion_main!(group_flux_density, group_quadrature);
