use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tzmap::{PointLocator, TrapMap};

/// Builds a map from `n` non-crossing segments stacked in horizontal bands.
/// The staggered x-extents make later insertions cross several regions.
fn ladder(n: usize) -> TrapMap {
    let mut trap_map = TrapMap::new([0., 0.], [100., n as f64 + 1.]).unwrap();
    for i in 0..n {
        let y = i as f64 + 0.4;
        let xl = 1. + (i % 7) as f64;
        let xr = 99. - (i % 5) as f64;
        let p = trap_map.add_point(format!("P{}", i), [xl, y]);
        let q = trap_map.add_point(format!("Q{}", i), [xr, y + 0.2]);
        trap_map
            .add_segment(format!("S{}", i), p, q)
            .expect("band segments are not vertical");
    }
    trap_map
}

pub fn build_maps(c: &mut Criterion) {
    for n in [10, 100, 500] {
        c.bench_with_input(BenchmarkId::new("Build trapezoidal maps", n), &n, |b, &n| {
            b.iter(|| ladder(n));
        });
    }
}

pub fn locate_points(c: &mut Criterion) {
    let n = 100;
    let trap_map = ladder(n);

    let mut rng = ChaCha8Rng::seed_from_u64(1234);
    let query: Vec<_> = (0..42_000)
        .map(|_| [rng.gen::<f64>() * 100., rng.gen::<f64>() * (n as f64 + 1.)])
        .collect();

    c.bench_with_input(BenchmarkId::new("Locate points", n), &query, |b, q| {
        b.iter(|| trap_map.locate_many(q));
    });
    c.bench_with_input(
        BenchmarkId::new("Locate points in parallel", n),
        &query,
        |b, q| {
            b.iter(|| trap_map.par_locate_many(q));
        },
    );
}

criterion_group!(benches, build_maps, locate_points);
criterion_main!(benches);
