//! Criterion benchmarks for the blocked TRMM drivers.
//!
//! The baseline materializes the triangle into a dense matrix and runs
//! ndarray's general matmul, which is what callers without a triangular
//! routine end up doing.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use trimly::{dtrmm_llnn, dtrmm_rutn, DMatMut, DMatRef};

fn lower_triangle(k: usize, rng: &mut StdRng) -> Vec<f64> {
    let mut a = vec![0.0; k * k];
    for j in 0..k {
        for i in j..k {
            a[j * k + i] = rng.random_range(-1.0..1.0);
        }
    }
    a
}

fn upper_triangle(k: usize, rng: &mut StdRng) -> Vec<f64> {
    let mut a = vec![0.0; k * k];
    for j in 0..k {
        for i in 0..=j {
            a[j * k + i] = rng.random_range(-1.0..1.0);
        }
    }
    a
}

fn dense(rows: usize, cols: usize, rng: &mut StdRng) -> Vec<f64> {
    (0..rows * cols).map(|_| rng.random_range(-1.0..1.0)).collect()
}

/// Column-major flat buffer -> ndarray (which is row-major by default).
fn to_array(data: &[f64], rows: usize, cols: usize) -> Array2<f64> {
    Array2::from_shape_fn((rows, cols), |(i, j)| data[j * rows + i])
}

fn bench_trmm_left_lower(c: &mut Criterion) {
    let mut group = c.benchmark_group("trmm_llnn");
    let mut rng = StdRng::seed_from_u64(1);

    // straddles the stack/heap switch-over on the wide tiers
    for &size in [32usize, 64, 128, 192, 256, 384].iter() {
        let (m, n) = (size, size);
        let a = lower_triangle(m, &mut rng);
        let b = dense(m, n, &mut rng);

        // triangular multiplies touch m*(m+1)/2 * n fused multiply-adds
        group.throughput(Throughput::Elements((m * (m + 1) / 2 * n) as u64));

        group.bench_with_input(BenchmarkId::new("trimly", size), &size, |bench, _| {
            let av = DMatRef::new(&a, m, m, m).unwrap();
            let bv = DMatRef::new(&b, m, n, m).unwrap();
            let mut d = vec![0.0; m * n];
            bench.iter(|| {
                let mut dv = DMatMut::new(&mut d, m, n, m).unwrap();
                dtrmm_llnn(m, n, 1.5, &av, &bv, &mut dv).unwrap();
                black_box(d[0]);
            });
        });

        group.bench_with_input(BenchmarkId::new("ndarray_dense", size), &size, |bench, _| {
            let a_nd = to_array(&a, m, m);
            let b_nd = to_array(&b, m, n);
            bench.iter(|| {
                let d = a_nd.dot(&b_nd) * 1.5;
                black_box(d[(0, 0)]);
            });
        });
    }

    group.finish();
}

fn bench_trmm_right_upper_trans(c: &mut Criterion) {
    let mut group = c.benchmark_group("trmm_rutn");
    let mut rng = StdRng::seed_from_u64(2);

    for &size in [64usize, 128, 256].iter() {
        let (m, n) = (size, size);
        let a = upper_triangle(n, &mut rng);
        let b = dense(m, n, &mut rng);

        group.throughput(Throughput::Elements((n * (n + 1) / 2 * m) as u64));

        group.bench_with_input(BenchmarkId::new("trimly", size), &size, |bench, _| {
            let av = DMatRef::new(&a, n, n, n).unwrap();
            let bv = DMatRef::new(&b, m, n, m).unwrap();
            let mut d = vec![0.0; m * n];
            bench.iter(|| {
                let mut dv = DMatMut::new(&mut d, m, n, m).unwrap();
                dtrmm_rutn(m, n, 1.0, &av, &bv, &mut dv).unwrap();
                black_box(d[0]);
            });
        });

        group.bench_with_input(BenchmarkId::new("ndarray_dense", size), &size, |bench, _| {
            let a_nd = to_array(&a, n, n);
            let b_nd = to_array(&b, m, n);
            bench.iter(|| {
                let d = b_nd.dot(&a_nd.t());
                black_box(d[(0, 0)]);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_trmm_left_lower, bench_trmm_right_upper_trans);
criterion_main!(benches);
