//! Benchmarks for tessera-math kernels.
#![allow(missing_docs)]

use chrono::Days;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ndarray::{Array1, Array2};
use rand::Rng;
use tessera_math::{
    RollingOptions, ScanPolicy, SumMethod, covariance, last_valid_index_with, mask_trim_pos,
    rolling_sum_with, search_trim_pos,
};
use tessera_primitives::{Date, DateRange};

fn dates(n: usize) -> Vec<Date> {
    let start = Date::from_ymd_opt(1990, 1, 1).unwrap();
    (0..n).map(|i| start + Days::new(i as u64)).collect()
}

fn random_array(n: usize) -> Array1<f64> {
    let mut rng = rand::thread_rng();
    Array1::from_iter((0..n).map(|_| rng.r#gen::<f64>() * 0.1 - 0.05))
}

fn random_matrix(rows: usize, cols: usize) -> Array2<f64> {
    let mut rng = rand::thread_rng();
    Array2::from_shape_fn((rows, cols), |_| rng.r#gen::<f64>())
}

fn bench_trim(c: &mut Criterion) {
    let mut group = c.benchmark_group("trim");

    for size in [1_000, 10_000, 100_000] {
        let ds = dates(size);
        let range = DateRange::between(ds[size / 4], ds[size / 2]);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("binary_search", size), &size, |b, _| {
            b.iter(|| search_trim_pos(black_box(&ds), black_box(&range)));
        });
        group.bench_with_input(BenchmarkId::new("mask_scan", size), &size, |b, _| {
            b.iter(|| mask_trim_pos(black_box(&ds), black_box(&range)));
        });
    }

    group.finish();
}

fn bench_last_valid(c: &mut Criterion) {
    let mut group = c.benchmark_group("last_valid");

    for trailing in [0, 10, 1_000] {
        let size = 100_000;
        let mut values = random_array(size);
        for i in size - trailing..size {
            values[i] = f64::NAN;
        }
        for (name, policy) in [
            ("reverse", ScanPolicy::Reverse),
            ("forward", ScanPolicy::Forward),
            ("adaptive", ScanPolicy::Adaptive),
        ] {
            group.bench_with_input(BenchmarkId::new(name, trailing), &trailing, |b, _| {
                b.iter(|| last_valid_index_with(black_box(values.view()), policy).unwrap());
            });
        }
    }

    group.finish();
}

fn bench_rolling(c: &mut Criterion) {
    let mut group = c.benchmark_group("rolling_sum");

    for window in [5, 21, 252] {
        let values = random_array(10_000);
        for (name, method) in [
            ("cumulative", SumMethod::CumulativeDifference),
            ("direct", SumMethod::Direct),
            ("compensated", SumMethod::Compensated),
        ] {
            let opts = RollingOptions::new(window).with_method(method);
            group.bench_with_input(BenchmarkId::new(name, window), &window, |b, _| {
                b.iter(|| rolling_sum_with(black_box(values.view()), &opts).unwrap());
            });
        }
    }

    group.finish();
}

fn bench_covariance(c: &mut Criterion) {
    let mut group = c.benchmark_group("covariance");

    for cols in [5, 50] {
        let matrix = random_matrix(2_520, cols);
        group.bench_with_input(BenchmarkId::from_parameter(cols), &cols, |b, _| {
            b.iter(|| covariance(black_box(matrix.view()), 252.0).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_trim, bench_last_valid, bench_rolling, bench_covariance);
criterion_main!(benches);
