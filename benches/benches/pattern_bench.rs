//! # Pattern Benchmarks
//!
//! Measures the per-request work done before a backend is called:
//! range checks, waveform conversion and directional weighting.
//!
//! Run: `cargo bench --bench pattern_bench`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use haptic_core::directional::{actuator_weights, spread};
use haptic_core::{Direction, Limits, Pattern, Pulse, RangePolicy, Waveform};

fn pattern_of(len: usize) -> Pattern {
    (0..len)
        .map(|i| Pulse::new(0.01 + (i % 7) as f64 * 0.005, (i % 11) as f32 / 8.0, 0.5))
        .collect()
}

/// Benchmark range checks under both policies
fn bench_limits(c: &mut Criterion) {
    let mut group = c.benchmark_group("limits");

    for len in [1usize, 64, 1024] {
        let pattern = pattern_of(len);

        let clamp = Limits::default();
        group.bench_with_input(BenchmarkId::new("clamp", len), &pattern, |b, p| {
            b.iter(|| black_box(clamp.check_pattern(p)))
        });

        let reject = Limits {
            policy: RangePolicy::Reject,
            ..Limits::default()
        };
        group.bench_with_input(BenchmarkId::new("reject", len), &pattern, |b, p| {
            b.iter(|| black_box(reject.check_pattern(p)))
        });
    }

    group.finish();
}

/// Benchmark timings/amplitudes conversion
fn bench_waveform(c: &mut Criterion) {
    let mut group = c.benchmark_group("waveform");

    for len in [1usize, 64, 1024] {
        let pattern = pattern_of(len);
        group.bench_with_input(BenchmarkId::new("from_pattern", len), &pattern, |b, p| {
            b.iter(|| black_box(Waveform::from_pattern(p)))
        });
    }

    group.finish();
}

/// Benchmark directional weighting
fn bench_directional(c: &mut Criterion) {
    let mut group = c.benchmark_group("directional");

    let direction = Direction::new(-0.6, 0.8);

    for actuators in [2usize, 4, 16] {
        group.bench_with_input(BenchmarkId::new("weights", actuators), &actuators, |b, n| {
            b.iter(|| black_box(actuator_weights(direction, *n)))
        });
    }

    let pattern = pattern_of(64);
    group.bench_function("spread_64_over_4", |b| {
        b.iter(|| black_box(spread(&pattern, direction, 4)))
    });

    group.finish();
}

/// Benchmark JSON pattern parsing
fn bench_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("json");

    let json = pattern_of(256).to_json().unwrap_or_default();
    group.bench_function("from_json_256", |b| b.iter(|| black_box(Pattern::from_json(&json))));

    group.finish();
}

criterion_group!(benches, bench_limits, bench_waveform, bench_directional, bench_json);

criterion_main!(benches);
