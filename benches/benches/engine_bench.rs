//! # Engine Benchmarks
//!
//! Measures a full request through the engine lock, validation and
//! dispatch to a backend that accepts everything.
//!
//! Run: `cargo bench --bench engine_bench`

use std::sync::Arc;
use std::thread;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use haptic_core::{HapticEngine, NullBackend, Pattern, Pulse};

fn ready_engine() -> HapticEngine {
    let engine = HapticEngine::new(Box::new(NullBackend));
    engine.initialize().expect("null backend always initializes");
    engine
}

/// Benchmark single-threaded requests
fn bench_requests(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_requests");

    let engine = ready_engine();
    let pattern: Pattern = (0..32).map(|i| Pulse::new(0.02, (i % 4) as f32 / 3.0, 0.5)).collect();
    let data = vec![0xA5u8; 4096];

    group.bench_function("one_shot", |b| {
        b.iter(|| black_box(engine.vibrate_one_shot(0.05, 0.8, 0.4)))
    });

    group.bench_function("pattern_32", |b| {
        b.iter(|| black_box(engine.vibrate_pattern(&pattern)))
    });

    group.bench_function("data_4k", |b| {
        b.iter(|| black_box(engine.vibrate_pattern_from_data(&data)))
    });

    group.bench_function("initialize_dispose", |b| {
        b.iter(|| {
            black_box(engine.dispose()).ok();
            black_box(engine.initialize()).ok();
        })
    });

    group.finish();
}

/// Benchmark lock contention with several callers
fn bench_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_contention");

    let engine = Arc::new(ready_engine());

    group.bench_function("4_threads_x_100_one_shots", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let engine = Arc::clone(&engine);
                    thread::spawn(move || {
                        for _ in 0..100 {
                            black_box(engine.vibrate_one_shot(0.01, 0.5, 0.5)).ok();
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().ok();
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_requests, bench_contention);

criterion_main!(benches);
