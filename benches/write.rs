//! Write path benchmark suite
//!
//! Benchmarks for destination write throughput.
//!
//! Run with: `cargo bench --bench write`
//!
//! # What we measure
//!
//! - Buffered writes (the hot path: format + push under the buffer lock)
//! - No-cache writes (every call pays the file append)
//! - The severity gate and the sampling draw on their rejection paths
//! - Flushing a full buffer as one concatenated write

use std::sync::Arc;
use std::time::{Duration, Instant};

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput,
};
use serde::Serialize;
use tempfile::TempDir;

use logbuf::{Destination, DestinationConfig, Level, LevelFilter, LogRegistry};

/// A log line in the size range web services typically emit
const LINE: &str = "GET /api/v1/users/42 200 12ms upstream=auth cache=miss";

/// Structured payload for the JSON benchmarks
#[derive(Serialize)]
struct BenchEvent<'a> {
    method: &'a str,
    path: &'a str,
    status: u16,
    duration_ms: u32,
}

const EVENT: BenchEvent<'static> = BenchEvent {
    method: "GET",
    path: "/api/v1/users/42",
    status: 200,
    duration_ms: 12,
};

/// Build a destination under `dir` through a throwaway registry
fn registry_dest(dir: &TempDir, defaults: DestinationConfig) -> Arc<Destination> {
    let name = dir.path().join("bench.log").to_str().unwrap().to_string();
    let registry = LogRegistry::builder().defaults(defaults).build();
    registry.get(&name)
}

// =============================================================================
// Write Path Benchmarks
// =============================================================================

/// Benchmark: buffered vs no-cache writes
fn bench_write_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");

    // Buffered: criterion picks the iteration count, so flush every few
    // thousand lines to keep the buffer from growing without bound.
    group.throughput(Throughput::Elements(1));
    group.bench_function("buffered", |b| {
        b.iter_custom(|iters| {
            let dir = TempDir::new().unwrap();
            let dest = registry_dest(&dir, DestinationConfig::default());

            let start = Instant::now();
            for i in 0..iters {
                dest.write(black_box(LINE)).unwrap();
                if i % 4096 == 4095 {
                    dest.flush().unwrap();
                }
            }
            dest.flush().unwrap();
            start.elapsed()
        });
    });

    // No-cache: every write is an append syscall.
    group.measurement_time(Duration::from_secs(10));
    group.bench_function("no_cache", |b| {
        let dir = TempDir::new().unwrap();
        let dest = registry_dest(
            &dir,
            DestinationConfig {
                cache_enabled: false,
                ..DestinationConfig::default()
            },
        );
        b.iter(|| dest.write(black_box(LINE)).unwrap());
    });

    group.finish();
}

// =============================================================================
// Filter Benchmarks
// =============================================================================

/// Benchmark: the rejection paths, which should cost no I/O at all
fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");

    group.throughput(Throughput::Elements(1));
    group.bench_function("level_gate_rejects", |b| {
        let dir = TempDir::new().unwrap();
        let dest = registry_dest(
            &dir,
            DestinationConfig {
                level: LevelFilter::Error,
                ..DestinationConfig::default()
            },
        );
        b.iter(|| dest.write_leveled(Level::Debug, black_box(LINE)).unwrap());
    });

    group.bench_function("sampling_mostly_drops", |b| {
        let dir = TempDir::new().unwrap();
        let dest = registry_dest(
            &dir,
            DestinationConfig {
                keep_probability: 0.01,
                ..DestinationConfig::default()
            },
        );
        b.iter(|| dest.write_json(black_box(&EVENT)).unwrap());
    });

    group.bench_function("json_kept", |b| {
        let dir = TempDir::new().unwrap();
        let dest = registry_dest(&dir, DestinationConfig::default());
        b.iter_custom(|iters| {
            let start = Instant::now();
            for i in 0..iters {
                dest.write_json(black_box(&EVENT)).unwrap();
                if i % 4096 == 4095 {
                    dest.flush().unwrap();
                }
            }
            dest.flush().unwrap();
            start.elapsed()
        });
    });

    group.finish();
}

// =============================================================================
// Flush Benchmarks
// =============================================================================

/// Benchmark: draining a full buffer with one concatenated write
fn bench_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("flush");

    group.throughput(Throughput::Elements(1000));
    group.bench_function("1000_lines", |b| {
        b.iter_batched(
            || {
                let dir = TempDir::new().unwrap();
                let dest = registry_dest(&dir, DestinationConfig::default());
                for _ in 0..1000 {
                    dest.write(LINE).unwrap();
                }
                (dir, dest)
            },
            |(_dir, dest)| dest.flush().unwrap(),
            BatchSize::PerIteration,
        );
    });

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(benches, bench_write_paths, bench_filters, bench_flush);

criterion_main!(benches);
