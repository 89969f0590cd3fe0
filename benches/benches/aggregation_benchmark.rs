//! Aggregation and engine throughput.
//!
//! Run with: `cargo bench --package obol-bench`

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use obol_aggregate::{AggregatorState, aggregate_chunk};
use obol_bench::{SyntheticMarket, daily_volumes, synthetic_source};
use obol_engine::{Engine, EngineConfig, MemorySink};
use obol_format::{FileSink, OutputLayout, ParquetFormatter};
use std::hint::black_box;
use tempfile::TempDir;

const TICKS_PER_DAY: usize = 200_000;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn aggregate_benchmark(c: &mut Criterion) {
    let ticks = SyntheticMarket::new(7, 40_000.0).day(start(), 1_000_000);
    let traded: f64 = ticks.iter().map(|t| t.dollar_value()).sum();

    let mut group = c.benchmark_group("aggregate_chunk");
    group.throughput(Throughput::Elements(ticks.len() as u64));
    for target in [10_000_u32, 1_000, 200] {
        let threshold = traded / f64::from(target);
        group.bench_with_input(BenchmarkId::from_parameter(target), &threshold, |b, &threshold| {
            b.iter(|| aggregate_chunk(black_box(&ticks), threshold, AggregatorState::new()));
        });
    }
    group.finish();
}

fn engine_benchmark(c: &mut Criterion) {
    // Ten warm-up days give a 5 day window room, leaving five aggregated days.
    let source = synthetic_source(start(), 10, TICKS_PER_DAY, 11);
    let volumes = daily_volumes(&source);
    let config = EngineConfig::new(&[10_000, 4_000, 2_000, 1_000, 500, 200], 5).unwrap();
    let runtime = tokio::runtime::Runtime::new().unwrap();

    let mut group = c.benchmark_group("engine");
    group.sample_size(10);
    group.throughput(Throughput::Elements(5 * TICKS_PER_DAY as u64));

    group.bench_function("sequential", |b| {
        b.iter(|| {
            let mut engine = Engine::from_volumes(config.clone(), &volumes).unwrap();
            engine.run(&source, &mut MemorySink::new()).unwrap()
        });
    });

    group.bench_function("concurrent", |b| {
        b.to_async(&runtime).iter(|| async {
            let mut engine = Engine::from_volumes(config.clone(), &volumes).unwrap();
            engine
                .run_concurrent(&source, &mut MemorySink::new())
                .await
                .unwrap()
        });
    });

    group.bench_function("parquet_sink", |b| {
        b.iter(|| {
            let temp_dir = TempDir::new().unwrap();
            let layout = OutputLayout::from_config(temp_dir.path(), &config);
            let mut sink = FileSink::new(layout, ParquetFormatter::new());
            let mut engine = Engine::from_volumes(config.clone(), &volumes).unwrap();
            engine.run(&source, &mut sink).unwrap()
        });
    });

    group.finish();
}

criterion_group!(benches, aggregate_benchmark, engine_benchmark);
criterion_main!(benches);
