use criterion::{black_box, Criterion};
use map_bench_harness::analysis::accumulate::BinAccumulator;
use map_bench_harness::analysis::sample::{Outcome, Sample};
use map_bench_harness::config::AnalysisConfig;
use map_bench_harness::model::method::{Method, Operation};

fn generate_samples(count: usize) -> Vec<Sample> {
    (0..count)
        .map(|x| Sample {
            size: 8 + (x as u64 * 7919) % 500_000,
            outcome: if x % 3 == 0 {
                Outcome::Hit
            } else {
                Outcome::Miss
            },
            time: 1e-8 + (x % 17) as f64 * 1e-10,
        })
        .collect()
}

fn filled_accumulator(samples: &[Sample]) -> BinAccumulator {
    let mut accumulator = BinAccumulator::new(AnalysisConfig::default().size_bins());
    for (x, sample) in samples.iter().enumerate() {
        let method = Method::ALL[x % Method::ALL.len()];
        accumulator.add(Operation::Insert, method, *sample);
    }
    accumulator
}

pub fn bench_bin_of(c: &mut Criterion) {
    let bins = AnalysisConfig::default().size_bins();
    let samples = generate_samples(10_000);
    let mut group = c.benchmark_group("bin_of");

    group.bench_function("10000_sizes", |b| {
        b.iter(|| {
            samples
                .iter()
                .filter_map(|sample| bins.bin_of(black_box(sample.size)))
                .sum::<usize>()
        })
    });

    group.finish();
}

pub fn bench_accumulate(c: &mut Criterion) {
    let samples = generate_samples(10_000);
    let mut group = c.benchmark_group("accumulate");

    group.bench_function("10000_samples", |b| {
        b.iter(|| filled_accumulator(black_box(&samples)))
    });

    group.finish();
}

pub fn bench_into_records(c: &mut Criterion) {
    let samples = generate_samples(10_000);
    let mut group = c.benchmark_group("into_records");

    group.bench_function("10000_samples", |b| {
        b.iter_batched(
            || filled_accumulator(&samples),
            |accumulator| accumulator.into_records(black_box(8)),
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}
