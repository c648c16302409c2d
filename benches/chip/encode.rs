//! Benchmarks for patch encoding.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_opl::chip::frequency::tuning;
use saavy_opl::chip::NUM_CHANNELS;
use saavy_opl::patch::{default_patch, encoder::encode_channel};

pub fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("chip/encode");
    let patch = default_patch();

    for channel in [0, NUM_CHANNELS - 1] {
        group.bench_with_input(BenchmarkId::new("channel", channel), &channel, |b, &ch| {
            b.iter(|| encode_channel(black_box(ch), black_box(&patch)).writes())
        });
    }

    group.bench_function("tuning_sweep", |b| {
        b.iter(|| (0..=127u8).filter_map(|p| tuning(black_box(p))).count())
    });

    group.finish();
}
