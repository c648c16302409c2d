//! Benchmarks for note dispatch against a null register bus.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_opl::patch::default_patch;
use saavy_opl::synth::clock::TickClock;
use saavy_opl::{ChipConfig, NoteDispatcher, PatchBank};

use crate::BURST_SIZES;

pub fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("chip/dispatch");
    let mut patches = PatchBank::new();
    let lead = patches.insert(default_patch());

    for &size in BURST_SIZES {
        let mut dispatcher =
            NoteDispatcher::new(|_: u8, _: u8| {}, TickClock::new(), ChipConfig::default())
                .expect("default config is valid");

        // Every note-on past the ninth steals a sounding channel
        group.bench_with_input(BenchmarkId::new("note_on", size), &size, |b, &n| {
            b.iter(|| {
                for i in 0..n {
                    let pitch = 24 + (i % 72) as u8;
                    let _ = black_box(dispatcher.note_on(&patches, lead, pitch));
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("note_on_off", size), &size, |b, &n| {
            b.iter(|| {
                for i in 0..n {
                    let pitch = 24 + (i % 72) as u8;
                    let _ = black_box(dispatcher.note_on(&patches, lead, pitch));
                    black_box(dispatcher.note_off(lead, pitch));
                }
            })
        });
    }

    group.finish();
}
