//! Benchmark suite for feed line parsing.
//!
//! Isolates line parsing and noise filtering from the async pipeline to
//! enable precise measurement of the per-line cost, which bounds the feed
//! rate the sniffer can sustain.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use wifi_sentinel::{NoiseFilter, ParseStrategy, parse_line};

/// A complete fixed-order line as the original firmware prints it.
const FULL_LINE: &str =
    "FT: 0 FST: 8 SRC: 082697773354 DEST: ffffffffffff RSSI: -62 SEQ: 1 CHNL: 6";

/// A newer-firmware line with the destination and counters dropped.
const SHORT_LINE: &str = "FT: 2 FST: 0 SRC: aabbccddeeff RSSI: -40";

/// Boot banner noise that shares the feed with frame lines.
const CHATTER: &str = "ets Jun  8 2016 00:22:57";

/// Benchmark both extraction strategies on accepted lines
fn bench_parse_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_line");

    group.throughput(Throughput::Elements(1));

    group.bench_function("labelled_full", |b| {
        b.iter(|| {
            let report = parse_line(black_box(FULL_LINE), ParseStrategy::Labelled);
            black_box(report)
        })
    });

    group.bench_function("positional_full", |b| {
        b.iter(|| {
            let report = parse_line(black_box(FULL_LINE), ParseStrategy::Positional);
            black_box(report)
        })
    });

    group.bench_function("labelled_short", |b| {
        b.iter(|| {
            let report = parse_line(black_box(SHORT_LINE), ParseStrategy::Labelled);
            black_box(report)
        })
    });

    group.finish();
}

/// Benchmark the rejection paths; chatter dominates a real feed's volume
fn bench_parse_rejection(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_rejection");

    group.throughput(Throughput::Elements(1));

    group.bench_function("chatter", |b| {
        b.iter(|| {
            let report = parse_line(black_box(CHATTER), ParseStrategy::Labelled);
            black_box(report)
        })
    });

    let bad_rssi = "FT: 0 FST: 8 SRC: aabbccddeeff RSSI: strong";
    group.bench_function("bad_rssi", |b| {
        b.iter(|| {
            let report = parse_line(black_box(bad_rssi), ParseStrategy::Labelled);
            black_box(report)
        })
    });

    group.finish();
}

/// Benchmark noise filtering of parsed reports
fn bench_noise_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("noise_filter");
    let filter = NoiseFilter::default();

    group.throughput(Throughput::Elements(1));

    let beacon = parse_line(FULL_LINE, ParseStrategy::Labelled).unwrap();
    group.bench_function("beacon", |b| {
        b.iter(|| {
            let verdict = filter.check(black_box(&beacon));
            black_box(verdict)
        })
    });

    let data = parse_line(SHORT_LINE, ParseStrategy::Labelled).unwrap();
    group.bench_function("data", |b| {
        b.iter(|| {
            let verdict = filter.check(black_box(&data));
            black_box(verdict)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_strategies,
    bench_parse_rejection,
    bench_noise_filter
);
criterion_main!(benches);
