// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec Benchmark
//!
//! Measures encode and decode of bundles with:
//! - Entry counts (8, 64, 512) of mixed scalar and text values
//! - Payload sizes (64B to 64KB) in a single byte array
//! - Nesting depth (1 to 16)

#![allow(clippy::uninlined_format_args)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use state_bundle::{codec, snapshot, DecodeLimits, OpaqueRegistry, StateBundle};
use std::hint::black_box as bb;

fn mixed_bundle(entries: usize) -> StateBundle {
    let mut bundle = StateBundle::with_capacity(entries);
    for i in 0..entries {
        let key = format!("key_{}", i);
        match i % 4 {
            0 => bundle.put_int(key, i as i32),
            1 => bundle.put_string(key, "some transient text"),
            2 => bundle.put_double_array(key, [0.5, 1.5, 2.5]),
            _ => bundle.put_boolean(key, i % 2 == 0),
        };
    }
    bundle
}

fn nested_bundle(depth: usize) -> StateBundle {
    let mut bundle = StateBundle::new();
    bundle.put_int("level", depth as i32);
    for level in (0..depth.saturating_sub(1)).rev() {
        let mut outer = StateBundle::new();
        outer.put_int("level", level as i32).put_bundle("child", bundle);
        bundle = outer;
    }
    bundle
}

fn bench_entry_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_by_entries");
    let registry = OpaqueRegistry::new();

    for entries in [8, 64, 512] {
        let bundle = mixed_bundle(entries);
        let bytes = codec::encode(&bundle).expect("encode");

        group.bench_with_input(BenchmarkId::new("encode", entries), &bundle, |b, bundle| {
            b.iter(|| codec::encode(bb(bundle)).expect("encode"));
        });
        group.bench_with_input(BenchmarkId::new("decode", entries), &bytes, |b, bytes| {
            b.iter(|| codec::decode(bb(bytes), &registry).expect("decode"));
        });
    }

    group.finish();
}

fn bench_payload_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_by_payload");
    let registry = OpaqueRegistry::new();
    let limits = DecodeLimits::default();

    for size in [64, 1024, 4096, 65536] {
        let mut bundle = StateBundle::new();
        bundle.put_byte_array("payload", vec![0xAB; size]);
        let image = snapshot::to_bytes(&bundle).expect("snapshot");

        group.bench_with_input(BenchmarkId::new("snapshot_write", size), &bundle, |b, bundle| {
            b.iter(|| snapshot::to_bytes(bb(bundle)).expect("snapshot"));
        });
        group.bench_with_input(BenchmarkId::new("snapshot_read", size), &image, |b, image| {
            b.iter(|| snapshot::from_bytes(bb(image), &registry, &limits).expect("read"));
        });
    }

    group.finish();
}

fn bench_nesting(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_by_depth");
    let registry = OpaqueRegistry::new();

    for depth in [1, 4, 16] {
        let bytes = codec::encode(&nested_bundle(depth)).expect("encode");
        group.bench_with_input(BenchmarkId::from_parameter(depth), &bytes, |b, bytes| {
            b.iter(|| codec::decode(bb(bytes), &registry).expect("decode"));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_entry_counts, bench_payload_sizes, bench_nesting);
criterion_main!(benches);
