//! Substrate Benchmarks
//!
//! Run with: `cargo bench --package fgc`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fgc::chunk::header::ChunkHeader;
use fgc::chunk::list::{ChunkListOwner, LevelHead};
use fgc::chunk::split::{coalesce, split_for_request};
use fgc::chunk::union_find::find_head_compress;
use fgc::sync::{Coordinator, ProcessorHandle};
use std::ptr::NonNull;

unsafe fn leaked_head(level: u32) -> NonNull<LevelHead> {
    NonNull::from(Box::leak(Box::new(LevelHead::new_root(level, ChunkListOwner::ToSpace))))
}

fn bench_chunk_split_and_coalesce(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk_split_coalesce");

    group.bench_function("split_for_request", |b| {
        b.iter_batched(
            || unsafe {
                let head = leaked_head(0);
                let buf = Box::leak(Box::new([0u8; 1 << 20]));
                let start = NonNull::new(buf.as_mut_ptr()).unwrap();
                let end = start.as_ptr() as usize + buf.len();
                ChunkHeader::initialize(start, end, head)
            },
            |chunk| unsafe {
                black_box(split_for_request(chunk, 4096, 4096));
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("split_then_coalesce", |b| {
        b.iter_batched(
            || unsafe {
                let head = leaked_head(0);
                let buf = Box::leak(Box::new([0u8; 1 << 20]));
                let start = NonNull::new(buf.as_mut_ptr()).unwrap();
                let end = start.as_ptr() as usize + buf.len();
                ChunkHeader::initialize(start, end, head)
            },
            |chunk| unsafe {
                if let Some(right) = split_for_request(chunk, 4096, 4096) {
                    black_box(coalesce(chunk, right));
                }
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

fn bench_union_find_compression(c: &mut Criterion) {
    let mut group = c.benchmark_group("union_find");

    group.bench_function("compress_chain_of_32", |b| {
        b.iter_batched(
            || unsafe {
                let mut heads: Vec<NonNull<LevelHead>> = (0..32).map(|lvl| leaked_head(lvl)).collect();
                for window in (0..heads.len() - 1).rev() {
                    heads[window].as_mut().parent = Some(heads[window + 1]);
                }
                heads[0]
            },
            |leaf| unsafe {
                black_box(find_head_compress(leaf));
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

fn bench_critical_section_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("critical_section");

    group.bench_function("single_processor_round_trip", |b| {
        let coordinator = Coordinator::new(1);
        let handle = ProcessorHandle::new(coordinator, 0);
        handle.signal_initialization();

        b.iter(|| {
            let guard = handle.enter_critical_section();
            black_box(&guard);
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_chunk_split_and_coalesce,
    bench_union_find_compression,
    bench_critical_section_round_trip
);
criterion_main!(benches);
