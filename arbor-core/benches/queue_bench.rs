#[macro_use]
extern crate criterion;

use criterion::{black_box, BatchSize, Criterion};

use arbor_core::alloc::{ObjectPool, StrategyKind};
use arbor_core::sync::{Channel, RingBuffer};

fn bench_queue_push_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_push_pop");

    for capacity in [128, 1024, 16384] {
        group.throughput(criterion::Throughput::Elements(1));

        group.bench_function(format!("ring_capacity_{}", capacity), |b| {
            let (mut tx, mut rx) = RingBuffer::with_capacity(capacity).unwrap().split();
            b.iter(|| {
                tx.push(black_box(7u64)).unwrap();
                rx.pop().unwrap();
            });
        });

        group.bench_function(format!("channel_capacity_{}", capacity), |b| {
            let channel = Channel::with_capacity(capacity);
            b.iter(|| {
                channel.push(black_box(7u64)).unwrap();
                channel.pop().unwrap();
            });
        });
    }
    group.finish();
}

fn bench_pool_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_alloc_release");

    for kind in [
        StrategyKind::Direct,
        StrategyKind::FreeList,
        StrategyKind::Slab { slots_per_block: 4096 },
    ] {
        // A fresh pool per batch: slab slots are only reclaimed with their pool.
        group.throughput(criterion::Throughput::Elements(1024));
        group.bench_function(format!("{:?}", kind), |b| {
            b.iter_batched(
                || ObjectPool::<[u64; 4]>::new(kind).unwrap(),
                |pool| {
                    for i in 0..1024u64 {
                        let boxed = pool.alloc(black_box([i, 2, 3, 4]));
                        black_box(&*boxed);
                    }
                    pool
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_queue_push_pop, bench_pool_strategies);
criterion_main!(benches);
