use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use orbseq::{
    AtomicCounterStore, AtomicSequence, BlockSequence, CounterStore, LockCounterStore,
    NumberSequence, OrbOfConfusion, Partitions, ScrambledSequence, SequenceBlockCache,
    SequenceConfig,
};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};

// Number of IDs generated per benchmark iteration (per-thread for
// multi-threaded).
const TOTAL_IDS: usize = 4096;

const SEED1: u64 = 0x0123_4567_89AB_CDEF;
const SEED2: u64 = 0xFEDC_BA98_7654_3210;

/// Benchmarks a sequence on a single thread.
fn bench_sequence<Q>(c: &mut Criterion, group_name: &str, sequence_factory: impl Fn() -> Q)
where
    Q: NumberSequence,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let sequence = sequence_factory();
                for _ in 0..TOTAL_IDS {
                    black_box(sequence.try_next_id().unwrap());
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks one shared sequence hammered by `threads` threads.
fn bench_sequence_threaded<Q>(c: &mut Criterion, group_name: &str, sequence_factory: impl Fn() -> Q)
where
    Q: NumberSequence,
{
    let mut thread_counts = vec![1, 2, 4, 8, num_cpus::get()];
    thread_counts.sort_unstable();
    thread_counts.dedup();

    let mut group = c.benchmark_group(group_name);
    for threads in thread_counts {
        let total = threads * TOTAL_IDS;
        group.throughput(Throughput::Elements(total as u64));
        group.bench_function(format!("elems/{total}/threads/{threads}"), |b| {
            b.iter_custom(|iters| {
                let mut elapsed = core::time::Duration::ZERO;
                for _ in 0..iters {
                    let sequence = sequence_factory();
                    let barrier = Barrier::new(threads + 1);
                    let start = scope(|s| {
                        for _ in 0..threads {
                            s.spawn(|| {
                                barrier.wait();
                                for _ in 0..TOTAL_IDS {
                                    black_box(sequence.try_next_id().unwrap());
                                }
                            });
                        }
                        barrier.wait();
                        Instant::now()
                    });
                    elapsed += start.elapsed();
                }
                elapsed
            });
        });
    }
    group.finish();
}

/// Benchmarks the raw block cache across `names` distinct sequences.
fn bench_cache_names<S>(c: &mut Criterion, group_name: &str, store_factory: impl Fn() -> S)
where
    S: CounterStore,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));
    for names in [1, 16] {
        let keys: Vec<String> = (0..names).map(|i| format!("seq-{i}")).collect();
        group.bench_function(format!("elems/{TOTAL_IDS}/names/{names}"), |b| {
            b.iter_custom(|iters| {
                let start = Instant::now();
                for _ in 0..iters {
                    let cache = SequenceBlockCache::new(store_factory(), 1000).unwrap();
                    for i in 0..TOTAL_IDS {
                        black_box(cache.next(&keys[i % names]).unwrap());
                    }
                }
                start.elapsed()
            });
        });
    }
    group.finish();
}

fn bench_orb(c: &mut Criterion) {
    let mut group = c.benchmark_group("orb");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    for bound in [100_000u64, 1 << 32, 1 << 63] {
        let orb = OrbOfConfusion::new(bound, &Partitions::default(), SEED1, SEED2).unwrap();
        group.bench_function(format!("transform/bound/{bound}"), |b| {
            b.iter(|| {
                for raw in 0..TOTAL_IDS as u64 {
                    black_box(orb.transform(black_box(raw)).unwrap());
                }
            });
        });
    }

    let decimal = Partitions::decimal(&[3, 3, 3]).unwrap();
    let orb = OrbOfConfusion::new(999_999_999, &decimal, SEED1, SEED2).unwrap();
    group.bench_function("transform/decimal", |b| {
        b.iter(|| {
            for raw in 0..TOTAL_IDS as u64 {
                black_box(orb.transform(black_box(raw)).unwrap());
            }
        });
    });

    group.finish();
}

fn block_sequence<S: CounterStore>(store: S) -> BlockSequence<S> {
    let cache = Arc::new(SequenceBlockCache::new(store, 1000).unwrap());
    BlockSequence::new("bench", cache).unwrap()
}

fn benchmarks(c: &mut Criterion) {
    bench_sequence(c, "sequence/atomic", || {
        AtomicSequence::new("bench", 0).unwrap()
    });
    bench_sequence(c, "sequence/block/atomic_store", || {
        block_sequence(AtomicCounterStore::default())
    });
    bench_sequence(c, "sequence/block/lock_store", || {
        block_sequence(LockCounterStore::default())
    });
    bench_sequence(c, "sequence/scrambled", || {
        ScrambledSequence::from_config(
            block_sequence(AtomicCounterStore::default()),
            1 << 40,
            &SequenceConfig::default(),
        )
        .unwrap()
    });

    bench_sequence_threaded(c, "sequence/block/threaded", || {
        block_sequence(AtomicCounterStore::default())
    });
    bench_sequence_threaded(c, "sequence/scrambled/threaded", || {
        ScrambledSequence::from_config(
            block_sequence(AtomicCounterStore::default()),
            1 << 40,
            &SequenceConfig::default(),
        )
        .unwrap()
    });

    bench_cache_names(c, "cache/atomic_store", AtomicCounterStore::default);
    bench_cache_names(c, "cache/lock_store", LockCounterStore::default);

    bench_orb(c);
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
