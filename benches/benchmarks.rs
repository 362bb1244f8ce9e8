use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dashmap::DashMap;
use hashbrown::HashMap;
use parking_lot::RwLock;
use sharded_map::{ShardedMap, ShardedMapBuilder};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const NUM_THREADS: usize = 8;

fn sharded(shard_count: usize) -> ShardedMap<usize, usize> {
    ShardedMapBuilder::new()
        .shard_count(shard_count)
        .unwrap()
        .build()
        .unwrap()
}

/// Run `work(thread_id)` on NUM_THREADS threads against a fresh map built by
/// `make`, `iters` times, and return the total wall time.
fn run_threads<M, F>(iters: u64, make: impl Fn() -> M, work: F) -> Duration
where
    M: Send + Sync + 'static,
    F: Fn(&M, usize) + Send + Sync + Copy + 'static,
{
    let start = Instant::now();
    for _ in 0..iters {
        let map = Arc::new(make());
        let handles: Vec<_> = (0..NUM_THREADS)
            .map(|thread_id| {
                let map = Arc::clone(&map);
                thread::spawn(move || work(&map, thread_id))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
    start.elapsed()
}

fn bench_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("set");

    group.bench_function("single_lock_hashmap", |b| {
        let map = RwLock::new(HashMap::new());
        b.iter(|| {
            for i in 0..1000usize {
                map.write().insert(i, i);
            }
        });
    });

    group.bench_function("dashmap", |b| {
        let map = DashMap::new();
        b.iter(|| {
            for i in 0..1000usize {
                map.insert(i, i);
            }
        });
    });

    for shard_count in [4, 16, 64] {
        group.bench_with_input(
            BenchmarkId::new("sharded_map", shard_count),
            &shard_count,
            |b, &shard_count| {
                let map = sharded(shard_count);
                b.iter(|| {
                    for i in 0..1000 {
                        map.set(i, i);
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");

    let single_map = RwLock::new(HashMap::new());
    let dashmap = DashMap::new();
    let sharded_16 = sharded(16);
    let sharded_default: ShardedMap<usize, usize> = ShardedMap::new(1000);

    for i in 0..1000usize {
        single_map.write().insert(i, i);
        dashmap.insert(i, i);
        sharded_16.set(i, i);
        sharded_default.set(i, i);
    }

    group.bench_function("single_lock_hashmap", |b| {
        b.iter(|| {
            for i in 0..1000 {
                black_box(single_map.read().get(&i).copied());
            }
        });
    });

    group.bench_function("dashmap", |b| {
        b.iter(|| {
            for i in 0..1000 {
                black_box(dashmap.get(&i).map(|v| *v));
            }
        });
    });

    group.bench_function("sharded_map_16", |b| {
        b.iter(|| {
            for i in 0..1000 {
                black_box(sharded_16.get(&i));
            }
        });
    });

    group.bench_function("sharded_map_default", |b| {
        b.iter(|| {
            for i in 0..1000 {
                black_box(sharded_default.get(&i));
            }
        });
    });

    group.finish();
}

fn bench_set_accept(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_accept");

    let map = sharded(64);
    for i in 0..1000 {
        map.set(i, 0);
    }

    group.bench_function("accepted", |b| {
        b.iter(|| {
            for i in 0..1000 {
                black_box(map.set_accept(i, i, |_| true));
            }
        });
    });

    group.bench_function("rejected", |b| {
        b.iter(|| {
            for i in 0..1000 {
                black_box(map.set_accept(i, i, |_| false));
            }
        });
    });

    group.finish();
}

fn bench_concurrent_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_set");
    let ops_per_thread = 10_000;

    group.bench_function("single_lock_hashmap", |b| {
        b.iter_custom(|iters| {
            run_threads(
                iters,
                || RwLock::new(HashMap::new()),
                move |map, thread_id| {
                    for i in 0..ops_per_thread {
                        let key = thread_id * ops_per_thread + i;
                        map.write().insert(key, key);
                    }
                },
            )
        });
    });

    group.bench_function("dashmap", |b| {
        b.iter_custom(|iters| {
            run_threads(iters, DashMap::new, move |map, thread_id| {
                for i in 0..ops_per_thread {
                    let key = thread_id * ops_per_thread + i;
                    map.insert(key, key);
                }
            })
        });
    });

    for shard_count in [4, 16, 64] {
        group.bench_with_input(
            BenchmarkId::new("sharded_map", shard_count),
            &shard_count,
            |b, &shard_count| {
                b.iter_custom(|iters| {
                    run_threads(
                        iters,
                        || sharded(shard_count),
                        move |map, thread_id| {
                            for i in 0..ops_per_thread {
                                let key = thread_id * ops_per_thread + i;
                                map.set(key, key);
                            }
                        },
                    )
                });
            },
        );
    }

    group.finish();
}

fn bench_mixed_workload(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed_workload");
    let ops_per_thread = 5_000;
    let key_space = NUM_THREADS * ops_per_thread;

    // 70% reads, 30% writes
    group.bench_function("single_lock_hashmap", |b| {
        b.iter_custom(|iters| {
            run_threads(
                iters,
                || RwLock::new(HashMap::new()),
                move |map, thread_id| {
                    for i in 0..ops_per_thread {
                        let key = thread_id * ops_per_thread + i;
                        if i % 10 < 3 {
                            map.write().insert(key, key);
                        } else {
                            black_box(map.read().get(&(key % key_space)).copied());
                        }
                    }
                },
            )
        });
    });

    group.bench_function("dashmap", |b| {
        b.iter_custom(|iters| {
            run_threads(iters, DashMap::new, move |map, thread_id| {
                for i in 0..ops_per_thread {
                    let key = thread_id * ops_per_thread + i;
                    if i % 10 < 3 {
                        map.insert(key, key);
                    } else {
                        black_box(map.get(&(key % key_space)).map(|v| *v));
                    }
                }
            })
        });
    });

    group.bench_function("sharded_map_default", |b| {
        b.iter_custom(|iters| {
            run_threads(
                iters,
                || ShardedMap::<usize, usize>::new(key_space),
                move |map, thread_id| {
                    for i in 0..ops_per_thread {
                        let key = thread_id * ops_per_thread + i;
                        if i % 10 < 3 {
                            map.set(key, key);
                        } else {
                            black_box(map.get(&(key % key_space)));
                        }
                    }
                },
            )
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_set,
    bench_get,
    bench_set_accept,
    bench_concurrent_set,
    bench_mixed_workload
);
criterion_main!(benches);
