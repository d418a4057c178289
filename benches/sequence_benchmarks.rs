use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use seqweld::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .unwrap()
}

fn bench_plain_sequence(c: &mut Criterion) {
    let mut group = c.benchmark_group("plain_sequence");
    let rt = runtime();

    for size in [100i64, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("collect", size), size, |b, &size| {
            b.iter(|| {
                rt.block_on(async {
                    let seq = from_iter(0..size);
                    black_box(collect(seq).await.unwrap());
                })
            });
        });

        group.bench_with_input(BenchmarkId::new("map", size), size, |b, &size| {
            b.iter(|| {
                rt.block_on(async {
                    let seq = from_iter(0..size).map(|x: i64| Ok(black_box(x * 2)));
                    black_box(collect(seq).await.unwrap());
                })
            });
        });
    }

    group.finish();
}

fn bench_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer");
    let rt = runtime();

    for capacity in [1, 16, 256].iter() {
        group.throughput(Throughput::Elements(10000));
        group.bench_with_input(
            BenchmarkId::new("capacity", capacity),
            capacity,
            |b, &capacity| {
                b.iter(|| {
                    rt.block_on(async {
                        let seq = from_iter(0..10000i64).buffer(capacity);
                        black_box(collect(seq).await.unwrap());
                    })
                });
            },
        );
    }

    group.finish();
}

fn bench_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel");
    let rt = runtime();

    for workers in [1, 2, 4, 8].iter() {
        group.bench_with_input(
            BenchmarkId::new("async_map", workers),
            workers,
            |b, &workers| {
                b.iter(|| {
                    rt.block_on(async {
                        let seq = from_iter(0..200u64)
                            .then(|x| async move {
                                tokio::task::yield_now().await;
                                Ok(black_box(x + 1))
                            })
                            .parallel(workers);
                        black_box(count(seq).await);
                    })
                });
            },
        );
    }

    group.finish();
}

fn bench_concat_and_zip(c: &mut Criterion) {
    let mut group = c.benchmark_group("combinators");
    let rt = runtime();

    group.bench_function("concat_four_parts", |b| {
        b.iter(|| {
            rt.block_on(async {
                let parts = (0..4).map(|i| from_iter(i * 2500..(i + 1) * 2500));
                black_box(count(concat(parts)).await);
            })
        });
    });

    group.bench_function("split_then_zip", |b| {
        b.iter(|| {
            rt.block_on(async {
                let (left, right) = from_iter(0..5000i64).split();
                black_box(count(left.zip(right)).await);
            })
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_plain_sequence,
    bench_buffer,
    bench_parallel,
    bench_concat_and_zip
);
criterion_main!(benches);
