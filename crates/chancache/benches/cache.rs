use chancache::{ChanCache, Thread};
use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tempfile::TempDir;

fn thread(no: i64, last_fetched: i64) -> Thread {
    Thread {
        board: "g".into(),
        no,
        created: Utc::now(),
        last_fetched,
        ..Default::default()
    }
}

fn bench_cached_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached_read");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("read_thread_cached", |b| {
        let dir = TempDir::new().unwrap();
        let cache = ChanCache::open(dir.path()).unwrap();

        for no in 1..=100 {
            cache.write_thread(thread(no, 1)).unwrap();
        }

        let mut counter = 0i64;
        b.iter(|| {
            black_box(cache.read_thread("g", counter % 100 + 1).unwrap());
            counter += 1;
        });
    });

    group.finish();
}

fn bench_mixed_50_50(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("50_read_50_write_cached", |b| {
        let dir = TempDir::new().unwrap();
        let cache = ChanCache::open(dir.path()).unwrap();

        for no in 1..=100 {
            cache.write_thread(thread(no, 1)).unwrap();
        }

        let mut counter = 0i64;
        b.iter(|| {
            let no = counter % 100 + 1;
            if counter % 2 == 0 {
                black_box(cache.read_thread("g", no).ok());
            } else {
                black_box(cache.write_thread(thread(no, counter)).ok());
            }
            counter += 1;
        });
    });

    group.finish();
}

fn bench_cache_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_miss");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("read_thread_evicted", |b| {
        let dir = TempDir::new().unwrap();
        let cache = ChanCache::open(dir.path()).unwrap();

        // More threads than the tier holds
        for no in 1..=300 {
            cache.write_thread(thread(no, 1)).unwrap();
        }

        let mut counter = 0i64;
        b.iter(|| {
            // Sequential scan over 300 keys with 100 slots always misses
            black_box(cache.read_thread("g", counter % 300 + 1).unwrap());
            counter += 1;
        });
    });

    group.finish();
}

criterion_group!(benches, bench_cached_read, bench_mixed_50_50, bench_cache_miss);
criterion_main!(benches);
