use chanstoredb::{Board, ChanStore, Post, Thread};
use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tempfile::TempDir;

fn sample_thread(no: i64, posts: usize) -> Thread {
    Thread {
        board: "g".into(),
        no,
        created: Utc::now(),
        posts: (0..posts as i64)
            .map(|i| Post {
                board: "g".into(),
                no: no + i,
                resto: no,
                comment: Some("x".repeat(200)),
                ..Default::default()
            })
            .collect(),
        last_fetched: 1,
        ..Default::default()
    }
}

fn bench_write_thread(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("write_thread_100_posts", |b| {
        let dir = TempDir::new().unwrap();
        let store = ChanStore::open(dir.path()).unwrap();
        let thread = sample_thread(1000, 100);

        b.iter(|| {
            black_box(store.write_thread(&thread).unwrap());
        });
    });
    group.finish();
}

fn bench_read_thread(c: &mut Criterion) {
    let mut group = c.benchmark_group("read");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("read_thread_100_posts", |b| {
        let dir = TempDir::new().unwrap();
        let store = ChanStore::open(dir.path()).unwrap();
        store.write_thread(&sample_thread(1000, 100)).unwrap();

        b.iter(|| {
            black_box(store.read_thread("g", 1000).unwrap());
        });
    });

    group.bench_function("read_board_placeholder", |b| {
        let dir = TempDir::new().unwrap();
        let store = ChanStore::open(dir.path()).unwrap();

        b.iter(|| {
            black_box(store.read_board("g").unwrap());
        });
    });
    group.finish();
}

fn bench_write_board(c: &mut Criterion) {
    let mut group = c.benchmark_group("board");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("write_board_150_threads", |b| {
        let dir = TempDir::new().unwrap();
        let store = ChanStore::open(dir.path()).unwrap();
        let board = Board {
            code: "g".into(),
            name: "Technology".into(),
            threads: (1..=150).map(|no| sample_thread(no, 1)).collect(),
            last_fetched: 1,
            is_placeholder: false,
        };

        b.iter(|| {
            black_box(store.write_board(&board).unwrap());
        });
    });
    group.finish();
}

criterion_group!(benches, bench_write_thread, bench_read_thread, bench_write_board);
criterion_main!(benches);
