use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use taxis_core::{
    Backend, GroupKey, ItemId, MemoryBackend, NewItem, OrderedItemStore, SqliteBackend,
};

const GROUP: GroupKey = 1;
const SIZES: [usize; 3] = [10, 100, 1_000];

fn seed<B: Backend>(backend: B, size: usize) -> (OrderedItemStore<B>, Vec<ItemId>)
where
    B::Error: std::fmt::Debug,
{
    let mut store = OrderedItemStore::new(backend);
    let ids = (0..size)
        .map(|n| {
            store
                .insert(&NewItem::new(1, format!("item-{n}"), ""), GROUP)
                .expect("seed insert")
        })
        .collect();
    (store, ids)
}

/// Walk the first item to the end of the group and back again.
fn round_trip<B: Backend>(store: &mut OrderedItemStore<B>, id: ItemId, steps: usize)
where
    B::Error: std::fmt::Debug,
{
    for _ in 0..steps {
        black_box(store.move_up(id, GROUP).expect("move up"));
    }
    for _ in 0..steps {
        black_box(store.move_down(id, GROUP).expect("move down"));
    }
}

fn bench_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("moves.round_trip");

    for size in SIZES {
        let steps = size - 1;
        group.throughput(Throughput::Elements((steps * 2) as u64));

        let (mut memory, ids) = seed(MemoryBackend::new(), size);
        group.bench_with_input(BenchmarkId::new("memory", size), &ids[0], |b, id| {
            b.iter(|| round_trip(&mut memory, *id, steps));
        });

        let (mut sqlite, ids) = seed(
            SqliteBackend::open_in_memory().expect("open in-memory store"),
            size,
        );
        group.bench_with_input(BenchmarkId::new("sqlite", size), &ids[0], |b, id| {
            b.iter(|| round_trip(&mut sqlite, *id, steps));
        });
    }

    group.finish();
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("insert.sqlite_append", |b| {
        let mut store =
            OrderedItemStore::new(SqliteBackend::open_in_memory().expect("open in-memory store"));
        b.iter(|| {
            black_box(
                store
                    .insert(&NewItem::new(1, "append", ""), GROUP)
                    .expect("insert"),
            )
        });
    });
}

criterion_group!(benches, bench_moves, bench_insert);
criterion_main!(benches);
