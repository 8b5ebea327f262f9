use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use catalog_infra::{InMemoryProductStore, ProductStore, SqliteProductStore, StoreConfig};
use catalog_products::ProductDetails;
use tokio::runtime::Runtime;

fn details(i: u32) -> ProductDetails {
    let category = if i % 2 == 0 { "tools" } else { "electronics" };
    ProductDetails::new(format!("product-{i}"), f64::from(i) * 1.5, u64::from(i), category)
}

async fn seed<S: ProductStore>(store: &S, n: u32) {
    for i in 0..n {
        let id = store.create(details(i)).await.unwrap();
        if i % 10 == 0 {
            store.soft_delete(id).await.unwrap();
        }
    }
}

fn bench_create(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let sqlite = rt
        .block_on(SqliteProductStore::connect(&StoreConfig::sqlite_file(
            dir.path().join("bench.sqlite3"),
        )))
        .unwrap();
    let memory = InMemoryProductStore::new();

    let mut group = c.benchmark_group("create");
    group.throughput(Throughput::Elements(1));
    group.bench_function("in_memory", |b| {
        b.iter(|| rt.block_on(memory.create(black_box(details(1)))).unwrap())
    });
    group.bench_function("sqlite", |b| {
        b.iter(|| rt.block_on(sqlite.create(black_box(details(1)))).unwrap())
    });
    group.finish();
}

fn bench_lists(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("list");

    for size in [100u32, 1_000] {
        let dir = tempfile::tempdir().unwrap();
        let sqlite = rt
            .block_on(SqliteProductStore::connect(&StoreConfig::sqlite_file(
                dir.path().join("bench.sqlite3"),
            )))
            .unwrap();
        let memory = InMemoryProductStore::new();
        rt.block_on(seed(&sqlite, size));
        rt.block_on(seed(&memory, size));

        group.throughput(Throughput::Elements(u64::from(size)));
        group.bench_with_input(BenchmarkId::new("active/in_memory", size), &size, |b, _| {
            b.iter(|| rt.block_on(memory.list_active()).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("active/sqlite", size), &size, |b, _| {
            b.iter(|| rt.block_on(sqlite.list_active()).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("category/sqlite", size), &size, |b, _| {
            b.iter(|| rt.block_on(sqlite.list_by_category(black_box("tools"))).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("deleted/sqlite", size), &size, |b, _| {
            b.iter(|| rt.block_on(sqlite.list_deleted()).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_create, bench_lists);
criterion_main!(benches);
