//! Benchmarks for the push resolver and auto-placement.
//!
//! Run with: cargo bench -p shelfgrid-layout

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::Map;
use shelfgrid_layout::{
    Cell, GridMetrics, GridSize, HorizontalBias, ItemId, LayoutStore, Placement, PixelPoint,
    PushRequest, ShelfSnapshot, SnapshotItem, VacatedCell, first_free_cell, pack_groups,
    place_new_item, resolve_push,
};
use std::hint::black_box;

/// `rows × cols` grid with every cell but the last one of each row filled.
fn make_shelf(rows: u16, cols: u16) -> Placement {
    (0..rows)
        .flat_map(|row| (0..cols.saturating_sub(1)).map(move |col| Cell::new(row, col)))
        .map(|cell| (ItemId::new(format!("r{}c{}", cell.row, cell.col)), cell))
        .collect()
}

fn bench_resolve_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("push/resolve");
    let mover = ItemId::from("mover");

    for cols in [8u16, 32, 128, 512] {
        let placement = make_shelf(4, cols);
        let left_blocked = PushRequest::new(&mover, Cell::new(1, 0), HorizontalBias::Left, cols)
            .with_origin(Cell::new(3, cols - 1), VacatedCell::Pinned);
        group.bench_with_input(
            BenchmarkId::new("full_chain_with_fallback", cols),
            &placement,
            |b, placement| b.iter(|| black_box(resolve_push(placement, &left_blocked))),
        );

        let free = PushRequest::new(&mover, Cell::new(1, cols - 1), HorizontalBias::Right, cols);
        group.bench_with_input(
            BenchmarkId::new("free_target", cols),
            &placement,
            |b, placement| b.iter(|| black_box(resolve_push(placement, &free))),
        );
    }

    group.finish();
}

fn bench_drop_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("push/drop_commit");

    for cols in [8u16, 64] {
        let snapshot = make_shelf(8, cols)
            .iter()
            .fold(ShelfSnapshot::new(8, cols), |snap, (id, cell)| {
                snap.with_item(SnapshotItem::new(id.clone(), cell))
            });
        let store = LayoutStore::from_snapshot(&snapshot).expect("bench snapshot is valid");
        let mover = ItemId::new("r0c0");

        group.bench_function(BenchmarkId::new("resolve_and_commit", cols), |b| {
            b.iter_batched(
                || store.clone(),
                |mut store| {
                    let request =
                        PushRequest::new(&mover, Cell::new(4, 0), HorizontalBias::Right, cols)
                            .with_origin(Cell::new(0, 0), VacatedCell::Pinned);
                    let resolution = resolve_push(store.placement(), &request)
                        .expect("row 4 has a free cell");
                    black_box(store.commit(resolution.into_placement()))
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_mapper(c: &mut Criterion) {
    let metrics = GridMetrics::default();
    let size = GridSize::new(20, 40);
    c.bench_function("mapper/to_grid", |b| {
        b.iter(|| black_box(metrics.to_grid(black_box(PixelPoint::new(1234.5, 987.25)), size)))
    });
}

fn bench_placement(c: &mut Criterion) {
    let mut group = c.benchmark_group("packing");

    for cols in [16u16, 64] {
        let placement = make_shelf(16, cols);
        let size = GridSize::new(16, cols);
        group.bench_with_input(
            BenchmarkId::new("first_free_cell", cols),
            &placement,
            |b, placement| b.iter(|| black_box(first_free_cell(placement, size))),
        );
    }

    let groups: Vec<Vec<ItemId>> = (0..64)
        .map(|g| (0..(g % 7 + 1)).map(|i| ItemId::new(format!("g{g}-{i}"))).collect())
        .collect();
    group.bench_function("pack_groups", |b| {
        b.iter(|| black_box(pack_groups(&groups, 12)))
    });

    let empty = LayoutStore::new(16).expect("non-zero capacity");
    group.bench_function("place_new_item_x64", |b| {
        b.iter_batched(
            || empty.clone(),
            |mut store| {
                for i in 0..64 {
                    let _ = place_new_item(&mut store, ItemId::new(format!("n{i}")), Map::new());
                }
                black_box(store.generation())
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_resolve_push,
    bench_drop_commit,
    bench_mapper,
    bench_placement,
);

criterion_main!(benches);
