#![no_main]

use libfuzzer_sys::fuzz_target;
use shelfgrid_core::PointerEvent;
use shelfgrid_layout::{Cell, LayoutStore, ShelfSnapshot, SnapshotItem};
use shelfgrid_runtime::{MemorySink, ShelfConfig, ShelfSurface};

fuzz_target!(|data: &[u8]| {
    // Header: cols (1..=8), rows (1..=4), item count.
    if data.len() < 3 {
        return;
    }
    let cols = u16::from(data[0] % 8) + 1;
    let rows = u16::from(data[1] % 4) + 1;
    let capacity = cols * rows;
    let count = u16::from(data[2]) % (capacity + 1);

    let snapshot = (0..count).fold(ShelfSnapshot::new(rows, cols), |s, i| {
        s.with_item(SnapshotItem::new(format!("i{i}"), Cell::new(i / cols, i % cols)))
    });
    let Ok(store) = LayoutStore::from_snapshot(&snapshot) else {
        return;
    };
    let mut config = ShelfConfig::default();
    config.sync.debounce_ms = 60_000;
    let Ok(mut surface) = ShelfSurface::new(config, store, MemorySink::new()) else {
        return;
    };

    // Each 3-byte chunk is one pointer event: kind, x, y (scaled onto the shelf).
    for chunk in data[3..].chunks_exact(3) {
        let x = f64::from(chunk[1]) * 3.0 - 20.0;
        let y = f64::from(chunk[2]) * 3.0 - 20.0;
        let event = match chunk[0] % 5 {
            0 => PointerEvent::down(x, y),
            1 | 2 => PointerEvent::moved(x, y),
            3 => PointerEvent::up(x, y),
            _ => PointerEvent::cancel(x, y),
        };
        surface.handle(event);

        let store = surface.store();
        assert!(store.placement().is_conflict_free(), "overlap after {event:?}");
        assert_eq!(store.placement().len(), usize::from(count), "item count changed");
        for (id, cell) in store.placement().iter() {
            assert!(store.size().contains(cell), "{id} out of bounds at {cell}");
        }
    }
    surface.teardown();
});
