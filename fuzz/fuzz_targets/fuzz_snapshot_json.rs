#![no_main]

use libfuzzer_sys::fuzz_target;
use shelfgrid_layout::{LayoutStore, ShelfSnapshot};

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(snapshot) = ShelfSnapshot::from_json_str(json) else {
        return;
    };
    // A snapshot that validates must load, and load into a consistent store.
    let store = LayoutStore::from_snapshot(&snapshot).expect("validated snapshot failed to load");
    assert!(store.placement().is_conflict_free());
    assert!(store.row_count() >= 1);
    for (id, cell) in store.placement().iter() {
        assert!(store.size().contains(cell), "{id} out of bounds at {cell}");
    }
    assert_eq!(store.placement().len(), snapshot.items.len());
});
