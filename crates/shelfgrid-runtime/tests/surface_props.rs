//! Property tests: arbitrary pointer traffic never corrupts the layout.

use proptest::prelude::*;
use serde_json::Map;
use shelfgrid_core::PointerEvent;
use shelfgrid_layout::{Cell, ItemId, LayoutStore, ShelfSnapshot, SnapshotItem, VacatedCell};
use shelfgrid_runtime::{MemorySink, ShelfConfig, ShelfSurface, SurfaceEffect};

#[derive(Debug, Clone)]
enum Step {
    Down { x: f64, y: f64, pointer: u32 },
    Move { x: f64, y: f64, pointer: u32 },
    Up { x: f64, y: f64, pointer: u32 },
    Cancel,
    AddRow,
    RemoveRow,
    Place,
}

fn coord() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => -50.0f64..700.0,
        1 => Just(f64::NAN),
        1 => Just(-1.0e9),
    ]
}

fn pointer() -> impl Strategy<Value = u32> {
    prop_oneof![9 => Just(0u32), 1 => Just(1u32)]
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (coord(), coord(), pointer()).prop_map(|(x, y, pointer)| Step::Down { x, y, pointer }),
        6 => (coord(), coord(), pointer()).prop_map(|(x, y, pointer)| Step::Move { x, y, pointer }),
        3 => (coord(), coord(), pointer()).prop_map(|(x, y, pointer)| Step::Up { x, y, pointer }),
        1 => Just(Step::Cancel),
        1 => Just(Step::AddRow),
        1 => Just(Step::RemoveRow),
        1 => Just(Step::Place),
    ]
}

fn surface(vacated: VacatedCell) -> ShelfSurface {
    let snap = (0u16..7).fold(ShelfSnapshot::new(3, 4), |s, i| {
        s.with_item(SnapshotItem::new(format!("item-{i}"), Cell::new(i / 4, i % 4)))
    });
    let mut config = ShelfConfig::default();
    config.sync.debounce_ms = 60_000;
    config.interaction.vacated_cell = vacated;
    let store = LayoutStore::from_snapshot(&snap).unwrap();
    ShelfSurface::new(config, store, MemorySink::new()).unwrap()
}

fn assert_consistent(surface: &ShelfSurface) {
    let store = surface.store();
    let size = store.size();
    assert!(store.placement().is_conflict_free());
    for (id, cell) in store.placement().iter() {
        assert!(size.contains(cell), "{id} at {cell} outside {size:?}");
    }
}

fn vacated() -> impl Strategy<Value = VacatedCell> {
    prop_oneof![Just(VacatedCell::Pinned), Just(VacatedCell::Reusable)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn pointer_traffic_keeps_layout_valid(
        vacated in vacated(),
        steps in prop::collection::vec(step(), 1..60),
    ) {
        let mut surface = surface(vacated);
        let initial = surface.placement().len();
        let mut placed = 0usize;

        for (n, step) in steps.into_iter().enumerate() {
            match step {
                Step::Down { x, y, pointer } => {
                    surface.handle(PointerEvent::down(x, y).with_pointer_id(pointer));
                }
                Step::Move { x, y, pointer } => {
                    surface.handle(PointerEvent::moved(x, y).with_pointer_id(pointer));
                }
                Step::Up { x, y, pointer } => {
                    let effect = surface.handle(PointerEvent::up(x, y).with_pointer_id(pointer));
                    if let SurfaceEffect::Dropped(outcome) = effect {
                        prop_assert!(surface.placement().contains(outcome.item()));
                    }
                }
                Step::Cancel => {
                    surface.cancel_gesture();
                }
                Step::AddRow => {
                    let _ = surface.add_row();
                }
                Step::RemoveRow => {
                    let _ = surface.remove_row();
                }
                Step::Place => {
                    if surface.place_item(ItemId::new(format!("new-{n}")), Map::new()).is_ok() {
                        placed += 1;
                    }
                }
            }
            assert_consistent(&surface);
            prop_assert!(surface.store().row_count() >= 1);
        }

        prop_assert_eq!(surface.placement().len(), initial + placed);
    }

    #[test]
    fn canceled_drag_leaves_store_untouched(
        from in 0u16..7,
        moves in prop::collection::vec((coord(), coord()), 0..10),
    ) {
        let mut surface = surface(VacatedCell::Pinned);
        let before = surface.store().clone();
        let rect = surface.config().metrics.item_rect(Cell::new(from / 4, from % 4));
        surface.handle(PointerEvent::down(rect.x + 1.0, rect.y + 1.0));
        prop_assert!(surface.gesture().is_dragging());
        for (x, y) in moves {
            surface.handle(PointerEvent::moved(x, y));
        }
        surface.cancel_gesture();
        prop_assert_eq!(surface.store(), &before);
    }
}
