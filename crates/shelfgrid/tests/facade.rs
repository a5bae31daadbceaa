//! Facade smoke tests: a host built only on `shelfgrid::prelude`.

use shelfgrid::prelude::*;
use shelfgrid::{DropOutcome, LayoutError, SurfaceError};

const SNAPSHOT: &str = r#"{
    "schemaVersion": 1,
    "rowCount": 2,
    "colsPerShelf": 3,
    "items": [
        { "id": "dune", "row": 0, "col": 0, "title": "Dune" },
        { "id": "emma", "row": 0, "col": 1 },
        { "id": "ulysses", "row": 1, "col": 2 }
    ]
}"#;

fn surface() -> Result<ShelfSurface> {
    let snapshot = ShelfSnapshot::from_json_str(SNAPSHOT)?;
    let store = LayoutStore::from_snapshot(&snapshot)?;
    let mut config = ShelfConfig::default();
    config.sync.debounce_ms = 60_000;
    Ok(ShelfSurface::new(config, store, MemorySink::new())?)
}

fn center(surface: &ShelfSurface, cell: Cell) -> PixelPoint {
    let r = surface.config().metrics.item_rect(cell);
    PixelPoint::new(r.x + r.width / 2.0, r.y + r.height / 2.0)
}

#[test]
fn drag_through_the_prelude() -> Result<()> {
    let mut surface = surface()?;
    let from = center(&surface, Cell::new(0, 0));
    let to = center(&surface, Cell::new(0, 1));

    surface.handle(PointerEvent::down(from.x, from.y));
    surface.handle(PointerEvent::moved(to.x, to.y));
    let effect = surface.handle(PointerEvent::up(to.x, to.y));

    let SurfaceEffect::Dropped(DropOutcome::Committed { to: cell, .. }) = effect else {
        panic!("expected a committed drop, got {effect:?}");
    };
    assert_eq!(cell, Cell::new(0, 1));
    assert_eq!(surface.store().cell_of(&ItemId::from("emma")), Some(Cell::new(0, 2)));
    assert_eq!(
        surface
            .store()
            .display(&ItemId::from("dune"))
            .and_then(|d| d.get("title"))
            .and_then(|v| v.as_str()),
        Some("Dune")
    );
    Ok(())
}

#[test]
fn errors_convert_into_facade_error() {
    let mut surface = surface().unwrap();
    let err: shelfgrid::Error = surface.remove_row().unwrap_err().into();
    assert!(matches!(
        err,
        shelfgrid::Error::Surface(SurfaceError::Layout(LayoutError::RowNotEmpty { row: 1, .. }))
    ));
    assert!(std::error::Error::source(&err).is_some());

    let bad = ShelfSnapshot::from_json_str(r#"{"schemaVersion": 9, "colsPerShelf": 3}"#);
    let err: shelfgrid::Error = bad.unwrap_err().into();
    assert!(matches!(err, shelfgrid::Error::Snapshot(_)));
}

#[test]
fn snapshot_round_trips_through_store() -> Result<()> {
    let surface = surface()?;
    let json = serde_json::to_string(&surface.store().snapshot()).unwrap();
    let reparsed = ShelfSnapshot::from_json_str(&json)?;
    assert_eq!(LayoutStore::from_snapshot(&reparsed)?.placement(), surface.placement());
    Ok(())
}
