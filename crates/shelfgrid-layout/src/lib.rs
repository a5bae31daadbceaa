#![forbid(unsafe_code)]

//! Layout primitives and solvers for the shelf grid.
//!
//! - [`mapper`]: stateless cell ⇄ pixel conversion.
//! - [`placement`]: the item → cell mapping and its conflict checks.
//! - [`store`]: the committed layout and grid capacity.
//! - [`push`]: chain-displacement resolver used while dragging.
//! - [`snapshot`]: the authoritative snapshot schema consumed on load.
//! - [`packing`]: auto-placement of new items and group-aware rebuilds.
//!
//! Everything here is synchronous and free of I/O; the interaction layer in
//! `shelfgrid-runtime` decides when a result is previewed or committed.

pub mod mapper;
pub mod packing;
pub mod placement;
pub mod push;
pub mod snapshot;
pub mod store;

pub use mapper::{GridMetrics, GridSize};
pub use packing::{PackedLayout, Placed, first_free_cell, pack_groups, place_new_item};
pub use placement::{CellConflict, Placement, PlacementRecord};
pub use push::{
    Displacement, HorizontalBias, PushBlocked, PushRequest, PushResolution, VacatedCell,
    resolve_push,
};
pub use shelfgrid_core::{Cell, ItemId, PixelPoint, PixelRect};
pub use snapshot::{SHELF_SCHEMA_VERSION, ShelfSnapshot, SnapshotError, SnapshotItem};
pub use store::{LayoutError, LayoutStore};
