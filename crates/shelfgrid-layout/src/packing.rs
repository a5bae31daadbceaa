#![forbid(unsafe_code)]

//! Auto-placement and group-aware packing.
//!
//! New items land on the first free cell in row-major order; a full grid
//! grows by one row. Rebuilds lay out ordered groups left to right, starting
//! a fresh row for a group that does not fit the space left in a partially
//! filled row.

use rustc_hash::FxHashSet;
use serde_json::{Map, Value};
use shelfgrid_core::{Cell, ItemId};

use crate::mapper::GridSize;
use crate::placement::Placement;
use crate::store::{LayoutError, LayoutStore};

/// First unoccupied cell of `size`, scanning row by row.
#[must_use]
pub fn first_free_cell(placement: &Placement, size: GridSize) -> Option<Cell> {
    let used: FxHashSet<Cell> = placement.iter().map(|(_, cell)| cell).collect();
    (0..size.rows)
        .flat_map(|row| (0..size.cols).map(move |col| Cell::new(row, col)))
        .find(|cell| !used.contains(cell))
}

/// Where [`place_new_item`] put an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placed {
    /// Already on the shelf; nothing changed.
    Existing(Cell),
    /// Placed on a free cell.
    Inserted(Cell),
    /// The grid was full; a row was appended.
    AppendedRow(Cell),
}

impl Placed {
    #[must_use]
    pub fn cell(&self) -> Cell {
        match *self {
            Self::Existing(cell) | Self::Inserted(cell) | Self::AppendedRow(cell) => cell,
        }
    }

    /// Whether the store was mutated.
    #[must_use]
    pub fn changed(&self) -> bool {
        !matches!(self, Self::Existing(_))
    }
}

/// Put `id` on the shelf unless it is already there.
///
/// On a full grid a row is appended and the item goes to column 0 of it, as
/// a single store mutation.
pub fn place_new_item(
    store: &mut LayoutStore,
    id: ItemId,
    display: Map<String, Value>,
) -> Result<Placed, LayoutError> {
    if let Some(cell) = store.cell_of(&id) {
        return Ok(Placed::Existing(cell));
    }
    if let Some(cell) = first_free_cell(store.placement(), store.size()) {
        store.insert_item(id, cell, display)?;
        return Ok(Placed::Inserted(cell));
    }
    let cell = store.insert_item_in_new_row(id, display)?;
    Ok(Placed::AppendedRow(cell))
}

/// Result of [`pack_groups`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedLayout {
    pub placement: Placement,
    /// Rows needed to hold the placement (at least 1).
    pub rows: u16,
}

/// Lay out ordered groups of ids on shelves of `cols_per_shelf` columns.
///
/// Ids already seen in an earlier group are skipped. A group that does not
/// fit in the remainder of a non-empty row starts on the next row; a group
/// wider than a whole row wraps wherever the row fills up.
pub fn pack_groups(
    groups: &[Vec<ItemId>],
    cols_per_shelf: u16,
) -> Result<PackedLayout, LayoutError> {
    if cols_per_shelf == 0 {
        return Err(LayoutError::InvalidCapacity { requested: 0 });
    }
    let mut placement = Placement::new();
    let mut seen: FxHashSet<&ItemId> = FxHashSet::default();
    let mut row: u16 = 0;
    let mut col: u16 = 0;

    for group in groups {
        let fresh: Vec<&ItemId> = group.iter().filter(|id| seen.insert(*id)).collect();
        if fresh.is_empty() {
            continue;
        }
        let remaining = usize::from(cols_per_shelf - col);
        if fresh.len() > remaining && col > 0 {
            row = next_row(row)?;
            col = 0;
        }
        for id in fresh {
            if col >= cols_per_shelf {
                row = next_row(row)?;
                col = 0;
            }
            placement.insert(id.clone(), Cell::new(row, col));
            col += 1;
        }
    }

    let rows = placement.max_row().map_or(1, |max| max.saturating_add(1));
    Ok(PackedLayout { placement, rows })
}

fn next_row(row: u16) -> Result<u16, LayoutError> {
    row.checked_add(1).ok_or(LayoutError::TooManyRows)
}
