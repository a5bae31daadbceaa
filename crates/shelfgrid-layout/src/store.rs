#![forbid(unsafe_code)]

//! Committed layout and grid capacity.
//!
//! [`LayoutStore`] is the single owner of the committed [`Placement`]. Every
//! mutation is all-or-nothing: a rejected operation leaves placement, row
//! count, capacity, and generation exactly as they were. After any successful
//! mutation the placement is conflict-free and every item lies inside
//! `row_count × cols_per_shelf`.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};
use shelfgrid_core::{Cell, ItemId};

use crate::mapper::GridSize;
use crate::placement::{CellConflict, Placement, PlacementRecord};
use crate::snapshot::{ShelfSnapshot, SnapshotError, SnapshotItem};

/// Errors from layout mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The last row still holds items.
    RowNotEmpty { row: u16, occupants: Vec<ItemId> },
    /// A shelf always keeps at least one row.
    LastRow,
    /// Column capacity must be at least 1.
    InvalidCapacity { requested: u16 },
    /// Shrinking capacity would strand these items.
    ColumnOccupied {
        cols_per_shelf: u16,
        occupants: Vec<ItemId>,
    },
    /// Two items claim the same cell.
    CellConflict(CellConflict),
    /// An item lies outside the grid.
    OutOfBounds {
        id: ItemId,
        cell: Cell,
        size: GridSize,
    },
    /// Row count is already at its maximum.
    TooManyRows,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RowNotEmpty { row, occupants } => write!(
                f,
                "row {row} still holds {} item(s); move them before removing the row",
                occupants.len()
            ),
            Self::LastRow => write!(f, "cannot remove the only remaining row"),
            Self::InvalidCapacity { requested } => {
                write!(f, "columns per shelf must be at least 1 (got {requested})")
            }
            Self::ColumnOccupied {
                cols_per_shelf,
                occupants,
            } => write!(
                f,
                "cannot shrink to {cols_per_shelf} column(s): {} item(s) sit beyond it",
                occupants.len()
            ),
            Self::CellConflict(c) => write!(
                f,
                "items '{}' and '{}' both occupy cell {}",
                c.first, c.second, c.cell
            ),
            Self::OutOfBounds { id, cell, size } => write!(
                f,
                "item '{id}' at {cell} lies outside the {}x{} grid",
                size.rows, size.cols
            ),
            Self::TooManyRows => write!(f, "row count is at its maximum"),
        }
    }
}

impl std::error::Error for LayoutError {}

impl From<CellConflict> for LayoutError {
    fn from(conflict: CellConflict) -> Self {
        Self::CellConflict(conflict)
    }
}

/// Committed placement, display metadata, and grid dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutStore {
    placement: Placement,
    display: BTreeMap<ItemId, Map<String, Value>>,
    cols_per_shelf: u16,
    row_count: u16,
    generation: u64,
}

impl LayoutStore {
    /// Empty one-row store.
    pub fn new(cols_per_shelf: u16) -> Result<Self, LayoutError> {
        if cols_per_shelf == 0 {
            return Err(LayoutError::InvalidCapacity { requested: 0 });
        }
        Ok(Self {
            placement: Placement::new(),
            display: BTreeMap::new(),
            cols_per_shelf,
            row_count: 1,
            generation: 0,
        })
    }

    /// Store initialized from a validated snapshot.
    pub fn from_snapshot(snapshot: &ShelfSnapshot) -> Result<Self, SnapshotError> {
        snapshot.validate()?;
        let mut store = Self {
            placement: Placement::new(),
            display: BTreeMap::new(),
            cols_per_shelf: snapshot.cols_per_shelf,
            row_count: 1,
            generation: 0,
        };
        store.apply_snapshot(snapshot);
        Ok(store)
    }

    /// Replace the whole store with `snapshot`.
    ///
    /// Nothing is merged: items absent from the snapshot disappear. The row
    /// count grows to fit the highest occupied row.
    pub fn load(&mut self, snapshot: &ShelfSnapshot) -> Result<(), SnapshotError> {
        snapshot.validate()?;
        self.apply_snapshot(snapshot);
        self.generation += 1;
        Ok(())
    }

    fn apply_snapshot(&mut self, snapshot: &ShelfSnapshot) {
        self.placement = snapshot.placement();
        self.display = snapshot
            .items
            .iter()
            .map(|item| (item.id.clone(), item.display.clone()))
            .collect();
        self.cols_per_shelf = snapshot.cols_per_shelf;
        self.row_count = snapshot.required_rows();
    }

    /// Atomically replace the placement, returning the new generation.
    ///
    /// Rejected with [`LayoutError::CellConflict`] or
    /// [`LayoutError::OutOfBounds`]; the store is unchanged on error.
    pub fn commit(&mut self, placement: Placement) -> Result<u64, LayoutError> {
        self.check(&placement, self.size())?;
        self.display.retain(|id, _| placement.contains(id));
        self.placement = placement;
        self.generation += 1;
        Ok(self.generation)
    }

    /// Replace placement and row count together (rebuilds).
    pub fn replace(&mut self, placement: Placement, rows: u16) -> Result<u64, LayoutError> {
        let size = GridSize::new(rows.max(1), self.cols_per_shelf);
        self.check(&placement, size)?;
        self.display.retain(|id, _| placement.contains(id));
        self.placement = placement;
        self.row_count = size.rows;
        self.generation += 1;
        Ok(self.generation)
    }

    /// Place a single new item on a free in-bounds cell.
    pub fn insert_item(
        &mut self,
        id: ItemId,
        cell: Cell,
        display: Map<String, Value>,
    ) -> Result<u64, LayoutError> {
        let mut next = self.placement.clone();
        next.remove(&id);
        next.insert(id.clone(), cell);
        self.commit(next)?;
        self.display.insert(id, display);
        Ok(self.generation)
    }

    /// Append a row and place `id` at its column 0 in one step.
    ///
    /// Returns the new cell. The generation advances once; on error nothing
    /// changes.
    pub fn insert_item_in_new_row(
        &mut self,
        id: ItemId,
        display: Map<String, Value>,
    ) -> Result<Cell, LayoutError> {
        let rows = self
            .row_count
            .checked_add(1)
            .ok_or(LayoutError::TooManyRows)?;
        let cell = Cell::new(self.row_count, 0);
        let mut next = self.placement.clone();
        next.remove(&id);
        next.insert(id.clone(), cell);
        self.replace(next, rows)?;
        self.display.insert(id, display);
        Ok(cell)
    }

    fn check(&self, placement: &Placement, size: GridSize) -> Result<(), LayoutError> {
        if let Some((id, cell)) = placement.iter().find(|(_, cell)| !size.contains(*cell)) {
            return Err(LayoutError::OutOfBounds {
                id: id.clone(),
                cell,
                size,
            });
        }
        if let Some(conflict) = placement.conflicts().into_iter().next() {
            return Err(conflict.into());
        }
        Ok(())
    }

    /// Append an empty row, returning the new row count.
    pub fn add_row(&mut self) -> Result<u16, LayoutError> {
        self.row_count = self
            .row_count
            .checked_add(1)
            .ok_or(LayoutError::TooManyRows)?;
        self.generation += 1;
        Ok(self.row_count)
    }

    /// Remove the last row, returning the new row count.
    pub fn remove_row(&mut self) -> Result<u16, LayoutError> {
        if self.row_count <= 1 {
            return Err(LayoutError::LastRow);
        }
        let last = self.row_count - 1;
        let occupants = self.row_occupants(last);
        if !occupants.is_empty() {
            return Err(LayoutError::RowNotEmpty {
                row: last,
                occupants,
            });
        }
        self.row_count = last;
        self.generation += 1;
        Ok(self.row_count)
    }

    /// Change column capacity.
    ///
    /// Shrinking is rejected while any item sits at a column `>= n`.
    pub fn set_columns_per_shelf(&mut self, n: u16) -> Result<(), LayoutError> {
        if n == 0 {
            return Err(LayoutError::InvalidCapacity { requested: n });
        }
        let occupants: Vec<ItemId> = self
            .placement
            .iter()
            .filter(|(_, cell)| cell.col >= n)
            .map(|(id, _)| id.clone())
            .collect();
        if !occupants.is_empty() {
            return Err(LayoutError::ColumnOccupied {
                cols_per_shelf: n,
                occupants,
            });
        }
        if n != self.cols_per_shelf {
            self.cols_per_shelf = n;
            self.generation += 1;
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    #[inline]
    #[must_use]
    pub fn cell_of(&self, id: &ItemId) -> Option<Cell> {
        self.placement.get(id)
    }

    #[inline]
    #[must_use]
    pub fn item_at(&self, cell: Cell) -> Option<&ItemId> {
        self.placement.occupant(cell)
    }

    /// Ids in `row`, ordered by column.
    #[must_use]
    pub fn row_occupants(&self, row: u16) -> Vec<ItemId> {
        self.placement
            .row_items(row)
            .into_iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Committed placement as sorted wire records.
    #[must_use]
    pub fn records(&self) -> Vec<PlacementRecord> {
        self.placement.records()
    }

    /// Display metadata carried for `id`.
    #[must_use]
    pub fn display(&self, id: &ItemId) -> Option<&Map<String, Value>> {
        self.display.get(id)
    }

    /// Monotonic counter bumped by every successful mutation.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    #[must_use]
    pub fn cols_per_shelf(&self) -> u16 {
        self.cols_per_shelf
    }

    #[inline]
    #[must_use]
    pub fn row_count(&self) -> u16 {
        self.row_count
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> GridSize {
        GridSize::new(self.row_count, self.cols_per_shelf)
    }

    /// Current state as a snapshot, display metadata included.
    #[must_use]
    pub fn snapshot(&self) -> ShelfSnapshot {
        let mut snapshot = ShelfSnapshot::new(self.row_count, self.cols_per_shelf);
        snapshot.items = self
            .placement
            .iter()
            .map(|(id, cell)| {
                let mut item = SnapshotItem::new(id.clone(), cell);
                if let Some(display) = self.display.get(id) {
                    item.display = display.clone();
                }
                item
            })
            .collect();
        snapshot
    }
}
