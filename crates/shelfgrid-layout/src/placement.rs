#![forbid(unsafe_code)]

//! Item → cell assignment.
//!
//! A [`Placement`] is a plain mapping; it does not enforce the no-overlap
//! invariant on every insert because resolver working copies are allowed to
//! hold transient conflicts. The [`LayoutStore`](crate::store::LayoutStore)
//! checks [`Placement::conflicts`] before anything becomes committed.

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use shelfgrid_core::{Cell, ItemId};

/// Two items claiming the same cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellConflict {
    pub cell: Cell,
    pub first: ItemId,
    pub second: ItemId,
}

/// Wire record sent to the persistence sink: `{ id, row, col }`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub id: ItemId,
    pub row: u16,
    pub col: u16,
}

impl PlacementRecord {
    #[must_use]
    pub fn cell(&self) -> Cell {
        Cell::new(self.row, self.col)
    }
}

/// Mapping from item id to its cell, iterated in id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    cells: BTreeMap<ItemId, Cell>,
}

impl Placement {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of placed items.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell of `id`, if placed.
    #[inline]
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<Cell> {
        self.cells.get(id).copied()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: &ItemId) -> bool {
        self.cells.contains_key(id)
    }

    /// Assign `id` to `cell`, returning its previous cell.
    pub fn insert(&mut self, id: ItemId, cell: Cell) -> Option<Cell> {
        self.cells.insert(id, cell)
    }

    /// Remove `id`, returning its cell.
    pub fn remove(&mut self, id: &ItemId) -> Option<Cell> {
        self.cells.remove(id)
    }

    /// Iterate `(id, cell)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, Cell)> + '_ {
        self.cells.iter().map(|(id, cell)| (id, *cell))
    }

    /// First item (in id order) occupying `cell`.
    #[must_use]
    pub fn occupant(&self, cell: Cell) -> Option<&ItemId> {
        self.cells
            .iter()
            .find_map(|(id, c)| (*c == cell).then_some(id))
    }

    /// Items in `row`, sorted by column.
    #[must_use]
    pub fn row_items(&self, row: u16) -> Vec<(&ItemId, u16)> {
        let mut items: Vec<_> = self
            .cells
            .iter()
            .filter(|(_, c)| c.row == row)
            .map(|(id, c)| (id, c.col))
            .collect();
        items.sort_by_key(|(_, col)| *col);
        items
    }

    /// Highest occupied row, if any item is placed.
    #[must_use]
    pub fn max_row(&self) -> Option<u16> {
        self.cells.values().map(|c| c.row).max()
    }

    /// Every pair of items sharing a cell.
    #[must_use]
    pub fn conflicts(&self) -> Vec<CellConflict> {
        let mut seen: FxHashMap<Cell, &ItemId> = FxHashMap::default();
        let mut conflicts = Vec::new();
        for (id, cell) in &self.cells {
            if let Some(first) = seen.insert(*cell, id) {
                conflicts.push(CellConflict {
                    cell: *cell,
                    first: first.clone(),
                    second: id.clone(),
                });
            }
        }
        conflicts
    }

    /// Whether no two items share a cell.
    #[must_use]
    pub fn is_conflict_free(&self) -> bool {
        let mut seen: FxHashSet<Cell> = FxHashSet::default();
        self.cells.values().all(|cell| seen.insert(*cell))
    }

    /// Sorted wire records.
    #[must_use]
    pub fn records(&self) -> Vec<PlacementRecord> {
        self.cells
            .iter()
            .map(|(id, cell)| PlacementRecord {
                id: id.clone(),
                row: cell.row,
                col: cell.col,
            })
            .collect()
    }
}

impl FromIterator<(ItemId, Cell)> for Placement {
    fn from_iter<T: IntoIterator<Item = (ItemId, Cell)>>(iter: T) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Placement {
    type Item = (&'a ItemId, &'a Cell);
    type IntoIter = std::collections::btree_map::Iter<'a, ItemId, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ItemId {
        ItemId::from(s)
    }

    #[test]
    fn occupant_and_row_items() {
        let p: Placement = [
            (id("b"), Cell::new(0, 3)),
            (id("a"), Cell::new(0, 1)),
            (id("c"), Cell::new(1, 0)),
        ]
        .into_iter()
        .collect();
        assert_eq!(p.occupant(Cell::new(0, 3)), Some(&id("b")));
        assert_eq!(p.occupant(Cell::new(0, 2)), None);
        let row0: Vec<_> = p.row_items(0).into_iter().map(|(i, c)| (i.clone(), c)).collect();
        assert_eq!(row0, vec![(id("a"), 1), (id("b"), 3)]);
        assert_eq!(p.max_row(), Some(1));
    }

    #[test]
    fn conflicts_reported_pairwise() {
        let mut p = Placement::new();
        p.insert(id("a"), Cell::new(0, 0));
        p.insert(id("b"), Cell::new(0, 0));
        p.insert(id("c"), Cell::new(0, 1));
        assert!(!p.is_conflict_free());
        let conflicts = p.conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].cell, Cell::new(0, 0));
        assert_eq!(conflicts[0].first, id("a"));
        assert_eq!(conflicts[0].second, id("b"));

        p.insert(id("b"), Cell::new(0, 2));
        assert!(p.is_conflict_free());
        assert!(p.conflicts().is_empty());
    }

    #[test]
    fn records_sorted_by_id() {
        let p: Placement = [(id("z"), Cell::new(1, 1)), (id("m"), Cell::new(0, 2))]
            .into_iter()
            .collect();
        let records = p.records();
        assert_eq!(records[0].id, id("m"));
        assert_eq!(records[0].cell(), Cell::new(0, 2));
        assert_eq!(records[1].id, id("z"));
    }

    #[test]
    fn record_json_shape() {
        let record = PlacementRecord {
            id: id("x1"),
            row: 2,
            col: 4,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"id": "x1", "row": 2, "col": 4}));
    }
}
