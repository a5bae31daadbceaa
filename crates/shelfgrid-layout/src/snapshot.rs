#![forbid(unsafe_code)]

//! Authoritative snapshot schema.
//!
//! A snapshot is the full shelf state as delivered by the snapshot source:
//!
//! ```json
//! {
//!   "rowCount": 2,
//!   "colsPerShelf": 5,
//!   "items": [
//!     { "id": "b-17", "row": 0, "col": 3, "title": "Dune", "cover": "..." }
//!   ]
//! }
//! ```
//!
//! Item fields other than `id`, `row`, and `col` are display metadata. They
//! are kept in [`SnapshotItem::display`] and carried through untouched.
//! Legacy payloads using `x`/`y` for row/column are accepted.

use std::collections::BTreeSet;
use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shelfgrid_core::{Cell, ItemId};

use crate::placement::Placement;

/// Current snapshot schema version.
pub const SHELF_SCHEMA_VERSION: u16 = 1;

fn default_schema_version() -> u16 {
    SHELF_SCHEMA_VERSION
}

fn default_row_count() -> u16 {
    1
}

/// One shelved item in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotItem {
    pub id: ItemId,
    #[serde(alias = "x")]
    pub row: u16,
    #[serde(alias = "y")]
    pub col: u16,
    /// Opaque display fields.
    #[serde(flatten)]
    pub display: Map<String, Value>,
}

impl SnapshotItem {
    /// Item without display metadata.
    #[must_use]
    pub fn new(id: impl Into<ItemId>, cell: Cell) -> Self {
        Self {
            id: id.into(),
            row: cell.row,
            col: cell.col,
            display: Map::new(),
        }
    }

    /// Attach one display field.
    #[must_use]
    pub fn with_display(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.display.insert(key.into(), value.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn cell(&self) -> Cell {
        Cell::new(self.row, self.col)
    }
}

/// Full shelf state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u16,
    /// Declared row count; grown on load to fit the highest occupied row.
    #[serde(default = "default_row_count")]
    pub row_count: u16,
    pub cols_per_shelf: u16,
    #[serde(default)]
    pub items: Vec<SnapshotItem>,
}

impl ShelfSnapshot {
    /// Empty v1 snapshot.
    #[must_use]
    pub fn new(row_count: u16, cols_per_shelf: u16) -> Self {
        Self {
            schema_version: SHELF_SCHEMA_VERSION,
            row_count,
            cols_per_shelf,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_item(mut self, item: SnapshotItem) -> Self {
        self.items.push(item);
        self
    }

    /// Parse and validate a JSON snapshot.
    pub fn from_json_str(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| SnapshotError::Json(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check schema and structural invariants.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.schema_version != SHELF_SCHEMA_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.schema_version,
                expected: SHELF_SCHEMA_VERSION,
            });
        }
        if self.cols_per_shelf == 0 {
            return Err(SnapshotError::ZeroCapacity);
        }

        let mut ids = BTreeSet::new();
        let mut cells: FxHashMap<Cell, &ItemId> = FxHashMap::default();
        for item in &self.items {
            if !ids.insert(&item.id) {
                return Err(SnapshotError::DuplicateItem {
                    id: item.id.clone(),
                });
            }
            if item.col >= self.cols_per_shelf {
                return Err(SnapshotError::ColumnOutOfRange {
                    id: item.id.clone(),
                    col: item.col,
                    cols_per_shelf: self.cols_per_shelf,
                });
            }
            if item.row == u16::MAX {
                return Err(SnapshotError::RowOutOfRange {
                    id: item.id.clone(),
                    row: item.row,
                });
            }
            if let Some(first) = cells.insert(item.cell(), &item.id) {
                return Err(SnapshotError::SharedCell {
                    cell: item.cell(),
                    first: first.clone(),
                    second: item.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Item → cell mapping.
    #[must_use]
    pub fn placement(&self) -> Placement {
        self.items
            .iter()
            .map(|item| (item.id.clone(), item.cell()))
            .collect()
    }

    /// Rows needed to hold every item, never less than the declared count or 1.
    #[must_use]
    pub fn required_rows(&self) -> u16 {
        let occupied = self
            .items
            .iter()
            .map(|item| item.row.saturating_add(1))
            .max()
            .unwrap_or(0);
        self.row_count.max(occupied).max(1)
    }
}

/// Errors from snapshot parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// Schema version is not supported.
    UnsupportedVersion { found: u16, expected: u16 },
    /// `colsPerShelf` is zero.
    ZeroCapacity,
    /// An id appears more than once.
    DuplicateItem { id: ItemId },
    /// Two items claim the same cell.
    SharedCell {
        cell: Cell,
        first: ItemId,
        second: ItemId,
    },
    /// An item sits past the last column.
    ColumnOutOfRange {
        id: ItemId,
        col: u16,
        cols_per_shelf: u16,
    },
    /// An item sits on a row the grid can never grow to.
    RowOutOfRange { id: ItemId, row: u16 },
    /// Malformed JSON.
    Json(String),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, expected } => {
                write!(
                    f,
                    "unsupported shelf schema version {found} (expected {expected})"
                )
            }
            Self::ZeroCapacity => write!(f, "snapshot declares zero columns per shelf"),
            Self::DuplicateItem { id } => write!(f, "item '{id}' appears more than once"),
            Self::SharedCell {
                cell,
                first,
                second,
            } => write!(f, "items '{first}' and '{second}' both occupy cell {cell}"),
            Self::ColumnOutOfRange {
                id,
                col,
                cols_per_shelf,
            } => write!(
                f,
                "item '{id}' at column {col} exceeds shelf capacity {cols_per_shelf}"
            ),
            Self::RowOutOfRange { id, row } => {
                write!(f, "item '{id}' at row {row} is beyond the last possible row")
            }
            Self::Json(msg) => write!(f, "invalid snapshot JSON: {msg}"),
        }
    }
}

impl std::error::Error for SnapshotError {}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "rowCount": 2,
        "colsPerShelf": 5,
        "items": [
            { "id": "a", "row": 0, "col": 0, "title": "Dune" },
            { "id": "b", "row": 3, "col": 4 }
        ]
    }"#;

    #[test]
    fn parses_camel_case_and_keeps_display_fields() {
        let snap = ShelfSnapshot::from_json_str(SAMPLE).unwrap();
        assert_eq!(snap.schema_version, SHELF_SCHEMA_VERSION);
        assert_eq!(snap.cols_per_shelf, 5);
        assert_eq!(snap.items[0].display.get("title"), Some(&Value::from("Dune")));
        assert!(snap.items[1].display.is_empty());
        assert_eq!(snap.required_rows(), 4);
    }

    #[test]
    fn accepts_legacy_xy_fields() {
        let json = r#"{"colsPerShelf": 3, "items": [{"id": "a", "x": 1, "y": 2}]}"#;
        let snap = ShelfSnapshot::from_json_str(json).unwrap();
        assert_eq!(snap.items[0].cell(), Cell::new(1, 2));
        assert_eq!(snap.row_count, 1);
        assert_eq!(snap.required_rows(), 2);
    }

    #[test]
    fn display_fields_survive_serialization() {
        let snap = ShelfSnapshot::new(1, 2)
            .with_item(SnapshotItem::new("a", Cell::new(0, 1)).with_display("color", "red"));
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["items"][0]["color"], "red");
        assert_eq!(json["colsPerShelf"], 2);
    }

    #[test]
    fn rejects_unsupported_version() {
        let mut snap = ShelfSnapshot::new(1, 5);
        snap.schema_version = 9;
        assert_eq!(
            snap.validate(),
            Err(SnapshotError::UnsupportedVersion {
                found: 9,
                expected: 1
            })
        );
    }

    #[test]
    fn rejects_structural_problems() {
        assert_eq!(
            ShelfSnapshot::new(1, 0).validate(),
            Err(SnapshotError::ZeroCapacity)
        );

        let dup = ShelfSnapshot::new(1, 5)
            .with_item(SnapshotItem::new("a", Cell::new(0, 0)))
            .with_item(SnapshotItem::new("a", Cell::new(0, 1)));
        assert!(matches!(dup.validate(), Err(SnapshotError::DuplicateItem { .. })));

        let shared = ShelfSnapshot::new(1, 5)
            .with_item(SnapshotItem::new("a", Cell::new(0, 2)))
            .with_item(SnapshotItem::new("b", Cell::new(0, 2)));
        assert!(matches!(shared.validate(), Err(SnapshotError::SharedCell { .. })));

        let wide = ShelfSnapshot::new(1, 5).with_item(SnapshotItem::new("a", Cell::new(0, 5)));
        assert!(matches!(
            wide.validate(),
            Err(SnapshotError::ColumnOutOfRange { col: 5, .. })
        ));

        let deep = ShelfSnapshot::new(1, 5)
            .with_item(SnapshotItem::new("a", Cell::new(u16::MAX, 0)));
        assert!(matches!(
            deep.validate(),
            Err(SnapshotError::RowOutOfRange { row: u16::MAX, .. })
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = ShelfSnapshot::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, SnapshotError::Json(_)));
        assert!(err.to_string().starts_with("invalid snapshot JSON"));
    }
}
