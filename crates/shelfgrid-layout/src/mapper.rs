#![forbid(unsafe_code)]

//! Grid coordinate mapper.
//!
//! Converts between grid cells and pixel geometry for a shelf drawn as a
//! stack of rows. Every row is a band of `top_gap + item_height` pixels
//! (the gap sits above the items), and rows are separated and surrounded by
//! a `frame` of shelf board.
//!
//! ```text
//!  frame ┌─────────────────────────────┐
//!        │ top_gap                     │
//!        │ [item][item][item]...       │  row 0
//!  frame ├─────────────────────────────┤
//!        │ top_gap                     │
//!        │ [item][item]...             │  row 1
//!  frame └─────────────────────────────┘
//! ```
//!
//! All functions are pure. [`GridMetrics::to_pixel`] is total over integer
//! input; [`GridMetrics::to_grid`] clamps into the current grid so a pointer
//! that leaves the shelf still yields a valid target cell.

use serde::{Deserialize, Serialize};
use shelfgrid_core::{Cell, PixelPoint, PixelRect};

/// Grid dimensions: row count and column capacity per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub rows: u16,
    pub cols: u16,
}

impl GridSize {
    #[inline]
    #[must_use]
    pub const fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }

    /// Whether `cell` lies inside the grid.
    #[inline]
    #[must_use]
    pub const fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    /// Number of cells in the grid.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.rows as u32 * self.cols as u32
    }
}

/// Pixel dimensions of the shelf drawing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridMetrics {
    /// Width of one item (and one column).
    pub item_width: f64,
    /// Height of one item.
    pub item_height: f64,
    /// Free space above the items in every row.
    pub top_gap: f64,
    /// Thickness of the shelf boards around and between rows.
    pub frame: f64,
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self {
            item_width: 80.0,
            item_height: 120.0,
            top_gap: 25.0,
            frame: 15.0,
        }
    }
}

impl GridMetrics {
    /// Height of one row band, excluding the board below it.
    #[inline]
    #[must_use]
    pub fn cell_height(&self) -> f64 {
        self.top_gap + self.item_height
    }

    /// Vertical distance between the tops of two consecutive rows.
    #[inline]
    #[must_use]
    pub fn row_pitch(&self) -> f64 {
        self.cell_height() + self.frame
    }

    /// Top-left pixel of the item slot at `(row, col)`.
    ///
    /// `x = frame + col·item_width`,
    /// `y = frame + row·(cell_height + frame) + top_gap`.
    #[must_use]
    pub fn to_pixel(&self, row: i64, col: i64) -> PixelPoint {
        PixelPoint::new(
            self.frame + col as f64 * self.item_width,
            self.frame + row as f64 * self.row_pitch() + self.top_gap,
        )
    }

    /// Top-left pixel of the item slot at `cell`.
    #[inline]
    #[must_use]
    pub fn cell_origin(&self, cell: Cell) -> PixelPoint {
        self.to_pixel(i64::from(cell.row), i64::from(cell.col))
    }

    /// Bounding box of an item drawn at `cell`.
    #[must_use]
    pub fn item_rect(&self, cell: Cell) -> PixelRect {
        let origin = self.cell_origin(cell);
        PixelRect::new(origin.x, origin.y, self.item_width, self.item_height)
    }

    /// Nearest cell for an item whose top-left corner is at `point`, clamped
    /// to `[0, rows-1] × [0, cols-1]`.
    ///
    /// Non-finite coordinates clamp toward their sign (`NaN` maps to 0).
    #[must_use]
    pub fn to_grid(&self, point: PixelPoint, size: GridSize) -> Cell {
        let col = nearest_index((point.x - self.frame) / self.item_width, size.cols);
        let row = nearest_index(
            (point.y - self.frame - self.top_gap) / self.row_pitch(),
            size.rows,
        );
        Cell::new(row, col)
    }

    /// Full drawing area of a shelf with the given dimensions.
    ///
    /// `width = cols·item_width + 2·frame`,
    /// `height = rows·cell_height + frame·(rows + 1)`.
    #[must_use]
    pub fn surface_rect(&self, size: GridSize) -> PixelRect {
        let rows = f64::from(size.rows);
        PixelRect::new(
            0.0,
            0.0,
            f64::from(size.cols) * self.item_width + 2.0 * self.frame,
            rows * self.cell_height() + self.frame * (rows + 1.0),
        )
    }
}

fn nearest_index(raw: f64, count: u16) -> u16 {
    let max = count.saturating_sub(1);
    if raw.is_nan() {
        return 0;
    }
    let rounded = raw.round();
    if rounded <= 0.0 {
        0
    } else if rounded >= f64::from(max) {
        max
    } else {
        rounded as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: GridSize = GridSize::new(3, 5);

    #[test]
    fn to_pixel_matches_shelf_formula() {
        let m = GridMetrics::default();
        assert_eq!(m.to_pixel(0, 0), PixelPoint::new(15.0, 40.0));
        // y = 15 + 1·(145 + 15) + 25
        assert_eq!(m.to_pixel(1, 2), PixelPoint::new(175.0, 200.0));
    }

    #[test]
    fn to_pixel_is_total() {
        let m = GridMetrics::default();
        let p = m.to_pixel(-1, -2);
        assert_eq!(p, PixelPoint::new(15.0 - 160.0, 15.0 - 160.0 + 25.0));
        let far = m.to_pixel(i64::from(u16::MAX), i64::from(u16::MAX));
        assert!(far.x.is_finite() && far.y.is_finite());
    }

    #[test]
    fn to_grid_inverts_to_pixel() {
        let m = GridMetrics::default();
        for row in 0..SIZE.rows {
            for col in 0..SIZE.cols {
                let cell = Cell::new(row, col);
                assert_eq!(m.to_grid(m.cell_origin(cell), SIZE), cell);
            }
        }
    }

    #[test]
    fn to_grid_snaps_to_nearest() {
        let m = GridMetrics::default();
        let origin = m.cell_origin(Cell::new(1, 1));
        let nudged = PixelPoint::new(origin.x + 39.0, origin.y - 70.0);
        assert_eq!(m.to_grid(nudged, SIZE), Cell::new(1, 1));
        let past_half = PixelPoint::new(origin.x + 41.0, origin.y + 81.0);
        assert_eq!(m.to_grid(past_half, SIZE), Cell::new(2, 2));
    }

    #[test]
    fn to_grid_clamps_outside_pointer() {
        let m = GridMetrics::default();
        assert_eq!(m.to_grid(PixelPoint::new(-500.0, -500.0), SIZE), Cell::new(0, 0));
        assert_eq!(m.to_grid(PixelPoint::new(1e9, 1e9), SIZE), Cell::new(2, 4));
        assert_eq!(
            m.to_grid(PixelPoint::new(f64::INFINITY, f64::NEG_INFINITY), SIZE),
            Cell::new(0, 4)
        );
        assert_eq!(m.to_grid(PixelPoint::new(f64::NAN, f64::NAN), SIZE), Cell::new(0, 0));
    }

    #[test]
    fn to_grid_on_degenerate_grid_is_origin() {
        let m = GridMetrics::default();
        let p = PixelPoint::new(400.0, 400.0);
        assert_eq!(m.to_grid(p, GridSize::new(0, 0)), Cell::new(0, 0));
        assert_eq!(m.to_grid(p, GridSize::new(1, 1)), Cell::new(0, 0));
    }

    #[test]
    fn surface_rect_includes_frames() {
        let m = GridMetrics::default();
        let r = m.surface_rect(GridSize::new(2, 5));
        assert_eq!(r.width, 5.0 * 80.0 + 30.0);
        assert_eq!(r.height, 2.0 * 145.0 + 15.0 * 3.0);
    }

    #[test]
    fn item_rect_has_item_dimensions() {
        let m = GridMetrics::default();
        let r = m.item_rect(Cell::new(0, 1));
        assert_eq!(r, PixelRect::new(95.0, 40.0, 80.0, 120.0));
    }

    #[test]
    fn grid_size_contains() {
        assert!(SIZE.contains(Cell::new(2, 4)));
        assert!(!SIZE.contains(Cell::new(3, 0)));
        assert!(!SIZE.contains(Cell::new(0, 5)));
        assert_eq!(SIZE.capacity(), 15);
    }
}
