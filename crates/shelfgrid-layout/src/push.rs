#![forbid(unsafe_code)]

//! Push resolver: chain displacement within one row.
//!
//! When a dragged item is dropped on an occupied cell, the occupant is moved
//! one column further in the bias direction, which may in turn require the
//! next occupant to move, and so on until the chain reaches a free cell. A
//! chain that would push an item past column `0` or `cols_per_shelf - 1` (or
//! into a pinned wall) fails; the resolver then retries the whole chain in
//! the opposite direction. If both fail the result is [`PushBlocked`].
//!
//! # Invariants
//!
//! 1. The resolver is pure: the input placement is never modified.
//! 2. Only items in the target row move, and each moves exactly one column.
//! 3. The walk visits at most `cols_per_shelf` cells per direction.
//! 4. The mover is never displaced and never blocks its own target.
//! 5. If the working copy is conflict-free in the target row, so is the
//!    resolved placement (with the mover assigned to the target).
//!
//! # Vacated cell
//!
//! With [`VacatedCell::Pinned`] the cell the mover still holds in the
//! committed layout is a wall for chains in that row. Dropping an item two
//! columns to the right in a full row therefore fails instead of rotating its
//! neighbours into the gap it leaves. [`VacatedCell::Reusable`] lets chains
//! flow into that cell.

use std::fmt;

use serde::{Deserialize, Serialize};
use shelfgrid_core::{Cell, ItemId};

use crate::placement::Placement;

/// Preferred horizontal push direction, derived from drag motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalBias {
    Left,
    #[default]
    Right,
}

impl HorizontalBias {
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Bias implied by a horizontal delta; `None` for zero or `NaN`.
    #[must_use]
    pub fn from_delta(dx: f64) -> Option<Self> {
        if dx > 0.0 {
            Some(Self::Right)
        } else if dx < 0.0 {
            Some(Self::Left)
        } else {
            None
        }
    }
}

/// How chains treat the cell the mover is leaving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VacatedCell {
    /// The mover's committed cell blocks chains in its row.
    #[default]
    Pinned,
    /// Chains may shift items into the mover's committed cell.
    Reusable,
}

/// Input to [`resolve_push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushRequest<'a> {
    /// The dragged item; excluded from occupancy checks.
    pub mover: &'a ItemId,
    /// Candidate drop cell.
    pub target: Cell,
    /// Direction tried first.
    pub bias: HorizontalBias,
    pub cols_per_shelf: u16,
    /// The mover's committed cell, if it has one.
    pub origin: Option<Cell>,
    pub vacated: VacatedCell,
}

impl<'a> PushRequest<'a> {
    /// Request without an origin cell.
    #[must_use]
    pub const fn new(
        mover: &'a ItemId,
        target: Cell,
        bias: HorizontalBias,
        cols_per_shelf: u16,
    ) -> Self {
        Self {
            mover,
            target,
            bias,
            cols_per_shelf,
            origin: None,
            vacated: VacatedCell::Pinned,
        }
    }

    /// Attach the mover's committed cell and the policy for it.
    #[must_use]
    pub const fn with_origin(mut self, origin: Cell, vacated: VacatedCell) -> Self {
        self.origin = Some(origin);
        self.vacated = vacated;
        self
    }

    fn wall(&self) -> Option<Cell> {
        match (self.vacated, self.origin) {
            (VacatedCell::Pinned, Some(origin))
                if origin.row == self.target.row && origin != self.target =>
            {
                Some(origin)
            }
            _ => None,
        }
    }
}

/// One single-step move performed by a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Displacement {
    pub item: ItemId,
    pub from: Cell,
    pub to: Cell,
}

/// Successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushResolution {
    mover: ItemId,
    target: Cell,
    direction: Option<HorizontalBias>,
    displaced: Vec<Displacement>,
    working: Placement,
}

impl PushResolution {
    /// The item being placed.
    #[must_use]
    pub fn mover(&self) -> &ItemId {
        &self.mover
    }

    /// Cell assigned to the mover.
    #[must_use]
    pub fn target(&self) -> Cell {
        self.target
    }

    /// Direction the chain moved in; `None` when the target was free.
    #[must_use]
    pub fn direction(&self) -> Option<HorizontalBias> {
        self.direction
    }

    /// Displaced occupants, ordered from the target outward.
    #[must_use]
    pub fn displaced(&self) -> &[Displacement] {
        &self.displaced
    }

    /// Updated working copy, without the mover.
    #[must_use]
    pub fn working(&self) -> &Placement {
        &self.working
    }

    /// Updated working copy with the mover assigned to the target.
    #[must_use]
    pub fn into_placement(self) -> Placement {
        let mut placement = self.working;
        placement.insert(self.mover, self.target);
        placement
    }
}

/// Neither push direction has room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushBlocked {
    pub target: Cell,
    pub bias: HorizontalBias,
}

impl fmt::Display for PushBlocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no room to push row {} at column {} in either direction",
            self.target.row, self.target.col
        )
    }
}

impl std::error::Error for PushBlocked {}

#[derive(Debug, Clone, Copy)]
enum Slot<'a> {
    Free,
    Wall,
    Item(&'a ItemId),
}

/// Resolve a drop of `request.mover` on `request.target` against `working`.
///
/// `working` may or may not contain the mover; its entry is ignored either
/// way. On failure `working` is left untouched and nothing is reassigned.
pub fn resolve_push(
    working: &Placement,
    request: &PushRequest<'_>,
) -> Result<PushResolution, PushBlocked> {
    let blocked = PushBlocked {
        target: request.target,
        bias: request.bias,
    };
    let cols = usize::from(request.cols_per_shelf);
    let start = usize::from(request.target.col);
    if start >= cols {
        return Err(blocked);
    }

    let arena = row_arena(working, request, cols);
    let (direction, end) = match arena[start] {
        Slot::Free => (None, start),
        _ => [request.bias, request.bias.opposite()]
            .into_iter()
            .find_map(|dir| chain_end(&arena, start, dir).map(|end| (Some(dir), end)))
            .ok_or(blocked)?,
    };

    let mut next = working.clone();
    next.remove(request.mover);

    let mut displaced = Vec::new();
    if let Some(dir) = direction {
        let row = request.target.row;
        let mut col = start;
        while col != end {
            let Some(to) = step(col, dir, cols) else {
                break;
            };
            if let Slot::Item(id) = arena[col] {
                let from = Cell::new(row, col as u16);
                let to_cell = Cell::new(row, to as u16);
                next.insert(id.clone(), to_cell);
                displaced.push(Displacement {
                    item: id.clone(),
                    from,
                    to: to_cell,
                });
            }
            col = to;
        }
    }

    Ok(PushResolution {
        mover: request.mover.clone(),
        target: request.target,
        direction,
        displaced,
        working: next,
    })
}

fn row_arena<'a>(working: &'a Placement, request: &PushRequest<'_>, cols: usize) -> Vec<Slot<'a>> {
    let mut arena = vec![Slot::Free; cols];
    for (id, cell) in working.iter() {
        if cell.row != request.target.row || id == request.mover {
            continue;
        }
        if let Some(slot) = arena.get_mut(usize::from(cell.col))
            && matches!(slot, Slot::Free)
        {
            *slot = Slot::Item(id);
        }
    }
    if let Some(wall) = request.wall()
        && let Some(slot) = arena.get_mut(usize::from(wall.col))
    {
        *slot = Slot::Wall;
    }
    arena
}

/// Column of the first free cell reached by walking from `start`, or `None`
/// if the walk hits a wall or the row edge first.
fn chain_end(arena: &[Slot<'_>], start: usize, direction: HorizontalBias) -> Option<usize> {
    let mut col = start;
    for _ in 0..arena.len() {
        match arena[col] {
            Slot::Free => return Some(col),
            Slot::Wall => return None,
            Slot::Item(_) => col = step(col, direction, arena.len())?,
        }
    }
    None
}

fn step(col: usize, direction: HorizontalBias, len: usize) -> Option<usize> {
    match direction {
        HorizontalBias::Left => col.checked_sub(1),
        HorizontalBias::Right => (col + 1 < len).then_some(col + 1),
    }
}
