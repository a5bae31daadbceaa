#![forbid(unsafe_code)]

//! Drag session controller.
//!
//! # Protocol
//!
//! ```text
//! pointer down on item ──▶ DragSession::start      guide at origin cell
//! pointer move         ──▶ DragSession::update     preview re-resolved
//! pointer up           ──▶ DragSession::finish     commit or revert
//! escape / focus loss  ──▶ DragSession::cancel     revert
//! ```
//!
//! While dragging, the mover floats under the pointer (keeping the grab
//! offset) and every move is resolved against the current *preview* layout,
//! so displaced neighbours stay where the last successful preview put them.
//! The drop is resolved again against the *committed* layout; the preview is
//! only used to compute which items need to animate to their final cells.
//!
//! A session never writes the store except through one `commit` in
//! [`DragSession::finish`], and that commit is re-checked by the store.
//! Whatever happens, the store holds a conflict-free layout afterwards.

use std::fmt;

use shelfgrid_core::{Offset, PixelPoint};
use shelfgrid_layout::{
    Cell, GridMetrics, HorizontalBias, ItemId, LayoutStore, Placement, PushRequest, resolve_push,
};

use crate::config::ShelfConfig;

/// An item whose on-screen cell changed.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemMotion {
    pub item: ItemId,
    pub from: Cell,
    pub to: Cell,
    /// Top-left pixel of `to`.
    pub position: PixelPoint,
}

/// What to draw after a pointer move.
#[derive(Debug, Clone, PartialEq)]
pub struct DragPreview {
    pub item: ItemId,
    /// Free-floating top-left of the dragged item (pointer minus grab offset).
    pub mover_position: PixelPoint,
    /// Cell under the dragged item.
    pub target: Cell,
    /// Placement guide; `None` when the target is blocked.
    pub guide: Option<Cell>,
    /// Neighbours that moved in the preview on this update.
    pub motions: Vec<ItemMotion>,
}

/// Why a drop did not commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertReason {
    /// Neither push direction had room.
    Blocked,
    /// The store refused the resolved layout.
    Rejected,
    /// The session was abandoned.
    Canceled,
}

/// End state of a drag session.
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    Committed {
        item: ItemId,
        from: Cell,
        to: Cell,
        /// Neighbours whose committed cell differs from their preview cell.
        motions: Vec<ItemMotion>,
        generation: u64,
    },
    Reverted {
        item: ItemId,
        /// Committed cell the mover returns to.
        cell: Cell,
        position: PixelPoint,
        /// Neighbours returning from their preview cell.
        motions: Vec<ItemMotion>,
        reason: RevertReason,
    },
}

impl DropOutcome {
    #[must_use]
    pub fn item(&self) -> &ItemId {
        match self {
            Self::Committed { item, .. } | Self::Reverted { item, .. } => item,
        }
    }

    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// Errors starting a drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragError {
    UnknownItem { id: ItemId },
}

impl fmt::Display for DragError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownItem { id } => write!(f, "item '{id}' is not on the shelf"),
        }
    }
}

impl std::error::Error for DragError {}

/// One in-progress drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    item: ItemId,
    origin: Cell,
    grab: Offset,
    pointer_id: u32,
    last_pointer: PixelPoint,
    bias: HorizontalBias,
    preview: Placement,
    guide: Option<Cell>,
}

impl DragSession {
    /// Pick up `item` with the pointer at `pointer`.
    pub fn start(
        store: &LayoutStore,
        metrics: &GridMetrics,
        item: ItemId,
        pointer: PixelPoint,
        pointer_id: u32,
    ) -> Result<Self, DragError> {
        let Some(origin) = store.cell_of(&item) else {
            return Err(DragError::UnknownItem { id: item });
        };
        let grab = metrics.cell_origin(origin).offset_to(pointer);
        tracing::debug!(
            target: "shelfgrid.drag",
            item = %item,
            row = origin.row,
            col = origin.col,
            pointer_id,
            "drag started"
        );
        Ok(Self {
            item,
            origin,
            grab,
            pointer_id,
            last_pointer: pointer,
            bias: HorizontalBias::Right,
            preview: store.placement().clone(),
            guide: Some(origin),
        })
    }

    /// Re-resolve the preview for a pointer move.
    pub fn update(
        &mut self,
        store: &LayoutStore,
        config: &ShelfConfig,
        pointer: PixelPoint,
    ) -> DragPreview {
        self.track(pointer);
        let mover_position = pointer.untranslate(self.grab);
        let target = config.metrics.to_grid(mover_position, store.size());
        let request = self.request(target, store, config);

        let motions = match resolve_push(&self.preview, &request) {
            Ok(resolution) => {
                let next = resolution.into_placement();
                let motions = motions_between(&self.preview, &next, &self.item, &config.metrics);
                self.preview = next;
                self.guide = Some(target);
                motions
            }
            Err(blocked) => {
                tracing::trace!(target: "shelfgrid.drag", item = %self.item, %blocked, "preview blocked");
                self.guide = None;
                Vec::new()
            }
        };

        DragPreview {
            item: self.item.clone(),
            mover_position,
            target,
            guide: self.guide,
            motions,
        }
    }

    /// Drop at `pointer`: resolve against the committed layout and commit.
    pub fn finish(
        mut self,
        store: &mut LayoutStore,
        config: &ShelfConfig,
        pointer: PixelPoint,
    ) -> DropOutcome {
        self.track(pointer);
        let Some(origin) = store.cell_of(&self.item) else {
            tracing::warn!(target: "shelfgrid.drag", item = %self.item, "dragged item vanished from the store");
            return self.revert(store, &config.metrics, RevertReason::Rejected);
        };
        self.origin = origin;

        let position = pointer.untranslate(self.grab);
        let target = config.metrics.to_grid(position, store.size());
        let request = self.request(target, store, config);

        let next = match resolve_push(store.placement(), &request) {
            Ok(resolution) => resolution.into_placement(),
            Err(blocked) => {
                tracing::debug!(target: "shelfgrid.drag", item = %self.item, %blocked, "drop blocked");
                return self.revert(store, &config.metrics, RevertReason::Blocked);
            }
        };
        let motions = motions_between(&self.preview, &next, &self.item, &config.metrics);

        let span = tracing::debug_span!(
            target: "shelfgrid.drag",
            "drag.commit",
            item = %self.item,
            row = target.row,
            col = target.col
        );
        let _guard = span.enter();
        match store.commit(next) {
            Ok(generation) => {
                tracing::debug!(target: "shelfgrid.drag", generation, moved = motions.len(), "drop committed");
                DropOutcome::Committed {
                    item: self.item,
                    from: origin,
                    to: target,
                    motions,
                    generation,
                }
            }
            Err(err) => {
                tracing::warn!(target: "shelfgrid.drag", error = %err, "resolved drop rejected by store");
                self.revert(store, &config.metrics, RevertReason::Rejected)
            }
        }
    }

    /// Abandon the drag; nothing is committed.
    pub fn cancel(self, store: &LayoutStore, metrics: &GridMetrics) -> DropOutcome {
        tracing::debug!(target: "shelfgrid.drag", item = %self.item, "drag canceled");
        self.revert(store, metrics, RevertReason::Canceled)
    }

    fn revert(self, store: &LayoutStore, metrics: &GridMetrics, reason: RevertReason) -> DropOutcome {
        let cell = store.cell_of(&self.item).unwrap_or(self.origin);
        let motions = motions_between(&self.preview, store.placement(), &self.item, metrics);
        DropOutcome::Reverted {
            cell,
            position: metrics.cell_origin(cell),
            motions,
            reason,
            item: self.item,
        }
    }

    fn track(&mut self, pointer: PixelPoint) {
        if let Some(bias) = HorizontalBias::from_delta(pointer.x - self.last_pointer.x) {
            self.bias = bias;
        }
        self.last_pointer = pointer;
    }

    fn request<'a>(
        &'a self,
        target: Cell,
        store: &LayoutStore,
        config: &ShelfConfig,
    ) -> PushRequest<'a> {
        PushRequest::new(&self.item, target, self.bias, store.cols_per_shelf())
            .with_origin(self.origin, config.interaction.vacated_cell)
    }

    #[inline]
    #[must_use]
    pub fn item(&self) -> &ItemId {
        &self.item
    }

    /// Committed cell at drag start.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> Cell {
        self.origin
    }

    /// Pointer position relative to the item's top-left corner.
    #[inline]
    #[must_use]
    pub fn grab(&self) -> Offset {
        self.grab
    }

    #[inline]
    #[must_use]
    pub fn pointer_id(&self) -> u32 {
        self.pointer_id
    }

    #[inline]
    #[must_use]
    pub fn bias(&self) -> HorizontalBias {
        self.bias
    }

    #[inline]
    #[must_use]
    pub fn guide(&self) -> Option<Cell> {
        self.guide
    }

    /// Layout currently shown, mover included.
    #[inline]
    #[must_use]
    pub fn preview(&self) -> &Placement {
        &self.preview
    }
}

fn motions_between(
    before: &Placement,
    after: &Placement,
    mover: &ItemId,
    metrics: &GridMetrics,
) -> Vec<ItemMotion> {
    after
        .iter()
        .filter(|(id, _)| *id != mover)
        .filter_map(|(id, to)| {
            let from = before.get(id)?;
            (from != to).then(|| ItemMotion {
                item: id.clone(),
                from,
                to,
                position: metrics.cell_origin(to),
            })
        })
        .collect()
}
