#![forbid(unsafe_code)]

//! Interaction surface: one shelf, one pointer gesture at a time.
//!
//! [`ShelfSurface`] owns the committed [`LayoutStore`], the current
//! [`Gesture`], the selection, and the [`SyncDebouncer`]. Pointer handlers
//! run synchronously on `&mut self` and return a [`SurfaceEffect`] for the
//! renderer; they never block on persistence.
//!
//! # Gesture rules
//!
//! - A pointer down on an item starts a drag; anywhere else starts a
//!   rubber-band selection. Starting a drag clears the selection.
//! - While a gesture is active, a second pointer down is a no-op, and moves
//!   or releases from a different pointer id are no-ops.
//! - A snapshot load during a drag is validated immediately but applied only
//!   when the drag ends (the latest queued snapshot wins). Applying it drops
//!   any pending write.
//! - Layout commits (drops, auto-placement, rebuilds) schedule a debounced
//!   write of the full placement.

use std::fmt;
use std::io;

use serde_json::{Map, Value};
use shelfgrid_core::{PixelPoint, PixelRect, PointerEvent, PointerEventKind};
use shelfgrid_layout::{
    Cell, ItemId, LayoutError, LayoutStore, Placed, Placement, ShelfSnapshot, SnapshotError,
    pack_groups, place_new_item,
};

use crate::config::{ConfigError, ShelfConfig};
use crate::drag::{DragError, DragPreview, DragSession, DropOutcome};
use crate::selection::{Selection, SelectionEnd, SelectionSession};
use crate::sync::{PersistenceSink, SyncDebouncer, SyncStats};

/// Active pointer gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging(DragSession),
    Selecting(SelectionSession),
}

impl Gesture {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging(_))
    }

    #[must_use]
    pub fn is_selecting(&self) -> bool {
        matches!(self, Self::Selecting(_))
    }

    /// Pointer that owns the gesture.
    #[must_use]
    pub fn pointer_id(&self) -> Option<u32> {
        match self {
            Self::Idle => None,
            Self::Dragging(session) => Some(session.pointer_id()),
            Self::Selecting(session) => Some(session.pointer_id()),
        }
    }
}

/// Why a pointer event changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoopReason {
    /// Move, release, or cancel with no gesture in progress.
    IdleWithoutGesture,
    /// Pointer down while another gesture is active.
    GestureAlreadyActive,
    /// Event from a pointer other than the one owning the gesture.
    PointerMismatch,
    /// The item under the pointer is not in the store.
    UnknownItem,
}

/// What the renderer should show after a pointer event.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEffect {
    DragStarted {
        item: ItemId,
        origin: Cell,
        /// Placement guide, initially at the origin cell.
        guide: Cell,
    },
    DragMoved(DragPreview),
    Dropped(DropOutcome),
    SelectionStarted {
        anchor: PixelPoint,
    },
    SelectionUpdated {
        rect: PixelRect,
        hits: Vec<ItemId>,
    },
    /// Hits handed to the confirmation flow.
    SelectionReady {
        items: Vec<ItemId>,
    },
    SelectionCleared,
    Noop {
        reason: NoopReason,
    },
}

/// Result of [`ShelfSurface::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied {
        generation: u64,
        /// Selected ids dropped because the snapshot no longer has them.
        pruned_selection: usize,
    },
    /// A drag is active; the snapshot applies when it ends.
    Queued,
}

/// Errors from surface operations.
#[derive(Debug)]
pub enum SurfaceError {
    Layout(LayoutError),
    Snapshot(SnapshotError),
    Config(ConfigError),
    Drag(DragError),
    /// The operation is not allowed while a drag is in progress.
    DragActive,
    /// The sync worker thread could not be started.
    Spawn(io::Error),
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout(e) => write!(f, "layout error: {e}"),
            Self::Snapshot(e) => write!(f, "snapshot error: {e}"),
            Self::Config(e) => write!(f, "config error: {e}"),
            Self::Drag(e) => write!(f, "drag error: {e}"),
            Self::DragActive => write!(f, "operation not allowed while dragging"),
            Self::Spawn(e) => write!(f, "failed to start sync worker: {e}"),
        }
    }
}

impl std::error::Error for SurfaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Layout(e) => Some(e),
            Self::Snapshot(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Drag(e) => Some(e),
            Self::DragActive => None,
            Self::Spawn(e) => Some(e),
        }
    }
}

impl From<LayoutError> for SurfaceError {
    fn from(e: LayoutError) -> Self {
        Self::Layout(e)
    }
}

impl From<SnapshotError> for SurfaceError {
    fn from(e: SnapshotError) -> Self {
        Self::Snapshot(e)
    }
}

impl From<ConfigError> for SurfaceError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<DragError> for SurfaceError {
    fn from(e: DragError) -> Self {
        Self::Drag(e)
    }
}

/// A shelf wired to pointer input and persistence.
#[derive(Debug)]
pub struct ShelfSurface {
    config: ShelfConfig,
    store: LayoutStore,
    gesture: Gesture,
    selection: Selection,
    queued_snapshot: Option<ShelfSnapshot>,
    sync: SyncDebouncer,
}

impl ShelfSurface {
    /// Validate `config` and start the sync worker for `sink`.
    pub fn new<S: PersistenceSink>(
        config: ShelfConfig,
        store: LayoutStore,
        sink: S,
    ) -> Result<Self, SurfaceError> {
        let config = config.validated()?;
        let sync = SyncDebouncer::spawn(sink, config.sync.debounce()).map_err(SurfaceError::Spawn)?;
        Ok(Self {
            config,
            store,
            gesture: Gesture::Idle,
            selection: Selection::new(),
            queued_snapshot: None,
            sync,
        })
    }

    /// Dispatch a pointer event to the matching handler.
    pub fn handle(&mut self, event: PointerEvent) -> SurfaceEffect {
        match event.kind {
            PointerEventKind::Down => self.pointer_down(event),
            PointerEventKind::Move => self.pointer_move(event),
            PointerEventKind::Up => self.pointer_up(event),
            PointerEventKind::Cancel => self.pointer_cancel(event),
        }
    }

    pub fn pointer_down(&mut self, event: PointerEvent) -> SurfaceEffect {
        if !self.gesture.is_idle() {
            return SurfaceEffect::Noop {
                reason: NoopReason::GestureAlreadyActive,
            };
        }

        let Some(item) = self.item_under(event.position) else {
            self.selection.clear();
            self.gesture =
                Gesture::Selecting(SelectionSession::start(event.position, event.pointer_id));
            return SurfaceEffect::SelectionStarted {
                anchor: event.position,
            };
        };

        self.start_drag(item, event)
    }

    fn start_drag(&mut self, item: ItemId, event: PointerEvent) -> SurfaceEffect {
        match DragSession::start(
            &self.store,
            &self.config.metrics,
            item,
            event.position,
            event.pointer_id,
        ) {
            Ok(session) => {
                self.selection.clear();
                let effect = SurfaceEffect::DragStarted {
                    item: session.item().clone(),
                    origin: session.origin(),
                    guide: session.origin(),
                };
                self.gesture = Gesture::Dragging(session);
                effect
            }
            Err(err) => {
                tracing::warn!(target: "shelfgrid.surface", error = %err, "hit item missing from store");
                SurfaceEffect::Noop {
                    reason: NoopReason::UnknownItem,
                }
            }
        }
    }

    pub fn pointer_move(&mut self, event: PointerEvent) -> SurfaceEffect {
        if let Some(reason) = self.reject(event) {
            return SurfaceEffect::Noop { reason };
        }
        match &mut self.gesture {
            Gesture::Idle => SurfaceEffect::Noop {
                reason: NoopReason::IdleWithoutGesture,
            },
            Gesture::Dragging(session) => {
                SurfaceEffect::DragMoved(session.update(&self.store, &self.config, event.position))
            }
            Gesture::Selecting(session) => {
                let hits = session
                    .update(&self.store, &self.config.metrics, event.position)
                    .to_vec();
                self.selection.highlight(&hits);
                SurfaceEffect::SelectionUpdated {
                    rect: session.rect(),
                    hits,
                }
            }
        }
    }

    pub fn pointer_up(&mut self, event: PointerEvent) -> SurfaceEffect {
        if let Some(reason) = self.reject(event) {
            return SurfaceEffect::Noop { reason };
        }
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => SurfaceEffect::Noop {
                reason: NoopReason::IdleWithoutGesture,
            },
            Gesture::Dragging(session) => {
                let outcome = session.finish(&mut self.store, &self.config, event.position);
                if outcome.is_committed() {
                    self.sync.schedule(self.store.records());
                }
                self.apply_queued_snapshot();
                SurfaceEffect::Dropped(outcome)
            }
            Gesture::Selecting(session) => {
                match session.finish(&self.store, &self.config, event.position) {
                    SelectionEnd::Click | SelectionEnd::Empty => {
                        self.selection.clear();
                        SurfaceEffect::SelectionCleared
                    }
                    SelectionEnd::Ready(items) => {
                        self.selection.request_confirmation(items.clone());
                        SurfaceEffect::SelectionReady { items }
                    }
                }
            }
        }
    }

    pub fn pointer_cancel(&mut self, event: PointerEvent) -> SurfaceEffect {
        if let Some(reason) = self.reject(event) {
            return SurfaceEffect::Noop { reason };
        }
        self.cancel_gesture().unwrap_or(SurfaceEffect::Noop {
            reason: NoopReason::IdleWithoutGesture,
        })
    }

    /// Abandon the active gesture regardless of pointer (escape, focus loss).
    pub fn cancel_gesture(&mut self) -> Option<SurfaceEffect> {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => None,
            Gesture::Dragging(session) => {
                let outcome = session.cancel(&self.store, &self.config.metrics);
                self.apply_queued_snapshot();
                Some(SurfaceEffect::Dropped(outcome))
            }
            Gesture::Selecting(_) => {
                self.selection.clear();
                Some(SurfaceEffect::SelectionCleared)
            }
        }
    }

    fn reject(&self, event: PointerEvent) -> Option<NoopReason> {
        match self.gesture.pointer_id() {
            Some(owner) if owner != event.pointer_id => Some(NoopReason::PointerMismatch),
            _ => None,
        }
    }

    fn item_under(&self, point: PixelPoint) -> Option<ItemId> {
        self.store
            .placement()
            .iter()
            .find(|(_, cell)| self.config.metrics.item_rect(*cell).contains(point))
            .map(|(id, _)| id.clone())
    }

    /// Replace the layout with an authoritative snapshot.
    ///
    /// Invalid snapshots are rejected right away. During a drag the snapshot
    /// is queued and applied once the drag ends.
    pub fn load(&mut self, snapshot: ShelfSnapshot) -> Result<LoadOutcome, SurfaceError> {
        snapshot.validate()?;
        if self.gesture.is_dragging() {
            tracing::debug!(target: "shelfgrid.surface", items = snapshot.items.len(), "snapshot queued behind active drag");
            self.queued_snapshot = Some(snapshot);
            return Ok(LoadOutcome::Queued);
        }
        self.apply_snapshot(&snapshot)
    }

    fn apply_snapshot(&mut self, snapshot: &ShelfSnapshot) -> Result<LoadOutcome, SurfaceError> {
        self.store.load(snapshot)?;
        if self.sync.cancel() {
            tracing::debug!(target: "shelfgrid.surface", "pending write superseded by snapshot");
        }
        let pruned_selection = self.selection.retain_placed(self.store.placement());
        let generation = self.store.generation();
        tracing::info!(
            target: "shelfgrid.store",
            generation,
            items = snapshot.items.len(),
            rows = self.store.row_count(),
            cols = self.store.cols_per_shelf(),
            "snapshot loaded"
        );
        Ok(LoadOutcome::Applied {
            generation,
            pruned_selection,
        })
    }

    fn apply_queued_snapshot(&mut self) {
        if let Some(snapshot) = self.queued_snapshot.take()
            && let Err(err) = self.apply_snapshot(&snapshot)
        {
            tracing::warn!(target: "shelfgrid.surface", error = %err, "queued snapshot rejected");
        }
    }

    fn ensure_not_dragging(&self) -> Result<(), SurfaceError> {
        if self.gesture.is_dragging() {
            Err(SurfaceError::DragActive)
        } else {
            Ok(())
        }
    }

    /// Append an empty row; returns the new row count.
    pub fn add_row(&mut self) -> Result<u16, SurfaceError> {
        self.ensure_not_dragging()?;
        let rows = self.store.add_row()?;
        tracing::info!(target: "shelfgrid.store", rows, "row added");
        Ok(rows)
    }

    /// Remove the last row; fails if it still holds items.
    pub fn remove_row(&mut self) -> Result<u16, SurfaceError> {
        self.ensure_not_dragging()?;
        match self.store.remove_row() {
            Ok(rows) => {
                tracing::info!(target: "shelfgrid.store", rows, "row removed");
                Ok(rows)
            }
            Err(err) => {
                tracing::debug!(target: "shelfgrid.store", error = %err, "row removal refused");
                Err(err.into())
            }
        }
    }

    pub fn set_columns_per_shelf(&mut self, cols: u16) -> Result<(), SurfaceError> {
        self.ensure_not_dragging()?;
        self.store.set_columns_per_shelf(cols)?;
        tracing::info!(target: "shelfgrid.store", cols, "column capacity changed");
        Ok(())
    }

    /// Auto-place a new item and schedule a write if the layout changed.
    pub fn place_item(
        &mut self,
        id: ItemId,
        display: Map<String, Value>,
    ) -> Result<Placed, SurfaceError> {
        self.ensure_not_dragging()?;
        let placed = place_new_item(&mut self.store, id, display)?;
        if placed.changed() {
            tracing::debug!(
                target: "shelfgrid.store",
                row = placed.cell().row,
                col = placed.cell().col,
                "item auto-placed"
            );
            self.sync.schedule(self.store.records());
        }
        Ok(placed)
    }

    /// Rebuild the layout from ordered groups and schedule a write.
    pub fn rebuild_from_groups(&mut self, groups: &[Vec<ItemId>]) -> Result<u64, SurfaceError> {
        self.ensure_not_dragging()?;
        let _span = tracing::debug_span!(target: "shelfgrid.store", "store.rebuild", groups = groups.len())
            .entered();
        let packed = pack_groups(groups, self.store.cols_per_shelf())?;
        let generation = self.store.replace(packed.placement, packed.rows)?;
        self.selection.retain_placed(self.store.placement());
        tracing::info!(target: "shelfgrid.store", generation, rows = packed.rows, "layout rebuilt from groups");
        self.sync.schedule(self.store.records());
        Ok(generation)
    }

    /// Accept the pending selection.
    pub fn confirm_selection(&mut self) -> Option<Vec<ItemId>> {
        self.selection.confirm()
    }

    /// Drop the selection. Returns whether anything was selected.
    pub fn cancel_selection(&mut self) -> bool {
        self.selection.cancel()
    }

    /// Cancel any gesture and any pending write, then stop the sync worker.
    ///
    /// Also run on drop. Calling it twice is harmless.
    pub fn teardown(&mut self) {
        let _ = self.cancel_gesture();
        self.selection.clear();
        self.queued_snapshot = None;
        if self.sync.cancel() {
            tracing::debug!(target: "shelfgrid.surface", "pending write dropped on teardown");
        }
        self.sync.shutdown();
    }

    #[inline]
    #[must_use]
    pub fn store(&self) -> &LayoutStore {
        &self.store
    }

    #[inline]
    #[must_use]
    pub fn placement(&self) -> &Placement {
        self.store.placement()
    }

    #[inline]
    #[must_use]
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    #[inline]
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ShelfConfig {
        &self.config
    }

    /// Whether a snapshot is waiting for the current drag to end.
    #[must_use]
    pub fn has_queued_snapshot(&self) -> bool {
        self.queued_snapshot.is_some()
    }

    #[must_use]
    pub fn is_sync_pending(&self) -> bool {
        self.sync.is_pending()
    }

    #[must_use]
    pub fn sync_stats(&self) -> SyncStats {
        self.sync.stats()
    }

    /// Borrow the debouncer (for hosts that wait on it at shutdown).
    #[must_use]
    pub fn sync(&self) -> &SyncDebouncer {
        &self.sync
    }
}

impl Drop for ShelfSurface {
    fn drop(&mut self) {
        self.teardown();
    }
}
