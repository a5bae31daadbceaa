#![forbid(unsafe_code)]

//! Rubber-band selection.
//!
//! A gesture that starts off any item draws a rectangle from the anchor to
//! the pointer. Items whose pixel box strictly overlaps the rectangle are
//! highlighted live; touching edges do not count. On release a tiny
//! rectangle is a click (clears), an empty hit set clears, and anything else
//! is handed over for confirmation.

use std::collections::BTreeSet;

use shelfgrid_core::{PixelPoint, PixelRect};
use shelfgrid_layout::{GridMetrics, ItemId, LayoutStore, Placement};

use crate::config::ShelfConfig;

/// Items whose drawn box strictly overlaps `rect`, in id order.
#[must_use]
pub fn hit_test(store: &LayoutStore, metrics: &GridMetrics, rect: &PixelRect) -> Vec<ItemId> {
    store
        .placement()
        .iter()
        .filter(|(_, cell)| metrics.item_rect(*cell).overlaps(rect))
        .map(|(id, _)| id.clone())
        .collect()
}

/// How a selection gesture ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEnd {
    /// Rectangle below the click threshold in both dimensions.
    Click,
    /// Large enough, but nothing inside.
    Empty,
    /// Items awaiting confirmation.
    Ready(Vec<ItemId>),
}

/// One in-progress rubber-band gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSession {
    anchor: PixelPoint,
    current: PixelPoint,
    pointer_id: u32,
    hits: Vec<ItemId>,
}

impl SelectionSession {
    /// Zero-size rectangle at `anchor`.
    #[must_use]
    pub fn start(anchor: PixelPoint, pointer_id: u32) -> Self {
        tracing::trace!(target: "shelfgrid.selection", x = anchor.x, y = anchor.y, "selection started");
        Self {
            anchor,
            current: anchor,
            pointer_id,
            hits: Vec::new(),
        }
    }

    /// Stretch the rectangle to `pointer` and recompute the hit set.
    pub fn update(&mut self, store: &LayoutStore, metrics: &GridMetrics, pointer: PixelPoint) -> &[ItemId] {
        self.current = pointer;
        self.hits = hit_test(store, metrics, &self.rect());
        &self.hits
    }

    /// Release at `pointer`.
    pub fn finish(mut self, store: &LayoutStore, config: &ShelfConfig, pointer: PixelPoint) -> SelectionEnd {
        self.update(store, &config.metrics, pointer);
        let rect = self.rect();
        let threshold = config.interaction.click_threshold_px;
        let end = if rect.width < threshold && rect.height < threshold {
            SelectionEnd::Click
        } else if self.hits.is_empty() {
            SelectionEnd::Empty
        } else {
            SelectionEnd::Ready(self.hits)
        };
        tracing::debug!(target: "shelfgrid.selection", ?end, "selection finished");
        end
    }

    /// Normalized rectangle from anchor to the latest pointer.
    #[must_use]
    pub fn rect(&self) -> PixelRect {
        PixelRect::from_corners(self.anchor, self.current)
    }

    #[inline]
    #[must_use]
    pub fn hits(&self) -> &[ItemId] {
        &self.hits
    }

    #[inline]
    #[must_use]
    pub fn anchor(&self) -> PixelPoint {
        self.anchor
    }

    #[inline]
    #[must_use]
    pub fn pointer_id(&self) -> u32 {
        self.pointer_id
    }
}

/// Highlighted or confirmation-pending item set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    items: BTreeSet<ItemId>,
    awaiting_confirmation: bool,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the live highlight.
    pub fn highlight(&mut self, hits: &[ItemId]) {
        self.items = hits.iter().cloned().collect();
        self.awaiting_confirmation = false;
    }

    /// Hold `items` until [`confirm`](Self::confirm) or [`cancel`](Self::cancel).
    pub fn request_confirmation(&mut self, items: Vec<ItemId>) {
        self.items = items.into_iter().collect();
        self.awaiting_confirmation = !self.items.is_empty();
    }

    /// Accept the pending set; returns it and clears the selection.
    pub fn confirm(&mut self) -> Option<Vec<ItemId>> {
        if !self.awaiting_confirmation {
            return None;
        }
        let items: Vec<ItemId> = std::mem::take(&mut self.items).into_iter().collect();
        self.awaiting_confirmation = false;
        tracing::debug!(target: "shelfgrid.selection", count = items.len(), "selection confirmed");
        Some(items)
    }

    /// Drop the selection. Returns whether anything was selected.
    pub fn cancel(&mut self) -> bool {
        let had_items = !self.items.is_empty();
        self.clear();
        had_items
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.awaiting_confirmation = false;
    }

    /// Forget ids no longer placed; returns how many were removed.
    pub fn retain_placed(&mut self, placement: &Placement) -> usize {
        let before = self.items.len();
        self.items.retain(|id| placement.contains(id));
        if self.items.is_empty() {
            self.awaiting_confirmation = false;
        }
        before - self.items.len()
    }

    #[must_use]
    pub fn is_awaiting_confirmation(&self) -> bool {
        self.awaiting_confirmation
    }

    #[must_use]
    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Selected ids in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ItemId> + '_ {
        self.items.iter()
    }
}
