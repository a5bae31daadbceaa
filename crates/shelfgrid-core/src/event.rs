#![forbid(unsafe_code)]

//! Canonical pointer event types.
//!
//! Rendering hosts translate whatever they receive (mouse, pen, touch) into a
//! [`PointerEvent`] in surface pixel coordinates and hand it to the
//! interaction surface. All events derive `Clone` and `PartialEq` for use in
//! tests and pattern matching.
//!
//! # Design Notes
//!
//! - Positions are relative to the top-left of the shelf frame.
//! - `pointer_id` distinguishes concurrent pointers; a gesture only listens
//!   to the pointer that started it. Hosts with a single mouse can use
//!   [`PointerEvent::PRIMARY`].
//! - `Cancel` covers escape, focus loss, and pointer capture loss alike.

use crate::geometry::PixelPoint;

/// Phase of a pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Button pressed / contact started.
    Down,
    /// Pointer moved while pressed.
    Move,
    /// Button released / contact ended.
    Up,
    /// The host aborted the interaction.
    Cancel,
}

/// A pointer event in surface pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub position: PixelPoint,
    pub pointer_id: u32,
}

impl PointerEvent {
    /// Pointer id used by single-pointer hosts.
    pub const PRIMARY: u32 = 0;

    /// Create a new event for the primary pointer.
    #[must_use]
    pub const fn new(kind: PointerEventKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            position: PixelPoint::new(x, y),
            pointer_id: Self::PRIMARY,
        }
    }

    /// Pointer-down at `(x, y)`.
    #[must_use]
    pub const fn down(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Down, x, y)
    }

    /// Pointer-move at `(x, y)`.
    #[must_use]
    pub const fn moved(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Move, x, y)
    }

    /// Pointer-up at `(x, y)`.
    #[must_use]
    pub const fn up(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Up, x, y)
    }

    /// Host cancellation at `(x, y)`.
    #[must_use]
    pub const fn cancel(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Cancel, x, y)
    }

    /// Attach a pointer id.
    #[must_use]
    pub const fn with_pointer_id(mut self, pointer_id: u32) -> Self {
        self.pointer_id = pointer_id;
        self
    }
}
