#![forbid(unsafe_code)]

//! Interaction and persistence layer for shelfgrid.
//!
//! [`surface::ShelfSurface`] is the entry point: it routes pointer events to
//! a [`drag::DragSession`] or a [`selection::SelectionSession`], commits
//! finished drags into the layout store, and hands every committed layout to
//! a [`sync::SyncDebouncer`] that writes it to a [`sync::PersistenceSink`]
//! after a quiet period.
//!
//! # Logging
//!
//! Everything logs through `tracing` under `shelfgrid.*` targets
//! (`shelfgrid.drag`, `shelfgrid.selection`, `shelfgrid.store`,
//! `shelfgrid.surface`, `shelfgrid.sync`). No subscriber is installed
//! here; enable the `tracing-json` feature for a ready-made one.

pub mod config;
pub mod drag;
#[cfg(feature = "tracing-json")]
pub mod logging;
pub mod selection;
pub mod surface;
pub mod sync;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, InteractionConfig, ShelfConfig, SyncConfig};
pub use drag::{DragError, DragPreview, DragSession, DropOutcome, ItemMotion, RevertReason};
pub use selection::{Selection, SelectionEnd, SelectionSession, hit_test};
pub use surface::{Gesture, LoadOutcome, NoopReason, ShelfSurface, SurfaceEffect, SurfaceError};
pub use sync::{Debounce, MemorySink, PersistError, PersistenceSink, SyncDebouncer, SyncStats};
