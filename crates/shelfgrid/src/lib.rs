#![forbid(unsafe_code)]

//! shelfgrid public facade.
//!
//! Re-exports the pieces a host needs to put a draggable shelf on screen:
//! load a [`ShelfSnapshot`], wrap the resulting [`LayoutStore`] in a
//! [`ShelfSurface`], feed it [`PointerEvent`]s, and render the returned
//! [`SurfaceEffect`]s. Committed layouts reach your [`PersistenceSink`]
//! after the configured quiet period.
//!
//! ```no_run
//! use shelfgrid::prelude::*;
//!
//! let snapshot = ShelfSnapshot::from_json_str(r#"{"colsPerShelf": 6, "items": []}"#)?;
//! let store = LayoutStore::from_snapshot(&snapshot)?;
//! let sink = MemorySink::new();
//! let mut surface = ShelfSurface::new(ShelfConfig::default(), store, sink)?;
//! let effect = surface.handle(PointerEvent::down(10.0, 10.0));
//! # let _ = effect;
//! # Ok::<(), shelfgrid::Error>(())
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use shelfgrid_core::{Cell, ItemId, Offset, PixelPoint, PixelRect, PointerEvent, PointerEventKind};

// --- Layout re-exports -----------------------------------------------------

pub use shelfgrid_layout::{
    CellConflict, GridMetrics, GridSize, HorizontalBias, LayoutError, LayoutStore, PackedLayout,
    Placed, Placement, PlacementRecord, PushBlocked, PushRequest, PushResolution,
    SHELF_SCHEMA_VERSION, ShelfSnapshot, SnapshotError, SnapshotItem, VacatedCell,
    first_free_cell, pack_groups, place_new_item, resolve_push,
};

// --- Runtime re-exports ----------------------------------------------------

pub use shelfgrid_runtime::{
    ConfigError, DragError, DragPreview, DropOutcome, Gesture, ItemMotion, LoadOutcome,
    MemorySink, NoopReason, PersistError, PersistenceSink, RevertReason, Selection, ShelfConfig,
    ShelfSurface, SurfaceEffect, SurfaceError, SyncStats,
};

#[cfg(feature = "tracing-json")]
pub use shelfgrid_runtime::logging::init_json_logging;

// --- Errors ---------------------------------------------------------------

/// Top-level error type for shelfgrid hosts.
#[derive(Debug)]
pub enum Error {
    /// A layout mutation was refused.
    Layout(LayoutError),
    /// A snapshot failed to parse or validate.
    Snapshot(SnapshotError),
    /// Configuration could not be loaded or is invalid.
    Config(ConfigError),
    /// A surface operation failed.
    Surface(SurfaceError),
    /// A drag could not start.
    Drag(DragError),
    /// The persistence sink reported a failure.
    Persist(PersistError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout(err) => write!(f, "{err}"),
            Self::Snapshot(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Surface(err) => write!(f, "{err}"),
            Self::Drag(err) => write!(f, "{err}"),
            Self::Persist(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Layout(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Surface(err) => Some(err),
            Self::Drag(err) => Some(err),
            Self::Persist(err) => Some(err),
        }
    }
}

impl From<LayoutError> for Error {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

impl From<SnapshotError> for Error {
    fn from(err: SnapshotError) -> Self {
        Self::Snapshot(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<SurfaceError> for Error {
    fn from(err: SurfaceError) -> Self {
        Self::Surface(err)
    }
}

impl From<DragError> for Error {
    fn from(err: DragError) -> Self {
        Self::Drag(err)
    }
}

impl From<PersistError> for Error {
    fn from(err: PersistError) -> Self {
        Self::Persist(err)
    }
}

/// Standard result type for shelfgrid APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Cell, GridMetrics, ItemId, LayoutStore, MemorySink, PersistenceSink, PixelPoint,
        PointerEvent, ShelfConfig, ShelfSnapshot, ShelfSurface, SurfaceEffect,
    };

    pub use crate::{Error, Result};
}

pub use shelfgrid_core as core;
pub use shelfgrid_layout as layout;
pub use shelfgrid_runtime as runtime;
