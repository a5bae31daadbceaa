#![forbid(unsafe_code)]

//! Core: pixel geometry, pointer events, and item identities.
//!
//! # Role in shelfgrid
//! `shelfgrid-core` is the vocabulary layer. It owns the pixel-space
//! primitives the mapper and hit-testing work in, the normalized pointer
//! events the interaction surface consumes, and the [`ItemId`] / [`Cell`]
//! pair that every placement is expressed in.
//!
//! # How it fits in the system
//! `shelfgrid-layout` builds the grid mapper, layout store, and push resolver
//! on top of these types. `shelfgrid-runtime` drives them from pointer input.
//! Nothing in this crate knows about rows, capacity, or persistence.

pub mod event;
pub mod geometry;
pub mod item;

pub use event::{PointerEvent, PointerEventKind};
pub use geometry::{Offset, PixelPoint, PixelRect};
pub use item::{Cell, ItemId};
