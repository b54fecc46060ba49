//! Engine - Live component storage.
//!
//! The engine holds the live side of synchronization:
//! - Registry: slot allocation, generational handles, recursive release
//! - Component: one live instance with its identifier, flags and style
//!
//! # Architecture
//!
//! Components live in an arena and refer to each other by index:
//!
//! ```text
//! Slot 0: Panel  (parent=None, id="root", children=[1, 2])
//! Slot 1: Button (parent=0,    id="b1",   children=[])
//! Slot 2: Button (parent=0,    id="b2",   children=[])
//! ```
//!
//! Children are stored back-to-front, so the last child is frontmost.

mod component;
mod registry;

pub use component::{Component, ComponentIndex};
pub use registry::{ComponentStats, ComponentTree};
