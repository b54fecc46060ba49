//! Layout - Flexbox geometry for live components.
//!
//! Uses [Taffy](https://github.com/DioxusLabs/taffy) for flexbox computation.
//! The bridge:
//!
//! 1. Converts component styles → Taffy styles
//! 2. Builds a Taffy tree from the component hierarchy
//! 3. Measures text leaves by characters and lines
//! 4. Reads the computed rectangles back, in absolute cells
//!
//! Layout only reads the component tree; call it again after the state
//! changes.

mod taffy_bridge;
mod text_measure;

pub use taffy_bridge::{compute_layout, ComputedLayout, LayoutRect};
pub use text_measure::{text_height, text_width};
