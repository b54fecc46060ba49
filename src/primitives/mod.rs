//! Primitives - Standard component types.
//!
//! Ready-made handlers for the common state node types:
//! - [`BoxHandler`] - `Box`, a flexbox container
//! - [`TextHandler`] - `Text`, a leaf showing its `text` attribute
//! - [`ImageHandler`] - `Image`, a leaf resolved through the image provider
//!
//! All three read the shared layout and flag attributes described in
//! [`props`].

mod box_primitive;
mod image;
pub mod props;
mod text;

pub use box_primitive::{BoxHandler, BOX_TYPE};
pub use image::{ImageHandler, IMAGE_TYPE};
pub use text::{TextHandler, TEXT_TYPE};

use crate::builder::HandlerRegistry;
use crate::error::BuilderError;

/// Register the `Box`, `Text` and `Image` handlers.
pub fn register_standard_types(registry: &mut HandlerRegistry) -> Result<(), BuilderError> {
    registry.register(Box::new(BoxHandler))?;
    registry.register(Box::new(TextHandler))?;
    registry.register(Box::new(ImageHandler))?;
    Ok(())
}
