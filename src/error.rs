//! Error types.
//!
//! Structural misuse that a caller can recover from is reported through these
//! enums. Identity violations inside the builder are assertions, not errors.

use thiserror::Error;

use crate::tree::NodeId;

/// Errors raised by state tree mutations.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("node {0:?} already has a parent")]
    AlreadyParented(NodeId),

    #[error("cannot add node {child:?} under itself or its own descendant {parent:?}")]
    WouldCycle { parent: NodeId, child: NodeId },

    #[error("node {0:?} belongs to a different state tree")]
    ForeignNode(NodeId),

    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("child index {index} out of range ({len} children)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid state tree json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while configuring a builder or creating its root component.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuilderError {
    #[error("a handler for type `{0}` is already registered")]
    DuplicateHandler(String),

    #[error("no type handlers registered; register them before building components")]
    NoHandlers,

    #[error("no handler registered for state type `{0}`")]
    UnknownType(String),

    #[error("builder is already synchronizing")]
    Reentrant,
}

/// Errors raised by layout computation.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("component {0:?} is not part of the component tree")]
    UnknownComponent(crate::engine::ComponentIndex),

    #[error("layout engine failure: {0}")]
    Taffy(#[from] taffy::TaffyError),
}
