//! # component-builder
//!
//! Keeps a tree of live UI components in step with a declarative state tree.
//!
//! ## Architecture
//!
//! The state tree is a document of typed nodes with attributes. A
//! [`ComponentBuilder`] observes it and owns the live components built from
//! it, one per identified state node:
//!
//! ```text
//! StateTree mutation → listener → nearest mapped ancestor → update / reconcile → ComponentTree
//! ```
//!
//! Reconciliation matches children by their `id` attribute, so reordering
//! keeps every component instance and only moves it in the stacking order.
//!
//! ## Modules
//!
//! - [`tree`] - State tree document, node handles and listeners
//! - [`engine`] - Live component arena with generational indices
//! - [`builder`] - Type handlers, reconciliation and change propagation
//! - [`primitives`] - Standard `Box`, `Text` and `Image` handlers
//! - [`layout`] - Taffy flexbox layout of a component tree
//! - [`types`] - Attribute values, dimensions, flags
//!
//! ## Example
//!
//! ```
//! use component_builder::{ComponentBuilder, StateTree};
//!
//! let tree = StateTree::from_json(r#"{
//!     "type": "Box", "attributes": { "id": "root" },
//!     "children": [
//!         { "type": "Text", "attributes": { "id": "b1", "text": "one" } },
//!         { "type": "Text", "attributes": { "id": "b2", "text": "two" } }
//!     ]
//! }"#).unwrap();
//!
//! let mut builder = ComponentBuilder::new(tree.root());
//! builder.register_standard_component_types().unwrap();
//! let root = builder.managed_component().unwrap();
//!
//! tree.root().move_child(0, 1).unwrap();
//! assert_eq!(builder.components().child_ids(root), vec!["b2", "b1"]);
//! ```

pub mod builder;
pub mod engine;
pub mod error;
pub mod layout;
pub mod primitives;
pub mod tree;
pub mod types;

pub use builder::{
    BuildContext, BuilderConfig, ComponentBuilder, DuplicateIdPolicy, HandlerRegistry, Image,
    ImageProvider, MemoryImageProvider, ReconcileReport, TypeHandler,
};
pub use engine::{Component, ComponentIndex, ComponentTree};
pub use error::{BuilderError, LayoutError, TreeError};
pub use layout::{compute_layout, ComputedLayout, LayoutRect};
pub use tree::{NodeId, NodeSpec, StateListener, StateNode, StateTree};
pub use types::*;
