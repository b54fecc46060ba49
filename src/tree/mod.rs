//! State Tree - The declarative side of synchronization.
//!
//! A document of typed nodes, each with ordered attributes and ordered
//! children. Mutations notify registered [`StateListener`]s synchronously,
//! before the mutating call returns.
//!
//! ```text
//! StateTree (document, owns all nodes)
//!   └─ StateNode "Panel" {id: "root"}
//!        ├─ StateNode "Button" {id: "b1"}
//!        └─ StateNode "Button" {id: "b2"}
//! ```

mod listener;
mod node;
mod spec;

pub use listener::StateListener;
pub use node::{NodeId, StateNode, StateTree};
pub use spec::NodeSpec;
