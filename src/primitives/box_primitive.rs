//! Box Primitive - Container component with flexbox layout.
//!
//! The fundamental container. Its children are built from the state node's
//! own children, so a `Box` nests arbitrarily:
//!
//! ```json
//! { "type": "Box", "attributes": { "id": "row", "direction": "row", "gap": 1 },
//!   "children": [ { "type": "Text", "attributes": { "id": "a", "text": "A" } } ] }
//! ```

use crate::builder::{BuildContext, TypeHandler};
use crate::engine::ComponentIndex;
use crate::tree::StateNode;
use crate::types::ComponentType;

use super::props;

pub const BOX_TYPE: &str = "Box";

/// Handler for `Box` state nodes.
#[derive(Debug, Default)]
pub struct BoxHandler;

impl TypeHandler for BoxHandler {
    fn type_tag(&self) -> &str {
        BOX_TYPE
    }

    fn create(
        &self,
        cx: &mut BuildContext<'_>,
        state: &StateNode,
        parent: Option<ComponentIndex>,
    ) -> ComponentIndex {
        // 1. ALLOCATE under the requested parent
        let index = cx.components_mut().create(parent, ComponentType::Box, BOX_TYPE);

        // 2. BIND attributes
        self.update(cx, index, state);
        index
    }

    fn update(&self, cx: &mut BuildContext<'_>, component: ComponentIndex, state: &StateNode) {
        if let Some(c) = cx.component_mut(component) {
            props::apply_common(c, state);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
