//! Text Primitive - Display text content.
//!
//! A pure display component. Children of a `Text` state node are ignored.

use crate::builder::{BuildContext, TypeHandler};
use crate::engine::ComponentIndex;
use crate::tree::StateNode;
use crate::types::ComponentType;

use super::props;

pub const TEXT_TYPE: &str = "Text";
pub const TEXT: &str = "text";

/// Handler for `Text` state nodes; content comes from the `text` attribute.
#[derive(Debug, Default)]
pub struct TextHandler;

impl TypeHandler for TextHandler {
    fn type_tag(&self) -> &str {
        TEXT_TYPE
    }

    fn create(
        &self,
        cx: &mut BuildContext<'_>,
        state: &StateNode,
        parent: Option<ComponentIndex>,
    ) -> ComponentIndex {
        let index = cx.components_mut().create(parent, ComponentType::Text, TEXT_TYPE);
        self.update(cx, index, state);
        index
    }

    fn update(&self, cx: &mut BuildContext<'_>, component: ComponentIndex, state: &StateNode) {
        let Some(c) = cx.component_mut(component) else { return };
        props::apply_common(c, state);
        c.text = Some(state.attribute_string(TEXT));
    }

    fn child_container(&self, _state: &StateNode) -> Option<StateNode> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ComponentBuilder;
    use crate::tree::{NodeSpec, StateTree};

    #[test]
    fn test_text_content_follows_state() {
        let tree = StateTree::from_spec(
            &NodeSpec::with_id("Box", "root").child(NodeSpec::with_id("Text", "greeting").attr("text", "Hello")),
        );
        let mut builder = ComponentBuilder::new(tree.root());
        builder.register_standard_component_types().unwrap();
        let root = builder.managed_component().unwrap();
        let greeting = builder.components().find_by_id(root, "greeting").unwrap();
        assert_eq!(builder.components().get(greeting).unwrap().text.as_deref(), Some("Hello"));

        tree.root().child(0).unwrap().set_attribute("text", "Bye");

        let components = builder.components();
        let c = components.get(greeting).unwrap();
        assert_eq!(c.kind, ComponentType::Text);
        assert_eq!(c.text.as_deref(), Some("Bye"));
    }

    #[test]
    fn test_text_children_are_not_built() {
        let tree = StateTree::from_spec(
            &NodeSpec::with_id("Text", "label").attr("text", "x").child(NodeSpec::with_id("Text", "nested")),
        );
        let mut builder = ComponentBuilder::new(tree.root());
        builder.register_standard_component_types().unwrap();

        let root = builder.managed_component().unwrap();

        assert!(builder.components().children(root).is_empty());
        assert_eq!(builder.components().len(), 1);
    }
}
