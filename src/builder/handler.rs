//! Type handlers and their registry.

use crate::engine::ComponentIndex;
use crate::error::BuilderError;
use crate::tree::StateNode;

use super::context::BuildContext;

/// Creates and updates live components for one state node type.
///
/// A handler is owned by the builder it is registered with.
pub trait TypeHandler {
    /// State node type this handler serves.
    fn type_tag(&self) -> &str;

    /// Create a component for `state`, attached to exactly `parent`.
    ///
    /// The builder assigns the identifier and builds children afterwards.
    fn create(
        &self,
        cx: &mut BuildContext<'_>,
        state: &StateNode,
        parent: Option<ComponentIndex>,
    ) -> ComponentIndex;

    /// Bring an existing component in line with `state`'s attributes.
    ///
    /// Must not change the component's identifier or parent.
    fn update(&self, cx: &mut BuildContext<'_>, component: ComponentIndex, state: &StateNode);

    /// Node whose children become this component's children.
    ///
    /// Defaults to `state` itself. Leaf types return `None`; containers that
    /// keep their children under a grouping node return that node.
    fn child_container(&self, state: &StateNode) -> Option<StateNode> {
        Some(state.clone())
    }
}

/// Type tag → handler, one handler per tag.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: Vec<Box<dyn TypeHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a handler.
    pub fn register(&mut self, handler: Box<dyn TypeHandler>) -> Result<(), BuilderError> {
        if self.handler_for_type(handler.type_tag()).is_some() {
            return Err(BuilderError::DuplicateHandler(handler.type_tag().to_string()));
        }
        self.handlers.push(handler);
        Ok(())
    }

    /// Handler for a state node's type, by linear scan.
    pub fn handler_for(&self, state: &StateNode) -> Option<&dyn TypeHandler> {
        self.handlers
            .iter()
            .find(|h| state.has_type(h.type_tag()))
            .map(|h| h.as_ref())
    }

    pub fn handler_for_type(&self, type_tag: &str) -> Option<&dyn TypeHandler> {
        self.handlers
            .iter()
            .find(|h| h.type_tag() == type_tag)
            .map(|h| h.as_ref())
    }

    pub fn get(&self, index: usize) -> Option<&(dyn TypeHandler + 'static)> {
        self.handlers.get(index).map(|h| h.as_ref())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered type tags in registration order.
    pub fn type_tags(&self) -> Vec<String> {
        self.handlers.iter().map(|h| h.type_tag().to_string()).collect()
    }
}
