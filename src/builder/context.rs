//! Build Context - What a type handler can reach while it works.

use log::warn;

use crate::engine::{Component, ComponentIndex, ComponentTree};
use crate::tree::StateNode;

use super::config::BuilderConfig;
use super::handler::{HandlerRegistry, TypeHandler};
use super::image::ImageProvider;
use super::reconcile::{self, ReconcileReport};

/// Borrowed view of a builder during one synchronization pass.
pub struct BuildContext<'a> {
    components: &'a mut ComponentTree,
    handlers: &'a HandlerRegistry,
    config: &'a BuilderConfig,
    image_provider: Option<&'a dyn ImageProvider>,
}

impl<'a> BuildContext<'a> {
    pub(crate) fn new(
        components: &'a mut ComponentTree,
        handlers: &'a HandlerRegistry,
        config: &'a BuilderConfig,
        image_provider: Option<&'a dyn ImageProvider>,
    ) -> Self {
        Self {
            components,
            handlers,
            config,
            image_provider,
        }
    }

    pub fn components(&self) -> &ComponentTree {
        &*self.components
    }

    pub fn components_mut(&mut self) -> &mut ComponentTree {
        &mut *self.components
    }

    pub fn component_mut(&mut self, index: ComponentIndex) -> Option<&mut Component> {
        self.components.get_mut(index)
    }

    pub fn config(&self) -> &'a BuilderConfig {
        self.config
    }

    pub fn image_provider(&self) -> Option<&'a dyn ImageProvider> {
        self.image_provider
    }

    pub(crate) fn handlers(&self) -> &'a HandlerRegistry {
        self.handlers
    }

    pub fn handler_for(&self, state: &StateNode) -> Option<&'a dyn TypeHandler> {
        self.handlers.handler_for(state)
    }

    /// Stable identifier of a state node; empty when it has none.
    pub fn state_id(&self, state: &StateNode) -> String {
        state.attribute_string(&self.config.id_attribute)
    }

    /// Create a component through `handler`, assign its identifier and build
    /// its children.
    ///
    /// # Panics
    ///
    /// If the handler returns a dead component or attaches it anywhere other
    /// than `parent`. Every later reconciliation relies on both.
    pub fn create_component(
        &mut self,
        handler: &dyn TypeHandler,
        state: &StateNode,
        parent: Option<ComponentIndex>,
    ) -> ComponentIndex {
        let component = handler.create(self, state, parent);
        assert!(
            self.components.contains(component),
            "handler `{}` returned a component that is not alive",
            handler.type_tag()
        );
        assert_eq!(
            self.components.parent(component),
            parent,
            "handler `{}` attached its component to the wrong parent",
            handler.type_tag()
        );

        let id = self.state_id(state);
        if let Some(parent) = parent.filter(|_| !id.is_empty()) {
            let clash = self
                .components
                .children(parent)
                .iter()
                .any(|&c| c != component && self.components.component_id(c) == Some(id.as_str()));
            if clash {
                warn!("builder: `{id}` already names a sibling component");
            }
        }
        self.components.set_component_id(component, &id);

        if let Some(container) = handler.child_container(state) {
            self.update_child_components(component, &container);
        }
        component
    }

    /// Reconcile `parent`'s children against the children of `container`.
    pub fn update_child_components(
        &mut self,
        parent: ComponentIndex,
        container: &StateNode,
    ) -> ReconcileReport {
        reconcile::reconcile_children(self, parent, &container.children())
    }

    /// Reconcile `parent`'s children against an explicit list of states.
    pub fn reconcile_children(
        &mut self,
        parent: ComponentIndex,
        children: &[StateNode],
    ) -> ReconcileReport {
        reconcile::reconcile_children(self, parent, children)
    }
}
