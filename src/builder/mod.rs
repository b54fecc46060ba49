//! Builder - Keeps a live component tree in step with a state tree.
//!
//! A [`ComponentBuilder`] observes one state node (usually a document root)
//! and owns the component tree built from it:
//!
//! ```text
//! StateTree                          ComponentTree
//!   Panel {id: root}      ───────▶     Panel "root"
//!     Button {id: b1}                    Button "b1"   (back)
//!     Button {id: b2}                    Button "b2"   (front)
//! ```
//!
//! The root component is created lazily by [`ComponentBuilder::managed_component`].
//! From then on every state mutation is applied synchronously: the builder
//! finds the nearest state node that maps to a live component and either
//! updates it or reconciles its children against the state.

mod config;
mod context;
mod handler;
mod image;
mod reconcile;

use std::cell::{Cell, Ref, RefCell};
use std::rc::{Rc, Weak};

use log::{debug, trace, warn};

use crate::engine::{ComponentIndex, ComponentTree};
use crate::error::BuilderError;
use crate::tree::{StateListener, StateNode};

pub use config::{BuilderConfig, DuplicateIdPolicy, ID_PROPERTY};
pub use context::BuildContext;
pub use handler::{HandlerRegistry, TypeHandler};
pub use image::{Image, ImageProvider, MemoryImageProvider};
pub use reconcile::ReconcileReport;

// =============================================================================
// ComponentBuilder
// =============================================================================

/// Owns a live component tree and keeps it synchronized with a state node.
///
/// Dropping the builder stops observation and releases every component it
/// created, root included.
pub struct ComponentBuilder {
    core: Rc<BuilderCore>,
}

impl ComponentBuilder {
    pub fn new(state: StateNode) -> Self {
        Self::with_config(state, BuilderConfig::default())
    }

    pub fn with_config(state: StateNode, config: BuilderConfig) -> Self {
        let core = Rc::new(BuilderCore {
            state,
            config,
            handlers: RefCell::new(HandlerRegistry::new()),
            components: RefCell::new(ComponentTree::new()),
            root: Cell::new(None),
            image_provider: RefCell::new(None),
        });
        let weak: Weak<BuilderCore> = Rc::downgrade(&core);
        let listener: Weak<dyn StateListener> = weak;
        core.state.tree().add_listener(listener);
        Self { core }
    }

    // -------------------------------------------------------------------------
    // Handlers
    // -------------------------------------------------------------------------

    /// Take ownership of a handler. One handler per type tag.
    pub fn register_type_handler(&mut self, handler: Box<dyn TypeHandler>) -> Result<(), BuilderError> {
        let tag = handler.type_tag().to_string();
        self.core.handlers.borrow_mut().register(handler)?;
        debug!("builder: registered handler for `{tag}`");
        Ok(())
    }

    pub fn register<H: TypeHandler + 'static>(&mut self, handler: H) -> Result<(), BuilderError> {
        self.register_type_handler(Box::new(handler))
    }

    /// Install handlers for the built-in `Box`, `Text` and `Image` types.
    pub fn register_standard_component_types(&mut self) -> Result<(), BuilderError> {
        crate::primitives::register_standard_types(&mut self.core.handlers.borrow_mut())
    }

    pub fn num_handlers(&self) -> usize {
        self.core.handlers.borrow().len()
    }

    /// Handler at `index` in registration order.
    pub fn handler(&self, index: usize) -> Option<Ref<'_, dyn TypeHandler>> {
        Ref::filter_map(self.core.handlers.borrow(), |handlers| handlers.get(index)).ok()
    }

    pub fn handler_types(&self) -> Vec<String> {
        self.core.handlers.borrow().type_tags()
    }

    // -------------------------------------------------------------------------
    // Components
    // -------------------------------------------------------------------------

    /// The root component, created on first call.
    pub fn managed_component(&self) -> Result<ComponentIndex, BuilderError> {
        if let Some(root) = self.core.live_root() {
            return Ok(root);
        }
        if self.core.handlers.borrow().is_empty() {
            return Err(BuilderError::NoHandlers);
        }

        let state = &self.core.state;
        let created = self
            .core
            .with_context(|cx| {
                cx.handler_for(state)
                    .map(|handler| cx.create_component(handler, state, None))
            })
            .ok_or(BuilderError::Reentrant)?;
        let root = created.ok_or_else(|| BuilderError::UnknownType(state.type_tag()))?;

        self.core.root.set(Some(root));
        debug!("builder: created root {root:?} for `{}`", state.type_tag());
        Ok(root)
    }

    /// Reconcile `parent`'s children against the children of `container`.
    pub fn update_child_components(
        &self,
        parent: ComponentIndex,
        container: &StateNode,
    ) -> Result<ReconcileReport, BuilderError> {
        self.core
            .with_context(|cx| cx.update_child_components(parent, container))
            .ok_or(BuilderError::Reentrant)
    }

    /// Live component currently mapped to `state`, if any.
    pub fn component_for_state(&self, state: &StateNode) -> Option<ComponentIndex> {
        let root = self.core.live_root()?;
        if !state.is_within(&self.core.state) {
            return None;
        }
        let components = self.core.components.try_borrow().ok()?;
        let handlers = self.core.handlers.try_borrow().ok()?;
        match self.core.locator(root, &components, &handlers).resolve(state) {
            Mapping::Live(_, component) => Some(component),
            Mapping::Missing | Mapping::Unmapped => None,
        }
    }

    /// Read access to the live components.
    ///
    /// Holding the guard while mutating the state tree makes the builder skip
    /// those mutations.
    pub fn components(&self) -> Ref<'_, ComponentTree> {
        self.core.components.borrow()
    }

    pub fn state(&self) -> &StateNode {
        &self.core.state
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.core.config
    }

    // -------------------------------------------------------------------------
    // Image provider
    // -------------------------------------------------------------------------

    pub fn set_image_provider(&self, provider: Option<Rc<dyn ImageProvider>>) {
        *self.core.image_provider.borrow_mut() = provider;
    }

    pub fn image_provider(&self) -> Option<Rc<dyn ImageProvider>> {
        self.core.image_provider.borrow().clone()
    }
}

impl Drop for ComponentBuilder {
    fn drop(&mut self) {
        let weak: Weak<BuilderCore> = Rc::downgrade(&self.core);
        let listener: Weak<dyn StateListener> = weak;
        self.core.state.tree().remove_listener(&listener);

        if let Some(root) = self.core.root.take() {
            match self.core.components.try_borrow_mut() {
                Ok(mut components) => components.release(root),
                Err(_) => warn!("builder: dropped while synchronizing; components go with the arena"),
            }
            debug!("builder: released root {root:?}");
        }
    }
}

// =============================================================================
// BuilderCore - the listener half
// =============================================================================

/// Which part of a mapped component a mutation invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    /// Attributes only: handler `update`.
    Properties,
    /// Child list only: reconcile the child container.
    Children,
    /// Both, used once the walk has moved up from an unmapped node.
    Subtree,
}

impl Change {
    fn touches_properties(self) -> bool {
        matches!(self, Self::Properties | Self::Subtree)
    }

    fn touches_children(self) -> bool {
        matches!(self, Self::Children | Self::Subtree)
    }
}

enum Mapping<'h> {
    Live(&'h dyn TypeHandler, ComponentIndex),
    /// Mapped by handler and id, but no such component exists.
    Missing,
    Unmapped,
}

/// Finds the component built for a state node by retracing the path the
/// builder took from its root state.
///
/// Identifiers are only unique among siblings, so each step matches against
/// the direct children of the component found for the step above, never
/// against the whole tree.
struct Locator<'c, 'h> {
    root_state: &'c StateNode,
    id_attribute: &'c str,
    root: ComponentIndex,
    components: &'c ComponentTree,
    handlers: &'h HandlerRegistry,
}

impl<'h> Locator<'_, 'h> {
    fn resolve(&self, node: &StateNode) -> Mapping<'h> {
        let Some(handler) = self.handlers.handler_for(node) else {
            return Mapping::Unmapped;
        };
        if node == self.root_state {
            return Mapping::Live(handler, self.root);
        }
        let id = node.attribute_string(self.id_attribute);
        if id.is_empty() {
            return Mapping::Unmapped;
        }
        let Some(container) = node.parent() else {
            return Mapping::Unmapped;
        };
        match self.owner_of(&container) {
            Mapping::Live(_, parent) => match self.nth_child_with_id(parent, &container, node, &id) {
                Some(component) => Mapping::Live(handler, component),
                None => Mapping::Missing,
            },
            other => other,
        }
    }

    /// The nearest mapped node at or above `container`, provided it takes its
    /// children from `container`.
    fn owner_of(&self, container: &StateNode) -> Mapping<'h> {
        let mut candidate = container.clone();
        loop {
            match self.resolve(&candidate) {
                Mapping::Live(handler, component) => {
                    return if handler.child_container(&candidate).as_ref() == Some(container) {
                        Mapping::Live(handler, component)
                    } else {
                        Mapping::Unmapped
                    };
                }
                Mapping::Missing => return Mapping::Missing,
                Mapping::Unmapped => {}
            }
            if candidate == *self.root_state {
                return Mapping::Unmapped;
            }
            match candidate.parent() {
                Some(parent) => candidate = parent,
                None => return Mapping::Unmapped,
            }
        }
    }

    /// Siblings sharing an id map in order: the k-th such state owns the
    /// k-th such component, which is how reconciliation leaves them stacked.
    fn nth_child_with_id(
        &self,
        parent: ComponentIndex,
        container: &StateNode,
        node: &StateNode,
        id: &str,
    ) -> Option<ComponentIndex> {
        let occurrence = container
            .children()
            .iter()
            .take_while(|sibling| *sibling != node)
            .filter(|sibling| {
                sibling.attribute_string(self.id_attribute) == id
                    && self.handlers.handler_for(sibling).is_some()
            })
            .count();
        self.components
            .children(parent)
            .iter()
            .copied()
            .filter(|&c| self.components.component_id(c) == Some(id))
            .nth(occurrence)
    }
}

struct BuilderCore {
    state: StateNode,
    config: BuilderConfig,
    handlers: RefCell<HandlerRegistry>,
    components: RefCell<ComponentTree>,
    root: Cell<Option<ComponentIndex>>,
    image_provider: RefCell<Option<Rc<dyn ImageProvider>>>,
}

impl BuilderCore {
    fn live_root(&self) -> Option<ComponentIndex> {
        let root = self.root.get()?;
        let alive = self
            .components
            .try_borrow()
            .map(|c| c.contains(root))
            .unwrap_or(true);
        alive.then_some(root)
    }

    /// Run `f` with exclusive access to the components, or warn and return
    /// `None` when a pass is already in progress.
    fn with_context<R>(&self, f: impl FnOnce(&mut BuildContext<'_>) -> R) -> Option<R> {
        let Ok(mut components) = self.components.try_borrow_mut() else {
            warn!("builder: state changed during synchronization; ignoring nested change");
            return None;
        };
        let Ok(handlers) = self.handlers.try_borrow() else {
            warn!("builder: handler registry busy; ignoring change");
            return None;
        };
        let provider = self.image_provider.borrow().clone();
        let mut cx = BuildContext::new(&mut components, &handlers, &self.config, provider.as_deref());
        Some(f(&mut cx))
    }

    fn locator<'c, 'h>(
        &'c self,
        root: ComponentIndex,
        components: &'c ComponentTree,
        handlers: &'h HandlerRegistry,
    ) -> Locator<'c, 'h> {
        Locator {
            root_state: &self.state,
            id_attribute: &self.config.id_attribute,
            root,
            components,
            handlers,
        }
    }

    /// Apply a mutation of `node` at its nearest mapped ancestor.
    fn refresh(&self, node: &StateNode, change: Change) {
        let Some(root) = self.root.get() else { return };
        if !node.is_within(&self.state) {
            return;
        }

        self.with_context(|cx| {
            let mut node = node.clone();
            let mut change = change;
            loop {
                let mapping = self.locator(root, cx.components(), cx.handlers()).resolve(&node);
                match mapping {
                    Mapping::Live(handler, component) => {
                        trace!("builder: {change:?} refresh of `{}` at {component:?}", node.type_tag());
                        if change.touches_properties() {
                            if component == root {
                                // The root is never matched by id, so a rename only relabels it.
                                let id = cx.state_id(&node);
                                cx.components_mut().set_component_id(root, &id);
                            }
                            handler.update(cx, component, &node);
                        }
                        if change.touches_children() {
                            if let Some(container) = handler.child_container(&node) {
                                cx.update_child_components(component, &container);
                            }
                        }
                        return;
                    }
                    Mapping::Missing => {
                        trace!("builder: `{}` has no live component; nothing to refresh", node.type_tag());
                        return;
                    }
                    Mapping::Unmapped => {}
                }

                if node == self.state {
                    return;
                }
                let Some(parent) = node.parent() else { return };
                node = parent;
                change = Change::Subtree;
            }
        });
    }
}

impl StateListener for BuilderCore {
    fn attribute_changed(&self, node: &StateNode, name: &str) {
        // A new id no longer matches the old component: rebuild it from the parent.
        if name == self.config.id_attribute && *node != self.state {
            if let Some(parent) = node.parent() {
                self.refresh(&parent, Change::Children);
                return;
            }
        }
        self.refresh(node, Change::Properties);
    }

    fn child_added(&self, parent: &StateNode, _child: &StateNode) {
        self.refresh(parent, Change::Children);
    }

    fn child_removed(&self, parent: &StateNode, _child: &StateNode, _index: usize) {
        self.refresh(parent, Change::Children);
    }

    fn child_order_changed(&self, parent: &StateNode, _old_index: usize, _new_index: usize) {
        self.refresh(parent, Change::Children);
    }

    fn parent_changed(&self, node: &StateNode) {
        self.refresh(node, Change::Properties);
    }
}
