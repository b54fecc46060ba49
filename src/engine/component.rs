//! Component - One live UI instance.

use indexmap::IndexMap;

use crate::builder::Image;
use crate::types::{ComponentFlags, ComponentType, NodeStyle, Value};

/// Generational handle to a component in a [`ComponentTree`](super::ComponentTree).
///
/// Slots are reused after release; the generation makes a stale handle
/// miss instead of silently naming the new occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentIndex {
    pub(crate) slot: u32,
    pub(crate) generation: u32,
}

impl ComponentIndex {
    /// Arena slot of this component.
    pub fn slot(self) -> usize {
        self.slot as usize
    }
}

/// A live component instance.
#[derive(Debug, Clone)]
pub struct Component {
    pub(crate) component_id: String,
    pub(crate) parent: Option<ComponentIndex>,
    /// Back-to-front: the last child is frontmost.
    pub(crate) children: Vec<ComponentIndex>,
    pub type_tag: String,
    pub kind: ComponentType,
    pub flags: ComponentFlags,
    pub style: NodeStyle,
    pub text: Option<String>,
    pub image: Option<Image>,
    /// Free-form properties for custom handlers.
    pub props: IndexMap<String, Value>,
}

impl Component {
    pub(crate) fn new(parent: Option<ComponentIndex>, kind: ComponentType, type_tag: &str) -> Self {
        Self {
            component_id: String::new(),
            parent,
            children: Vec::new(),
            type_tag: type_tag.to_string(),
            kind,
            flags: ComponentFlags::default(),
            style: NodeStyle::default(),
            text: None,
            image: None,
            props: IndexMap::new(),
        }
    }

    /// Stable identifier copied from the source state node.
    pub fn component_id(&self) -> &str {
        &self.component_id
    }

    pub fn parent(&self) -> Option<ComponentIndex> {
        self.parent
    }

    /// Direct children, back-to-front.
    pub fn children(&self) -> &[ComponentIndex] {
        &self.children
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(ComponentFlags::VISIBLE)
    }
}
