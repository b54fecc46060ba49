//! State tree document and node handles.
//!
//! The document keeps its nodes in a slot arena. Nodes are addressed by
//! generational [`NodeId`]s; [`StateNode`] pairs an id with a document handle
//! so it can be passed around and cloned like a value.
//!
//! Every slot counts the `StateNode` handles pointing at it. A subtree that is
//! detached from the document root and has no handles left anywhere inside it
//! can never be reached again, so its slots return to the free pool.
//!
//! Parent links are plain ids, used only for walking upward. Ownership of
//! nodes never follows them.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use log::trace;

use crate::error::TreeError;
use crate::types::Value;

use super::listener::{ListenerList, StateListener};

/// Arena index of a state node within its document.
///
/// The generation changes every time a slot is reused, so an id kept past
/// its node's lifetime never names a different node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    slot: u32,
    generation: u32,
}

impl NodeId {
    /// Raw arena index.
    pub fn index(self) -> usize {
        self.slot as usize
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

struct NodeData {
    type_tag: String,
    attributes: IndexMap<String, Value>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl NodeData {
    fn new(type_tag: &str) -> Self {
        Self {
            type_tag: type_tag.to_string(),
            attributes: IndexMap::new(),
            children: Vec::new(),
            parent: None,
        }
    }
}

struct Slot {
    generation: u32,
    node: Option<NodeData>,
    /// Live `StateNode` handles naming this slot.
    handles: Cell<usize>,
}

struct TreeData {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    root: NodeId,
    listeners: ListenerList,
}

impl TreeData {
    fn new(root_type: &str) -> Self {
        let mut data = Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            root: NodeId { slot: 0, generation: 0 },
            listeners: ListenerList::default(),
        };
        data.root = data.alloc(root_type);
        data
    }

    fn alloc(&mut self, type_tag: &str) -> NodeId {
        let node = NodeData::new(type_tag);
        self.live += 1;

        // Reuse free slot or allocate new
        match self.free.pop() {
            Some(slot) => {
                let entry = &mut self.slots[slot as usize];
                entry.node = Some(node);
                NodeId {
                    slot,
                    generation: entry.generation,
                }
            }
            None => {
                let slot = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                    handles: Cell::new(0),
                });
                NodeId { slot, generation: 0 }
            }
        }
    }

    fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.slots
            .get(id.slot as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.node.as_ref())
    }

    /// A node that a handle or a live parent refers to.
    ///
    /// # Panics
    ///
    /// If the node was freed, which handle counting rules out.
    fn node(&self, id: NodeId) -> &NodeData {
        self.get(id)
            .unwrap_or_else(|| panic!("state node {id:?} used after it was freed"))
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        self.slots
            .get_mut(id.slot as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.node.as_mut())
            .unwrap_or_else(|| panic!("state node {id:?} used after it was freed"))
    }

    fn acquire(&self, id: NodeId) {
        if let Some(slot) = self.slots.get(id.slot as usize) {
            slot.handles.set(slot.handles.get() + 1);
        }
    }

    /// Drop one handle; true when it was the last one.
    fn release(&self, id: NodeId) -> bool {
        match self.slots.get(id.slot as usize) {
            Some(slot) if slot.generation == id.generation => {
                let remaining = slot.handles.get().saturating_sub(1);
                slot.handles.set(remaining);
                remaining == 0
            }
            _ => false,
        }
    }

    fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).parent;
        }
        false
    }

    /// Free the detached subtree containing `id` once nothing refers to it.
    /// Returns the number of nodes freed.
    fn collect(&mut self, id: NodeId) -> usize {
        if self.get(id).is_none() {
            return 0;
        }
        let mut top = id;
        while let Some(parent) = self.node(top).parent {
            top = parent;
        }
        if top == self.root {
            return 0;
        }

        let mut doomed = Vec::new();
        let mut stack = vec![top];
        while let Some(current) = stack.pop() {
            if self.slots[current.slot as usize].handles.get() > 0 {
                return 0;
            }
            doomed.push(current);
            stack.extend(self.node(current).children.iter().copied());
        }

        for current in &doomed {
            let entry = &mut self.slots[current.slot as usize];
            entry.node = None;
            entry.generation = entry.generation.wrapping_add(1);
            self.free.push(current.slot);
        }
        self.live -= doomed.len();
        doomed.len()
    }
}

// =============================================================================
// StateTree
// =============================================================================

/// A state tree document.
///
/// Cloning is cheap and yields another handle to the same document.
#[derive(Clone)]
pub struct StateTree {
    inner: Rc<RefCell<TreeData>>,
}

impl StateTree {
    /// Create a document whose root node has the given type.
    pub fn new(root_type: &str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(TreeData::new(root_type))),
        }
    }

    /// The root node.
    pub fn root(&self) -> StateNode {
        let root = self.inner.borrow().root;
        self.handle(root)
    }

    /// Handle for a node id of this document, if that node still exists.
    pub fn node(&self, id: NodeId) -> Option<StateNode> {
        let alive = self.inner.borrow().get(id).is_some();
        alive.then(|| self.handle(id))
    }

    /// Create a detached node. It joins the hierarchy through `add_child`.
    ///
    /// A detached node is freed when its last handle goes away.
    pub fn create_node(&self, type_tag: &str) -> StateNode {
        let id = self.inner.borrow_mut().alloc(type_tag);
        self.handle(id)
    }

    /// Number of nodes currently alive in this document.
    pub fn node_count(&self) -> usize {
        self.inner.borrow().live
    }

    /// Register a listener. Registering the same listener twice is a no-op.
    pub fn add_listener(&self, listener: Weak<dyn StateListener>) {
        self.inner.borrow_mut().listeners.add(listener);
    }

    /// Unregister a listener.
    pub fn remove_listener(&self, listener: &Weak<dyn StateListener>) {
        self.inner.borrow_mut().listeners.remove(listener);
    }

    /// Number of live registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Whether both handles point at the same document.
    pub fn same_document(&self, other: &StateTree) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Must not be called while the document is mutably borrowed.
    fn handle(&self, id: NodeId) -> StateNode {
        self.inner.borrow().acquire(id);
        StateNode {
            tree: self.clone(),
            id,
        }
    }

    fn notify(&self, f: impl Fn(&dyn StateListener)) {
        // The borrow ends before dispatch so listeners can read the tree.
        let listeners = self.inner.borrow_mut().listeners.snapshot();
        for listener in listeners {
            f(listener.as_ref());
        }
    }

    pub(super) fn with_data<R>(&self, f: impl FnOnce(&TreeDataView<'_>) -> R) -> R {
        let data = self.inner.borrow();
        f(&TreeDataView { data: &data })
    }

    /// Allocate a detached node with attributes, without notifications.
    pub(super) fn build_detached(
        &self,
        type_tag: &str,
        attributes: IndexMap<String, Value>,
    ) -> StateNode {
        let id = {
            let mut data = self.inner.borrow_mut();
            let id = data.alloc(type_tag);
            data.node_mut(id).attributes = attributes;
            id
        };
        self.handle(id)
    }

    pub(super) fn link_silently(&self, parent: NodeId, child: NodeId) {
        let mut data = self.inner.borrow_mut();
        data.node_mut(child).parent = Some(parent);
        data.node_mut(parent).children.push(child);
    }
}

impl fmt::Debug for StateTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.borrow();
        f.debug_struct("StateTree")
            .field("root", &data.root)
            .field("nodes", &data.live)
            .finish()
    }
}

/// Read-only access to document internals for sibling modules.
pub(super) struct TreeDataView<'a> {
    data: &'a TreeData,
}

impl TreeDataView<'_> {
    pub(super) fn type_tag(&self, id: NodeId) -> &str {
        &self.data.node(id).type_tag
    }

    pub(super) fn attributes(&self, id: NodeId) -> &IndexMap<String, Value> {
        &self.data.node(id).attributes
    }

    pub(super) fn children(&self, id: NodeId) -> &[NodeId] {
        &self.data.node(id).children
    }
}

// =============================================================================
// StateNode
// =============================================================================

/// Handle to one node of a state tree.
///
/// Equality is identity: two handles are equal when they name the same node
/// of the same document. A node stays alive while any handle to it exists.
pub struct StateNode {
    tree: StateTree,
    id: NodeId,
}

impl Clone for StateNode {
    fn clone(&self) -> Self {
        self.tree.handle(self.id)
    }
}

impl Drop for StateNode {
    fn drop(&mut self) {
        let last = match self.tree.inner.try_borrow() {
            Ok(data) => data.release(self.id),
            Err(_) => false,
        };
        if !last {
            return;
        }
        if let Ok(mut data) = self.tree.inner.try_borrow_mut() {
            let freed = data.collect(self.id);
            if freed > 0 {
                trace!("state: freed {freed} detached node(s) from {:?}", self.id);
            }
        }
    }
}

impl PartialEq for StateNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.tree.same_document(&other.tree)
    }
}

impl Eq for StateNode {}

impl fmt::Debug for StateNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.tree.inner.borrow();
        let node = data.node(self.id);
        f.debug_struct("StateNode")
            .field("id", &self.id)
            .field("type", &node.type_tag)
            .field("children", &node.children.len())
            .finish()
    }
}

impl StateNode {
    /// Arena id of this node.
    pub fn node_id(&self) -> NodeId {
        self.id
    }

    /// The owning document.
    pub fn tree(&self) -> &StateTree {
        &self.tree
    }

    // -------------------------------------------------------------------------
    // Type and attributes
    // -------------------------------------------------------------------------

    pub fn type_tag(&self) -> String {
        self.tree.inner.borrow().node(self.id).type_tag.clone()
    }

    pub fn has_type(&self, type_tag: &str) -> bool {
        self.tree.inner.borrow().node(self.id).type_tag == type_tag
    }

    pub fn attribute(&self, name: &str) -> Option<Value> {
        self.tree.inner.borrow().node(self.id).attributes.get(name).cloned()
    }

    /// Attribute rendered as a string; empty when absent.
    pub fn attribute_string(&self, name: &str) -> String {
        self.attribute(name).map(|v| v.to_string()).unwrap_or_default()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.tree.inner.borrow().node(self.id).attributes.contains_key(name)
    }

    /// All attributes in insertion order.
    pub fn attributes(&self) -> Vec<(String, Value)> {
        self.tree
            .inner
            .borrow()
            .node(self.id)
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Set an attribute. Listeners hear about it only if the value changed.
    pub fn set_attribute(&self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        let changed = {
            let mut data = self.tree.inner.borrow_mut();
            let attributes = &mut data.node_mut(self.id).attributes;
            if attributes.get(name) == Some(&value) {
                false
            } else {
                attributes.insert(name.to_string(), value);
                true
            }
        };
        if changed {
            self.tree.notify(|l| l.attribute_changed(self, name));
        }
    }

    /// Remove an attribute, returning its old value.
    pub fn remove_attribute(&self, name: &str) -> Option<Value> {
        let old = self
            .tree
            .inner
            .borrow_mut()
            .node_mut(self.id)
            .attributes
            .shift_remove(name);
        if old.is_some() {
            self.tree.notify(|l| l.attribute_changed(self, name));
        }
        old
    }

    // -------------------------------------------------------------------------
    // Hierarchy reads
    // -------------------------------------------------------------------------

    pub fn num_children(&self) -> usize {
        self.tree.inner.borrow().node(self.id).children.len()
    }

    pub fn child(&self, index: usize) -> Option<StateNode> {
        let id = self.tree.inner.borrow().node(self.id).children.get(index).copied();
        id.map(|id| self.tree.handle(id))
    }

    /// Children in document order.
    pub fn children(&self) -> Vec<StateNode> {
        let ids = self.tree.inner.borrow().node(self.id).children.clone();
        ids.into_iter().map(|id| self.tree.handle(id)).collect()
    }

    /// First child with the given type.
    pub fn child_with_type(&self, type_tag: &str) -> Option<StateNode> {
        let found = {
            let data = self.tree.inner.borrow();
            data.node(self.id)
                .children
                .iter()
                .copied()
                .find(|&c| data.node(c).type_tag == type_tag)
        };
        found.map(|id| self.tree.handle(id))
    }

    /// Position of `child` among this node's children.
    pub fn index_of(&self, child: &StateNode) -> Option<usize> {
        if !self.tree.same_document(&child.tree) {
            return None;
        }
        self.tree
            .inner
            .borrow()
            .node(self.id)
            .children
            .iter()
            .position(|&c| c == child.id)
    }

    pub fn parent(&self) -> Option<StateNode> {
        let parent = self.tree.inner.borrow().node(self.id).parent;
        parent.map(|id| self.tree.handle(id))
    }

    /// Whether this node is `ancestor` or lies somewhere beneath it.
    pub fn is_within(&self, ancestor: &StateNode) -> bool {
        self.tree.same_document(&ancestor.tree)
            && self.tree.inner.borrow().is_within(self.id, ancestor.id)
    }

    // -------------------------------------------------------------------------
    // Hierarchy mutations
    // -------------------------------------------------------------------------

    /// Insert `child` at `index` (or at the end for `None`).
    pub fn add_child(&self, child: &StateNode, index: Option<usize>) -> Result<(), TreeError> {
        if !self.tree.same_document(&child.tree) {
            return Err(TreeError::ForeignNode(child.id));
        }
        {
            let mut data = self.tree.inner.borrow_mut();
            if data.node(child.id).parent.is_some() {
                return Err(TreeError::AlreadyParented(child.id));
            }
            if data.is_within(self.id, child.id) {
                return Err(TreeError::WouldCycle {
                    parent: self.id,
                    child: child.id,
                });
            }
            let len = data.node(self.id).children.len();
            let index = index.unwrap_or(len);
            if index > len {
                return Err(TreeError::IndexOutOfRange { index, len });
            }
            data.node_mut(self.id).children.insert(index, child.id);
            data.node_mut(child.id).parent = Some(self.id);
        }
        trace!("state: added {:?} under {:?}", child.id, self.id);
        self.tree.notify(|l| l.child_added(self, child));
        self.tree.notify(|l| l.parent_changed(child));
        Ok(())
    }

    /// Append `child` after the existing children.
    pub fn append_child(&self, child: &StateNode) -> Result<(), TreeError> {
        self.add_child(child, None)
    }

    /// Detach and return the child at `index`.
    ///
    /// The detached subtree is freed once the returned handle and any other
    /// handles into it are dropped.
    pub fn remove_child(&self, index: usize) -> Result<StateNode, TreeError> {
        let child = {
            let mut data = self.tree.inner.borrow_mut();
            let len = data.node(self.id).children.len();
            if index >= len {
                return Err(TreeError::IndexOutOfRange { index, len });
            }
            let child = data.node_mut(self.id).children.remove(index);
            data.node_mut(child).parent = None;
            child
        };
        let child = self.tree.handle(child);
        trace!("state: removed {:?} from {:?}", child.id, self.id);
        self.tree.notify(|l| l.child_removed(self, &child, index));
        self.tree.notify(|l| l.parent_changed(&child));
        Ok(child)
    }

    /// Detach a specific child.
    pub fn remove_child_node(&self, child: &StateNode) -> Result<(), TreeError> {
        let index = self.index_of(child).ok_or(TreeError::NotAChild {
            parent: self.id,
            child: child.id,
        })?;
        self.remove_child(index).map(|_| ())
    }

    /// Move the child at `from` so that it ends up at `to`.
    pub fn move_child(&self, from: usize, to: usize) -> Result<(), TreeError> {
        {
            let mut data = self.tree.inner.borrow_mut();
            let children = &mut data.node_mut(self.id).children;
            let len = children.len();
            for index in [from, to] {
                if index >= len {
                    return Err(TreeError::IndexOutOfRange { index, len });
                }
            }
            if from == to {
                return Ok(());
            }
            let moved = children.remove(from);
            children.insert(to, moved);
        }
        self.tree.notify(|l| l.child_order_changed(self, from, to));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<String>>,
    }

    impl StateListener for Recorder {
        fn attribute_changed(&self, node: &StateNode, name: &str) {
            self.events.borrow_mut().push(format!("attr {} {name}", node.type_tag()));
        }
        fn child_added(&self, parent: &StateNode, child: &StateNode) {
            self.events
                .borrow_mut()
                .push(format!("added {} {}", parent.type_tag(), child.type_tag()));
        }
        fn child_removed(&self, parent: &StateNode, child: &StateNode, index: usize) {
            self.events
                .borrow_mut()
                .push(format!("removed {} {} {index}", parent.type_tag(), child.type_tag()));
        }
        fn child_order_changed(&self, parent: &StateNode, old_index: usize, new_index: usize) {
            self.events
                .borrow_mut()
                .push(format!("moved {} {old_index}->{new_index}", parent.type_tag()));
        }
        fn parent_changed(&self, node: &StateNode) {
            self.events.borrow_mut().push(format!("parent {}", node.type_tag()));
        }
    }

    fn listen(tree: &StateTree) -> Rc<Recorder> {
        let recorder = Rc::new(Recorder::default());
        let weak: Weak<Recorder> = Rc::downgrade(&recorder);
        tree.add_listener(weak);
        recorder
    }

    #[test]
    fn test_add_and_read_children() {
        let tree = StateTree::new("Panel");
        let root = tree.root();
        let a = tree.create_node("A");
        let b = tree.create_node("B");

        root.append_child(&a).unwrap();
        root.add_child(&b, Some(0)).unwrap();

        let types: Vec<String> = root.children().iter().map(StateNode::type_tag).collect();
        assert_eq!(types, vec!["B", "A"]);
        assert_eq!(a.parent(), Some(root.clone()));
        assert_eq!(root.index_of(&a), Some(1));
        assert!(a.is_within(&root));
        assert!(!root.is_within(&a));
    }

    #[test]
    fn test_notification_order() {
        let tree = StateTree::new("Panel");
        let recorder = listen(&tree);
        let root = tree.root();
        let a = tree.create_node("A");
        let b = tree.create_node("B");

        root.append_child(&a).unwrap();
        root.append_child(&b).unwrap();
        a.set_attribute("text", "hi");
        root.move_child(0, 1).unwrap();
        root.remove_child(0).unwrap();

        assert_eq!(
            *recorder.events.borrow(),
            vec![
                "added Panel A",
                "parent A",
                "added Panel B",
                "parent B",
                "attr A text",
                "moved Panel 0->1",
                "removed Panel B 0",
                "parent B",
            ]
        );
    }

    #[test]
    fn test_unchanged_attribute_is_silent() {
        let tree = StateTree::new("Panel");
        let recorder = listen(&tree);
        let root = tree.root();

        root.set_attribute("width", 10);
        root.set_attribute("width", 10);
        assert_eq!(root.remove_attribute("missing"), None);

        assert_eq!(recorder.events.borrow().len(), 1);
        assert_eq!(root.attribute("width"), Some(Value::Int(10)));
    }

    #[test]
    fn test_structural_errors() {
        let tree = StateTree::new("Panel");
        let root = tree.root();
        let a = tree.create_node("A");
        root.append_child(&a).unwrap();

        assert!(matches!(root.append_child(&a), Err(TreeError::AlreadyParented(_))));
        assert!(matches!(a.append_child(&root), Err(TreeError::WouldCycle { .. })));

        let detached = tree.create_node("D");
        let inner = tree.create_node("I");
        detached.append_child(&inner).unwrap();
        assert!(matches!(inner.append_child(&detached), Err(TreeError::WouldCycle { .. })));

        let other = StateTree::new("Other");
        assert!(matches!(root.append_child(&other.root()), Err(TreeError::ForeignNode(_))));
        assert!(matches!(root.remove_child(5), Err(TreeError::IndexOutOfRange { index: 5, len: 1 })));
        assert!(matches!(root.move_child(0, 3), Err(TreeError::IndexOutOfRange { .. })));
    }

    #[test]
    fn test_dropped_listener_is_pruned() {
        let tree = StateTree::new("Panel");
        let recorder = listen(&tree);
        assert_eq!(tree.listener_count(), 1);

        drop(recorder);
        assert_eq!(tree.listener_count(), 0);
        tree.root().set_attribute("x", 1);
    }

    #[test]
    fn test_child_with_type() {
        let tree = StateTree::new("Panel");
        let root = tree.root();
        root.append_child(&tree.create_node("Properties")).unwrap();
        root.append_child(&tree.create_node("Children")).unwrap();

        assert!(root.child_with_type("Children").is_some());
        assert!(root.child_with_type("Missing").is_none());
    }

    #[test]
    fn test_removed_subtrees_are_reclaimed() {
        let tree = StateTree::new("Panel");
        let root = tree.root();

        for _ in 0..10 {
            let row = tree.create_node("Row");
            row.append_child(&tree.create_node("Cell")).unwrap();
            root.append_child(&row).unwrap();
            drop(row);
            root.remove_child(0).unwrap();
        }

        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.inner.borrow().slots.len(), 3);
    }

    #[test]
    fn test_held_handles_keep_detached_nodes_alive() {
        let tree = StateTree::new("Panel");
        let root = tree.root();
        let a = tree.create_node("A");
        root.append_child(&a).unwrap();

        root.remove_child(0).unwrap();
        assert_eq!(tree.node_count(), 2);
        a.set_attribute("x", 1);
        root.append_child(&a).unwrap();
        assert_eq!(root.num_children(), 1);

        let id = a.node_id();
        root.remove_child(0).unwrap();
        drop(a);
        assert_eq!(tree.node_count(), 1);
        assert!(tree.node(id).is_none());

        let fresh = tree.create_node("B");
        assert_eq!(fresh.node_id().index(), id.index());
        assert_ne!(fresh.node_id(), id);
    }

    #[test]
    fn test_detached_child_handle_pins_its_subtree() {
        let tree = StateTree::new("Panel");
        let parent = tree.create_node("Row");
        let cell = tree.create_node("Cell");
        parent.append_child(&cell).unwrap();

        drop(parent);
        assert_eq!(tree.node_count(), 3);
        assert_eq!(cell.parent().map(|p| p.type_tag()), Some("Row".to_string()));

        drop(cell);
        assert_eq!(tree.node_count(), 1);
    }
}
