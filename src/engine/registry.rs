//! Component Registry - Slot allocation and hierarchy for live components.
//!
//! Manages the lifecycle of live components:
//! - Slot allocation with a free pool for O(1) reuse
//! - Generational handles so stale indices never alias new components
//! - Parent/child containment with back-to-front z-order
//! - Recursive release with per-component destroy callbacks

use std::collections::HashMap;

use log::{trace, warn};

use crate::types::ComponentType;

use super::component::{Component, ComponentIndex};

/// Counters describing churn since the tree was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComponentStats {
    pub created: usize,
    pub destroyed: usize,
}

struct Slot {
    generation: u32,
    component: Option<Component>,
}

/// Arena of live components.
#[derive(Default)]
pub struct ComponentTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    stats: ComponentStats,
    destroy_callbacks: HashMap<ComponentIndex, Vec<Box<dyn FnOnce()>>>,
}

impl ComponentTree {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Create a component as the frontmost child of `parent`, or as a
    /// standalone root when `parent` is `None` or no longer alive.
    pub fn create(
        &mut self,
        parent: Option<ComponentIndex>,
        kind: ComponentType,
        type_tag: &str,
    ) -> ComponentIndex {
        let parent = match parent {
            Some(p) if !self.contains(p) => {
                warn!("engine: parent {p:?} is gone; creating `{type_tag}` as a root");
                None
            }
            other => other,
        };

        let component = Component::new(parent, kind, type_tag);

        // Reuse free slot or allocate new
        let index = match self.free.pop() {
            Some(slot) => {
                let entry = &mut self.slots[slot as usize];
                entry.component = Some(component);
                ComponentIndex {
                    slot,
                    generation: entry.generation,
                }
            }
            None => {
                let slot = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    component: Some(component),
                });
                ComponentIndex { slot, generation: 0 }
            }
        };

        if let Some(parent) = parent {
            if let Some(p) = self.get_mut(parent) {
                p.children.push(index);
            }
        }

        self.live += 1;
        self.stats.created += 1;
        trace!("engine: created {index:?} `{type_tag}` under {parent:?}");
        index
    }

    /// Release a component and its whole subtree.
    ///
    /// Children go first, then the component's destroy callbacks run, then it
    /// is detached from its parent and its slot returns to the pool.
    pub fn release(&mut self, index: ComponentIndex) {
        let Some(component) = self.get(index) else { return };
        let children = component.children.clone();
        let parent = component.parent;

        for child in children {
            self.release(child);
        }

        self.run_destroy_callbacks(index);

        if let Some(parent) = parent {
            if let Some(p) = self.get_mut(parent) {
                p.children.retain(|&c| c != index);
            }
        }

        let entry = &mut self.slots[index.slot as usize];
        entry.component = None;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(index.slot);
        self.live -= 1;
        self.stats.destroyed += 1;
        trace!("engine: released {index:?}");
    }

    /// Release everything.
    pub fn clear(&mut self) {
        let roots: Vec<ComponentIndex> = self
            .iter()
            .filter(|(_, c)| c.parent.is_none())
            .map(|(i, _)| i)
            .collect();
        for root in roots {
            self.release(root);
        }
    }

    // =========================================================================
    // Destroy Callbacks
    // =========================================================================

    /// Register a callback to run when the component at `index` is released.
    pub fn on_destroy(&mut self, index: ComponentIndex, callback: impl FnOnce() + 'static) {
        if !self.contains(index) {
            return;
        }
        self.destroy_callbacks
            .entry(index)
            .or_default()
            .push(Box::new(callback));
    }

    fn run_destroy_callbacks(&mut self, index: ComponentIndex) {
        if let Some(callbacks) = self.destroy_callbacks.remove(&index) {
            for callback in callbacks {
                callback();
            }
        }
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn contains(&self, index: ComponentIndex) -> bool {
        self.get(index).is_some()
    }

    pub fn get(&self, index: ComponentIndex) -> Option<&Component> {
        self.slots
            .get(index.slot as usize)
            .filter(|s| s.generation == index.generation)
            .and_then(|s| s.component.as_ref())
    }

    pub fn get_mut(&mut self, index: ComponentIndex) -> Option<&mut Component> {
        self.slots
            .get_mut(index.slot as usize)
            .filter(|s| s.generation == index.generation)
            .and_then(|s| s.component.as_mut())
    }

    pub fn component_id(&self, index: ComponentIndex) -> Option<&str> {
        self.get(index).map(Component::component_id)
    }

    pub fn set_component_id(&mut self, index: ComponentIndex, id: &str) {
        if let Some(c) = self.get_mut(index) {
            c.component_id = id.to_string();
        }
    }

    pub fn parent(&self, index: ComponentIndex) -> Option<ComponentIndex> {
        self.get(index).and_then(|c| c.parent)
    }

    /// Direct children, back-to-front. Empty for released components.
    pub fn children(&self, index: ComponentIndex) -> &[ComponentIndex] {
        self.get(index).map(|c| c.children.as_slice()).unwrap_or(&[])
    }

    /// Identifiers of the direct children, back-to-front.
    pub fn child_ids(&self, index: ComponentIndex) -> Vec<String> {
        self.children(index)
            .iter()
            .filter_map(|&c| self.component_id(c))
            .map(str::to_string)
            .collect()
    }

    /// Depth-first search for a component with the given identifier,
    /// starting at (and including) `root`.
    pub fn find_by_id(&self, root: ComponentIndex, id: &str) -> Option<ComponentIndex> {
        let component = self.get(root)?;
        if component.component_id == id {
            return Some(root);
        }
        component
            .children
            .iter()
            .find_map(|&child| self.find_by_id(child, id))
    }

    /// Number of live components.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn stats(&self) -> ComponentStats {
        self.stats
    }

    /// All live components in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentIndex, &Component)> {
        self.slots.iter().enumerate().filter_map(|(slot, s)| {
            s.component.as_ref().map(|c| {
                (
                    ComponentIndex {
                        slot: slot as u32,
                        generation: s.generation,
                    },
                    c,
                )
            })
        })
    }

    // =========================================================================
    // Z-Order
    // =========================================================================

    /// Bring a component in front of all its siblings.
    pub fn to_front(&mut self, index: ComponentIndex) {
        let Some(parent) = self.parent(index) else { return };
        if let Some(p) = self.get_mut(parent) {
            p.children.retain(|&c| c != index);
            p.children.push(index);
        }
    }

    /// Place a component directly behind `sibling`.
    ///
    /// Both must share a parent; otherwise nothing happens.
    pub fn to_behind(&mut self, index: ComponentIndex, sibling: ComponentIndex) {
        if index == sibling {
            return;
        }
        let parent = self.parent(index);
        if parent.is_none() || parent != self.parent(sibling) {
            warn!("engine: {index:?} and {sibling:?} are not siblings");
            return;
        }
        let Some(p) = parent.and_then(|p| self.get_mut(p)) else { return };
        p.children.retain(|&c| c != index);
        let position = p
            .children
            .iter()
            .position(|&c| c == sibling)
            .unwrap_or(p.children.len());
        p.children.insert(position, index);
    }
}

impl Drop for ComponentTree {
    fn drop(&mut self) {
        // Owners see their destroy callbacks even when the arena itself goes away.
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn tree_with_children(n: usize) -> (ComponentTree, ComponentIndex, Vec<ComponentIndex>) {
        let mut tree = ComponentTree::new();
        let root = tree.create(None, ComponentType::Box, "Panel");
        let children = (0..n)
            .map(|i| {
                let c = tree.create(Some(root), ComponentType::Box, "Button");
                tree.set_component_id(c, &format!("c{i}"));
                c
            })
            .collect();
        (tree, root, children)
    }

    #[test]
    fn test_create_appends_frontmost() {
        let (tree, root, children) = tree_with_children(3);

        assert_eq!(tree.children(root), children.as_slice());
        assert_eq!(tree.parent(children[0]), Some(root));
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.stats().created, 4);
    }

    #[test]
    fn test_release_is_recursive() {
        let (mut tree, root, children) = tree_with_children(2);
        let grandchild = tree.create(Some(children[0]), ComponentType::Text, "Label");

        tree.release(children[0]);

        assert!(!tree.contains(children[0]));
        assert!(!tree.contains(grandchild));
        assert_eq!(tree.children(root), &[children[1]]);
        assert_eq!(tree.stats().destroyed, 2);
    }

    #[test]
    fn test_stale_index_does_not_alias() {
        let (mut tree, root, children) = tree_with_children(1);
        let old = children[0];

        tree.release(old);
        let reused = tree.create(Some(root), ComponentType::Box, "Button");

        assert_eq!(reused.slot(), old.slot());
        assert_ne!(reused, old);
        assert!(tree.get(old).is_none());
        assert!(tree.get(reused).is_some());
    }

    #[test]
    fn test_z_order_operations() {
        let (mut tree, root, c) = tree_with_children(3);

        tree.to_front(c[0]);
        assert_eq!(tree.children(root), &[c[1], c[2], c[0]]);

        tree.to_behind(c[0], c[1]);
        assert_eq!(tree.children(root), &[c[0], c[1], c[2]]);

        tree.to_behind(c[2], c[0]);
        assert_eq!(tree.children(root), &[c[2], c[0], c[1]]);
    }

    #[test]
    fn test_to_behind_requires_siblings() {
        let (mut tree, root, c) = tree_with_children(2);
        let nested = tree.create(Some(c[0]), ComponentType::Box, "Inner");

        tree.to_behind(nested, c[1]);
        assert_eq!(tree.children(root), &[c[0], c[1]]);
        assert_eq!(tree.children(c[0]), &[nested]);
    }

    #[test]
    fn test_find_by_id() {
        let (mut tree, root, c) = tree_with_children(2);
        let nested = tree.create(Some(c[1]), ComponentType::Text, "Label");
        tree.set_component_id(nested, "deep");

        assert_eq!(tree.find_by_id(root, "c1"), Some(c[1]));
        assert_eq!(tree.find_by_id(root, "deep"), Some(nested));
        assert_eq!(tree.find_by_id(root, "missing"), None);
    }

    #[test]
    fn test_destroy_callback() {
        let (mut tree, root, _) = tree_with_children(1);
        let called = Rc::new(Cell::new(0));
        let called_clone = called.clone();

        tree.on_destroy(root, move || called_clone.set(called_clone.get() + 1));

        assert_eq!(called.get(), 0);
        tree.release(root);
        assert_eq!(called.get(), 1);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_drop_runs_callbacks() {
        let called = Rc::new(Cell::new(false));
        {
            let (mut tree, root, _) = tree_with_children(0);
            let called_clone = called.clone();
            tree.on_destroy(root, move || called_clone.set(true));
        }
        assert!(called.get());
    }
}
