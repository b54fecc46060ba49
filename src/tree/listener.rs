//! State tree listeners.

use std::rc::Weak;

use super::StateNode;

/// Receives synchronous notifications about state tree mutations.
///
/// Every callback fires after the mutation is committed, so the tree can be
/// read freely from inside it. All methods default to no-ops.
pub trait StateListener {
    /// An attribute on `node` was set, changed or removed.
    fn attribute_changed(&self, _node: &StateNode, _name: &str) {}

    /// `child` was inserted into `parent`.
    fn child_added(&self, _parent: &StateNode, _child: &StateNode) {}

    /// `child` was removed from `parent`; `index` is where it used to be.
    fn child_removed(&self, _parent: &StateNode, _child: &StateNode, _index: usize) {}

    /// A child of `parent` moved from `old_index` to `new_index`.
    fn child_order_changed(&self, _parent: &StateNode, _old_index: usize, _new_index: usize) {}

    /// `node` was attached to or detached from a parent.
    fn parent_changed(&self, _node: &StateNode) {}
}

/// Listener list held by a state tree document.
///
/// Listeners are held weakly: dropping the owner is enough to stop
/// notifications, and dead entries are pruned on the next dispatch.
#[derive(Default)]
pub(crate) struct ListenerList {
    listeners: Vec<Weak<dyn StateListener>>,
}

impl ListenerList {
    pub(crate) fn add(&mut self, listener: Weak<dyn StateListener>) {
        if !self.listeners.iter().any(|l| same_listener(l, &listener)) {
            self.listeners.push(listener);
        }
    }

    pub(crate) fn remove(&mut self, listener: &Weak<dyn StateListener>) {
        self.listeners.retain(|l| !same_listener(l, listener));
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.iter().filter(|l| l.strong_count() > 0).count()
    }

    /// Snapshot of live listeners, pruning dead ones.
    pub(crate) fn snapshot(&mut self) -> Vec<std::rc::Rc<dyn StateListener>> {
        self.listeners.retain(|l| l.strong_count() > 0);
        self.listeners.iter().filter_map(Weak::upgrade).collect()
    }
}

fn same_listener(a: &Weak<dyn StateListener>, b: &Weak<dyn StateListener>) -> bool {
    std::ptr::addr_eq(a.as_ptr(), b.as_ptr())
}
