//! Child list reconciliation.
//!
//! Brings a live component's children in line with a new ordered list of
//! child states:
//!
//! 1. Snapshot the current children into a pool.
//! 2. Walk the new states in order; claim the pool member with the same
//!    identifier, or create one through the state's handler.
//! 3. Release whatever is left in the pool.
//! 4. Restack so front-to-back order equals the new state order.

use std::collections::HashSet;

use log::{debug, warn};

use crate::engine::{ComponentIndex, ComponentTree};
use crate::tree::StateNode;

use super::config::{BuilderConfig, DuplicateIdPolicy};
use super::context::BuildContext;

/// What one reconciliation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileReport {
    pub created: usize,
    pub reused: usize,
    pub destroyed: usize,
    pub skipped: usize,
}

impl ReconcileReport {
    /// True when no component was created or destroyed.
    pub fn is_churn_free(&self) -> bool {
        self.created == 0 && self.destroyed == 0
    }
}

pub(crate) fn reconcile_children(
    cx: &mut BuildContext<'_>,
    parent: ComponentIndex,
    children: &[StateNode],
) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    let mut pool: Vec<ComponentIndex> = cx.components().children(parent).to_vec();
    let mut in_order: Vec<ComponentIndex> = Vec::with_capacity(children.len());
    let mut seen: HashSet<String> = HashSet::with_capacity(children.len());

    for state in children {
        let id = cx.state_id(state);
        if id.is_empty() {
            missing_id(cx.config(), state);
        } else if !seen.insert(id.clone()) && cx.config().duplicate_ids == DuplicateIdPolicy::Reject {
            warn!("builder: duplicate id `{id}` among siblings; skipping later `{}`", state.type_tag());
            report.skipped += 1;
            continue;
        }

        let component = match take_from_pool(cx.components(), &mut pool, &id) {
            Some(existing) => {
                report.reused += 1;
                existing
            }
            None => match cx.handler_for(state) {
                Some(handler) => {
                    report.created += 1;
                    cx.create_component(handler, state, Some(parent))
                }
                None => {
                    unknown_type(cx.config(), state);
                    report.skipped += 1;
                    continue;
                }
            },
        };
        in_order.push(component);
    }

    for stale in pool {
        cx.components_mut().release(stale);
        report.destroyed += 1;
    }

    // Last state is frontmost; each earlier one sits directly behind its successor.
    if let Some(&front) = in_order.last() {
        let components = cx.components_mut();
        components.to_front(front);
        for pair in in_order.windows(2).rev() {
            components.to_behind(pair[0], pair[1]);
        }
    }

    debug!(
        "builder: reconciled {parent:?}: {} created, {} reused, {} destroyed, {} skipped",
        report.created, report.reused, report.destroyed, report.skipped
    );
    report
}

/// Remove and return the last pool member carrying `id`.
fn take_from_pool(
    components: &ComponentTree,
    pool: &mut Vec<ComponentIndex>,
    id: &str,
) -> Option<ComponentIndex> {
    if id.is_empty() {
        return None;
    }
    let position = pool
        .iter()
        .rposition(|&c| components.component_id(c) == Some(id))?;
    Some(pool.remove(position))
}

fn missing_id(config: &BuilderConfig, state: &StateNode) {
    if config.strict {
        panic!(
            "state node `{}` has no `{}` attribute and cannot be matched to a component",
            state.type_tag(),
            config.id_attribute
        );
    }
    warn!(
        "builder: `{}` has no `{}`; it will be recreated on every pass",
        state.type_tag(),
        config.id_attribute
    );
}

fn unknown_type(config: &BuilderConfig, state: &StateNode) {
    if config.strict {
        panic!("no handler registered for state type `{}`", state.type_tag());
    }
    warn!("builder: no handler for `{}`; skipping", state.type_tag());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::HandlerRegistry;
    use crate::builder::TypeHandler;
    use crate::tree::{NodeSpec, StateTree};
    use crate::types::ComponentType;

    struct Widget(&'static str);

    impl TypeHandler for Widget {
        fn type_tag(&self) -> &str {
            self.0
        }

        fn create(
            &self,
            cx: &mut BuildContext<'_>,
            _state: &StateNode,
            parent: Option<ComponentIndex>,
        ) -> ComponentIndex {
            cx.components_mut().create(parent, ComponentType::None, self.0)
        }

        fn update(&self, _cx: &mut BuildContext<'_>, _component: ComponentIndex, _state: &StateNode) {}

        fn child_container(&self, _state: &StateNode) -> Option<StateNode> {
            None
        }
    }

    struct Fixture {
        components: ComponentTree,
        handlers: HandlerRegistry,
        config: BuilderConfig,
        tree: StateTree,
        parent: ComponentIndex,
    }

    impl Fixture {
        fn new(config: BuilderConfig) -> Self {
            let mut handlers = HandlerRegistry::new();
            handlers.register(Box::new(Widget("Button"))).unwrap();
            let mut components = ComponentTree::new();
            let parent = components.create(None, ComponentType::Box, "Panel");
            Self {
                components,
                handlers,
                config,
                tree: StateTree::new("Panel"),
                parent,
            }
        }

        fn states(&self, ids: &[&str]) -> Vec<StateNode> {
            ids.iter()
                .map(|id| self.tree.create_from_spec(&NodeSpec::with_id("Button", id)))
                .collect()
        }

        fn run(&mut self, states: &[StateNode]) -> ReconcileReport {
            let mut cx = BuildContext::new(&mut self.components, &self.handlers, &self.config, None);
            reconcile_children(&mut cx, self.parent, states)
        }

        fn ids(&self) -> Vec<String> {
            self.components.child_ids(self.parent)
        }
    }

    #[test]
    fn test_empty_list_destroys_everything() {
        let mut f = Fixture::new(BuilderConfig::default());
        let states = f.states(&["a", "b"]);
        f.run(&states);

        let report = f.run(&[]);

        assert_eq!(report.destroyed, 2);
        assert!(f.ids().is_empty());
        assert_eq!(f.components.len(), 1);
    }

    #[test]
    fn test_reverse_keeps_instances() {
        let mut f = Fixture::new(BuilderConfig::default());
        let states = f.states(&["a", "b", "c"]);
        f.run(&states);
        let before: Vec<ComponentIndex> = f.components.children(f.parent).to_vec();

        let reversed: Vec<StateNode> = states.iter().rev().cloned().collect();
        let report = f.run(&reversed);

        assert!(report.is_churn_free());
        assert_eq!(report.reused, 3);
        assert_eq!(f.ids(), vec!["c", "b", "a"]);
        let after: Vec<ComponentIndex> = f.components.children(f.parent).to_vec();
        assert_eq!(after, vec![before[2], before[1], before[0]]);
    }

    #[test]
    fn test_duplicate_ids_rejected_by_default() {
        let mut f = Fixture::new(BuilderConfig::default());
        let states = f.states(&["a", "a", "b"]);

        let report = f.run(&states);

        assert_eq!(report.created, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(f.ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_duplicate_ids_allowed() {
        let config = BuilderConfig::default().with_duplicate_ids(DuplicateIdPolicy::Allow);
        let mut f = Fixture::new(config);
        let states = f.states(&["a", "a"]);

        let first = f.run(&states);
        assert_eq!(first.created, 2);

        let second = f.run(&states);
        assert!(second.is_churn_free());
        assert_eq!(f.ids(), vec!["a", "a"]);
    }

    #[test]
    fn test_missing_id_recreates_when_lenient() {
        let mut f = Fixture::new(BuilderConfig::default().with_strict(false));
        let anonymous = vec![f.tree.create_node("Button")];

        f.run(&anonymous);
        let report = f.run(&anonymous);

        assert_eq!(report.created, 1);
        assert_eq!(report.destroyed, 1);
    }

    #[test]
    #[should_panic(expected = "no handler registered")]
    fn test_unknown_type_panics_when_strict() {
        let mut f = Fixture::new(BuilderConfig::default().with_strict(true));
        let states = vec![f.tree.create_from_spec(&NodeSpec::with_id("Slider", "s"))];
        f.run(&states);
    }
}
