//! Attribute reading shared by the standard primitives.
//!
//! Every update recomputes style and flags from defaults, so removing an
//! attribute restores the default value.

use log::warn;

use crate::engine::Component;
use crate::tree::StateNode;
use crate::types::{ComponentFlags, Dimension, FlexDirection, NodeStyle, Value};

pub const WIDTH: &str = "width";
pub const HEIGHT: &str = "height";
pub const DIRECTION: &str = "direction";
pub const GROW: &str = "grow";
pub const PADDING: &str = "padding";
pub const GAP: &str = "gap";
pub const VISIBLE: &str = "visible";
pub const ENABLED: &str = "enabled";
pub const FOCUSABLE: &str = "focusable";

/// Layout style described by a state node's attributes.
pub fn style_from_state(state: &StateNode) -> NodeStyle {
    let mut style = NodeStyle::default();

    if let Some(width) = state.attribute(WIDTH) {
        style.width = dimension(state, WIDTH, &width);
    }
    if let Some(height) = state.attribute(HEIGHT) {
        style.height = dimension(state, HEIGHT, &height);
    }
    if let Some(direction) = state.attribute(DIRECTION) {
        match direction.as_str().and_then(FlexDirection::parse) {
            Some(d) => style.direction = d,
            None => warn!("primitives: `{direction}` is not a direction; using column"),
        }
    }
    if let Some(grow) = state.attribute(GROW).and_then(|v| v.as_f64()) {
        style.grow = grow.max(0.0) as f32;
    }
    style.padding = cells(state, PADDING);
    style.gap = cells(state, GAP);
    style
}

/// Behavioral flags described by a state node's attributes.
pub fn flags_from_state(state: &StateNode) -> ComponentFlags {
    let mut flags = ComponentFlags::default();
    flags.set(ComponentFlags::VISIBLE, flag(state, VISIBLE, true));
    flags.set(ComponentFlags::ENABLED, flag(state, ENABLED, true));
    flags.set(ComponentFlags::FOCUSABLE, flag(state, FOCUSABLE, false));
    flags
}

/// Copy style and flags onto a component.
pub(crate) fn apply_common(component: &mut Component, state: &StateNode) {
    component.style = style_from_state(state);
    component.flags = flags_from_state(state);
}

fn dimension(state: &StateNode, name: &str, value: &Value) -> Dimension {
    Dimension::from_value(value).unwrap_or_else(|| {
        warn!("primitives: `{}`.{name} = `{value}` is not a size; using auto", state.type_tag());
        Dimension::Auto
    })
}

fn cells(state: &StateNode, name: &str) -> u16 {
    state
        .attribute(name)
        .and_then(|v| v.as_i64())
        .map(|n| n.clamp(0, u16::MAX as i64) as u16)
        .unwrap_or(0)
}

fn flag(state: &StateNode, name: &str, default: bool) -> bool {
    state.attribute(name).and_then(|v| v.as_bool()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{NodeSpec, StateTree};

    #[test]
    fn test_style_from_attributes() {
        let tree = StateTree::from_spec(
            &NodeSpec::new("Box")
                .attr("width", 40)
                .attr("height", "50%")
                .attr("direction", "row")
                .attr("grow", 1.5)
                .attr("padding", 2)
                .attr("gap", 1),
        );

        let style = style_from_state(&tree.root());

        assert_eq!(style.width, Dimension::Cells(40));
        assert_eq!(style.height, Dimension::Percent(50.0));
        assert_eq!(style.direction, FlexDirection::Row);
        assert_eq!(style.grow, 1.5);
        assert_eq!((style.padding, style.gap), (2, 1));
    }

    #[test]
    fn test_bad_values_fall_back_to_defaults() {
        let tree = StateTree::from_spec(
            &NodeSpec::new("Box")
                .attr("width", "wide")
                .attr("direction", "sideways")
                .attr("padding", -3),
        );

        let style = style_from_state(&tree.root());

        assert_eq!(style, NodeStyle::default());
    }

    #[test]
    fn test_flags() {
        let tree = StateTree::from_spec(&NodeSpec::new("Box").attr("visible", false).attr("focusable", "true"));

        let flags = flags_from_state(&tree.root());

        assert!(!flags.contains(ComponentFlags::VISIBLE));
        assert!(flags.contains(ComponentFlags::ENABLED));
        assert!(flags.contains(ComponentFlags::FOCUSABLE));
    }
}
