//! Taffy Bridge - Flexbox layout of a live component tree.
//!
//! Builds a Taffy tree mirroring the component hierarchy (children in
//! stacking order), computes it, and reads back one rectangle per component
//! in absolute coordinates.

use std::collections::HashMap;

use log::trace;
use taffy::{
    AvailableSpace, Dimension as TaffyDimension, Display, FlexDirection as TaffyFlexDirection,
    LengthPercentage, NodeId, Rect, Size, Style, TaffyTree,
};

use crate::engine::{Component, ComponentIndex, ComponentTree};
use crate::error::LayoutError;
use crate::types::{ComponentType, Dimension, FlexDirection};

use super::text_measure::{text_height, text_width};

// =============================================================================
// RESULT
// =============================================================================

/// Position and size of one component, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Layout of every visible component under a root.
#[derive(Debug, Clone, Default)]
pub struct ComputedLayout {
    rects: HashMap<ComponentIndex, LayoutRect>,
}

impl ComputedLayout {
    pub fn get(&self, index: ComponentIndex) -> Option<LayoutRect> {
        self.rects.get(&index).copied()
    }

    /// Number of laid-out components.
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

// =============================================================================
// CONVERSION
// =============================================================================

fn to_taffy_dimension(dim: Dimension) -> TaffyDimension {
    match dim {
        Dimension::Auto => TaffyDimension::Auto,
        Dimension::Cells(n) => TaffyDimension::Length(n as f32),
        Dimension::Percent(p) => TaffyDimension::Percent(p / 100.0),
    }
}

fn to_taffy_flex_direction(dir: FlexDirection) -> TaffyFlexDirection {
    match dir {
        FlexDirection::Column => TaffyFlexDirection::Column,
        FlexDirection::Row => TaffyFlexDirection::Row,
        FlexDirection::ColumnReverse => TaffyFlexDirection::ColumnReverse,
        FlexDirection::RowReverse => TaffyFlexDirection::RowReverse,
    }
}

fn build_style(component: &Component) -> Style {
    let s = &component.style;
    let padding = LengthPercentage::Length(s.padding as f32);
    let gap = LengthPercentage::Length(s.gap as f32);

    let mut style = Style {
        display: Display::Flex,
        flex_direction: to_taffy_flex_direction(s.direction),
        flex_grow: s.grow,
        size: Size {
            width: to_taffy_dimension(s.width),
            height: to_taffy_dimension(s.height),
        },
        padding: Rect {
            top: padding,
            right: padding,
            bottom: padding,
            left: padding,
        },
        gap: Size {
            width: gap,
            height: gap,
        },
        ..Default::default()
    };

    // Text sizes from its content
    if component.kind == ComponentType::Text {
        style.size = Size::auto();
    }
    style
}

// =============================================================================
// TEXT MEASUREMENT
// =============================================================================

fn measure_text(
    component: Option<&Component>,
    known_dimensions: Size<Option<f32>>,
    available_space: Size<AvailableSpace>,
) -> Size<f32> {
    let Some(content) = component.and_then(|c| c.text.as_deref()) else {
        return Size::ZERO;
    };
    if content.is_empty() {
        return Size::ZERO;
    }

    let width = text_width(content);
    let avail_width = match available_space.width {
        AvailableSpace::Definite(w) => w.max(0.0) as u16,
        AvailableSpace::MinContent | AvailableSpace::MaxContent => width,
    };
    let wrap_at = known_dimensions.width.map(|w| w as u16).unwrap_or(avail_width);

    Size {
        width: known_dimensions.width.unwrap_or(width.min(avail_width) as f32),
        height: known_dimensions.height.unwrap_or(text_height(content, wrap_at) as f32),
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Lay out the subtree under `root` within `width` × `height` cells.
///
/// Invisible components and everything beneath them are left out.
pub fn compute_layout(
    components: &ComponentTree,
    root: ComponentIndex,
    width: f32,
    height: f32,
) -> Result<ComputedLayout, LayoutError> {
    let root_component = components.get(root).ok_or(LayoutError::UnknownComponent(root))?;
    if !root_component.is_visible() {
        return Ok(ComputedLayout::default());
    }

    let mut tree: TaffyTree<ComponentIndex> = TaffyTree::new();
    let mut nodes: Vec<(ComponentIndex, NodeId)> = Vec::new();
    let root_node = add_subtree(components, &mut tree, root, &mut nodes)?;

    // An unsized root fills the available area.
    let mut root_style = tree.style(root_node)?.clone();
    if root_component.style.width == Dimension::Auto {
        root_style.size.width = TaffyDimension::Length(width);
    }
    if root_component.style.height == Dimension::Auto {
        root_style.size.height = TaffyDimension::Length(height);
    }
    tree.set_style(root_node, root_style)?;

    let available = Size {
        width: AvailableSpace::Definite(width),
        height: AvailableSpace::Definite(height),
    };
    tree.compute_layout_with_measure(
        root_node,
        available,
        |known_dimensions, available_space, _node_id, context: Option<&mut ComponentIndex>, _style| {
            let component = context.and_then(|&mut index| components.get(index));
            measure_text(component, known_dimensions, available_space)
        },
    )?;

    // Parents are pushed before their children, so offsets are ready in order.
    let mut result = ComputedLayout::default();
    for (index, node) in nodes {
        let layout = tree.layout(node)?;
        let (dx, dy) = components
            .parent(index)
            .filter(|_| index != root)
            .and_then(|p| result.get(p))
            .map(|r| (r.x, r.y))
            .unwrap_or((0.0, 0.0));
        result.rects.insert(
            index,
            LayoutRect {
                x: dx + layout.location.x,
                y: dy + layout.location.y,
                width: layout.size.width,
                height: layout.size.height,
            },
        );
    }

    trace!("layout: {} components under {root:?}", result.len());
    Ok(result)
}

fn add_subtree(
    components: &ComponentTree,
    tree: &mut TaffyTree<ComponentIndex>,
    index: ComponentIndex,
    nodes: &mut Vec<(ComponentIndex, NodeId)>,
) -> Result<NodeId, LayoutError> {
    let component = components.get(index).ok_or(LayoutError::UnknownComponent(index))?;
    let style = build_style(component);
    let node = if component.kind == ComponentType::Text {
        tree.new_leaf_with_context(style, index)?
    } else {
        tree.new_leaf(style)?
    };
    nodes.push((index, node));

    for &child in component.children() {
        if components.get(child).is_some_and(Component::is_visible) {
            let child_node = add_subtree(components, tree, child, nodes)?;
            tree.add_child(node, child_node)?;
        }
    }
    Ok(node)
}
