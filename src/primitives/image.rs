//! Image Primitive - Displays an image resolved through the builder's
//! image provider.
//!
//! The `src` attribute is handed to the provider as-is. Without an explicit
//! `width`/`height` attribute the component takes the image's natural size;
//! an explicit `"auto"` leaves sizing to layout.

use log::warn;

use crate::builder::{BuildContext, TypeHandler};
use crate::engine::ComponentIndex;
use crate::tree::StateNode;
use crate::types::{ComponentType, Dimension};

use super::props;

pub const IMAGE_TYPE: &str = "Image";
pub const SRC: &str = "src";

/// Handler for `Image` state nodes.
#[derive(Debug, Default)]
pub struct ImageHandler;

impl TypeHandler for ImageHandler {
    fn type_tag(&self) -> &str {
        IMAGE_TYPE
    }

    fn create(
        &self,
        cx: &mut BuildContext<'_>,
        state: &StateNode,
        parent: Option<ComponentIndex>,
    ) -> ComponentIndex {
        let index = cx.components_mut().create(parent, ComponentType::Image, IMAGE_TYPE);
        self.update(cx, index, state);
        index
    }

    fn update(&self, cx: &mut BuildContext<'_>, component: ComponentIndex, state: &StateNode) {
        let image = match (state.attribute(SRC), cx.image_provider()) {
            (Some(src), Some(provider)) => {
                let image = provider.image_for_identifier(&src);
                if image.is_none() {
                    warn!("primitives: no image for `{src}`");
                }
                image
            }
            (Some(src), None) => {
                warn!("primitives: `{src}` needs an image provider; none is set");
                None
            }
            (None, _) => None,
        };

        let Some(c) = cx.component_mut(component) else { return };
        props::apply_common(c, state);
        if let Some(image) = &image {
            if !state.has_attribute(props::WIDTH) {
                c.style.width = natural(image.width);
            }
            if !state.has_attribute(props::HEIGHT) {
                c.style.height = natural(image.height);
            }
        }
        c.image = image;
    }

    fn child_container(&self, _state: &StateNode) -> Option<StateNode> {
        None
    }
}

fn natural(size: u32) -> Dimension {
    Dimension::from(i64::from(size))
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::builder::{ComponentBuilder, Image, ImageProvider, MemoryImageProvider};
    use crate::tree::{NodeSpec, StateTree};

    fn provider() -> Rc<dyn ImageProvider> {
        let mut provider = MemoryImageProvider::new();
        provider.insert(Image::new("logo", 12, 4));
        provider.insert(Image::new("icon", 2, 2));
        Rc::new(provider)
    }

    #[test]
    fn test_image_resolves_through_provider() {
        let tree = StateTree::from_spec(&NodeSpec::with_id("Image", "pic").attr("src", "logo"));
        let mut builder = ComponentBuilder::new(tree.root());
        builder.register_standard_component_types().unwrap();
        builder.set_image_provider(Some(provider()));

        let root = builder.managed_component().unwrap();

        let components = builder.components();
        let c = components.get(root).unwrap();
        assert_eq!(c.image.as_ref().map(|i| i.name.as_str()), Some("logo"));
        assert_eq!(c.style.width, Dimension::Cells(12));
        assert_eq!(c.style.height, Dimension::Cells(4));
    }

    #[test]
    fn test_explicit_size_wins_and_src_changes_apply() {
        let tree = StateTree::from_spec(&NodeSpec::with_id("Image", "pic").attr("src", "logo").attr("width", 6));
        let mut builder = ComponentBuilder::new(tree.root());
        builder.register_standard_component_types().unwrap();
        builder.set_image_provider(Some(provider()));
        let root = builder.managed_component().unwrap();
        assert_eq!(builder.components().get(root).unwrap().style.width, Dimension::Cells(6));

        tree.root().set_attribute("src", "icon");

        let components = builder.components();
        let c = components.get(root).unwrap();
        assert_eq!(c.image.as_ref().map(|i| i.name.as_str()), Some("icon"));
        assert_eq!(c.style.width, Dimension::Cells(6));
        assert_eq!(c.style.height, Dimension::Cells(2));
    }

    #[test]
    fn test_explicit_auto_is_not_replaced_by_natural_size() {
        let tree = StateTree::from_spec(
            &NodeSpec::with_id("Image", "pic")
                .attr("src", "logo")
                .attr("width", "auto"),
        );
        let mut builder = ComponentBuilder::new(tree.root());
        builder.register_standard_component_types().unwrap();
        builder.set_image_provider(Some(provider()));

        let root = builder.managed_component().unwrap();

        let components = builder.components();
        let c = components.get(root).unwrap();
        assert_eq!(c.style.width, Dimension::Auto);
        assert_eq!(c.style.height, Dimension::Cells(4));
    }

    #[test]
    fn test_missing_provider_leaves_image_empty() {
        let tree = StateTree::from_spec(&NodeSpec::with_id("Image", "pic").attr("src", "logo"));
        let mut builder = ComponentBuilder::new(tree.root());
        builder.register_standard_component_types().unwrap();

        let root = builder.managed_component().unwrap();

        assert!(builder.components().get(root).unwrap().image.is_none());
    }
}
