//! Image lookup for image-bearing components.
//!
//! The builder only stores a provider and hands it to type handlers; it never
//! performs lookups itself.

use std::collections::HashMap;

use crate::types::Value;

/// An image as seen by components: a name plus its natural size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl Image {
    pub fn new(name: &str, width: u32, height: u32) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
        }
    }
}

/// Resolves image identifiers stored in the state tree.
pub trait ImageProvider {
    /// Image for an identifier attribute, if known.
    fn image_for_identifier(&self, identifier: &Value) -> Option<Image>;

    /// Identifier to store in the state tree for an image.
    fn identifier_for_image(&self, image: &Image) -> Option<Value>;
}

/// Provider backed by an in-memory name → image map.
#[derive(Debug, Default)]
pub struct MemoryImageProvider {
    images: HashMap<String, Image>,
}

impl MemoryImageProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, image: Image) {
        self.images.insert(image.name.clone(), image);
    }
}

impl ImageProvider for MemoryImageProvider {
    fn image_for_identifier(&self, identifier: &Value) -> Option<Image> {
        self.images.get(identifier.as_str()?).cloned()
    }

    fn identifier_for_image(&self, image: &Image) -> Option<Value> {
        self.images
            .contains_key(&image.name)
            .then(|| Value::Str(image.name.clone()))
    }
}
