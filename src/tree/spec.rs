//! Declarative JSON description of state trees.
//!
//! ```json
//! {
//!   "type": "Panel",
//!   "attributes": { "id": "root", "direction": "row" },
//!   "children": [
//!     { "type": "Button", "attributes": { "id": "b1" } }
//!   ]
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::types::Value;

use super::{NodeId, StateNode, StateTree};

/// Serializable description of a node and its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(type_tag: &str) -> Self {
        Self {
            type_tag: type_tag.to_string(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Shorthand for a node carrying an `id` attribute.
    pub fn with_id(type_tag: &str, id: &str) -> Self {
        Self::new(type_tag).attr("id", id)
    }

    pub fn attr(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }
}

impl StateTree {
    /// Build a document from a description; its root becomes the document root.
    pub fn from_spec(spec: &NodeSpec) -> Self {
        let tree = StateTree::new(&spec.type_tag);
        let root = tree.root();
        for (name, value) in &spec.attributes {
            root.set_attribute(name, value.clone());
        }
        for child in &spec.children {
            let node = tree.create_from_spec(child);
            tree.link_silently(root.node_id(), node.node_id());
        }
        tree
    }

    /// Parse a document from JSON.
    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        let spec: NodeSpec = serde_json::from_str(json)?;
        Ok(Self::from_spec(&spec))
    }

    /// Build a detached subtree without sending notifications.
    ///
    /// Attach it with `add_child`; listeners then see a single insertion.
    pub fn create_from_spec(&self, spec: &NodeSpec) -> StateNode {
        let node = self.build_detached(&spec.type_tag, spec.attributes.clone());
        for child in &spec.children {
            let child_node = self.create_from_spec(child);
            self.link_silently(node.node_id(), child_node.node_id());
        }
        node
    }

    /// Serialize the whole document as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string_pretty(&self.root().to_spec())?)
    }
}

impl StateNode {
    /// Snapshot of this node and its subtree.
    pub fn to_spec(&self) -> NodeSpec {
        self.tree().with_data(|data| spec_of(data, self.node_id()))
    }
}

fn spec_of(data: &super::node::TreeDataView<'_>, id: NodeId) -> NodeSpec {
    NodeSpec {
        type_tag: data.type_tag(id).to_string(),
        attributes: data.attributes(id).clone(),
        children: data.children(id).iter().map(|&c| spec_of(data, c)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PANEL: &str = r#"{
        "type": "Panel",
        "attributes": { "id": "root", "width": 80 },
        "children": [
            { "type": "Button", "attributes": { "id": "b1", "text": "OK" } },
            { "type": "Button", "attributes": { "id": "b2" } }
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let tree = StateTree::from_json(PANEL).unwrap();
        let root = tree.root();

        assert_eq!(root.type_tag(), "Panel");
        assert_eq!(root.attribute("width"), Some(Value::Int(80)));
        assert_eq!(root.num_children(), 2);
        let b1 = root.child(0).unwrap();
        assert_eq!(b1.attribute_string("text"), "OK");
        assert_eq!(b1.parent(), Some(root));
    }

    #[test]
    fn test_to_spec_matches_source() {
        let tree = StateTree::from_json(PANEL).unwrap();
        let spec: NodeSpec = serde_json::from_str(PANEL).unwrap();
        assert_eq!(tree.root().to_spec(), spec);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(StateTree::from_json("{\"children\": []}"), Err(TreeError::Json(_))));
    }

    #[test]
    fn test_create_from_spec_is_detached() {
        let tree = StateTree::new("Panel");
        let node = tree.create_from_spec(
            &NodeSpec::with_id("Box", "b").child(NodeSpec::with_id("Text", "t").attr("text", "x")),
        );

        assert!(node.parent().is_none());
        assert_eq!(node.num_children(), 1);
        assert_eq!(tree.root().num_children(), 0);
    }
}
