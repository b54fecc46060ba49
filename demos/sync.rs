//! Sync demo - builds components from a JSON state tree, edits the state
//! and prints the live tree with its layout after each step.
//!
//! Run with: RUST_LOG=debug cargo run --example sync

use component_builder::{compute_layout, ComponentBuilder, ComponentIndex, ComponentTree, NodeSpec, StateTree};

const STATE: &str = r#"{
    "type": "Box",
    "attributes": { "id": "root", "direction": "column", "padding": 1, "gap": 1 },
    "children": [
        { "type": "Text", "attributes": { "id": "b1", "text": "First" } },
        { "type": "Text", "attributes": { "id": "b2", "text": "Second" } }
    ]
}"#;

fn print_tree(components: &ComponentTree, index: ComponentIndex, depth: usize) {
    let Some(c) = components.get(index) else { return };
    println!(
        "{:indent$}{} `{}` {}",
        "",
        c.type_tag,
        c.component_id(),
        c.text.as_deref().unwrap_or(""),
        indent = depth * 2
    );
    for &child in c.children() {
        print_tree(components, child, depth + 1);
    }
}

fn show(step: &str, builder: &ComponentBuilder, root: ComponentIndex) {
    println!("== {step}");
    let components = builder.components();
    print_tree(&components, root, 0);
    match compute_layout(&components, root, 40.0, 12.0) {
        Ok(layout) => {
            for &child in components.children(root) {
                if let (Some(rect), Some(id)) = (layout.get(child), components.component_id(child)) {
                    println!("  {id}: {}x{} at ({}, {})", rect.width, rect.height, rect.x, rect.y);
                }
            }
        }
        Err(e) => eprintln!("layout failed: {e}"),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let tree = StateTree::from_json(STATE)?;
    let mut builder = ComponentBuilder::new(tree.root());
    builder.register_standard_component_types()?;
    let root = builder.managed_component()?;
    show("initial", &builder, root);

    let state_root = tree.root();
    state_root.remove_child(0)?;
    state_root.append_child(&tree.create_from_spec(&NodeSpec::with_id("Text", "b3").attr("text", "Third")))?;
    show("removed b1, appended b3", &builder, root);

    state_root.move_child(1, 0)?;
    if let Some(b3) = state_root.child(0) {
        b3.set_attribute("text", "Third, now first");
    }
    show("moved b3 to the back", &builder, root);

    println!("stats: {:?}", builder.components().stats());
    Ok(())
}
