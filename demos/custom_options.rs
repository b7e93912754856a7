//! Customizing indentation and generated anchor names.
//!
//! Run with: cargo run --example custom_options

use serde::Serialize;
use sigil::{compose_with_options, to_string_with_options, ComposeOptions, Composite, Indent, Value};
use std::error::Error;

#[derive(Debug, Serialize)]
struct Config {
    name: String,
    version: String,
    debug: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config {
        name: "MyApp".to_string(),
        version: "1.0.0".to_string(),
        debug: true,
    };

    println!("Default (tabs):");
    println!("{}", sigil::to_string(&config)?);

    println!("Two spaces:");
    let spaces = ComposeOptions::new().with_indent(Indent::Spaces(2));
    println!("{}", to_string_with_options(&config, spaces)?);

    println!("Generated anchors named node1, node2, ...:");
    let left = Value::share(Value::from(Composite::new("Leaf").with("id", 1)));
    let right = Value::share(Value::from(Composite::new("Leaf").with("id", 2)));
    let tree = Value::array(vec![left.clone(), right.clone(), right, left]);
    let options = ComposeOptions::new().with_anchor_prefix("node");
    println!("{}", compose_with_options(&tree, options)?);

    Ok(())
}
