//! Walking a parsed document, aliases included.
//!
//! Run with: cargo run --example dynamic_values

use sigil::{compose, parse, Composite, Document, Value, ValueKind};
use std::error::Error;

const CREW: &str = r#"
; the crew of the Argo
{ Ship
    name "Argo"
    captain #jason
    crew [
        { Person name "Jason" role "captain" } @jason
        { Person name "Tiphys" role "helmsman" mentor #jason }
    ]
    length =30.50
}
"#;

fn describe(doc: &Document, value: &Value, depth: usize) -> Result<(), Box<dyn Error>> {
    let pad = "  ".repeat(depth);
    match value.payload() {
        ValueKind::Composite(c) => {
            println!("{}{} with {} members", pad, c.class(), c.len());
            for (name, member) in c.iter() {
                println!("{}  .{}", pad, name);
                describe(doc, member, depth + 2)?;
            }
        }
        ValueKind::Array(items) => {
            println!("{}array of {}", pad, items.len());
            for item in items {
                describe(doc, item, depth + 1)?;
            }
        }
        ValueKind::Reference(name) => {
            let target = doc.resolve(value)?;
            let label = target
                .as_composite()
                .and_then(|c| c.get("name"))
                .and_then(Value::as_str)
                .unwrap_or("?");
            println!("{}alias #{} -> {}", pad, name, label);
        }
        ValueKind::Numeric(n) => println!("{}numeric {} (as f64: {})", pad, n, n.to_f64()?),
        _ => println!("{}{} {}", pad, value.kind(), compose(value)?.trim_end()),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let doc = parse(CREW)?;
    println!("Anchors: {:?}\n", doc.anchor_names().collect::<Vec<_>>());
    describe(&doc, &doc[0], 0)?;

    // Build a tree that shares one value in two places.
    let harbour = Value::share(Value::from(Composite::new("Port").with("name", "Iolcus")));
    let voyage = Value::from(
        Composite::new("Voyage")
            .with("from", harbour.clone())
            .with("to", harbour),
    );
    println!("\nShared value composed once:\n{}", compose(&voyage)?);

    Ok(())
}
