//! Building value trees with the value! macro.
//!
//! Run with: cargo run --example macro

use sigil::{compose, value, Value};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let number = value!(42);
    let precise = value!((sigil::Numeric::new("0.500")?));
    let text = value!("Hello, sigil!");

    println!("Primitives:");
    print!("  number:  {}", compose(&number)?);
    print!("  precise: {}", compose(&precise)?);
    println!("  text:    {}", compose(&text)?);

    let numbers = value!([1, 2, 3, 4, 5]);
    println!("Array:\n{}", compose(&numbers)?);

    let config = value!({ Config
        app: { App name: "MyApp", version: "1.0.0" },
        database: { Database host: "localhost", port: 5432 },
        features: ["auth", "logging", "metrics"],
    });
    println!("Nested composites:\n{}", compose(&config)?);

    let items: Vec<Value> = (1..=3)
        .map(|id| value!({ Item id: id, status: "pending" }))
        .collect();
    let summary = value!({ Summary total: 3, items: (Value::array(items)) });
    println!("Dynamic construction:\n{}", compose(&summary)?);

    if let Some(app) = config.as_composite().and_then(|c| c.get("app")) {
        let name = app.as_composite().and_then(|a| a.get("name")).and_then(Value::as_str);
        println!("App name: {}", name.unwrap_or("?"));
    }

    Ok(())
}
