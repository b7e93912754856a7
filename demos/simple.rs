//! Basic serialization and deserialization.
//!
//! Run with: cargo run --example simple

use serde::{Deserialize, Serialize};
use sigil::{from_str, to_string};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct User {
    id: u32,
    name: String,
    email: String,
    manager: Option<u32>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let users = vec![
        User {
            id: 42,
            name: "Alice Johnson".to_string(),
            email: "alice@example.com".to_string(),
            manager: None,
        },
        User {
            id: 43,
            name: "Bob \"Bobby\" Smith".to_string(),
            email: "bob@example.com".to_string(),
            manager: Some(42),
        },
    ];

    let text = to_string(&users)?;
    println!("Composed:\n{}", text);

    let users_back: Vec<User> = from_str(&text)?;
    assert_eq!(users, users_back);
    println!("✓ Round-trip successful");

    Ok(())
}
