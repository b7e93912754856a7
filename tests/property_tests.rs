//! Property-based tests for the round-trip guarantees.
//!
//! Generated value trees are composed and parsed back; generated Rust data
//! goes through the serde layer.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use sigil::{compose, from_str, parse, to_string, Composite, Numeric, Value};

fn roundtrip<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(
    value: &T,
) -> bool {
    match to_string(value) {
        Ok(serialized) => match from_str::<T>(&serialized) {
            Ok(deserialized) => *value == deserialized,
            Err(e) => {
                eprintln!("Deserialize failed: {}", e);
                eprintln!("Serialized was: {}", serialized);
                false
            }
        },
        Err(e) => {
            eprintln!("Serialize failed: {}", e);
            false
        }
    }
}

fn identifier() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,8}"
}

fn numeric() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        "-?[0-9]{1,30}(\\.[0-9]{1,10})?([eE][+-]?[0-9]{1,3})?"
            .prop_map(|s| Value::from(Numeric::new(&s).unwrap())),
        Just(Value::from(f64::NAN)),
        Just(Value::from(f64::NEG_INFINITY)),
    ]
}

fn tree() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![numeric(), any::<String>().prop_map(Value::text)];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::array),
            (
                identifier(),
                prop::collection::vec((identifier(), inner), 0..5)
            )
                .prop_map(|(class, members)| {
                    let mut composite = Composite::new(class);
                    for (name, value) in members {
                        composite.insert(name, value);
                    }
                    Value::from(composite)
                }),
        ]
    })
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Record {
    id: u64,
    name: String,
    scores: Vec<i32>,
    note: Option<String>,
}

proptest! {
    #[test]
    fn prop_tree_roundtrip(value in tree()) {
        let text = compose(&value).unwrap();
        let doc = parse(&text).unwrap();
        prop_assert_eq!(doc.len(), 1);
        prop_assert_eq!(&doc[0], &value);
        prop_assert_eq!(compose(&doc[0]).unwrap(), text);
    }

    #[test]
    fn prop_has_next_is_idempotent(values in prop::collection::vec(numeric(), 0..5), repeats in 1usize..4) {
        let text: String = values.iter().map(|v| compose(v).unwrap()).collect();
        let mut parser = sigil::Parser::new(&text);
        for expected in &values {
            for _ in 0..repeats {
                prop_assert!(parser.has_next().unwrap());
            }
            prop_assert_eq!(&parser.parse_next().unwrap(), expected);
        }
        prop_assert!(!parser.has_next().unwrap());
        prop_assert!(parser.parse_next().unwrap_err().is_eof());
    }

    #[test]
    fn prop_i64(n in any::<i64>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_u128(n in any::<u128>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_f64(f in any::<f64>().prop_filter("NaN never equals itself", |f| !f.is_nan())) {
        prop_assert!(roundtrip(&f));
    }

    #[test]
    fn prop_string(s in any::<String>()) {
        prop_assert!(roundtrip(&s));
    }

    #[test]
    fn prop_record(
        id in any::<u64>(),
        name in any::<String>(),
        scores in prop::collection::vec(any::<i32>(), 0..10),
        note in prop::option::of(any::<String>()),
    ) {
        let record = Record { id, name, scores, note };
        prop_assert!(roundtrip(&record));
    }
}
