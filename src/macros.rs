/// Builds a [`Value`](crate::Value) from a literal-like description.
///
/// Composites are written `{ Class member: value, ... }`, arrays
/// `[a, b, ...]` and aliases `#name`. Anything else goes through
/// `Value::from`; wrap negative numbers and other multi-token expressions in
/// parentheses when they appear inside a composite or array.
///
/// ```rust
/// use sigil::{value, Composite, Value};
///
/// let v = value!({ Line from: [0, 0], to: [(-1), 2.5], label: "diagonal" });
/// assert_eq!(v.as_composite().unwrap().class(), "Line");
/// assert_eq!(value!(#start), Value::reference("start"));
/// assert_eq!(value!({ Empty }), Value::from(Composite::new("Empty")));
/// ```
#[macro_export]
macro_rules! value {
    ([]) => {
        $crate::Value::array(::std::vec::Vec::new())
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::array(vec![$($crate::value!($elem)),*])
    };

    ({ $class:ident }) => {
        $crate::Value::composite(stringify!($class))
    };

    ({ $class:ident $($member:ident : $value:tt),* $(,)? }) => {{
        let mut composite = $crate::Composite::new(stringify!($class));
        $(
            composite.insert(stringify!($member), $crate::value!($value));
        )*
        $crate::Value::from(composite)
    }};

    (# $name:ident) => {
        $crate::Value::reference(stringify!($name))
    };

    (( $e:expr )) => {
        $crate::Value::from($e)
    };

    ($e:expr) => {
        $crate::Value::from($e)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Composite, Value};

    #[test]
    fn test_value_macro_scalars() {
        assert_eq!(value!(42), Value::from(42));
        assert_eq!(value!(0.25), Value::from(0.25));
        assert_eq!(value!("hello"), Value::text("hello"));
        assert_eq!(value!((-3)), Value::from(-3));
    }

    #[test]
    fn test_value_macro_arrays() {
        assert_eq!(value!([]), Value::array(vec![]));

        let arr = value!([1, "two", [3]]);
        let items = arr.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1], Value::text("two"));
        assert_eq!(items[2], Value::array(vec![Value::from(3)]));
    }

    #[test]
    fn test_value_macro_composites() {
        assert_eq!(value!({ Nothing }), Value::composite("Nothing"));

        let point = value!({ Point x: 1, y: (-2), tags: ["a"] });
        let expected = Composite::new("Point")
            .with("x", 1)
            .with("y", -2)
            .with("tags", Value::array(vec![Value::text("a")]));
        assert_eq!(point, Value::from(expected));
    }
}
