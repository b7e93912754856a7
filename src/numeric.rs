//! Literal-preserving numbers.
//!
//! A [`Numeric`] keeps the exact text it was parsed from and converts it on
//! demand. Writing it back emits that text verbatim, so `=0.500`, `=1e3` and
//! `=-Infinity` survive a round trip unchanged.
//!
//! ## Conversions
//!
//! - Integer accessors (`to_i8` through `to_u128`) accept any literal whose
//!   exact value is integral and in range: `=1e3` converts to `1000`, `=2.5`
//!   does not convert at all.
//! - Float accessors understand `Infinity`, `-Infinity` and `NaN` and fail if
//!   a finite literal overflows the target type.
//! - [`Numeric::to_decimal`] gives the exact value as a [`Decimal`].
//!
//! ```rust
//! use sigil::Numeric;
//!
//! let n: Numeric = "1.50e2".parse().unwrap();
//! assert_eq!(n.as_str(), "1.50e2");
//! assert_eq!(n.to_i32().unwrap(), 150);
//! assert_eq!(n.to_f64().unwrap(), 150.0);
//! assert!(n.to_i8().is_ok());
//! assert!("2.5".parse::<Numeric>().unwrap().to_i64().is_err());
//! ```

use crate::syntax::{INFINITY, NAN, NEG_INFINITY};
use crate::{Error, Result};
use num_bigint::{BigInt, Sign};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Powers of ten above this are not expanded when converting to integers.
const MAX_EXPONENT: u32 = 4096;

/// A number stored as its literal text.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Numeric {
    literal: String,
}

macro_rules! integer_accessors {
    ($($method:ident => $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("Converts the literal to `", stringify!($ty), "` if its exact value fits.")]
            pub fn $method(&self) -> Result<$ty> {
                if let Ok(n) = self.literal.parse::<$ty>() {
                    return Ok(n);
                }
                let n = self.to_bigint_for(stringify!($ty))?;
                <$ty>::try_from(n).map_err(|_| {
                    self.conversion_error(stringify!($ty), "value is out of range")
                })
            }
        )*
    };
}

impl Numeric {
    /// Creates a numeric value after checking `literal` against the numeric grammar.
    pub fn new(literal: &str) -> Result<Self> {
        if is_valid_literal(literal) {
            Ok(Numeric {
                literal: literal.to_string(),
            })
        } else {
            Err(Error::invalid_literal(literal))
        }
    }

    /// The literal text exactly as parsed or constructed.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.literal
    }

    /// Returns `true` for `Infinity`, `-Infinity` and `NaN`.
    #[must_use]
    pub fn is_special(&self) -> bool {
        matches!(self.literal.as_str(), INFINITY | NEG_INFINITY | NAN)
    }

    /// Returns `true` if the literal denotes an integer.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.to_bigint().is_ok()
    }

    integer_accessors! {
        to_i8 => i8,
        to_i16 => i16,
        to_i32 => i32,
        to_i64 => i64,
        to_i128 => i128,
        to_isize => isize,
        to_u8 => u8,
        to_u16 => u16,
        to_u32 => u32,
        to_u64 => u64,
        to_u128 => u128,
        to_usize => usize,
    }

    /// Converts the literal to `f64`.
    pub fn to_f64(&self) -> Result<f64> {
        match self.literal.as_str() {
            INFINITY => Ok(f64::INFINITY),
            NEG_INFINITY => Ok(f64::NEG_INFINITY),
            NAN => Ok(f64::NAN),
            literal => {
                let f: f64 = literal
                    .parse()
                    .map_err(|_| self.conversion_error("f64", "not a number"))?;
                if f.is_finite() {
                    Ok(f)
                } else {
                    Err(self.conversion_error("f64", "value overflows"))
                }
            }
        }
    }

    /// Converts the literal to `f32`.
    pub fn to_f32(&self) -> Result<f32> {
        match self.literal.as_str() {
            INFINITY => Ok(f32::INFINITY),
            NEG_INFINITY => Ok(f32::NEG_INFINITY),
            NAN => Ok(f32::NAN),
            literal => {
                let f: f32 = literal
                    .parse()
                    .map_err(|_| self.conversion_error("f32", "not a number"))?;
                if f.is_finite() {
                    Ok(f)
                } else {
                    Err(self.conversion_error("f32", "value overflows"))
                }
            }
        }
    }

    /// Converts the literal to an exact decimal.
    pub fn to_decimal(&self) -> Result<Decimal> {
        if self.is_special() {
            return Err(self.conversion_error("decimal", "value is not finite"));
        }
        Decimal::parse(&self.literal)
            .ok_or_else(|| self.conversion_error("decimal", "exponent is out of range"))
    }

    /// Converts the literal to an arbitrary-precision integer.
    pub fn to_bigint(&self) -> Result<BigInt> {
        self.to_bigint_for("integer")
    }

    fn to_bigint_for(&self, target: &str) -> Result<BigInt> {
        if self.is_special() {
            return Err(self.conversion_error(target, "value is not finite"));
        }
        let decimal = Decimal::parse(&self.literal)
            .ok_or_else(|| self.conversion_error(target, "exponent is out of range"))?;
        decimal
            .to_integer()
            .ok_or_else(|| {
                self.conversion_error(target, "value is not an integer or its exponent is out of range")
            })
    }

    fn conversion_error(&self, target: &str, msg: &str) -> Error {
        Error::conversion("numeric", target, &format!("{}: {}", self.literal, msg))
    }
}

/// Checks `[+-]?digits(.digits)?([eE][+-]?digits)?` and the special literals.
fn is_valid_literal(literal: &str) -> bool {
    if matches!(literal, INFINITY | NEG_INFINITY | NAN) {
        return true;
    }

    let bytes = literal.as_bytes();
    let mut i = 0;
    let digits = |i: &mut usize| {
        let start = *i;
        while *i < bytes.len() && bytes[*i].is_ascii_digit() {
            *i += 1;
        }
        *i > start
    };

    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    if !digits(&mut i) {
        return false;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        if !digits(&mut i) {
            return false;
        }
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        if !digits(&mut i) {
            return false;
        }
    }
    i == bytes.len()
}

impl FromStr for Numeric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Numeric::new(s)
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

macro_rules! numeric_from_display {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Numeric {
                fn from(n: $ty) -> Self {
                    Numeric { literal: n.to_string() }
                }
            }
        )*
    };
}

numeric_from_display!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, BigInt);

macro_rules! numeric_from_float {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Numeric {
                fn from(f: $ty) -> Self {
                    let literal = if f.is_nan() {
                        NAN.to_string()
                    } else if f.is_infinite() {
                        (if f > 0.0 { INFINITY } else { NEG_INFINITY }).to_string()
                    } else {
                        f.to_string()
                    };
                    Numeric { literal }
                }
            }
        )*
    };
}

numeric_from_float!(f32, f64);

impl From<Decimal> for Numeric {
    fn from(d: Decimal) -> Self {
        Numeric {
            literal: d.to_string(),
        }
    }
}

/// An exact decimal number: `unscaled * 10^-scale`.
///
/// Equality compares values, so `1.50` equals `1.5`, while [`Display`](fmt::Display)
/// keeps the scale and prints `1.50`.
///
/// ```rust
/// use sigil::Decimal;
///
/// let d: Decimal = "-0.0250".parse().unwrap();
/// assert_eq!(d.scale(), 4);
/// assert_eq!(d.to_string(), "-0.0250");
/// assert_eq!(d, "-25e-3".parse().unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct Decimal {
    unscaled: BigInt,
    scale: i64,
}

impl Decimal {
    #[must_use]
    pub fn new(unscaled: BigInt, scale: i64) -> Self {
        Decimal { unscaled, scale }
    }

    #[must_use]
    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    #[must_use]
    pub fn scale(&self) -> i64 {
        self.scale
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.unscaled.sign() == Sign::NoSign
    }

    /// Parses a finite literal that already satisfies the numeric grammar.
    fn parse(literal: &str) -> Option<Self> {
        let (mantissa, exponent) = match literal.find(|c: char| c == 'e' || c == 'E') {
            Some(i) => (&literal[..i], literal[i + 1..].parse::<i64>().ok()?),
            None => (literal, 0),
        };
        let (int_part, frac_part) = match mantissa.find('.') {
            Some(i) => (&mantissa[..i], &mantissa[i + 1..]),
            None => (mantissa, ""),
        };
        let digits = format!("{}{}", int_part, frac_part);
        let unscaled = BigInt::parse_bytes(digits.as_bytes(), 10)?;
        let scale = (frac_part.len() as i64).checked_sub(exponent)?;
        Some(Decimal { unscaled, scale })
    }

    /// Removes trailing zeros from the unscaled value.
    ///
    /// The scale widens to `i128` so stripping zeros never overflows, even
    /// for a scale near `i64::MIN`.
    fn normalized(&self) -> (BigInt, i128) {
        if self.is_zero() {
            return (BigInt::from(0), 0);
        }
        let ten = BigInt::from(10);
        let zero = BigInt::from(0);
        let mut unscaled = self.unscaled.clone();
        let mut scale = i128::from(self.scale);
        while &unscaled % &ten == zero {
            unscaled /= &ten;
            scale -= 1;
        }
        (unscaled, scale)
    }

    /// The exact integer value, if integral and not beyond the exponent limit.
    #[must_use]
    pub fn to_integer(&self) -> Option<BigInt> {
        let (unscaled, scale) = self.normalized();
        match scale.cmp(&0) {
            Ordering::Greater => None,
            Ordering::Equal => Some(unscaled),
            Ordering::Less => {
                let exponent = u32::try_from(-scale).ok().filter(|e| *e <= MAX_EXPONENT)?;
                Some(unscaled * BigInt::from(10).pow(exponent))
            }
        }
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        let (a, a_scale) = self.normalized();
        let (b, b_scale) = other.normalized();
        a == b && a_scale == b_scale
    }
}

impl Eq for Decimal {}

impl FromStr for Decimal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Numeric::new(s)?.to_decimal()
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unscaled.sign() == Sign::Minus {
            f.write_str("-")?;
        }
        let digits = self.unscaled.magnitude().to_string();
        if self.scale == 0 {
            return f.write_str(&digits);
        }
        if self.scale < 0 || self.scale as usize > digits.len() + 32 {
            return write!(f, "{}e{}", digits, -i128::from(self.scale));
        }

        let scale = self.scale as usize;
        if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{}.{}", int_part, frac_part)
        } else {
            write!(f, "0.{}{}", "0".repeat(scale - digits.len()), digits)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(s: &str) -> Numeric {
        Numeric::new(s).unwrap()
    }

    #[test]
    fn test_literal_grammar() {
        for ok in ["0", "-1", "+7", "0.500", "1e9", "1.5E-3", "-2e+4", "Infinity", "-Infinity", "NaN"] {
            assert!(Numeric::new(ok).is_ok(), "{} should be accepted", ok);
        }
        for bad in ["", "-", ".5", "5.", "1e", "1e+", "0x10", "inf", "+Infinity", "1 2", "1.2.3"] {
            assert!(
                matches!(Numeric::new(bad), Err(Error::InvalidLiteral(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_literal_is_preserved() {
        assert_eq!(num("0.500").to_string(), "0.500");
        assert_eq!(num("1.0e10").as_str(), "1.0e10");
    }

    #[test]
    fn test_integer_accessors() {
        assert_eq!(num("127").to_i8().unwrap(), 127);
        assert!(num("128").to_i8().is_err());
        assert_eq!(num("-128").to_i8().unwrap(), -128);
        assert!(num("-1").to_u64().is_err());
        assert_eq!(num("1e3").to_u16().unwrap(), 1000);
        assert_eq!(num("2.000").to_i32().unwrap(), 2);
        assert_eq!(num("12300e-2").to_i64().unwrap(), 123);
        assert!(num("2.5").to_i64().is_err());
        assert!(num("NaN").to_i32().is_err());
        assert!(num("1e5000").to_u128().is_err());
        assert_eq!(
            num("170141183460469231731687303715884105727").to_i128().unwrap(),
            i128::MAX
        );
    }

    #[test]
    fn test_conversion_error_names_target() {
        let err = num("300").to_u8().unwrap_err();
        assert!(matches!(err, Error::Conversion { ref target, .. } if target == "u8"));
    }

    #[test]
    fn test_float_accessors() {
        assert_eq!(num("0.5").to_f64().unwrap(), 0.5);
        assert_eq!(num("Infinity").to_f64().unwrap(), f64::INFINITY);
        assert_eq!(num("-Infinity").to_f32().unwrap(), f32::NEG_INFINITY);
        assert!(num("NaN").to_f64().unwrap().is_nan());
        assert!(num("1e400").to_f64().is_err());
        assert!(num("1e39").to_f32().is_err());
        assert_eq!(num("1e39").to_f64().unwrap(), 1e39);
    }

    #[test]
    fn test_from_floats() {
        assert_eq!(Numeric::from(f64::INFINITY).as_str(), "Infinity");
        assert_eq!(Numeric::from(f64::NEG_INFINITY).as_str(), "-Infinity");
        assert_eq!(Numeric::from(f32::NAN).as_str(), "NaN");
        assert_eq!(Numeric::from(0.25f64).as_str(), "0.25");
        assert_eq!(Numeric::from(0.1f64).to_f64().unwrap(), 0.1);
    }

    #[test]
    fn test_decimal() {
        let d = num("0.500").to_decimal().unwrap();
        assert_eq!(d.scale(), 3);
        assert_eq!(d.to_string(), "0.500");
        assert_eq!(d, "0.5".parse().unwrap());
        assert_ne!(d, "0.05".parse().unwrap());

        assert_eq!("-12.5e1".parse::<Decimal>().unwrap().to_string(), "-125");
        assert_eq!("3e2".parse::<Decimal>().unwrap().to_string(), "3e2");
        assert_eq!("0e5".parse::<Decimal>().unwrap(), "0.000".parse().unwrap());
        assert!(num("Infinity").to_decimal().is_err());
    }

    #[test]
    fn test_extreme_exponents() {
        let huge = num("100e9223372036854775807");
        assert!(huge.to_i32().is_err());
        assert!(huge.to_bigint().is_err());
        assert!(num("10e9223372036854775807").to_i32().is_err());
        assert!(num("1e-9223372036854775807").to_i64().is_err());

        let a = huge.to_decimal().unwrap();
        let b = num("1e9223372036854775807").to_decimal().unwrap();
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_ne!(
            Decimal::new(BigInt::from(100), i64::MIN),
            Decimal::new(BigInt::from(1), i64::MIN)
        );
        assert_eq!(
            Decimal::new(BigInt::from(7), i64::MIN).to_string(),
            "7e9223372036854775808"
        );
    }

    #[test]
    fn test_is_integer() {
        assert!(num("10").is_integer());
        assert!(num("1.0").is_integer());
        assert!(!num("1.1").is_integer());
        assert!(!num("NaN").is_integer());
        assert!(num("-Infinity").is_special());
    }
}
