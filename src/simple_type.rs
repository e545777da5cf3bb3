use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde_json::{Number, Value};

/// The primitive kinds a simple schema can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimpleType {
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Any,
}

impl SimpleType {
    pub const ALL: [SimpleType; 6] = [
        SimpleType::String,
        SimpleType::Number,
        SimpleType::Integer,
        SimpleType::Boolean,
        SimpleType::Null,
        SimpleType::Any,
    ];

    /// Whether `value` has the shape this type demands.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            SimpleType::String => value.is_string(),
            SimpleType::Number => value.is_number(),
            SimpleType::Integer => match value {
                Value::Number(number) => is_integral(number),
                _ => false,
            },
            SimpleType::Boolean => value.is_boolean(),
            SimpleType::Null => value.is_null(),
            SimpleType::Any => true,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SimpleType::String => "string",
            SimpleType::Number => "number",
            SimpleType::Integer => "integer",
            SimpleType::Boolean => "boolean",
            SimpleType::Null => "null",
            SimpleType::Any => "any",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, SimpleType::Number | SimpleType::Integer)
    }
}

impl fmt::Display for SimpleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SimpleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SimpleType::ALL
            .into_iter()
            .find(|candidate| candidate.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| s.to_string())
    }
}

/// An integer is a numeric literal without fraction or exponent, so `1.0` is
/// a number but not an integer.
fn is_integral(number: &Number) -> bool {
    if number.is_i64() || number.is_u64() {
        return true;
    }
    let literal = number.to_string();
    let digits = literal.strip_prefix('-').unwrap_or(&literal);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Exact decimal value of a JSON number, taken from its literal text.
pub(crate) fn decimal_value(number: &Number) -> Option<BigDecimal> {
    BigDecimal::from_str(&number.to_string()).ok()
}

/// Structural equality where numbers compare by decimal value (`1` == `1.0`).
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (decimal_value(x), decimal_value(y)) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}
