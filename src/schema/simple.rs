use std::fmt;

use bigdecimal::BigDecimal;
use regex::Regex;
use serde_json::Value;

use crate::error::ConstraintError;
use crate::error_message::ErrorMessage;
use crate::format;
use crate::simple_type::{SimpleType, decimal_value, values_equal};

/// A regex that must match the whole string, not a substring of it.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    anchored: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        // an unbalanced source can become valid once wrapped
        Regex::new(source)?;
        let anchored = Regex::new(&format!("^(?:{})$", source))?;
        Ok(Self {
            source: source.to_string(),
            anchored,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_full_match(&self, value: &str) -> bool {
        self.anchored.is_match(value)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

/// One primitive type plus optional refinements.
///
/// Built through [`SimpleTypeSchemaBuilder`], which rejects keyword
/// combinations the type cannot carry.
#[derive(Debug, Clone)]
pub struct SimpleTypeSchema {
    simple_type: SimpleType,
    pattern: Option<Pattern>,
    format: Option<String>,
    min_length: usize,
    max_length: usize,
    minimum: Option<BigDecimal>,
    maximum: Option<BigDecimal>,
    exclusive_minimum: bool,
    exclusive_maximum: bool,
    enumeration: Option<Vec<Value>>,
}

impl SimpleTypeSchema {
    /// An unrefined schema for `simple_type`.
    pub fn new(simple_type: SimpleType) -> Self {
        Self {
            simple_type,
            pattern: None,
            format: None,
            min_length: 0,
            max_length: 0,
            minimum: None,
            maximum: None,
            exclusive_minimum: false,
            exclusive_maximum: false,
            enumeration: None,
        }
    }

    pub fn builder(simple_type: SimpleType) -> SimpleTypeSchemaBuilder {
        SimpleTypeSchemaBuilder {
            schema: Self::new(simple_type),
            min_length: None,
            max_length: None,
            exclusive_minimum: None,
            exclusive_maximum: None,
        }
    }

    pub fn validate(&self, value: &Value) -> Vec<ErrorMessage> {
        if !self.simple_type.matches(value) {
            return ErrorMessage::single(
                "",
                format!("Invalid type: must be of type {}", self.simple_type),
            );
        }

        let mut results = Vec::new();
        self.validate_pattern(value, &mut results);
        self.validate_format(value, &mut results);
        self.validate_range(value, &mut results);
        self.validate_length(value, &mut results);
        self.validate_enumeration(value, &mut results);
        results
    }

    fn validate_pattern(&self, value: &Value, results: &mut Vec<ErrorMessage>) {
        if let (Some(pattern), Some(text)) = (&self.pattern, value.as_str())
            && !pattern.is_full_match(text)
        {
            results.push(ErrorMessage::new(
                "",
                format!(
                    "String value '{}' does not match regex '{}'",
                    text,
                    pattern.as_str()
                ),
            ));
        }
    }

    fn validate_format(&self, value: &Value, results: &mut Vec<ErrorMessage>) {
        let Some(name) = &self.format else {
            return;
        };
        if let Some(checker) = format::lookup(name)
            && !checker.is_valid(value)
        {
            results.push(ErrorMessage::new(
                "",
                format!("Value '{}' is not a valid {}", text_of(value), name),
            ));
        }
    }

    fn validate_range(&self, value: &Value, results: &mut Vec<ErrorMessage>) {
        let Some(number) = value.as_number() else {
            return;
        };
        let Some(actual) = decimal_value(number) else {
            return;
        };
        let literal = number.to_string();

        if let Some(minimum) = &self.minimum {
            if self.exclusive_minimum && actual <= *minimum {
                results.push(ErrorMessage::new(
                    "",
                    format!(
                        "Value '{}' must be greater than {} when exclusiveMinimum is true",
                        literal, minimum
                    ),
                ));
            } else if actual < *minimum {
                results.push(ErrorMessage::new(
                    "",
                    format!("Value '{}' must be greater or equal to {}", literal, minimum),
                ));
            }
        }

        if let Some(maximum) = &self.maximum {
            if self.exclusive_maximum && actual >= *maximum {
                results.push(ErrorMessage::new(
                    "",
                    format!(
                        "Value '{}' must be less than {} when exclusiveMaximum is true",
                        literal, maximum
                    ),
                ));
            } else if actual > *maximum {
                results.push(ErrorMessage::new(
                    "",
                    format!(
                        "Value '{}' must be less than or equal to {}",
                        literal, maximum
                    ),
                ));
            }
        }
    }

    fn validate_length(&self, value: &Value, results: &mut Vec<ErrorMessage>) {
        let Some(text) = value.as_str() else {
            return;
        };
        let length = text.chars().count();

        if self.min_length > 0 && length < self.min_length {
            results.push(ErrorMessage::new(
                "",
                format!(
                    "Value '{}' must be greater or equal to {} characters",
                    text, self.min_length
                ),
            ));
        }
        if self.max_length > 0 && length > self.max_length {
            results.push(ErrorMessage::new(
                "",
                format!(
                    "Value '{}' must be less or equal to {} characters",
                    text, self.max_length
                ),
            ));
        }
    }

    fn validate_enumeration(&self, value: &Value, results: &mut Vec<ErrorMessage>) {
        let Some(enumeration) = &self.enumeration else {
            return;
        };
        if !enumeration.iter().any(|allowed| values_equal(allowed, value)) {
            let allowed: Vec<String> = enumeration.iter().map(Value::to_string).collect();
            results.push(ErrorMessage::new(
                "",
                format!("Value {} must be one of: [{}]", value, allowed.join(", ")),
            ));
        }
    }

    pub fn simple_type(&self) -> SimpleType {
        self.simple_type
    }

    pub fn pattern(&self) -> Option<&Pattern> {
        self.pattern.as_ref()
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn minimum(&self) -> Option<&BigDecimal> {
        self.minimum.as_ref()
    }

    pub fn maximum(&self) -> Option<&BigDecimal> {
        self.maximum.as_ref()
    }

    pub fn is_exclusive_minimum(&self) -> bool {
        self.exclusive_minimum
    }

    pub fn is_exclusive_maximum(&self) -> bool {
        self.exclusive_maximum
    }

    pub fn enumeration(&self) -> Option<&[Value]> {
        self.enumeration.as_deref()
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Collects refinements for a [`SimpleTypeSchema`]; [`build`](Self::build)
/// checks them against the declared type.
///
/// Lengths and exclusive flags are kept apart until `build` so that a keyword
/// given as `0` or `false` is still rejected on a type that cannot carry it.
#[derive(Debug, Clone)]
pub struct SimpleTypeSchemaBuilder {
    schema: SimpleTypeSchema,
    min_length: Option<usize>,
    max_length: Option<usize>,
    exclusive_minimum: Option<bool>,
    exclusive_maximum: Option<bool>,
}

impl SimpleTypeSchemaBuilder {
    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.schema.pattern = Some(pattern);
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.schema.format = Some(format.into());
        self
    }

    pub fn min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn minimum(mut self, minimum: BigDecimal) -> Self {
        self.schema.minimum = Some(minimum);
        self
    }

    pub fn maximum(mut self, maximum: BigDecimal) -> Self {
        self.schema.maximum = Some(maximum);
        self
    }

    pub fn exclusive_minimum(mut self, exclusive: bool) -> Self {
        self.exclusive_minimum = Some(exclusive);
        self
    }

    pub fn exclusive_maximum(mut self, exclusive: bool) -> Self {
        self.exclusive_maximum = Some(exclusive);
        self
    }

    pub fn enumeration(mut self, values: Vec<Value>) -> Self {
        self.schema.enumeration = Some(values);
        self
    }

    pub fn build(self) -> Result<SimpleTypeSchema, ConstraintError> {
        let mut schema = self.schema;
        let simple_type = schema.simple_type;

        if schema.pattern.is_some() && simple_type != SimpleType::String {
            return Err(ConstraintError::PatternRequiresString);
        }

        if let Some(name) = &schema.format
            && let Some(checker) = format::lookup(name)
            && !checker.is_compatible_type(simple_type)
        {
            return Err(ConstraintError::IncompatibleFormat {
                format: name.clone(),
                type_name: simple_type.to_string(),
            });
        }

        if simple_type != SimpleType::String {
            if self.min_length.is_some() {
                return Err(ConstraintError::LengthRequiresString {
                    keyword: "minLength",
                });
            }
            if self.max_length.is_some() {
                return Err(ConstraintError::LengthRequiresString {
                    keyword: "maxLength",
                });
            }
        }

        if !simple_type.is_numeric() {
            let numeric_keywords = [
                ("minimum", schema.minimum.is_some()),
                ("maximum", schema.maximum.is_some()),
                ("exclusiveMinimum", self.exclusive_minimum.is_some()),
                ("exclusiveMaximum", self.exclusive_maximum.is_some()),
            ];
            if let Some((keyword, _)) = numeric_keywords.into_iter().find(|(_, set)| *set) {
                return Err(ConstraintError::RangeRequiresNumeric { keyword });
            }
        }

        if let Some(values) = &schema.enumeration {
            if matches!(simple_type, SimpleType::Null | SimpleType::Any) {
                return Err(ConstraintError::EnumerationNotAllowed);
            }
            if let Some(value) = values.iter().find(|value| !simple_type.matches(value)) {
                return Err(ConstraintError::EnumerationTypeMismatch {
                    type_name: simple_type.to_string(),
                    value: value.to_string(),
                });
            }
        }

        schema.min_length = self.min_length.unwrap_or_default();
        schema.max_length = self.max_length.unwrap_or_default();
        schema.exclusive_minimum = self.exclusive_minimum.unwrap_or_default();
        schema.exclusive_maximum = self.exclusive_maximum.unwrap_or_default();
        Ok(schema)
    }
}
