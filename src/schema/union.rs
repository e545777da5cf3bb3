use serde_json::Value;

use super::SchemaNode;
use crate::error_message::ErrorMessage;

/// Accepts a value if any nested schema does, reporting the closest match.
#[derive(Debug)]
pub struct UnionSchema {
    nested: Vec<SchemaNode>,
}

impl UnionSchema {
    pub fn new(nested: Vec<SchemaNode>) -> Self {
        Self { nested }
    }

    pub fn nested(&self) -> &[SchemaNode] {
        &self.nested
    }

    pub fn is_acceptable_type(&self, value: &Value) -> bool {
        self.nested.iter().any(|schema| schema.is_acceptable_type(value))
    }

    pub fn validate(&self, value: &Value) -> Vec<ErrorMessage> {
        if !self.is_acceptable_type(value) {
            return ErrorMessage::single(
                "",
                format!("Invalid type: must be one of: [{}]", self.described_types()),
            );
        }

        // min_by_key keeps the first of equal minima
        self.nested
            .iter()
            .map(|schema| schema.validate(value))
            .min_by_key(Vec::len)
            .unwrap_or_default()
    }

    fn described_types(&self) -> String {
        let mut seen: Vec<String> = Vec::new();
        for description in self.nested.iter().map(SchemaNode::description) {
            if !seen.contains(&description) {
                seen.push(description);
            }
        }
        seen.iter()
            .map(|d| format!("\"{}\"", d))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
