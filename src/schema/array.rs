use serde_json::Value;

use super::SchemaNode;
use crate::error_message::{ErrorMessage, prefix_all};

/// Homogeneous array: every element is checked against `items`.
///
/// `0` for either bound means unbounded.
#[derive(Debug)]
pub struct ArraySchema {
    items: Box<SchemaNode>,
    min_items: usize,
    max_items: usize,
}

impl Default for ArraySchema {
    fn default() -> Self {
        Self {
            items: Box::new(SchemaNode::any()),
            min_items: 0,
            max_items: 0,
        }
    }
}

impl ArraySchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(mut self, items: SchemaNode) -> Self {
        self.items = Box::new(items);
        self
    }

    pub fn with_min_items(mut self, min_items: usize) -> Self {
        self.min_items = min_items;
        self
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn items(&self) -> &SchemaNode {
        &self.items
    }

    pub fn min_items(&self) -> usize {
        self.min_items
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    pub fn validate(&self, value: &Value) -> Vec<ErrorMessage> {
        let Some(elements) = value.as_array() else {
            return ErrorMessage::single("", "Invalid type: must be an array");
        };

        let mut results = Vec::new();
        let size = elements.len();

        if self.max_items > 0 && size > self.max_items {
            results.push(ErrorMessage::new(
                "",
                format!(
                    "Current array size of {} is greater than allowed maximum array size of {}",
                    size, self.max_items
                ),
            ));
        }
        if self.min_items > 0 && size < self.min_items {
            results.push(ErrorMessage::new(
                "",
                format!(
                    "Current array size of {} is less than allowed minimum array size of {}",
                    size, self.min_items
                ),
            ));
        }

        for (index, element) in elements.iter().enumerate() {
            results.extend(prefix_all(
                &format!("[{}]", index),
                self.items.validate(element),
            ));
        }
        results
    }
}
