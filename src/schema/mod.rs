//! Compiled schema graph.
//!
//! A [`SchemaNode`] is immutable once built. Validation is a pure recursive
//! walk that accumulates [`ErrorMessage`]s; it never fails.

mod array;
mod object;
mod reference;
mod simple;
mod union;

use serde_json::Value;

use crate::error_message::ErrorMessage;
use crate::simple_type::SimpleType;

pub use array::ArraySchema;
pub use object::{AdditionalProperties, ObjectSchema, Property};
pub use reference::SchemaReference;
pub use simple::{Pattern, SimpleTypeSchema, SimpleTypeSchemaBuilder};
pub use union::UnionSchema;

#[derive(Debug)]
pub enum SchemaNode {
    Simple(SimpleTypeSchema),
    Object(ObjectSchema),
    Array(ArraySchema),
    Union(UnionSchema),
    Reference(SchemaReference),
}

impl SchemaNode {
    /// A node that accepts every document.
    pub fn any() -> Self {
        SchemaNode::Simple(SimpleTypeSchema::new(SimpleType::Any))
    }

    pub fn validate(&self, value: &Value) -> Vec<ErrorMessage> {
        match self {
            SchemaNode::Simple(schema) => schema.validate(value),
            SchemaNode::Object(schema) => schema.validate(value),
            SchemaNode::Array(schema) => schema.validate(value),
            SchemaNode::Union(schema) => schema.validate(value),
            SchemaNode::Reference(schema) => schema.validate(value),
        }
    }

    /// The top-level type gate only; no keyword checks run.
    pub fn is_acceptable_type(&self, value: &Value) -> bool {
        match self {
            SchemaNode::Simple(schema) => schema.simple_type().matches(value),
            SchemaNode::Object(_) => value.is_object(),
            SchemaNode::Array(_) => value.is_array(),
            SchemaNode::Union(schema) => schema.is_acceptable_type(value),
            SchemaNode::Reference(schema) => schema.is_acceptable_type(value),
        }
    }

    /// Human-readable type name, used when listing the members of a union.
    pub fn description(&self) -> String {
        match self {
            SchemaNode::Simple(schema) => schema.simple_type().name().to_string(),
            SchemaNode::Object(_) => "object".to_string(),
            SchemaNode::Array(_) => "array".to_string(),
            SchemaNode::Union(_) => "union".to_string(),
            SchemaNode::Reference(schema) => schema.description(),
        }
    }
}

impl From<SimpleTypeSchema> for SchemaNode {
    fn from(schema: SimpleTypeSchema) -> Self {
        SchemaNode::Simple(schema)
    }
}

impl From<ObjectSchema> for SchemaNode {
    fn from(schema: ObjectSchema) -> Self {
        SchemaNode::Object(schema)
    }
}

impl From<ArraySchema> for SchemaNode {
    fn from(schema: ArraySchema) -> Self {
        SchemaNode::Array(schema)
    }
}

impl From<UnionSchema> for SchemaNode {
    fn from(schema: UnionSchema) -> Self {
        SchemaNode::Union(schema)
    }
}

impl From<SchemaReference> for SchemaNode {
    fn from(schema: SchemaReference) -> Self {
        SchemaNode::Reference(schema)
    }
}
