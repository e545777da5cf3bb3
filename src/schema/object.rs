use serde_json::{Map, Value};

use super::SchemaNode;
use crate::error_message::{ErrorMessage, prefix_all};

/// A declared entry of an object schema's `properties`.
#[derive(Debug)]
pub struct Property {
    name: String,
    required: bool,
    nested: SchemaNode,
}

impl Property {
    pub fn new(name: impl Into<String>, nested: SchemaNode) -> Self {
        Self {
            name: name.into(),
            required: false,
            nested,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn nested(&self) -> &SchemaNode {
        &self.nested
    }
}

/// What happens to keys that are not declared in `properties`.
#[derive(Debug, Default)]
pub enum AdditionalProperties {
    #[default]
    AllowAll,
    ForbidAny,
    Schema(Box<SchemaNode>),
}

#[derive(Debug, Default)]
pub struct ObjectSchema {
    properties: Vec<Property>,
    additional_properties: AdditionalProperties,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_additional_properties(mut self, additional: AdditionalProperties) -> Self {
        self.additional_properties = additional;
        self
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn additional_properties(&self) -> &AdditionalProperties {
        &self.additional_properties
    }

    pub fn validate(&self, value: &Value) -> Vec<ErrorMessage> {
        let Some(object) = value.as_object() else {
            return ErrorMessage::single("", "Invalid type: must be an object");
        };

        let mut results = self.validate_declared(object);
        results.extend(self.validate_additional(object));
        results
    }

    fn validate_declared(&self, object: &Map<String, Value>) -> Vec<ErrorMessage> {
        let mut results = Vec::new();
        for property in &self.properties {
            match object.get(&property.name) {
                Some(child) => {
                    results.extend(prefix_all(&property.name, property.nested.validate(child)));
                }
                None if property.required => {
                    results.push(ErrorMessage::new(
                        property.name.clone(),
                        format!("Missing required property {}", property.name),
                    ));
                }
                None => {}
            }
        }
        results
    }

    fn validate_additional(&self, object: &Map<String, Value>) -> Vec<ErrorMessage> {
        if matches!(self.additional_properties, AdditionalProperties::AllowAll) {
            return Vec::new();
        }

        let mut results = Vec::new();
        for (key, child) in object {
            if self.properties.iter().any(|p| p.name == *key) {
                continue;
            }
            match &self.additional_properties {
                AdditionalProperties::AllowAll => {}
                AdditionalProperties::ForbidAny => {
                    results.push(ErrorMessage::new(key.clone(), "Unexpected property"));
                }
                AdditionalProperties::Schema(schema) => {
                    results.extend(prefix_all(key, schema.validate(child)));
                }
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SimpleTypeSchema;
    use crate::simple_type::SimpleType;
    use serde_json::json;

    fn simple(simple_type: SimpleType) -> SchemaNode {
        SimpleTypeSchema::new(simple_type).into()
    }

    fn id_only(additional: AdditionalProperties) -> ObjectSchema {
        ObjectSchema::new()
            .with_property(Property::new("id", simple(SimpleType::Integer)).required(true))
            .with_additional_properties(additional)
    }

    #[test]
    fn test_non_object_is_a_single_error() {
        let errors = ObjectSchema::new().validate(&json!([1, 2]));
        assert_eq!(errors, vec![ErrorMessage::new("", "Invalid type: must be an object")]);
    }

    #[test]
    fn test_missing_required_then_unexpected() {
        let schema = id_only(AdditionalProperties::ForbidAny);

        let errors = schema.validate(&json!({"name": "x"}));

        assert_eq!(
            errors,
            vec![
                ErrorMessage::new("id", "Missing required property id"),
                ErrorMessage::new("name", "Unexpected property"),
            ]
        );
    }

    #[test]
    fn test_optional_property_may_be_absent() {
        let schema = ObjectSchema::new().with_property(Property::new("a", simple(SimpleType::String)));
        assert!(schema.validate(&json!({})).is_empty());
    }

    #[test]
    fn test_nested_errors_are_prefixed_with_property_name() {
        let inner = ObjectSchema::new()
            .with_property(Property::new("bar", simple(SimpleType::Boolean)));
        let schema = ObjectSchema::new().with_property(Property::new("foo", inner.into()));

        let errors = schema.validate(&json!({"foo": {"bar": "yes"}}));

        assert_eq!(
            errors,
            vec![ErrorMessage::new("foo.bar", "Invalid type: must be of type boolean")]
        );
    }

    #[test]
    fn test_additional_properties_allowed_by_default() {
        let schema = id_only(AdditionalProperties::AllowAll);
        assert!(schema.validate(&json!({"id": 1, "extra": [1, 2]})).is_empty());
    }

    #[test]
    fn test_additional_properties_schema() {
        let schema = id_only(AdditionalProperties::Schema(Box::new(simple(
            SimpleType::String,
        ))));

        let errors = schema.validate(&json!({"id": 1, "b": "ok", "a": 2}));

        assert_eq!(
            errors,
            vec![ErrorMessage::new("a", "Invalid type: must be of type string")]
        );
    }

    #[test]
    fn test_additional_errors_follow_document_key_order() {
        let schema = ObjectSchema::new().with_additional_properties(AdditionalProperties::ForbidAny);

        let document: Value = serde_json::from_str(r#"{"zeta": 1, "alpha": 2, "mid": 3}"#).unwrap();
        let locations: Vec<String> = schema
            .validate(&document)
            .iter()
            .map(|e| e.location().to_string())
            .collect();

        assert_eq!(locations, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_declared_errors_follow_declaration_order() {
        let schema = ObjectSchema::new()
            .with_property(Property::new("b", simple(SimpleType::String)).required(true))
            .with_property(Property::new("a", simple(SimpleType::String)).required(true));

        let errors = schema.validate(&json!({}));

        assert_eq!(errors[0].location(), "b");
        assert_eq!(errors[1].location(), "a");
    }
}
