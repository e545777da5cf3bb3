//! Turns raw schema documents into [`SchemaNode`] graphs.
//!
//! `$ref` targets are not compiled recursively. Each one is fetched and
//! queued the first time it is seen, and the referring node becomes a
//! [`SchemaReference`]. The queue is drained until every reachable document
//! is compiled, and only then is the whole batch registered, so a failure
//! anywhere leaves the cache untouched.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use serde_json::{Map, Value};
use url::Url;

use crate::cache::SchemaCache;
use crate::error::{ConstraintError, Result, SchemaError};
use crate::location;
use crate::schema::{
    AdditionalProperties, ArraySchema, ObjectSchema, Pattern, Property, SchemaNode,
    SchemaReference, SimpleTypeSchema, UnionSchema,
};
use crate::simple_type::{SimpleType, decimal_value};

struct PendingSchema {
    location: Url,
    raw: Value,
}

/// Compiles one location and everything it references.
///
/// A compiler is single-use; [`SchemaCache::get_schema`] creates a fresh one
/// for every miss.
pub struct SchemaCompiler<'a> {
    cache: &'a SchemaCache,
    pending: VecDeque<PendingSchema>,
    scheduled: HashSet<String>,
}

impl<'a> SchemaCompiler<'a> {
    pub fn new(cache: &'a SchemaCache) -> Self {
        Self {
            cache,
            pending: VecDeque::new(),
            scheduled: HashSet::new(),
        }
    }

    pub fn compile(mut self, location: &Url) -> Result<Arc<SchemaNode>> {
        let location = location::normalize(location.clone());
        self.schedule(&location)?;

        let mut compiled = Vec::new();
        while let Some(pending) = self.pending.pop_front() {
            let node = self.compile_node(&pending.raw, &pending.location)?;
            compiled.push((pending.location, Arc::new(node)));
        }

        self.ensure_no_reference_loops(&compiled)?;

        if !compiled.is_empty() {
            tracing::info!(root = %location, count = compiled.len(), "registering compiled schemas");
        }
        for (schema_location, node) in compiled {
            self.cache.register_schema(&schema_location, node);
        }

        self.cache
            .lookup(&location)
            .ok_or_else(|| SchemaError::SchemaNotFound {
                location: location.to_string(),
            })
    }

    /// Fetch and parse `location` unless it is cached or already queued.
    fn schedule(&mut self, location: &Url) -> Result<()> {
        if self.cache.has_schema(location) || self.scheduled.contains(location.as_str()) {
            return Ok(());
        }

        tracing::debug!(%location, "scheduling schema for compilation");
        let text = self.cache.fetcher().fetch(location)?;
        let raw = serde_json::from_str(&text).map_err(|source| SchemaError::InvalidJson {
            location: location.to_string(),
            source,
        })?;

        self.scheduled.insert(location.to_string());
        self.pending.push_back(PendingSchema {
            location: location.clone(),
            raw,
        });
        Ok(())
    }

    fn compile_node(&mut self, raw: &Value, location: &Url) -> Result<SchemaNode> {
        let Some(raw) = raw.as_object() else {
            return Err(SchemaError::NotAnObject {
                location: location.to_string(),
            });
        };

        if let Some(reference) = raw.get("$ref") {
            return self.compile_reference(reference, location);
        }

        match raw.get("type") {
            None => Ok(SchemaNode::any()),
            Some(Value::String(type_name)) => self.compile_typed(type_name, raw, location),
            Some(Value::Array(entries)) => self.compile_union(entries, location),
            Some(_) => Err(invalid_keyword(location, "type", "a string or an array")),
        }
    }

    fn compile_reference(&mut self, reference: &Value, location: &Url) -> Result<SchemaNode> {
        let Some(reference) = reference.as_str() else {
            return Err(SchemaError::MalformedReference {
                location: location.to_string(),
                reference: reference.to_string(),
                reason: "$ref must be a string".to_string(),
            });
        };

        let target = location::resolve_reference(location, reference)?;
        self.schedule(&target)?;
        Ok(SchemaReference::new(self.cache.downgrade(), target).into())
    }

    fn compile_typed(
        &mut self,
        type_name: &str,
        raw: &Map<String, Value>,
        location: &Url,
    ) -> Result<SchemaNode> {
        match type_name {
            "object" => self.compile_object(raw, location).map(Into::into),
            "array" => self.compile_array(raw, location).map(Into::into),
            _ => {
                let simple_type = parse_simple_type(type_name, location)?;
                compile_simple(simple_type, raw, location).map(Into::into)
            }
        }
    }

    /// A `type` array: names become unrefined nodes, objects are inline schemas.
    fn compile_union(&mut self, entries: &[Value], location: &Url) -> Result<SchemaNode> {
        let mut nested = Vec::with_capacity(entries.len());
        for entry in entries {
            let node = match entry {
                Value::String(type_name) => match type_name.as_str() {
                    "object" => ObjectSchema::new().into(),
                    "array" => ArraySchema::new().into(),
                    _ => SimpleTypeSchema::new(parse_simple_type(type_name, location)?).into(),
                },
                Value::Object(_) => self.compile_node(entry, location)?,
                _ => {
                    return Err(invalid_keyword(
                        location,
                        "type",
                        "an array of type names or schemas",
                    ));
                }
            };
            nested.push(node);
        }
        Ok(UnionSchema::new(nested).into())
    }

    fn compile_object(&mut self, raw: &Map<String, Value>, location: &Url) -> Result<ObjectSchema> {
        let mut schema = ObjectSchema::new();

        match raw.get("additionalProperties") {
            None | Some(Value::Bool(true)) => {}
            Some(Value::Bool(false)) => {
                schema = schema.with_additional_properties(AdditionalProperties::ForbidAny);
            }
            Some(nested @ Value::Object(_)) => {
                let nested = self.compile_node(nested, location)?;
                schema = schema
                    .with_additional_properties(AdditionalProperties::Schema(Box::new(nested)));
            }
            Some(_) => {
                return Err(invalid_keyword(
                    location,
                    "additionalProperties",
                    "a boolean or a schema",
                ));
            }
        }

        if let Some(properties) = raw.get("properties") {
            let Some(properties) = properties.as_object() else {
                return Err(invalid_keyword(location, "properties", "an object"));
            };
            for (name, nested) in properties {
                let required = match nested.get("required") {
                    None => false,
                    Some(Value::Bool(required)) => *required,
                    Some(_) => return Err(invalid_keyword(location, "required", "a boolean")),
                };
                let node = self.compile_node(nested, location)?;
                schema = schema.with_property(Property::new(name.clone(), node).required(required));
            }
        }

        Ok(schema)
    }

    fn compile_array(&mut self, raw: &Map<String, Value>, location: &Url) -> Result<ArraySchema> {
        let mut schema = ArraySchema::new();

        if let Some(items) = raw.get("items") {
            if !items.is_object() {
                return Err(invalid_keyword(location, "items", "a schema object"));
            }
            schema = schema.with_items(self.compile_node(items, location)?);
        }
        if let Some(min_items) = optional_count(raw, "minItems", location)? {
            schema = schema.with_min_items(min_items);
        }
        if let Some(max_items) = optional_count(raw, "maxItems", location)? {
            schema = schema.with_max_items(max_items);
        }

        Ok(schema)
    }

    /// Reject locations whose type check would chase references forever.
    ///
    /// Only edges that do not consume any of the document count: a node that
    /// is itself a reference, or a union member. Loops through properties or
    /// array items are legitimate recursive schemas.
    fn ensure_no_reference_loops(&self, compiled: &[(Url, Arc<SchemaNode>)]) -> Result<()> {
        let batch: HashMap<&str, &SchemaNode> = compiled
            .iter()
            .map(|(location, node)| (location.as_str(), node.as_ref()))
            .collect();
        let mut finished = HashSet::new();

        for (location, _) in compiled {
            let mut path = Vec::new();
            self.walk_reference_chain(location, &batch, &mut path, &mut finished)?;
        }
        Ok(())
    }

    fn walk_reference_chain(
        &self,
        location: &Url,
        batch: &HashMap<&str, &SchemaNode>,
        path: &mut Vec<String>,
        finished: &mut HashSet<String>,
    ) -> Result<()> {
        let key = location.as_str();
        if finished.contains(key) {
            return Ok(());
        }
        if let Some(start) = path.iter().position(|visited| visited == key) {
            let mut chain = path[start..].to_vec();
            chain.push(key.to_string());
            return Err(SchemaError::ReferenceLoop {
                location: key.to_string(),
                chain: chain.join(" -> "),
            });
        }

        let mut targets = Vec::new();
        match batch.get(key) {
            Some(node) => collect_gate_targets(node, &mut targets),
            None => {
                if let Some(node) = self.cache.lookup(location) {
                    collect_gate_targets(&node, &mut targets);
                }
            }
        }

        path.push(key.to_string());
        for target in &targets {
            self.walk_reference_chain(target, batch, path, finished)?;
        }
        path.pop();
        finished.insert(key.to_string());
        Ok(())
    }
}

fn collect_gate_targets(node: &SchemaNode, targets: &mut Vec<Url>) {
    match node {
        SchemaNode::Reference(reference) => targets.push(reference.location().clone()),
        SchemaNode::Union(union) => {
            for nested in union.nested() {
                collect_gate_targets(nested, targets);
            }
        }
        _ => {}
    }
}

fn parse_simple_type(type_name: &str, location: &Url) -> Result<SimpleType> {
    type_name
        .parse()
        .map_err(|type_name| SchemaError::UnknownType {
            location: location.to_string(),
            type_name,
        })
}

fn compile_simple(
    simple_type: SimpleType,
    raw: &Map<String, Value>,
    location: &Url,
) -> Result<SimpleTypeSchema> {
    let mut builder = SimpleTypeSchema::builder(simple_type);

    if let Some(pattern) = optional_str(raw, "pattern", location)? {
        let compiled = Pattern::new(pattern).map_err(|source| SchemaError::InvalidPattern {
            location: location.to_string(),
            pattern: pattern.to_string(),
            source,
        })?;
        builder = builder.pattern(compiled);
    }
    if let Some(format) = optional_str(raw, "format", location)? {
        builder = builder.format(format);
    }
    if let Some(min_length) = optional_count(raw, "minLength", location)? {
        builder = builder.min_length(min_length);
    }
    if let Some(max_length) = optional_count(raw, "maxLength", location)? {
        builder = builder.max_length(max_length);
    }
    if let Some(minimum) = optional_decimal(raw, "minimum", location)? {
        builder = builder.minimum(minimum);
    }
    if let Some(maximum) = optional_decimal(raw, "maximum", location)? {
        builder = builder.maximum(maximum);
    }
    if let Some(exclusive) = optional_bool(raw, "exclusiveMinimum", location)? {
        builder = builder.exclusive_minimum(exclusive);
    }
    if let Some(exclusive) = optional_bool(raw, "exclusiveMaximum", location)? {
        builder = builder.exclusive_maximum(exclusive);
    }
    if let Some(values) = raw.get("enumeration") {
        let Some(values) = values.as_array() else {
            return Err(invalid_keyword(location, "enumeration", "an array"));
        };
        builder = builder.enumeration(values.clone());
    }

    builder.build().map_err(|source| SchemaError::Constraint {
        location: location.to_string(),
        source,
    })
}

fn invalid_keyword(location: &Url, keyword: &str, expected: &'static str) -> SchemaError {
    SchemaError::InvalidKeyword {
        location: location.to_string(),
        keyword: keyword.to_string(),
        expected,
    }
}

fn optional_str<'v>(
    raw: &'v Map<String, Value>,
    keyword: &str,
    location: &Url,
) -> Result<Option<&'v str>> {
    match raw.get(keyword) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(_) => Err(invalid_keyword(location, keyword, "a string")),
    }
}

fn optional_bool(raw: &Map<String, Value>, keyword: &str, location: &Url) -> Result<Option<bool>> {
    match raw.get(keyword) {
        None => Ok(None),
        Some(Value::Bool(value)) => Ok(Some(*value)),
        Some(_) => Err(invalid_keyword(location, keyword, "a boolean")),
    }
}

fn optional_count(
    raw: &Map<String, Value>,
    keyword: &str,
    location: &Url,
) -> Result<Option<usize>> {
    match raw.get(keyword) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|count| usize::try_from(count).ok())
            .map(Some)
            .ok_or_else(|| invalid_keyword(location, keyword, "a non-negative integer")),
    }
}

fn optional_decimal(
    raw: &Map<String, Value>,
    keyword: &'static str,
    location: &Url,
) -> Result<Option<bigdecimal::BigDecimal>> {
    match raw.get(keyword) {
        None => Ok(None),
        Some(Value::Number(number)) => decimal_value(number).map(Some).ok_or_else(|| {
            SchemaError::Constraint {
                location: location.to_string(),
                source: ConstraintError::InvalidBound {
                    keyword,
                    value: number.to_string(),
                },
            }
        }),
        Some(_) => Err(invalid_keyword(location, keyword, "a number")),
    }
}
