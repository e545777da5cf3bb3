use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use url::Url;

use super::SchemaNode;
use crate::cache::WeakSchemaCache;
use crate::error_message::ErrorMessage;

/// A `$ref` to another schema location, looked up in the registry each time
/// it is used.
///
/// The registry handle is weak: registered nodes hold references, and the
/// registry holds the nodes.
#[derive(Clone)]
pub struct SchemaReference {
    registry: WeakSchemaCache,
    location: Url,
}

impl SchemaReference {
    pub fn new(registry: WeakSchemaCache, location: Url) -> Self {
        Self { registry, location }
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    /// The target node, compiling it on demand if it is not registered yet.
    pub fn resolve(&self) -> Result<Arc<SchemaNode>, String> {
        let registry = self
            .registry
            .upgrade()
            .ok_or_else(|| "schema registry is no longer available".to_string())?;
        registry
            .get_schema(&self.location)
            .map_err(|error| error.to_string())
    }

    pub fn validate(&self, value: &Value) -> Vec<ErrorMessage> {
        match self.resolve() {
            Ok(target) => target.validate(value),
            Err(cause) => {
                tracing::error!(location = %self.location, %cause, "unresolved schema reference");
                ErrorMessage::single(
                    "",
                    format!("Unable to resolve schema {}: {}", self.location, cause),
                )
            }
        }
    }

    pub fn is_acceptable_type(&self, value: &Value) -> bool {
        self.resolve()
            .map(|target| target.is_acceptable_type(value))
            .unwrap_or(true)
    }

    pub fn description(&self) -> String {
        self.resolve()
            .map(|target| target.description())
            .unwrap_or_else(|_| "unresolved".to_string())
    }
}

impl fmt::Debug for SchemaReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaReference")
            .field("location", &self.location.as_str())
            .finish()
    }
}
