use std::fmt;

use serde::{Deserialize, Serialize};

/// A single document violation, located by a dotted/bracketed path such as
/// `foo.bar[2]`. The empty location is the document root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorMessage {
    location: String,
    message: String,
}

impl ErrorMessage {
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Re-root `nested` under `prefix`.
    ///
    /// Array indices are self-delimiting, so `[3]` attaches without a dot, and
    /// an empty child location leaves the prefix as is.
    pub fn nested(prefix: &str, nested: &ErrorMessage) -> Self {
        let separator = if nested.needs_separator() { "." } else { "" };
        Self {
            location: format!("{}{}{}", prefix, separator, nested.location),
            message: nested.message.clone(),
        }
    }

    pub(crate) fn single(location: impl Into<String>, message: impl Into<String>) -> Vec<Self> {
        vec![Self::new(location, message)]
    }

    fn needs_separator(&self) -> bool {
        !self.location.is_empty() && !self.location.starts_with('[')
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Prefix every message in `errors` with `prefix`.
pub(crate) fn prefix_all(prefix: &str, errors: Vec<ErrorMessage>) -> Vec<ErrorMessage> {
    errors
        .iter()
        .map(|error| ErrorMessage::nested(prefix, error))
        .collect()
}
