//! Validation entry points.
//!
//! [`validate`] checks one in-memory value against a compiled node.
//! [`Validator`] binds a compiled schema to the cache it came from and checks
//! documents on disk, producing [`ValidationReport`]s that can be summarized
//! with [`ValidationSummary::aggregate`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::cache::SchemaCache;
use crate::error::Result;
use crate::error_message::ErrorMessage;
use crate::output::ValidationReport;
use crate::schema::SchemaNode;

/// Validate `document` against `schema`. An empty list means valid.
pub fn validate(schema: &SchemaNode, document: &Value) -> Vec<ErrorMessage> {
    schema.validate(document)
}

/// A document could not be read or parsed; it was never validated.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Could not read document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Document {path} is not valid JSON: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read and parse a JSON document from disk.
pub fn read_document(path: &Path) -> std::result::Result<Value, DocumentError> {
    let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| DocumentError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })
}

/// A compiled schema ready to check documents.
///
/// Holds a strong handle on the cache so that references inside the schema
/// keep resolving for as long as the validator lives.
pub struct Validator {
    cache: SchemaCache,
    location: Url,
    schema: Arc<SchemaNode>,
}

impl Validator {
    /// Compile (or fetch from `cache`) the schema at `location`.
    pub fn new(cache: SchemaCache, location: &Url) -> Result<Self> {
        let schema = cache.get_schema(location)?;
        Ok(Self {
            cache,
            location: location.clone(),
            schema,
        })
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    pub fn schema(&self) -> &Arc<SchemaNode> {
        &self.schema
    }

    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    pub fn validate_value(&self, document: &Value) -> Vec<ErrorMessage> {
        validate(&self.schema, document)
    }

    /// Validate a document on disk. Unreadable documents yield a report with
    /// the read failure instead of validation errors.
    pub fn validate_file(&self, path: &Path) -> ValidationReport {
        let name = path.display().to_string();
        match read_document(path) {
            Ok(document) => {
                let errors = self.validate_value(&document);
                tracing::debug!(document = %name, errors = errors.len(), "validated document");
                ValidationReport::new(name, errors)
            }
            Err(error) => {
                tracing::debug!(document = %name, %error, "could not read document");
                ValidationReport::unreadable(name, error.to_string())
            }
        }
    }

    pub fn validate_files(&self, paths: &[PathBuf]) -> Vec<ValidationReport> {
        paths.iter().map(|path| self.validate_file(path)).collect()
    }
}

/// Counts over a batch of reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationSummary {
    /// Total number of documents processed
    pub total_documents: usize,
    /// Number of valid documents
    pub valid_documents: usize,
    /// Number of documents with validation errors
    pub invalid_documents: usize,
    /// Number of documents that could not be read
    pub unreadable_documents: usize,
}

impl ValidationSummary {
    /// Aggregate individual reports into a summary
    pub fn aggregate(reports: &[ValidationReport]) -> Self {
        let mut summary = Self {
            total_documents: reports.len(),
            ..Self::default()
        };
        for report in reports {
            if report.read_error.is_some() {
                summary.unreadable_documents += 1;
            } else if report.valid {
                summary.valid_documents += 1;
            } else {
                summary.invalid_documents += 1;
            }
        }
        summary
    }

    /// Whether every document was read and found valid
    pub fn all_valid(&self) -> bool {
        self.valid_documents == self.total_documents
    }
}
