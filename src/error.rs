use thiserror::Error;

/// Compile-time failure: the schema itself (or the place it lives) is broken.
///
/// Document problems are never reported through this type; those are
/// accumulated as [`ErrorMessage`](crate::ErrorMessage)s instead.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Could not retrieve schema from {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema not found: {location}")]
    SchemaNotFound { location: String },

    #[error("HTTP error while fetching {location}: {source}")]
    Http {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP status error: {status} for {location} - {message}")]
    HttpStatus {
        location: String,
        status: u16,
        message: String,
    },

    #[error("Unsupported schema location scheme '{scheme}': {location}")]
    UnsupportedScheme { location: String, scheme: String },

    #[error("The schema at location {location} contains invalid JSON: {source}")]
    InvalidJson {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("A valid json schema must be an object: {location}")]
    NotAnObject { location: String },

    #[error("Illegal schema type {type_name} in {location}")]
    UnknownType { location: String, type_name: String },

    #[error("The schema reference '{reference}' in {location} is malformed: {reason}")]
    MalformedReference {
        location: String,
        reference: String,
        reason: String,
    },

    #[error("Schema {location} refers back to itself without constraining anything: {chain}")]
    ReferenceLoop { location: String, chain: String },

    #[error("Keyword '{keyword}' in {location} must be {expected}")]
    InvalidKeyword {
        location: String,
        keyword: String,
        expected: &'static str,
    },

    #[error("Invalid regex pattern '{pattern}' in {location}: {source}")]
    InvalidPattern {
        location: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid schema definition in {location}: {source}")]
    Constraint {
        location: String,
        #[source]
        source: ConstraintError,
    },
}

impl SchemaError {
    /// The schema location the failure is attributed to.
    pub fn location(&self) -> &str {
        match self {
            SchemaError::Io { location, .. }
            | SchemaError::SchemaNotFound { location }
            | SchemaError::Http { location, .. }
            | SchemaError::HttpStatus { location, .. }
            | SchemaError::UnsupportedScheme { location, .. }
            | SchemaError::InvalidJson { location, .. }
            | SchemaError::NotAnObject { location }
            | SchemaError::UnknownType { location, .. }
            | SchemaError::MalformedReference { location, .. }
            | SchemaError::ReferenceLoop { location, .. }
            | SchemaError::InvalidKeyword { location, .. }
            | SchemaError::InvalidPattern { location, .. }
            | SchemaError::Constraint { location, .. } => location,
        }
    }
}

/// Keyword combination rejected while building a schema node
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("Regex patterns are only legal for type string")]
    PatternRequiresString,

    #[error("{keyword} can only be used for type: string")]
    LengthRequiresString { keyword: &'static str },

    #[error("{keyword} can only be used for integer or number types")]
    RangeRequiresNumeric { keyword: &'static str },

    #[error("enumeration not allowed for null or any types")]
    EnumerationNotAllowed,

    #[error("values in enum must be of type {type_name}, found {value}")]
    EnumerationTypeMismatch { type_name: String, value: String },

    #[error("Format {format} is not valid for type {type_name}")]
    IncompatibleFormat { format: String, type_name: String },

    #[error("{keyword} is not a valid decimal number: {value}")]
    InvalidBound { keyword: &'static str, value: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, SchemaError>;
