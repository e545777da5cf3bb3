//! # json-schema-validator Library
//!
//! Compiles draft-03 JSON Schemas into an immutable tree of schema nodes and
//! validates JSON documents against them, collecting every violation with the
//! location where it occurred.
//!
//! Schemas are loaded from `file:`, `http:` and `https:` locations. `$ref`
//! links between documents are followed at compile time and resolved lazily
//! through a shared [`SchemaCache`], so recursive and mutually recursive
//! schemas compile and validate without special handling.
//!
//! ```no_run
//! use json_schema_validator::{SchemaCache, Validator};
//! use url::Url;
//!
//! let cache = SchemaCache::default();
//! let location = Url::parse("file:///schemas/person.json").unwrap();
//! let validator = Validator::new(cache, &location).unwrap();
//! let errors = validator.validate_value(&serde_json::json!({"id": 1}));
//! for error in &errors {
//!     println!("{error}");
//! }
//! ```

pub mod cache;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod error;
pub mod error_message;
pub mod fetcher;
pub mod format;
pub mod location;
pub mod lookup;
pub mod output;
pub mod schema;
pub mod simple_type;
pub mod validator;

pub use cache::{SchemaCache, WeakSchemaCache};
pub use cli::{Cli, OutputFormat};
pub use compiler::SchemaCompiler;
pub use config::{Config, ConfigError, ConfigManager};
pub use error::{ConstraintError, SchemaError};
pub use error_message::ErrorMessage;
pub use fetcher::{DefaultFetcher, FetchConfig, SchemaFetcher};
pub use lookup::{DirectorySchemaLookup, SchemaLookup, resolve_location};
pub use output::{Output, ValidationReport, VerbosityLevel};
pub use schema::{
    AdditionalProperties, ArraySchema, ObjectSchema, Pattern, Property, SchemaNode,
    SchemaReference, SimpleTypeSchema, SimpleTypeSchemaBuilder, UnionSchema,
};
pub use simple_type::SimpleType;
pub use validator::{DocumentError, ValidationSummary, Validator, validate};
