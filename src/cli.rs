use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Report format for validation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per document, errors indented below
    #[default]
    Human,
    /// One JSON report per document
    Json,
}

/// Validate JSON documents against a draft-03 JSON Schema
#[derive(Parser, Debug, Clone)]
#[command(name = "json-schema-validate")]
#[command(about = "Validate JSON documents against a draft-03 JSON Schema")]
#[command(version)]
pub struct Cli {
    /// Schema to validate against: a URL, a file path, or a name under --schema-dir
    #[arg(help = "Schema URL, path or name")]
    pub schema: String,

    /// Documents to validate
    #[arg(required = true, help = "JSON documents to validate")]
    pub documents: Vec<PathBuf>,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Directory searched for schemas given by name
    #[arg(long = "schema-dir")]
    pub schema_dir: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// HTTP request timeout in seconds
    #[arg(long = "timeout")]
    pub timeout: Option<u64>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(timeout) = self.timeout
            && timeout == 0
        {
            return Err("Timeout must be greater than 0".to_string());
        }
        if let Some(dir) = &self.schema_dir
            && !dir.is_dir()
        {
            return Err(format!("Schema directory does not exist: {}", dir.display()));
        }
        Ok(())
    }
}
