use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, anyhow};
use tracing_subscriber::EnvFilter;

use json_schema_validator::cli::Cli;
use json_schema_validator::config::{Config, ConfigManager};
use json_schema_validator::lookup::{DirectorySchemaLookup, SchemaLookup, resolve_location};
use json_schema_validator::output::{Output, VerbosityLevel};
use json_schema_validator::{DefaultFetcher, SchemaCache, ValidationSummary, Validator};

/// Every document was valid
const EXIT_VALID: u8 = 0;
/// At least one document was invalid or unreadable
const EXIT_INVALID: u8 = 1;
/// The schema or the configuration could not be loaded
const EXIT_FAILURE: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<u8> {
    cli.validate().map_err(|message| anyhow!(message))?;

    let config = ConfigManager::load_config(cli).context("Failed to load configuration")?;
    init_tracing(&config);
    tracing::debug!(?config, "loaded configuration");

    let cache = SchemaCache::new(Box::new(DefaultFetcher::new(
        ConfigManager::fetch_config(&config),
    )));

    let lookup = config.lookup.schema_dir.as_ref().map(DirectorySchemaLookup::new);
    let location = resolve_location(
        &cli.schema,
        lookup.as_ref().map(|lookup| lookup as &dyn SchemaLookup),
    )
    .with_context(|| format!("Could not locate schema {}", cli.schema))?;

    let validator = Validator::new(cache, &location)
        .with_context(|| format!("Could not compile schema {location}"))?;

    let reports = validator.validate_files(&cli.documents);
    print!("{}", output_for(&config).format_reports(&reports));
    std::io::stdout().flush()?;

    let summary = ValidationSummary::aggregate(&reports);
    tracing::info!(
        total = summary.total_documents,
        valid = summary.valid_documents,
        invalid = summary.invalid_documents,
        unreadable = summary.unreadable_documents,
        "validation finished"
    );

    Ok(if summary.all_valid() {
        EXIT_VALID
    } else {
        EXIT_INVALID
    })
}

/// Verbose output from any source (flag, file or environment) raises the log
/// level to `debug`; otherwise `RUST_LOG` decides.
fn init_tracing(config: &Config) {
    let filter = if config.output.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn output_for(config: &Config) -> Output {
    Output::new(
        config.output.format.into(),
        VerbosityLevel::from_flags(config.output.verbose, config.output.quiet),
    )
}
