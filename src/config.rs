use crate::cli::{Cli, OutputFormat};
use crate::fetcher::FetchConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub lookup: LookupConfig,
    pub output: OutputConfig,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// HTTP request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent sent with schema requests
    pub user_agent: String,
}

/// Where schemas given by name are looked up
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct LookupConfig {
    /// Base directory for named schemas
    pub schema_dir: Option<PathBuf>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormatConfig,
    /// Verbose output
    pub verbose: bool,
    /// Quiet mode (errors only)
    pub quiet: bool,
}

/// Output format configuration (serializable version of CLI OutputFormat)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormatConfig {
    Human,
    Json,
}

impl From<OutputFormat> for OutputFormatConfig {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputFormatConfig::Human,
            OutputFormat::Json => OutputFormatConfig::Json,
        }
    }
}

impl From<OutputFormatConfig> for OutputFormat {
    fn from(format: OutputFormatConfig) -> Self {
        match format {
            OutputFormatConfig::Human => OutputFormat::Human,
            OutputFormatConfig::Json => OutputFormat::Json,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        let fetch = FetchConfig::default();
        Self {
            timeout_seconds: fetch.timeout_seconds,
            user_agent: fetch.user_agent,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormatConfig::Human,
            verbose: false,
            quiet: false,
        }
    }
}

const CONFIG_NAMES: [&str; 4] = [
    "json-schema-validator.toml",
    "json-schema-validator.json",
    ".json-schema-validator.toml",
    ".json-schema-validator.json",
];

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: file -> environment -> CLI
    pub fn load_config(cli: &Cli) -> Result<Config> {
        Self::load_config_with(&SystemEnvProvider, cli)
    }

    /// Same as [`load_config`](Self::load_config) with a custom environment
    pub fn load_config_with(env: &impl EnvProvider, cli: &Cli) -> Result<Config> {
        let mut config = Config::default();

        if let Some(config_path) = &cli.config {
            let file_config = Self::load_from_file(config_path)?;
            config = Self::merge_configs(config, file_config);
        } else if let Some(found_config) = Self::find_config_file()? {
            config = Self::merge_configs(config, found_config);
        }

        config = Self::apply_environment_overrides_with(env, config)?;

        // CLI arguments have the highest precedence
        config = Self::merge_with_cli(config, cli);

        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find configuration file in standard locations
    pub fn find_config_file() -> Result<Option<Config>> {
        Self::find_config_file_in(Path::new("."), dirs::config_dir().as_deref())
    }

    fn find_config_file_in(working_dir: &Path, config_dir: Option<&Path>) -> Result<Option<Config>> {
        let mut search_dirs = vec![working_dir.to_path_buf()];
        if let Some(config_dir) = config_dir {
            search_dirs.push(config_dir.join("json-schema-validator"));
        }

        for dir in &search_dirs {
            for name in &CONFIG_NAMES {
                let path = dir.join(name);
                if path.is_file() {
                    tracing::debug!(path = %path.display(), "loading configuration file");
                    return Ok(Some(Self::load_from_file(&path)?));
                }
            }
        }

        Ok(None)
    }

    /// Apply environment variable overrides using the system environment
    pub fn apply_environment_overrides(config: Config) -> Result<Config> {
        Self::apply_environment_overrides_with(&SystemEnvProvider, config)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        // Network settings
        if let Some(timeout) = env.get("JSON_SCHEMA_TIMEOUT") {
            config.network.timeout_seconds = timeout.parse().map_err(|_| {
                ConfigError::Environment(format!("Invalid JSON_SCHEMA_TIMEOUT value: {}", timeout))
            })?;
        }

        if let Some(user_agent) = env.get("JSON_SCHEMA_USER_AGENT") {
            config.network.user_agent = user_agent;
        }

        // Lookup settings
        if let Some(schema_dir) = env.get("JSON_SCHEMA_DIR") {
            config.lookup.schema_dir = Some(PathBuf::from(schema_dir));
        }

        // Output settings
        if let Some(verbose) = env.get("JSON_SCHEMA_VERBOSE") {
            config.output.verbose = verbose.parse().map_err(|_| {
                ConfigError::Environment(format!("Invalid JSON_SCHEMA_VERBOSE value: {}", verbose))
            })?;
        }

        if let Some(quiet) = env.get("JSON_SCHEMA_QUIET") {
            config.output.quiet = quiet.parse().map_err(|_| {
                ConfigError::Environment(format!("Invalid JSON_SCHEMA_QUIET value: {}", quiet))
            })?;
        }

        if let Some(format) = env.get("JSON_SCHEMA_FORMAT") {
            config.output.format = match format.to_lowercase().as_str() {
                "human" => OutputFormatConfig::Human,
                "json" => OutputFormatConfig::Json,
                _ => {
                    return Err(ConfigError::Environment(format!(
                        "Invalid JSON_SCHEMA_FORMAT value: {}",
                        format
                    )));
                }
            };
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence)
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if let Some(timeout) = cli.timeout {
            config.network.timeout_seconds = timeout;
        }

        if let Some(schema_dir) = &cli.schema_dir {
            config.lookup.schema_dir = Some(schema_dir.clone());
        }

        if let Some(format) = cli.output_format {
            config.output.format = format.into();
        }
        // Flags only ever switch a mode on
        if cli.verbose {
            config.output.verbose = true;
            config.output.quiet = false;
        }
        if cli.quiet {
            config.output.quiet = true;
            config.output.verbose = false;
        }

        config
    }

    /// Merge two configurations (second takes precedence for non-None values)
    pub fn merge_configs(mut base: Config, override_config: Config) -> Config {
        // Network settings
        base.network.timeout_seconds = override_config.network.timeout_seconds;
        base.network.user_agent = override_config.network.user_agent;

        // Lookup settings
        if override_config.lookup.schema_dir.is_some() {
            base.lookup.schema_dir = override_config.lookup.schema_dir;
        }

        // Output settings
        base.output.format = override_config.output.format;
        base.output.verbose = override_config.output.verbose;
        base.output.quiet = override_config.output.quiet;

        base
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        if config.network.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        if config.network.user_agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "User agent must not be empty".to_string(),
            ));
        }

        if config.output.verbose && config.output.quiet {
            return Err(ConfigError::Validation(
                "Cannot enable both verbose and quiet modes".to_string(),
            ));
        }

        Ok(())
    }

    /// Convert configuration to Duration for network timeout
    pub fn get_timeout_duration(config: &Config) -> Duration {
        Duration::from_secs(config.network.timeout_seconds)
    }

    /// Settings for the schema fetcher
    pub fn fetch_config(config: &Config) -> FetchConfig {
        FetchConfig {
            timeout_seconds: config.network.timeout_seconds,
            user_agent: config.network.user_agent.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    /// Mock environment variable provider for testing
    #[derive(Default)]
    struct MockEnvProvider {
        vars: HashMap<String, String>,
    }

    impl MockEnvProvider {
        fn new() -> Self {
            Self {
                vars: HashMap::new(),
            }
        }

        fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
            self.vars.insert(key.into(), value.into());
        }
    }

    impl EnvProvider for MockEnvProvider {
        fn get(&self, key: &str) -> Option<String> {
            self.vars.get(key).cloned()
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.network.timeout_seconds, 30);
        assert!(
            config
                .network
                .user_agent
                .starts_with("json-schema-validator/")
        );
        assert_eq!(config.lookup.schema_dir, None);
        assert_eq!(config.output.format, OutputFormatConfig::Human);
        assert!(!config.output.verbose);
        assert!(!config.output.quiet);
    }

    #[test]
    fn test_load_toml_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let toml_content = r#"
[network]
timeout_seconds = 60
user_agent = "schema-bot/1.0"

[lookup]
schema_dir = "/srv/schemas"

[output]
format = "json"
verbose = true
quiet = false
"#;

        fs::write(&config_path, toml_content).unwrap();

        let config = ConfigManager::load_from_file(&config_path).unwrap();

        assert_eq!(config.network.timeout_seconds, 60);
        assert_eq!(config.network.user_agent, "schema-bot/1.0");
        assert_eq!(config.lookup.schema_dir, Some(PathBuf::from("/srv/schemas")));
        assert_eq!(config.output.format, OutputFormatConfig::Json);
        assert!(config.output.verbose);
        assert!(!config.output.quiet);
    }

    #[test]
    fn test_load_json_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let json_content = r#"{
  "network": {
    "timeout_seconds": 45,
    "user_agent": "agent"
  },
  "output": {
    "format": "human",
    "verbose": false,
    "quiet": true
  }
}"#;

        fs::write(&config_path, json_content).unwrap();

        let config = ConfigManager::load_from_file(&config_path).unwrap();

        assert_eq!(config.network.timeout_seconds, 45);
        assert_eq!(config.network.user_agent, "agent");
        assert_eq!(config.lookup.schema_dir, None);
        assert_eq!(config.output.format, OutputFormatConfig::Human);
        assert!(config.output.quiet);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[output]\nformat = \"json\"\n").unwrap();

        let config = ConfigManager::load_from_file(&config_path).unwrap();

        assert_eq!(config.output.format, OutputFormatConfig::Json);
        assert_eq!(config.network.timeout_seconds, 30);
    }

    #[test]
    fn test_extensionless_file_is_guessed() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config");
        fs::write(&config_path, r#"{"network": {"timeout_seconds": 7}}"#).unwrap();

        let config = ConfigManager::load_from_file(&config_path).unwrap();

        assert_eq!(config.network.timeout_seconds, 7);
    }

    #[test]
    fn test_unsupported_file_format() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        fs::write(&config_path, "invalid: yaml").unwrap();

        let result = ConfigManager::load_from_file(&config_path);

        match result.unwrap_err() {
            ConfigError::UnsupportedFormat(ext) => assert_eq!(ext, "yaml"),
            _ => panic!("Expected UnsupportedFormat error"),
        }
    }

    #[test]
    fn test_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        fs::write(&config_path, "invalid toml [[[").unwrap();

        let result = ConfigManager::load_from_file(&config_path);
        assert!(matches!(result.unwrap_err(), ConfigError::TomlParsing(_)));
    }

    #[test]
    fn test_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        fs::write(&config_path, "{ invalid json }").unwrap();

        let result = ConfigManager::load_from_file(&config_path);
        assert!(matches!(result.unwrap_err(), ConfigError::JsonParsing(_)));
    }

    #[test]
    fn test_find_config_file_prefers_working_directory() {
        let working = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        fs::create_dir_all(user.path().join("json-schema-validator")).unwrap();
        fs::write(
            user.path()
                .join("json-schema-validator")
                .join("json-schema-validator.toml"),
            "[network]\ntimeout_seconds = 99\n",
        )
        .unwrap();

        let found =
            ConfigManager::find_config_file_in(working.path(), Some(user.path())).unwrap();
        assert_eq!(found.unwrap().network.timeout_seconds, 99);

        fs::write(
            working.path().join(".json-schema-validator.json"),
            r#"{"network": {"timeout_seconds": 11}}"#,
        )
        .unwrap();

        let found =
            ConfigManager::find_config_file_in(working.path(), Some(user.path())).unwrap();
        assert_eq!(found.unwrap().network.timeout_seconds, 11);
    }

    #[test]
    fn test_find_config_file_not_found() {
        let working = TempDir::new().unwrap();
        let found = ConfigManager::find_config_file_in(working.path(), None).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_environment_overrides() {
        let mut mock_env = MockEnvProvider::new();
        mock_env.set("JSON_SCHEMA_TIMEOUT", "120");
        mock_env.set("JSON_SCHEMA_USER_AGENT", "env-agent");
        mock_env.set("JSON_SCHEMA_DIR", "/env/schemas");
        mock_env.set("JSON_SCHEMA_VERBOSE", "true");
        mock_env.set("JSON_SCHEMA_FORMAT", "JSON");

        let config =
            ConfigManager::apply_environment_overrides_with(&mock_env, Config::default()).unwrap();

        assert_eq!(config.network.timeout_seconds, 120);
        assert_eq!(config.network.user_agent, "env-agent");
        assert_eq!(config.lookup.schema_dir, Some(PathBuf::from("/env/schemas")));
        assert!(config.output.verbose);
        assert_eq!(config.output.format, OutputFormatConfig::Json);
    }

    #[test]
    fn test_invalid_environment_values() {
        for (key, value) in [
            ("JSON_SCHEMA_TIMEOUT", "soon"),
            ("JSON_SCHEMA_QUIET", "maybe"),
            ("JSON_SCHEMA_FORMAT", "yaml"),
        ] {
            let mut mock_env = MockEnvProvider::new();
            mock_env.set(key, value);

            let result = ConfigManager::apply_environment_overrides_with(&mock_env, Config::default());

            assert!(matches!(result.unwrap_err(), ConfigError::Environment(_)));
        }
    }

    #[test]
    fn test_merge_with_cli() {
        let args = vec![
            "json-schema-validate",
            "--timeout",
            "90",
            "--format",
            "json",
            "--schema-dir",
            "/cli/schemas",
            "--quiet",
            "schema.json",
            "doc.json",
        ];

        let cli = Cli::try_parse_from(args).unwrap();
        let mut base_config = Config::default();
        base_config.output.verbose = true;
        let config = ConfigManager::merge_with_cli(base_config, &cli);

        assert_eq!(config.network.timeout_seconds, 90);
        assert_eq!(config.output.format, OutputFormatConfig::Json);
        assert_eq!(config.lookup.schema_dir, Some(PathBuf::from("/cli/schemas")));
        assert!(config.output.quiet);
        assert!(!config.output.verbose);
    }

    #[test]
    fn test_merge_with_cli_keeps_unset_options() {
        let cli = Cli::try_parse_from(vec!["json-schema-validate", "s.json", "d.json"]).unwrap();
        let mut base_config = Config::default();
        base_config.network.timeout_seconds = 12;
        base_config.output.format = OutputFormatConfig::Json;

        let config = ConfigManager::merge_with_cli(base_config, &cli);

        assert_eq!(config.network.timeout_seconds, 12);
        assert_eq!(config.output.format, OutputFormatConfig::Json);
    }

    #[test]
    fn test_merge_configs() {
        let mut base = Config::default();
        base.lookup.schema_dir = Some(PathBuf::from("/base"));

        let mut override_config = Config::default();
        override_config.network.timeout_seconds = 60;

        let merged = ConfigManager::merge_configs(base, override_config);

        assert_eq!(merged.network.timeout_seconds, 60); // Override wins
        assert_eq!(merged.lookup.schema_dir, Some(PathBuf::from("/base"))); // None never overrides
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(ConfigManager::validate_config(&config).is_ok());

        config.network.timeout_seconds = 0;
        assert!(ConfigManager::validate_config(&config).is_err());
        config.network.timeout_seconds = 30;

        config.network.user_agent = "  ".to_string();
        assert!(ConfigManager::validate_config(&config).is_err());
        config.network.user_agent = "agent".to_string();

        config.output.verbose = true;
        config.output.quiet = true;
        assert!(ConfigManager::validate_config(&config).is_err());
    }

    #[test]
    fn test_load_config_precedence() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");
        fs::write(
            &config_path,
            "[network]\ntimeout_seconds = 45\nuser_agent = \"file-agent\"\n\n[output]\nformat = \"json\"\n",
        )
        .unwrap();

        let mut mock_env = MockEnvProvider::new();
        mock_env.set("JSON_SCHEMA_USER_AGENT", "env-agent");
        mock_env.set("JSON_SCHEMA_TIMEOUT", "50");

        let args = vec![
            "json-schema-validate",
            "--config",
            config_path.to_str().unwrap(),
            "--timeout",
            "8",
            "schema.json",
            "doc.json",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        let config = ConfigManager::load_config_with(&mock_env, &cli).unwrap();

        assert_eq!(config.network.timeout_seconds, 8); // CLI
        assert_eq!(config.network.user_agent, "env-agent"); // environment
        assert_eq!(config.output.format, OutputFormatConfig::Json); // file
    }

    #[test]
    fn test_fetch_config_and_durations() {
        let mut config = Config::default();
        config.network.timeout_seconds = 3;

        assert_eq!(
            ConfigManager::get_timeout_duration(&config),
            Duration::from_secs(3)
        );
        let fetch = ConfigManager::fetch_config(&config);
        assert_eq!(fetch.timeout_seconds, 3);
        assert_eq!(fetch.user_agent, config.network.user_agent);
    }

    #[test]
    fn test_output_format_conversion() {
        assert_eq!(
            OutputFormatConfig::from(OutputFormat::Human),
            OutputFormatConfig::Human
        );
        assert_eq!(
            OutputFormat::from(OutputFormatConfig::Json),
            OutputFormat::Json
        );
    }
}
