//! # Application Configuration
//!
//! This module defines the configuration structure for the `subhook-server` and
//! provides the logic for loading it from a `config.yml` file and environment
//! variables.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use subhook::{dispatch::DEFAULT_MAX_CONCURRENT_JOBS, SubscriptionState};
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// The shared secret webhook senders must present. Loaded from `API_TOKEN` env var.
    /// Left empty, every webhook call is rejected.
    #[serde(default)]
    pub api_token: String,
    /// HMAC secret for admin bearer tokens. Loaded from `JWT_SECRET` env var.
    /// Must be non-empty.
    pub jwt_secret: String,
    /// Where the subscription endpoints are mounted.
    #[serde(default = "default_route_prefix")]
    pub route_prefix: String,
    pub engine: EngineConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

fn default_port() -> u16 {
    3001
}

fn default_route_prefix() -> String {
    "/api/v1/subscribe".to_string()
}

/// Where and how to reach the subscription engine.
#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct DispatchConfig {
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: default_max_concurrent_jobs(),
        }
    }
}

fn default_max_concurrent_jobs() -> usize {
    DEFAULT_MAX_CONCURRENT_JOBS
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// State searched by `GET /search` when the caller does not pick one.
    #[serde(default = "default_search_state")]
    pub default_state: SubscriptionState,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_state: default_search_state(),
        }
    }
}

fn default_search_state() -> SubscriptionState {
    SubscriptionState::Running
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(format!("Invalid substitution pattern: {e}")))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration from a file and environment variables.
///
/// - The file is `config_path_override`, else `SUBHOOK_CONFIG`, else `config.yml`
///   in the crate directory. Only an explicitly named file is required to exist.
/// - `${VAR}` placeholders in the file are replaced from the environment.
/// - Top-level keys like `port` and `api_token` are overridden by `PORT` and `API_TOKEN`.
/// - Nested keys are overridden by `SUBHOOK_...` variables (e.g., `SUBHOOK_ENGINE__BASE_URL`).
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder()
        // Layer 1: Programmatic defaults.
        .set_default("port", i64::from(default_port()))?
        .set_default("route_prefix", default_route_prefix())?
        .set_default("engine.timeout_secs", default_timeout_secs())?
        .set_default("dispatch.max_concurrent_jobs", DEFAULT_MAX_CONCURRENT_JOBS as u64)?
        .set_default("search.default_state", default_search_state().code())?;

    // Layer 2: Config file.
    let explicit_path = config_path_override
        .map(str::to_string)
        .or_else(|| env::var("SUBHOOK_CONFIG").ok().filter(|p| !p.is_empty()));
    let config_path = explicit_path
        .clone()
        .unwrap_or_else(|| format!("{}/config.yml", env!("CARGO_MANIFEST_DIR")));

    match read_and_substitute(&config_path)? {
        Some(content) => {
            info!("Loading configuration from '{config_path}'.");
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None if explicit_path.is_some() => {
            return Err(ConfigError::NotFound(format!(
                "Config file not found at '{config_path}'."
            )));
        }
        None => {
            info!("'{config_path}' not found. Using defaults and environment only.");
        }
    }

    let settings = builder
        // Layer 3: Load environment variables for top-level keys like PORT.
        .add_source(Environment::default())
        // Layer 4: Load prefixed environment variables for deeper overrides.
        .add_source(
            Environment::with_prefix("SUBHOOK")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;

    if config.jwt_secret.is_empty() {
        return Err(ConfigError::General(
            "jwt_secret must not be empty; admin endpoints cannot be secured without it".to_string(),
        ));
    }

    if config.api_token.is_empty() {
        tracing::warn!("api_token is empty; every webhook request will be rejected.");
    }

    Ok(config)
}
