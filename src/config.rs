//! Layered configuration
//!
//! Defaults → optional TOML file → `GRAFT_*` environment overlay (with `__`
//! as the separator for nested keys). The service credential is deliberately
//! not part of the layered config: it is read once from `GRAFT_TOKEN` at
//! startup and its absence is fatal.

use crate::classify;
use crate::error::SyncError;
use crate::logging::LoggingConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding the page-tree service credential
pub const TOKEN_ENV_VAR: &str = "GRAFT_TOKEN";

/// Remote service connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the page-tree service API
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Server-imposed write limits
///
/// These are service-specific constants surfaced as configuration: the
/// maximum length of one text block and the maximum number of blocks the
/// service accepts in a single append call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitConfig {
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    #[serde(default = "default_max_blocks_per_append")]
    pub max_blocks_per_append: usize,
}

/// Traversal and classification rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRules {
    /// Extensions (without dot) whose files get inlined text content
    #[serde(default = "classify::default_text_extensions")]
    pub text_extensions: Vec<String>,

    /// Entries whose name starts with this prefix are skipped; empty
    /// disables hidden filtering
    #[serde(default = "default_hidden_prefix")]
    pub hidden_prefix: String,

    /// Base URL for synthesized external file references
    #[serde(default = "default_external_file_base_url")]
    pub external_file_base_url: String,
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraftConfig {
    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub limits: LimitConfig,

    #[serde(default)]
    pub rules: SyncRules,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_base_url() -> String {
    "https://api.notion.com".to_string()
}

fn default_max_chunk_chars() -> usize {
    2000
}

fn default_max_blocks_per_append() -> usize {
    50
}

fn default_hidden_prefix() -> String {
    ".".to_string()
}

fn default_external_file_base_url() -> String {
    "https://example.com/files".to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: default_max_chunk_chars(),
            max_blocks_per_append: default_max_blocks_per_append(),
        }
    }
}

impl Default for SyncRules {
    fn default() -> Self {
        Self {
            text_extensions: classify::default_text_extensions(),
            hidden_prefix: default_hidden_prefix(),
            external_file_base_url: default_external_file_base_url(),
        }
    }
}

impl Default for GraftConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            limits: LimitConfig::default(),
            rules: SyncRules::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl GraftConfig {
    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.limits.max_chunk_chars == 0 {
            return Err(SyncError::Config(
                "limits.max_chunk_chars must be at least 1".to_string(),
            ));
        }
        if self.limits.max_blocks_per_append == 0 {
            return Err(SyncError::Config(
                "limits.max_blocks_per_append must be at least 1".to_string(),
            ));
        }
        if self.remote.base_url.is_empty() {
            return Err(SyncError::Config("remote.base_url must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from defaults, an optional file, and environment.
    pub fn load(config_file: Option<&Path>) -> Result<GraftConfig, SyncError> {
        let mut builder =
            Config::builder().add_source(Config::try_from(&GraftConfig::default()).map_err(cfg_err)?);
        match config_file {
            Some(path) => builder = builder.add_source(File::from(path)),
            None => builder = builder.add_source(File::with_name("graft").required(false)),
        }
        let merged = builder
            .add_source(
                Environment::with_prefix("GRAFT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(cfg_err)?;
        let config: GraftConfig = merged.try_deserialize().map_err(cfg_err)?;
        config.validate()?;
        Ok(config)
    }
}

fn cfg_err(e: config::ConfigError) -> SyncError {
    SyncError::Config(e.to_string())
}

/// Read the service credential from the environment.
pub fn resolve_token() -> Result<String, SyncError> {
    match std::env::var(TOKEN_ENV_VAR) {
        Ok(token) if !token.is_empty() => Ok(token),
        _ => Err(SyncError::Config(format!(
            "{} is not set; export the page-tree service token before running",
            TOKEN_ENV_VAR
        ))),
    }
}
