//! Configuration loading via `ortho-config`.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

/// Default servers.com public API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.servers.com/v1";

/// Default quiet period before pending create requests are flushed.
pub const DEFAULT_DEBOUNCE_SECS: u64 = 5;

/// Default deadline for a single upstream HTTP call.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Default `User-Agent` header value.
pub const DEFAULT_USER_AGENT: &str = "terraform-provider-serverscom";

/// servers.com API and collector settings derived from environment
/// variables and configuration files.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "SERVERSCOM",
    discovery(
        app_name = "serverscom",
        env_var = "SERVERSCOM_CONFIG_PATH",
        config_file_name = "serverscom.toml",
        dotfile_name = ".serverscom.toml",
        project_file_name = "serverscom.toml"
    )
)]
pub struct ServerscomConfig {
    /// Bearer token used to authenticate against the public API. Required.
    pub api_token: String,
    /// Base URL of the public API, including the version segment.
    #[ortho_config(default = DEFAULT_API_URL.to_owned())]
    pub api_url: String,
    /// Quiet period, in seconds, that the collector waits after the last
    /// create request before dispatching batches.
    #[ortho_config(default = DEFAULT_DEBOUNCE_SECS)]
    pub collector_debounce_secs: u64,
    /// Deadline, in seconds, applied to every upstream HTTP call.
    #[ortho_config(default = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,
    /// `User-Agent` header sent with every request.
    #[ortho_config(default = DEFAULT_USER_AGENT.to_owned())]
    pub user_agent: String,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }

    fn missing(&self) -> ConfigError {
        ConfigError::MissingField(format!(
            "missing {}: set {} or add {} to serverscom.toml",
            self.description, self.env_var, self.toml_key
        ))
    }
}

impl ServerscomConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(metadata.missing());
        }
        Ok(())
    }

    fn require_positive(value: u64, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value == 0 {
            return Err(ConfigError::Invalid(format!(
                "{} must be greater than zero: check {} or {} in serverscom.toml",
                metadata.description, metadata.env_var, metadata.toml_key
            )));
        }
        Ok(())
    }

    /// Builds a configuration for the given token with every other field at
    /// its default.
    #[must_use]
    pub fn with_token(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            api_url: DEFAULT_API_URL.to_owned(),
            collector_debounce_secs: DEFAULT_DEBOUNCE_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Loads configuration using the `ortho-config` derive. Values merge
    /// defaults, configuration files, environment variables, and CLI flags in
    /// that order of precedence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the loader fails to merge sources.
    pub fn load_from_sources() -> Result<Self, ConfigError> {
        Self::load().map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("serverscom")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Debounce window used by the server collector.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_secs(self.collector_debounce_secs)
    }

    /// Deadline applied to each upstream HTTP call.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Performs semantic validation on required fields. Error messages include
    /// guidance on how to provide missing values via environment variables or
    /// configuration files.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty
    /// and [`ConfigError::Invalid`] when a time window is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.api_token,
            &FieldMetadata::new("servers.com API token", "SERVERSCOM_API_TOKEN", "api_token"),
        )?;
        Self::require_field(
            &self.api_url,
            &FieldMetadata::new("servers.com API URL", "SERVERSCOM_API_URL", "api_url"),
        )?;
        Self::require_positive(
            self.collector_debounce_secs,
            &FieldMetadata::new(
                "collector debounce window",
                "SERVERSCOM_COLLECTOR_DEBOUNCE_SECS",
                "collector_debounce_secs",
            ),
        )?;
        Self::require_positive(
            self.request_timeout_secs,
            &FieldMetadata::new(
                "request timeout",
                "SERVERSCOM_REQUEST_TIMEOUT_SECS",
                "request_timeout_secs",
            ),
        )?;
        Ok(())
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates a field holds a value outside its accepted range.
    #[error("invalid configuration value: {0}")]
    Invalid(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
