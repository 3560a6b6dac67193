//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ToolConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Network declarations compiled into the binary.
pub const BUILTIN_NETWORKS: &str = include_str!("../../networks.toml");

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error("Unknown network '{0}'")]
    UnknownNetwork(String),

    #[error("Network '{network}' requires secret {reference}, which resolved to an empty value")]
    MissingSecret { network: String, reference: String },

    #[error("Network '{0}' has no signer configured for value-transferring operations")]
    NoSigner(String),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ToolConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    tracing::debug!(
        path = %path.display(),
        networks = config.networks.len(),
        "Configuration file loaded"
    );
    Ok(config)
}

/// Parse and validate the compiled-in declarations.
pub fn builtin_config() -> Result<ToolConfig, ConfigError> {
    parse_config(BUILTIN_NETWORKS)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<ToolConfig, ConfigError> {
    let config: ToolConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
