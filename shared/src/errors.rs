//! Shared error types

use thiserror::Error;

/// Errors raised while loading or applying configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing configuration value: {key}")]
    Missing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: String, reason: String },

    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}
