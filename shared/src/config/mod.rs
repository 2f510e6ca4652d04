//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `cache` - Redis connection and key namespace
//! - `environment` - Environment detection and logging configuration
//! - `otp` - Code length, alphabet, lifetime and attempt cap
//! - `rate_limit` - Issuance cooldown and rolling window cap
//!
//! Values are layered: built-in defaults, then `config/<environment>.toml`
//! (optional), then `OTP__`-prefixed environment variables such as
//! `OTP__CACHE__URL` or `OTP__RATE_LIMIT__WINDOW_SECONDS`.

pub mod cache;
pub mod environment;
pub mod otp;
pub mod rate_limit;

use ::config::builder::DefaultState;
use ::config::{ConfigBuilder, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

// Re-export commonly used types
pub use cache::{mask_url, CacheConfig};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use otp::OtpPolicyConfig;
pub use rate_limit::RateLimitConfig;

/// Prefix for environment variable overrides
const ENV_PREFIX: &str = "OTP";

/// Separator between nested keys in environment variable names
const ENV_SEPARATOR: &str = "__";

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Redis configuration (required, no default URL)
    pub cache: CacheConfig,

    /// Code policy
    #[serde(default)]
    pub otp: OtpPolicyConfig,

    /// Issuance rate limiting
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `.env`, the environment's config file and
    /// `OTP__*` environment variables, then validate it
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = Environment::from_env();
        let builder = Self::defaults(environment)?
            .add_source(File::with_name(environment.config_file()).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            );

        Self::finish(builder)
    }

    /// Load configuration from an in-memory TOML document
    pub fn from_toml(environment: Environment, contents: &str) -> Result<Self, ConfigError> {
        let builder =
            Self::defaults(environment)?.add_source(File::from_str(contents, FileFormat::Toml));
        Self::finish(builder)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cache.validate()?;
        self.otp.validate()?;
        self.rate_limit.validate()?;
        Ok(())
    }

    fn defaults(environment: Environment) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let logging = LoggingConfig::for_environment(environment);
        let format = match logging.format {
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
            LogFormat::Compact => "compact",
        };

        Ok(::config::Config::builder()
            .set_default("environment", environment.to_string())?
            .set_default("logging.level", logging.level)?
            .set_default("logging.format", format)?)
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
