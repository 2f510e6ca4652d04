//! Wiring of the Redis-backed OTP endpoint

use std::sync::Arc;
use tracing::info;

use otp_core::services::{
    DeliveryGateway, OtpEndpoint, OtpService, OtpServiceConfig, RateLimitPolicy, RateLimiter,
};
use otp_shared::config::mask_url;
use otp_shared::AppConfig;

use crate::cache::{RedisClient, RedisCredentialStore, RedisRateLimitStore};
use crate::delivery::LoggingDeliveryGateway;
use crate::InfrastructureError;

/// OTP service over the Redis stores
pub type RedisOtpService = OtpService<RedisCredentialStore, RedisRateLimitStore>;

/// Caller-facing endpoint over the Redis stores
pub type RedisOtpEndpoint<D = LoggingDeliveryGateway> =
    OtpEndpoint<RedisCredentialStore, RedisRateLimitStore, D>;

/// Connect to Redis and build an endpoint that logs deliveries
pub async fn connect(config: &AppConfig) -> Result<RedisOtpEndpoint, InfrastructureError> {
    connect_with_delivery(config, Arc::new(LoggingDeliveryGateway::new())).await
}

/// Connect to Redis and build an endpoint around the given delivery gateway
///
/// # Errors
///
/// * `InfrastructureError::Config` - invalid configuration
/// * `InfrastructureError::Cache` - Redis unreachable
/// * `InfrastructureError::Domain` - the OTP policy was rejected
pub async fn connect_with_delivery<D: DeliveryGateway>(
    config: &AppConfig,
    delivery: Arc<D>,
) -> Result<RedisOtpEndpoint<D>, InfrastructureError> {
    config
        .validate()
        .map_err(|e| InfrastructureError::Config(e.to_string()))?;

    let client = RedisClient::new(config.cache.clone()).await?;
    client.health_check().await?;

    let credentials = Arc::new(RedisCredentialStore::new(client.clone()));
    let counters = Arc::new(RedisRateLimitStore::new(client));

    let policy = RateLimitPolicy::from_config(&config.rate_limit, config.otp.max_attempts);
    let service_config = OtpServiceConfig::try_from(&config.otp)?;
    let service = OtpService::new(credentials, RateLimiter::new(counters, policy), service_config)?;

    info!(
        environment = %config.environment,
        redis = %mask_url(&config.cache.url),
        code_length = config.otp.code_length,
        ttl_seconds = config.otp.ttl_seconds,
        max_attempts = config.otp.max_attempts,
        event = "otp_endpoint_ready",
        "OTP endpoint initialized"
    );

    Ok(OtpEndpoint::new(Arc::new(service), delivery))
}
