//! Redis client implementation
//!
//! Wraps a multiplexed async connection with connect-time backoff and a
//! retry helper for idempotent commands. Commands that must run at most
//! once (counter scripts) go through [`RedisClient::execute_once`].

use redis::{aio::MultiplexedConnection, Client, RedisError, RedisResult};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use otp_shared::config::mask_url;
use otp_shared::CacheConfig;

use crate::InfrastructureError;

/// Upper bound for the exponential backoff between retries
const MAX_RETRY_DELAY_MS: u64 = 5_000;

pub(crate) type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Redis client with retry logic
///
/// Cheap to clone: clones share the same multiplexed connection.
#[derive(Clone)]
pub struct RedisClient {
    connection: MultiplexedConnection,
    config: CacheConfig,
}

impl RedisClient {
    /// Connect using the given cache configuration
    ///
    /// # Errors
    ///
    /// * `InfrastructureError::Config` - the URL cannot be parsed
    /// * `InfrastructureError::Cache` - no connection after `max_retries` tries
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(
            url = %mask_url(&config.url),
            key_prefix = %config.key_prefix,
            "Creating Redis client"
        );

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection =
            Self::connect_with_retry(&client, config.max_retries, config.retry_delay_ms).await?;

        info!("Redis client created successfully");
        Ok(Self { connection, config })
    }

    async fn connect_with_retry(
        client: &Client,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            match client.get_multiplexed_async_connection().await {
                Ok(connection) => return Ok(connection),
                Err(e) if attempts < max_retries => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Namespaced key under the configured prefix
    pub fn key(&self, key: &str) -> String {
        self.config.make_key(key)
    }

    /// Run an idempotent operation, retrying transient failures with
    /// exponential backoff
    pub(crate) async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let mut attempts = 0;
        let mut delay = self.config.retry_delay_ms;

        loop {
            attempts += 1;

            match operation(self.connection.clone()).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < self.config.max_retries && is_retriable_error(&e) => {
                    warn!(
                        "Redis operation failed (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, self.config.max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
                }
                Err(e) => {
                    error!("Redis operation failed after {} attempts: {}", attempts, e);
                    return Err(e);
                }
            }
        }
    }

    /// Run a non-idempotent operation exactly once
    ///
    /// A retried increment could count twice if the first reply was lost.
    pub(crate) async fn execute_once<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: FnOnce(MultiplexedConnection) -> RedisFuture<T>,
    {
        operation(self.connection.clone()).await.map_err(|e| {
            error!("Redis operation failed: {}", e);
            e
        })
    }

    /// Check connectivity with a PING
    pub async fn health_check(&self) -> Result<(), InfrastructureError> {
        debug!("Performing Redis health check");

        let response = self
            .execute_with_retry(|mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await?;

        if response == "PONG" {
            debug!("Redis health check passed");
            Ok(())
        } else {
            warn!("Redis health check returned unexpected response: {}", response);
            Err(InfrastructureError::Config(format!(
                "unexpected PING response: {}",
                response
            )))
        }
    }
}

/// Whether a Redis error is transient and the command may be retried
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    error.is_io_error()
        || error.is_timeout()
        || error.is_connection_dropped()
        || matches!(
            error.kind(),
            redis::ErrorKind::BusyLoadingError | redis::ErrorKind::TryAgain
        )
}
