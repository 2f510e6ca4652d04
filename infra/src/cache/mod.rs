//! Redis-backed stores
//!
//! - `RedisClient`: connection handling and retries
//! - `RedisCredentialStore`: OTP records as expiring hashes
//! - `RedisRateLimitStore`: cooldowns and issuance windows

pub mod credential_store;
pub mod rate_limit_store;
pub mod redis_client;

mod record_codec;

pub use credential_store::RedisCredentialStore;
pub use rate_limit_store::RedisRateLimitStore;
pub use redis_client::RedisClient;
