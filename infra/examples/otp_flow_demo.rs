//! End-to-end OTP flow against a local Redis
//!
//! This example shows how to:
//! - Load configuration and initialize logging
//! - Build the Redis-backed endpoint
//! - Issue a code, reject a wrong guess, accept the right one
//! - Observe the issuance cooldown
//!
//! Run with:
//! OTP__CACHE__URL=redis://127.0.0.1:6379 cargo run -p otp_infra --example otp_flow_demo

use std::sync::Arc;

use otp_core::domain::entities::OtpPurpose;
use otp_core::domain::value_objects::OtpCode;
use otp_core::errors::DomainError;
use otp_core::services::{DeliveryError, DeliveryGateway};
use otp_infra::connect_with_delivery;
use otp_shared::{init_tracing, AppConfig};
use tokio::sync::Mutex;

/// Keeps the last code so the demo can play the user's part
#[derive(Default)]
struct Inbox {
    last: Mutex<Option<String>>,
}

#[async_trait::async_trait]
impl DeliveryGateway for Inbox {
    async fn send(
        &self,
        _destination: &str,
        code: &OtpCode,
        _purpose: &OtpPurpose,
    ) -> Result<(), DeliveryError> {
        *self.last.lock().await = Some(code.expose().to_string());
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging)?;

    println!("OTP Flow Demo");
    println!("=============\n");

    let inbox = Arc::new(Inbox::default());
    let endpoint = connect_with_delivery(&config, inbox.clone()).await?;
    println!("✓ Connected to Redis\n");

    let subject = format!("+1555{:07}", uuid::Uuid::new_v4().as_u128() % 10_000_000);

    let issued = endpoint.request_code(&subject, "login").await?;
    println!("1. Issued a code, valid until {}", issued.expires_at);

    let code = inbox.last.lock().await.clone().unwrap_or_default();

    let wrong = endpoint.check_code(&subject, "login", "not-the-code").await?;
    println!("2. Wrong code accepted? {}", wrong.success);

    let right = endpoint.check_code(&subject, "login", &code).await?;
    println!("3. Right code accepted? {}", right.success);

    let replay = endpoint.check_code(&subject, "login", &code).await?;
    println!("4. Replayed code accepted? {}", replay.success);

    match endpoint.request_code(&subject, "login").await {
        Err(DomainError::Denied { retry_after_seconds }) => {
            println!("5. Re-issue denied, retry after {}s", retry_after_seconds)
        }
        Ok(_) => println!("5. Re-issue allowed (cooldown disabled)"),
        Err(e) => return Err(e.into()),
    }

    endpoint
        .service()
        .rate_limiter()
        .reset(&subject, &OtpPurpose::Login)
        .await?;
    println!("6. Rate limit counters reset");

    Ok(())
}
