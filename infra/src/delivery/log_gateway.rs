//! Log-only delivery gateway for development

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

use otp_core::domain::entities::OtpPurpose;
use otp_core::domain::value_objects::OtpCode;
use otp_core::services::{DeliveryError, DeliveryGateway};
use otp_shared::mask_subject;

/// Delivery gateway that records a log line instead of sending anything
///
/// Only the masked destination and the purpose are logged; the code itself
/// never reaches the log.
#[derive(Clone, Default)]
pub struct LoggingDeliveryGateway {
    delivered: Arc<AtomicU64>,
}

impl LoggingDeliveryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of codes handed to this gateway
    pub fn delivered_count(&self) -> u64 {
        self.delivered.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeliveryGateway for LoggingDeliveryGateway {
    async fn send(
        &self,
        destination: &str,
        code: &OtpCode,
        purpose: &OtpPurpose,
    ) -> Result<(), DeliveryError> {
        if destination.trim().is_empty() {
            return Err(DeliveryError::Rejected("empty destination".to_string()));
        }

        let count = self.delivered.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            destination = %mask_subject(destination),
            purpose = %purpose,
            code_length = code.len(),
            delivered = count,
            event = "otp_delivered",
            "Delivered one-time code (log gateway)"
        );
        Ok(())
    }
}
