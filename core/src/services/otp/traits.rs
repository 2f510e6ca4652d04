//! Delivery collaborator boundary

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::OtpPurpose;
use crate::domain::value_objects::OtpCode;

/// Failure reported by a delivery gateway
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Delivery channel unavailable: {0}")]
    Unavailable(String),

    #[error("Delivery rejected: {0}")]
    Rejected(String),
}

/// Sends an issued code to its destination (SMS, email, push)
#[async_trait]
pub trait DeliveryGateway: Send + Sync {
    /// Deliver `code` for `purpose` to `destination`
    async fn send(
        &self,
        destination: &str,
        code: &OtpCode,
        purpose: &OtpPurpose,
    ) -> Result<(), DeliveryError>;
}
