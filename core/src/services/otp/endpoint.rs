//! Caller-facing OTP API

use std::sync::Arc;

use otp_shared::mask_subject;

use crate::domain::entities::OtpPurpose;
use crate::errors::DomainResult;
use crate::repositories::{CredentialStore, RateLimitStore};

use super::service::OtpService;
use super::traits::DeliveryGateway;
use super::types::{IssueResponse, VerifyResponse};

/// Transport-agnostic entry point for issuing and checking codes
///
/// Purposes arrive as tags (`"login"`, `"password_reset"`, custom tags) and
/// are parsed here. Verification failures collapse into a single
/// `success: false` so callers cannot tell a wrong code from an expired or
/// locked record; the precise cause stays in the logs.
pub struct OtpEndpoint<S, L, D>
where
    S: CredentialStore + ?Sized,
    L: RateLimitStore + ?Sized,
    D: DeliveryGateway + ?Sized,
{
    service: Arc<OtpService<S, L>>,
    delivery: Arc<D>,
}

impl<S, L, D> OtpEndpoint<S, L, D>
where
    S: CredentialStore + ?Sized,
    L: RateLimitStore + ?Sized,
    D: DeliveryGateway + ?Sized,
{
    pub fn new(service: Arc<OtpService<S, L>>, delivery: Arc<D>) -> Self {
        Self { service, delivery }
    }

    pub fn service(&self) -> &OtpService<S, L> {
        &self.service
    }

    /// Issue a code and hand it to the delivery gateway
    ///
    /// A delivery failure leaves the issued record in place; the caller is
    /// expected to re-deliver rather than re-issue.
    pub async fn request_code(&self, subject: &str, purpose_tag: &str) -> DomainResult<IssueResponse> {
        let purpose: OtpPurpose = purpose_tag.parse()?;
        let issued = self.service.issue(subject, &purpose).await?;

        if let Err(e) = self.delivery.send(subject, &issued.code, &purpose).await {
            tracing::warn!(
                subject = %mask_subject(subject),
                purpose = %purpose,
                issuance_id = %issued.issuance_id,
                error = %e,
                event = "otp_delivery_failed",
                "Failed to deliver one-time code; record kept"
            );
        }

        Ok(IssueResponse {
            expires_at: issued.expires_at,
        })
    }

    /// Check a code, reporting only success or failure
    pub async fn check_code(
        &self,
        subject: &str,
        purpose_tag: &str,
        code: &str,
    ) -> DomainResult<VerifyResponse> {
        let purpose: OtpPurpose = purpose_tag.parse()?;
        let outcome = self.service.verify(subject, &purpose, code).await?;

        Ok(VerifyResponse {
            success: outcome.is_success(),
        })
    }
}
