//! Delivery gateway implementations
//!
//! Vendor integrations (SMS, email) plug in by implementing
//! `otp_core::services::DeliveryGateway`.

pub mod log_gateway;

pub use log_gateway::LoggingDeliveryGateway;
