//! Tests for the OTP service and endpoint

#[cfg(test)]
mod service_tests;
