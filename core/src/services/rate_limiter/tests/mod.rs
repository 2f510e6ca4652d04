//! Tests for the rate limiter

#[cfg(test)]
mod limiter_tests;
