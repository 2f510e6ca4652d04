//! Raw one-time code.

use std::fmt;

/// A raw one-time code
///
/// The raw value only travels from the generator to the immediate caller
/// and the delivery collaborator. `Debug` is redacted and there is no
/// `Display`, so the code cannot end up in logs by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    /// Wrap a raw code
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Borrow the raw code
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Number of characters in the code
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode(<redacted>)")
    }
}
