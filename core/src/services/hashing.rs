//! Salted one-way hashing of codes

use constant_time_eq::constant_time_eq;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::domain::value_objects::OtpCode;

/// Salt size in bytes
pub const SALT_LEN: usize = 16;

/// Hashes codes with a per-record salt
///
/// The stored digest is `hex(SHA-256(salt || code))`, where `salt` is the
/// raw salt bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeHasher;

impl CodeHasher {
    pub fn new() -> Self {
        Self
    }

    /// Fresh hex-encoded random salt
    pub fn new_salt(&self) -> String {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        hex::encode(salt)
    }

    /// Hex digest of `code` under `salt`
    ///
    /// A salt that is not valid hex is hashed as its UTF-8 bytes, so a
    /// damaged record simply never matches.
    pub fn hash(&self, salt: &str, code: &str) -> String {
        let salt_bytes = hex::decode(salt).unwrap_or_else(|_| salt.as_bytes().to_vec());

        let mut hasher = Sha256::new();
        hasher.update(&salt_bytes);
        hasher.update(code.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Compare a supplied code against a stored digest in constant time
    pub fn matches(&self, salt: &str, supplied: &OtpCode, expected_hash: &str) -> bool {
        let candidate = self.hash(salt, supplied.expose());
        constant_time_eq(candidate.as_bytes(), expected_hash.as_bytes())
    }
}
