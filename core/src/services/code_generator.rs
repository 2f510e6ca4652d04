//! Cryptographically secure code generation

use rand::distributions::{Distribution, Uniform};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use otp_shared::config::otp::{MAX_CODE_LENGTH, MIN_CODE_LENGTH};
use otp_shared::OtpPolicyConfig;

use crate::domain::value_objects::OtpCode;
use crate::errors::{DomainError, DomainResult};

/// Set of characters a code is drawn from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    /// Build an alphabet from the distinct ASCII graphic characters of `chars`
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when a character is not ASCII
    /// graphic, appears twice, or fewer than two characters are given.
    pub fn new(chars: &str) -> DomainResult<Self> {
        let mut collected: Vec<char> = Vec::with_capacity(chars.len());
        for c in chars.chars() {
            if !c.is_ascii_graphic() {
                return Err(DomainError::Validation {
                    message: format!("alphabet character {:?} is not ASCII graphic", c),
                });
            }
            if collected.contains(&c) {
                return Err(DomainError::Validation {
                    message: format!("alphabet character {:?} appears more than once", c),
                });
            }
            collected.push(c);
        }

        if collected.len() < 2 {
            return Err(DomainError::Validation {
                message: "alphabet needs at least two distinct characters".to_string(),
            });
        }

        Ok(Self { chars: collected })
    }

    /// Decimal digits
    pub fn numeric() -> Self {
        Self {
            chars: ('0'..='9').collect(),
        }
    }

    /// Upper-case letters and digits
    pub fn alphanumeric() -> Self {
        Self {
            chars: ('A'..='Z').chain('0'..='9').collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }
}

/// Generates uniformly distributed codes from the OS random source
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    length: usize,
    alphabet: Alphabet,
    index: Uniform<usize>,
}

impl CodeGenerator {
    /// Create a generator for codes of `length` characters
    pub fn new(length: usize, alphabet: Alphabet) -> DomainResult<Self> {
        if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&length) {
            return Err(DomainError::Validation {
                message: format!(
                    "code length must be between {} and {}, got {}",
                    MIN_CODE_LENGTH, MAX_CODE_LENGTH, length
                ),
            });
        }

        let index = Uniform::from(0..alphabet.len());
        Ok(Self {
            length,
            alphabet,
            index,
        })
    }

    /// Create a generator from the configured policy
    pub fn from_policy(policy: &OtpPolicyConfig) -> DomainResult<Self> {
        Self::new(policy.code_length, Alphabet::new(&policy.alphabet)?)
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Generate a code using the operating system CSPRNG
    pub fn generate(&self) -> OtpCode {
        self.generate_with(&mut OsRng)
    }

    /// Generate a code from the given cryptographic RNG
    ///
    /// `Uniform` rejects out-of-range samples instead of reducing modulo the
    /// alphabet size, so every character is equally likely.
    pub fn generate_with<R: RngCore + CryptoRng>(&self, rng: &mut R) -> OtpCode {
        let code: String = (0..self.length)
            .map(|_| self.alphabet.chars[self.index.sample(rng)])
            .collect();
        OtpCode::new(code)
    }
}
