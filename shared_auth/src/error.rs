// signed_ledger/shared_auth/src/error.rs

//! Error types for key generation, signing and wire parsing.
//!
//! Authentication failures are not errors: they are reported as
//! [`AuthResult`](crate::verifier::AuthResult) values.

use thiserror::Error;

/// Hard failures of the cryptographic core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The public exponent was not invertible for any drawn prime pair
    #[error("Key generation failed after {attempts} attempts: public exponent not invertible mod phi(n)")]
    KeyGenerationFailure {
        /// Number of prime pairs drawn before giving up
        attempts: u32,
    },

    /// No probable prime was found within the candidate budget
    #[error("Could not find a {bits}-bit probable prime")]
    PrimeGenerationFailure {
        /// Requested prime size
        bits: u64,
    },

    /// The requested prime size is too small to carry a padded digest
    #[error("Prime size of {bits} bits is below the minimum of {minimum} bits")]
    InvalidKeySize {
        /// Requested prime size
        bits: u64,
        /// Smallest accepted prime size
        minimum: u64,
    },

    /// Text could not be converted to the required form
    #[error("Encoding failed: {0}")]
    Encoding(String),

    /// Signing was attempted before a key pair was bound
    #[error("No key material bound to this signer")]
    NoKeyMaterial,

    /// The configuration is unreadable or out of range
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for cryptographic operations
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Reasons a wire line does not decode into a signed request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedLine {
    #[error("expected exactly one ';' separating message and signature")]
    MissingSignature,

    #[error("expected 4 comma-separated message fields, found {0}")]
    FieldCount(usize),

    #[error("field `{field}` is not canonical: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },

    #[error("unknown operation `{0}`")]
    UnknownOperation(String),
}

impl MalformedLine {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        MalformedLine::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
