// signed_ledger/shared_auth/src/signer.rs

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::codec::{CanonicalMessage, SignedRequest};
use crate::digest::message_representative;
use crate::encoding::parse_decimal;
use crate::error::{CryptoError, CryptoResult, MalformedLine};
use crate::rsa::KeyPair;

/// `padded_digest(message)^d mod n`, carried on the wire in decimal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(BigUint);

impl Signature {
    pub fn from_biguint(value: BigUint) -> Self {
        Signature(value)
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }
}

impl FromStr for Signature {
    type Err = MalformedLine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_decimal("signature", s).map(Signature)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signs the UTF-8 bytes of `message` with the private half of `keys`.
/// Deterministic: the same message and key always give the same signature.
pub fn sign(message: &str, keys: &KeyPair) -> Signature {
    Signature(keys.apply_private(&message_representative(message)))
}

/// Holds the key pair of a session, if one has been established. The default
/// signer holds none and refuses every request with `NoKeyMaterial`.
#[derive(Clone, Debug, Default)]
pub struct Signer {
    keys: Option<Arc<KeyPair>>,
}

impl Signer {
    pub fn new(keys: Arc<KeyPair>) -> Self {
        Signer { keys: Some(keys) }
    }

    pub fn sign(&self, message: &str) -> CryptoResult<Signature> {
        let keys = self.keys.as_deref().ok_or(CryptoError::NoKeyMaterial)?;
        Ok(sign(message, keys))
    }

    /// Signs the rendered form of `message` and pairs the two into a request.
    pub fn sign_request(&self, message: CanonicalMessage) -> CryptoResult<SignedRequest> {
        let signature = self.sign(&message.render())?;
        Ok(SignedRequest { message, signature })
    }
}
