// signed_ledger/shared_auth/src/identity.rs

//! Identities bound to public keys.
//!
//! An identity is the decimal rendering of the least-significant
//! [`IDENTITY_LEN`] bytes of `SHA-256(public key encoding)`, read as an
//! unsigned big-endian integer. Anyone holding the encoding can recompute it,
//! so a claimed identity is only trusted when it matches the key presented
//! next to it.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::digest::{digest, HASH_LEN};
use crate::encoding::{parse_decimal, PublicKeyEncoding};
use crate::error::MalformedLine;

/// Number of trailing hash bytes kept for an identity
pub const IDENTITY_LEN: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn derive(encoding: &PublicKeyEncoding) -> Self {
        let hash = digest(encoding.as_bytes());
        let value = BigUint::from_bytes_be(&hash[HASH_LEN - IDENTITY_LEN..]);
        Identity(value.to_str_radix(10))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if this identity is the one derived from `encoding`.
    pub fn is_bound_to(&self, encoding: &PublicKeyEncoding) -> bool {
        Identity::derive(encoding) == *self
    }
}

impl FromStr for Identity {
    type Err = MalformedLine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_decimal("identity", s)?;
        Ok(Identity(s.to_string()))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
