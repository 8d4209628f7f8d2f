// signed_ledger/shared_auth/src/digest.rs

use num_bigint::BigUint;
use sha2::{Digest, Sha256};

/// Length of a SHA-256 output in bytes
pub const HASH_LEN: usize = 32;

pub type HashOutput = [u8; HASH_LEN];

pub fn digest(data: &[u8]) -> HashOutput {
    Sha256::digest(data).into()
}

/// Prepends a zero byte to the hash and reads the 33 bytes as a big-endian
/// unsigned integer. Signer and verifier must agree on this bit for bit.
pub fn to_padded_integer(hash: &HashOutput) -> BigUint {
    let mut padded = [0u8; HASH_LEN + 1];
    padded[1..].copy_from_slice(hash);
    BigUint::from_bytes_be(&padded)
}

/// `to_padded_integer(digest(message))`, the value that gets signed.
pub fn message_representative(message: &str) -> BigUint {
    to_padded_integer(&digest(message.as_bytes()))
}
