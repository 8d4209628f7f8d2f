// signed_ledger/shared_auth/src/verifier.rs

//! Receiver-side trust decision.
//!
//! A request is trusted only if
//! 1. the claimed identity is the one derived from the public key it carries, and
//! 2. the signature opens, under that key, to the padded digest of the message.
//!
//! The binding is checked first so a forged identity is reported apart from a
//! corrupted signature. Neither outcome is an error: both are [`AuthResult`]
//! values, and nothing about the reason reaches the wire.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::codec::{parse_line, CanonicalMessage, SignedRequest};
use crate::digest::message_representative;
use crate::encoding::PublicKeyEncoding;
use crate::identity::Identity;
use crate::rsa::PublicKey;
use crate::signer::Signature;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthResult {
    Accepted,
    /// The identity does not hash from the presented public key
    RejectedBinding,
    /// The signature does not match the message under the presented key
    RejectedSignature,
    /// The request could not be decoded
    Malformed,
}

impl AuthResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, AuthResult::Accepted)
    }
}

impl fmt::Display for AuthResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AuthResult::Accepted => "accepted",
            AuthResult::RejectedBinding => "rejected: identity not bound to public key",
            AuthResult::RejectedSignature => "rejected: invalid signature",
            AuthResult::Malformed => "malformed request",
        };
        f.write_str(text)
    }
}

/// `signature^e mod n == padded_digest(message)`. A signature that is not
/// smaller than the modulus never verifies.
pub fn verify(message: &str, signature: &Signature, key: &PublicKey) -> bool {
    match key.apply(signature.as_biguint()) {
        Some(recovered) => recovered == message_representative(message),
        None => false,
    }
}

pub fn check_binding(identity: &Identity, public_key: &PublicKeyEncoding) -> bool {
    identity.is_bound_to(public_key)
}

/// Runs the binding check, then the signature check, on a decoded request.
pub fn authenticate(request: &SignedRequest) -> AuthResult {
    let CanonicalMessage {
        identity,
        public_key,
        ..
    } = &request.message;

    let key = match public_key.decode() {
        Ok(key) => key,
        Err(reason) => {
            debug!(%reason, "public key does not decode");
            return AuthResult::Malformed;
        }
    };

    if !check_binding(identity, public_key) {
        warn!(
            claimed = %identity,
            derived = %Identity::derive(public_key),
            "public key does not hash to the claimed identity, possible impersonation"
        );
        return AuthResult::RejectedBinding;
    }

    if !verify(&request.message.render(), &request.signature, &key) {
        warn!(identity = %identity, "invalid signature");
        return AuthResult::RejectedSignature;
    }

    AuthResult::Accepted
}

/// Parses and authenticates one wire line. Undecodable lines are `Malformed`.
pub fn authenticate_line(line: &str) -> AuthResult {
    match parse_line(line) {
        Ok(request) => authenticate(&request),
        Err(reason) => {
            debug!(%reason, "malformed request line");
            AuthResult::Malformed
        }
    }
}

/// Same as [`authenticate_line`], also handing back the decoded request when it
/// was accepted.
pub fn authenticate_request(line: &str) -> (AuthResult, Option<SignedRequest>) {
    match parse_line(line) {
        Ok(request) => match authenticate(&request) {
            AuthResult::Accepted => (AuthResult::Accepted, Some(request)),
            rejected => (rejected, None),
        },
        Err(reason) => {
            debug!(%reason, "malformed request line");
            (AuthResult::Malformed, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{build_signed_line, Operation};
    use crate::encoding::PublicKeyFormat;
    use crate::rsa::{KeyGenerator, KeyPair, MIN_PRIME_BITS};
    use crate::signer::sign;
    use num_bigint::BigUint;
    use num_traits::One;

    struct Fixture {
        keys: KeyPair,
        identity: Identity,
        encoding: PublicKeyEncoding,
    }

    fn fixture(format: PublicKeyFormat) -> Fixture {
        let keys = KeyGenerator::new(MIN_PRIME_BITS)
            .unwrap()
            .with_rounds(20)
            .generate()
            .unwrap();
        let encoding = PublicKeyEncoding::encode(keys.public_key(), format).unwrap();
        let identity = Identity::derive(&encoding);
        Fixture {
            keys,
            identity,
            encoding,
        }
    }

    #[test]
    fn test_verify_accepts_own_signature() {
        let f = fixture(PublicKeyFormat::Delimited);
        let sig = sign("hello", &f.keys);
        assert!(verify("hello", &sig, f.keys.public_key()));
        assert!(!verify("hello!", &sig, f.keys.public_key()));
    }

    #[test]
    fn test_verify_rejects_other_key() {
        let f = fixture(PublicKeyFormat::Delimited);
        let g = fixture(PublicKeyFormat::Delimited);
        let sig = sign("hello", &f.keys);
        assert!(!verify("hello", &sig, g.keys.public_key()));
    }

    #[test]
    fn test_verify_rejects_oversized_signature() {
        let f = fixture(PublicKeyFormat::Delimited);
        let sig = Signature::from_biguint(f.keys.modulus().clone());
        assert!(!verify("hello", &sig, f.keys.public_key()));
    }

    #[test]
    fn test_accepts_valid_request_in_both_layouts() {
        for format in [PublicKeyFormat::Delimited, PublicKeyFormat::Concatenated] {
            let f = fixture(format);
            let line = build_signed_line(&f.identity, &f.encoding, Operation::Add, 5, &f.keys);
            assert_eq!(authenticate_line(&line), AuthResult::Accepted);
        }
    }

    #[test]
    fn test_tampered_operand_is_rejected_signature() {
        let f = fixture(PublicKeyFormat::Delimited);
        let line = build_signed_line(&f.identity, &f.encoding, Operation::Add, 5, &f.keys);
        let tampered = line.replacen(",add,5;", ",add,6;", 1);
        assert_ne!(line, tampered);
        assert_eq!(authenticate_line(&tampered), AuthResult::RejectedSignature);
    }

    #[test]
    fn test_substituted_identity_is_rejected_binding() {
        let f = fixture(PublicKeyFormat::Delimited);
        let victim = fixture(PublicKeyFormat::Delimited);
        // attacker signs a message naming the victim's identity with its own key
        let message = CanonicalMessage::new(
            victim.identity.clone(),
            f.encoding.clone(),
            Operation::Min,
            100,
        );
        let request = SignedRequest {
            signature: sign(&message.render(), &f.keys),
            message,
        };
        assert_eq!(authenticate(&request), AuthResult::RejectedBinding);
    }

    #[test]
    fn test_binding_checked_before_signature() {
        let f = fixture(PublicKeyFormat::Delimited);
        let message = CanonicalMessage::new(
            "1".parse().unwrap(),
            f.encoding.clone(),
            Operation::Get,
            0,
        );
        let request = SignedRequest {
            message,
            signature: Signature::from_biguint(7u32.into()),
        };
        assert_eq!(authenticate(&request), AuthResult::RejectedBinding);
    }

    #[test]
    fn test_malformed_lines() {
        assert_eq!(authenticate_line("garbage"), AuthResult::Malformed);
        assert_eq!(authenticate_line("1,2,add,3"), AuthResult::Malformed);
        assert_eq!(authenticate_line("1,65537:3233,add,x;5"), AuthResult::Malformed);
        assert_eq!(authenticate_request("1,2;3").0, AuthResult::Malformed);
    }

    #[test]
    fn test_foreign_exponent_is_malformed() {
        let modulus = (BigUint::one() << 300usize) + BigUint::one();
        let cases = [
            (BigUint::one(), PublicKeyFormat::Delimited),
            (BigUint::from(12345u32), PublicKeyFormat::Concatenated),
        ];
        for (exponent, format) in cases {
            let key = PublicKey::new(exponent, modulus.clone());
            let encoding = PublicKeyEncoding::encode(&key, format).unwrap();
            let identity = Identity::derive(&encoding);
            let message = CanonicalMessage::new(identity, encoding, Operation::Add, 1_000_000);
            let signature = Signature::from_biguint(message_representative(&message.render()));
            let request = SignedRequest { message, signature };

            assert_eq!(authenticate(&request), AuthResult::Malformed);
            assert_eq!(authenticate_line(&request.to_line()), AuthResult::Malformed);
        }
    }

    #[test]
    fn test_exponent_one_signature_needs_no_private_key() {
        // under e = 1 the padded digest opens to itself
        let modulus = (BigUint::one() << 300usize) + BigUint::one();
        let key = PublicKey::new(BigUint::one(), modulus);
        let forged = Signature::from_biguint(message_representative("1,1:2,add,5"));
        assert!(verify("1,1:2,add,5", &forged, &key));
        assert!(PublicKeyEncoding::encode(&key, PublicKeyFormat::Delimited)
            .unwrap()
            .decode()
            .is_err());
    }

    #[test]
    fn test_authenticate_request_returns_accepted_fields() {
        let f = fixture(PublicKeyFormat::Delimited);
        let line = build_signed_line(&f.identity, &f.encoding, Operation::Get, 0, &f.keys);
        let (result, request) = authenticate_request(&line);
        assert!(result.is_accepted());
        assert_eq!(request.unwrap().message.identity, f.identity);

        let (result, request) = authenticate_request(&line.replacen(",get,0;", ",get,1;", 1));
        assert_eq!(result, AuthResult::RejectedSignature);
        assert!(request.is_none());
    }
}
