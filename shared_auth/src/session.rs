// signed_ledger/shared_auth/src/session.rs

//! Sender-side session state.
//!
//! A session owns one key pair plus the identity and public key text derived
//! from it. It is built once and then only read, so it can be shared behind an
//! `Arc` by every request of the session.

use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::info;

use crate::codec::{CanonicalMessage, Operation};
use crate::encoding::{PublicKeyEncoding, PublicKeyFormat};
use crate::error::{CryptoError, CryptoResult};
use crate::identity::Identity;
use crate::rsa::{KeyGenerator, KeyPair};
use crate::signer::Signer;

#[derive(Clone, Debug)]
pub struct Session {
    keys: Arc<KeyPair>,
    signer: Signer,
    identity: Identity,
    public_key: PublicKeyEncoding,
}

impl Session {
    /// Generates a fresh key pair and derives the session identity from it.
    pub fn establish(generator: &KeyGenerator, format: PublicKeyFormat) -> CryptoResult<Self> {
        Session::from_key_pair(generator.generate()?, format)
    }

    pub fn from_key_pair(keys: KeyPair, format: PublicKeyFormat) -> CryptoResult<Self> {
        let public_key = PublicKeyEncoding::encode(keys.public_key(), format)?;
        let identity = Identity::derive(&public_key);
        info!(%identity, modulus_bits = keys.modulus().bits(), "session established");
        let keys = Arc::new(keys);
        Ok(Session {
            signer: Signer::new(Arc::clone(&keys)),
            keys,
            identity,
            public_key,
        })
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.keys
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn public_key(&self) -> &PublicKeyEncoding {
        &self.public_key
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// Signs `operation operand` under this session and returns the wire line
    /// (without the trailing newline).
    pub fn build_signed_line(&self, operation: Operation, operand: i64) -> CryptoResult<String> {
        let message = CanonicalMessage::new(
            self.identity.clone(),
            self.public_key.clone(),
            operation,
            operand,
        );
        Ok(self.signer.sign_request(message)?.to_line())
    }
}

/// Lazily established session, initialized at most once even when several
/// first requests race for it.
#[derive(Debug, Default)]
pub struct SessionCell {
    inner: OnceCell<Arc<Session>>,
}

impl SessionCell {
    pub fn new() -> Self {
        SessionCell::default()
    }

    pub fn get(&self) -> Option<Arc<Session>> {
        self.inner.get().cloned()
    }

    pub fn get_or_establish(
        &self,
        generator: &KeyGenerator,
        format: PublicKeyFormat,
    ) -> CryptoResult<Arc<Session>> {
        self.inner
            .get_or_try_init(|| Session::establish(generator, format).map(Arc::new))
            .cloned()
    }

    /// Signs with the established session. Fails with `NoKeyMaterial` if no
    /// session exists yet.
    pub fn build_signed_line(&self, operation: Operation, operand: i64) -> CryptoResult<String> {
        match self.inner.get() {
            Some(session) => session.build_signed_line(operation, operand),
            None => Err(CryptoError::NoKeyMaterial),
        }
    }
}
