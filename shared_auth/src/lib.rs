// signed_ledger/shared_auth/src/lib.rs

//! RSA-signed ledger requests with identities bound to public keys.
//!
//! A sender establishes a [`Session`] (key pair, identity, public key text) and
//! signs each request line with it. A receiver parses the line, checks that
//! the claimed identity hashes from the enclosed public key, then checks the
//! signature, and gets back an [`AuthResult`].
//!
//! ```no_run
//! use shared_auth::{authenticate_line, AuthConfig, Operation, Session};
//!
//! let config = AuthConfig::default();
//! let session = Session::establish(&config.key_generator()?, config.key_format)?;
//! let line = session.build_signed_line(Operation::Add, 5)?;
//! assert!(authenticate_line(&line).is_accepted());
//! # Ok::<(), shared_auth::CryptoError>(())
//! ```

pub mod codec;
pub mod config;
pub mod digest;
pub mod encoding;
pub mod error;
pub mod identity;
pub mod rsa;
pub mod session;
pub mod signer;
pub mod verifier;

pub use codec::{build_signed_line, parse_line, CanonicalMessage, Operation, SignedRequest};
pub use config::AuthConfig;
pub use encoding::{PublicKeyEncoding, PublicKeyFormat, EXPONENT_WIDTH};
pub use error::{CryptoError, CryptoResult, MalformedLine};
pub use identity::Identity;
pub use rsa::{KeyGenerator, KeyPair, PublicKey, PUBLIC_EXPONENT};
pub use session::{Session, SessionCell};
pub use signer::{sign, Signature, Signer};
pub use verifier::{
    authenticate, authenticate_line, authenticate_request, check_binding, verify, AuthResult,
};
