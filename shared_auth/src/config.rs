// signed_ledger/shared_auth/src/config.rs

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::encoding::PublicKeyFormat;
use crate::error::{CryptoError, CryptoResult};
use crate::rsa::{
    KeyGenerator, DEFAULT_MAX_KEYGEN_ATTEMPTS, DEFAULT_MILLER_RABIN_ROUNDS, MIN_PRIME_BITS,
};

/// Key generation and wire settings, read from TOML:
///
/// ```toml
/// prime_bits = 2048
/// miller_rabin_rounds = 40
/// max_keygen_attempts = 16
/// key_format = "delimited"
/// ```
///
/// Missing keys fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Size of each RSA prime; the modulus is twice as wide
    pub prime_bits: u64,
    pub miller_rabin_rounds: usize,
    pub max_keygen_attempts: u32,
    pub key_format: PublicKeyFormat,
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            prime_bits: 2048,
            miller_rabin_rounds: DEFAULT_MILLER_RABIN_ROUNDS,
            max_keygen_attempts: DEFAULT_MAX_KEYGEN_ATTEMPTS,
            key_format: PublicKeyFormat::Delimited,
        }
    }
}

impl AuthConfig {
    pub fn from_toml_str(text: &str) -> CryptoResult<Self> {
        let config: AuthConfig =
            toml::from_str(text).map_err(|e| CryptoError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> CryptoResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| CryptoError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> CryptoResult<()> {
        if self.prime_bits < MIN_PRIME_BITS {
            return Err(CryptoError::Config(format!(
                "prime_bits must be at least {}, got {}",
                MIN_PRIME_BITS, self.prime_bits
            )));
        }
        if self.miller_rabin_rounds == 0 {
            return Err(CryptoError::Config("miller_rabin_rounds must be positive".into()));
        }
        if self.max_keygen_attempts == 0 {
            return Err(CryptoError::Config("max_keygen_attempts must be positive".into()));
        }
        Ok(())
    }

    pub fn key_generator(&self) -> CryptoResult<KeyGenerator> {
        Ok(KeyGenerator::new(self.prime_bits)?
            .with_rounds(self.miller_rabin_rounds)
            .with_max_attempts(self.max_keygen_attempts))
    }
}
