// signed_ledger/shared_auth/src/encoding.rs

//! Textual form of a public key as it travels inside a request.
//!
//! Two layouts exist:
//!
//! * `delimited`: `<e>:<n>`, self-describing, the default.
//! * `concatenated`: `<e><n>` with no separator. The receiver splits it at
//!   [`EXPONENT_WIDTH`] characters, so the exponent must be exactly that wide
//!   (65537 is five digits). This is the legacy layout and is part of the wire
//!   contract for peers that still emit it.
//!
//! Decoding accepts either layout: text containing `:` is delimited, anything
//! else is treated as concatenated. Either way the exponent must be
//! [`PUBLIC_EXPONENT`]; a key carrying any other exponent is malformed.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CryptoError, CryptoResult, MalformedLine};
use crate::rsa::{PublicKey, PUBLIC_EXPONENT};

/// Decimal width of the public exponent in the concatenated layout.
pub const EXPONENT_WIDTH: usize = 5;

pub const KEY_DELIMITER: char = ':';

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicKeyFormat {
    #[default]
    Delimited,
    Concatenated,
}

impl FromStr for PublicKeyFormat {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delimited" => Ok(PublicKeyFormat::Delimited),
            "concatenated" => Ok(PublicKeyFormat::Concatenated),
            other => Err(CryptoError::Config(format!("unknown key format `{}`", other))),
        }
    }
}

/// The exact text of a public key on the wire. Identities are derived from
/// these bytes, so the text is kept verbatim once built or parsed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKeyEncoding(String);

impl PublicKeyEncoding {
    pub fn encode(key: &PublicKey, format: PublicKeyFormat) -> CryptoResult<Self> {
        let exponent = key.exponent.to_str_radix(10);
        let modulus = key.modulus.to_str_radix(10);
        match format {
            PublicKeyFormat::Delimited => Ok(PublicKeyEncoding(format!(
                "{}{}{}",
                exponent, KEY_DELIMITER, modulus
            ))),
            PublicKeyFormat::Concatenated => {
                if exponent.len() != EXPONENT_WIDTH {
                    return Err(CryptoError::Encoding(format!(
                        "public exponent {} is not {} digits wide",
                        exponent, EXPONENT_WIDTH
                    )));
                }
                Ok(PublicKeyEncoding(format!("{}{}", exponent, modulus)))
            }
        }
    }

    pub fn format(&self) -> PublicKeyFormat {
        if self.0.contains(KEY_DELIMITER) {
            PublicKeyFormat::Delimited
        } else {
            PublicKeyFormat::Concatenated
        }
    }

    pub fn decode(&self) -> Result<PublicKey, MalformedLine> {
        let (exponent, modulus) = match self.0.split_once(KEY_DELIMITER) {
            Some(parts) => parts,
            None => {
                if self.0.len() <= EXPONENT_WIDTH || !self.0.is_char_boundary(EXPONENT_WIDTH) {
                    return Err(MalformedLine::invalid(
                        "public_key",
                        "shorter than the fixed exponent width",
                    ));
                }
                self.0.split_at(EXPONENT_WIDTH)
            }
        };
        let exponent = parse_decimal("public_key", exponent)?;
        if exponent != BigUint::from(PUBLIC_EXPONENT) {
            return Err(MalformedLine::invalid(
                "public_key",
                format!("public exponent must be {}", PUBLIC_EXPONENT),
            ));
        }
        Ok(PublicKey::new(exponent, parse_decimal("public_key", modulus)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl FromStr for PublicKeyEncoding {
    type Err = MalformedLine;

    /// Accepts the text only if it decodes to a key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let encoding = PublicKeyEncoding(s.to_string());
        encoding.decode()?;
        Ok(encoding)
    }
}

impl fmt::Display for PublicKeyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parses an unsigned decimal, rejecting signs, leading zeros and anything that
/// would not print back to the same text.
pub(crate) fn parse_decimal(field: &'static str, text: &str) -> Result<BigUint, MalformedLine> {
    if text.is_empty() {
        return Err(MalformedLine::invalid(field, "empty"));
    }
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MalformedLine::invalid(field, "not a decimal number"));
    }
    if text.len() > 1 && text.starts_with('0') {
        return Err(MalformedLine::invalid(field, "leading zero"));
    }
    BigUint::parse_bytes(text.as_bytes(), 10)
        .ok_or_else(|| MalformedLine::invalid(field, "not a decimal number"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(modulus: u64) -> PublicKey {
        PublicKey::new(BigUint::from(PUBLIC_EXPONENT), BigUint::from(modulus))
    }

    #[test]
    fn test_delimited_layout() {
        let encoding = PublicKeyEncoding::encode(&key(3233), PublicKeyFormat::Delimited).unwrap();
        assert_eq!(encoding.as_str(), "65537:3233");
        assert_eq!(encoding.format(), PublicKeyFormat::Delimited);
        assert_eq!(encoding.decode().unwrap(), key(3233));
    }

    #[test]
    fn test_concatenated_layout() {
        let encoding = PublicKeyEncoding::encode(&key(3233), PublicKeyFormat::Concatenated).unwrap();
        assert_eq!(encoding.as_str(), "655373233");
        assert_eq!(encoding.format(), PublicKeyFormat::Concatenated);
        assert_eq!(encoding.decode().unwrap(), key(3233));
    }

    #[test]
    fn test_concatenated_requires_fixed_exponent_width() {
        let odd = PublicKey::new(BigUint::from(3u32), BigUint::from(3233u32));
        let err = PublicKeyEncoding::encode(&odd, PublicKeyFormat::Concatenated).unwrap_err();
        assert!(matches!(err, CryptoError::Encoding(_)));
        // the delimited layout writes it, but no decoder will take it back
        let encoding = PublicKeyEncoding::encode(&odd, PublicKeyFormat::Delimited).unwrap();
        assert_eq!(encoding.as_str(), "3:3233");
        assert!(encoding.decode().is_err());
    }

    #[test]
    fn test_decode_rejects_foreign_exponent() {
        let err = "1:3233".parse::<PublicKeyEncoding>().unwrap_err();
        assert!(matches!(err, MalformedLine::InvalidField { field: "public_key", .. }));
        assert!("3:3233".parse::<PublicKeyEncoding>().is_err());
        assert!("65539:3233".parse::<PublicKeyEncoding>().is_err());

        // the five leading digits must spell 65537
        let err = "123453233".parse::<PublicKeyEncoding>().unwrap_err();
        assert!(matches!(err, MalformedLine::InvalidField { field: "public_key", .. }));
        assert!("655383233".parse::<PublicKeyEncoding>().is_err());
        assert!("655373233".parse::<PublicKeyEncoding>().is_ok());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!("".parse::<PublicKeyEncoding>().is_err());
        assert!("65537".parse::<PublicKeyEncoding>().is_err());
        assert!("65537:".parse::<PublicKeyEncoding>().is_err());
        assert!(":3233".parse::<PublicKeyEncoding>().is_err());
        assert!("65537:32x3".parse::<PublicKeyEncoding>().is_err());
        assert!("65537:0323".parse::<PublicKeyEncoding>().is_err());
        assert!("65537:3233:1".parse::<PublicKeyEncoding>().is_err());
        assert!("6553é3233".parse::<PublicKeyEncoding>().is_err());
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("delimited".parse::<PublicKeyFormat>().unwrap(), PublicKeyFormat::Delimited);
        assert_eq!(
            "concatenated".parse::<PublicKeyFormat>().unwrap(),
            PublicKeyFormat::Concatenated
        );
        assert!("base64".parse::<PublicKeyFormat>().is_err());
    }
}
