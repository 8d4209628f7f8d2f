// signed_ledger/shared_auth/src/codec.rs

//! Wire format of an authenticated request:
//!
//! ```text
//! <identity>,<public key>,<operation>,<operand>;<signature>
//! ```
//!
//! Everything before `;` is the canonical message, the exact text that was
//! hashed and signed. Parsing only accepts canonical field text, so a parsed
//! request renders back to the identical line.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::encoding::PublicKeyEncoding;
use crate::error::MalformedLine;
use crate::identity::Identity;
use crate::rsa::KeyPair;
use crate::signer::{sign, Signature};

pub const FIELD_SEPARATOR: char = ',';
pub const SIGNATURE_SEPARATOR: char = ';';

/// Ledger operation named in a request. The core only signs it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Min,
    Get,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Min => "min",
            Operation::Get => "get",
        }
    }
}

impl FromStr for Operation {
    type Err = MalformedLine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Operation::Add),
            "min" => Ok(Operation::Min),
            "get" => Ok(Operation::Get),
            other => Err(MalformedLine::UnknownOperation(other.to_string())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The signed part of a request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalMessage {
    pub identity: Identity,
    pub public_key: PublicKeyEncoding,
    pub operation: Operation,
    pub operand: i64,
}

impl CanonicalMessage {
    pub fn new(
        identity: Identity,
        public_key: PublicKeyEncoding,
        operation: Operation,
        operand: i64,
    ) -> Self {
        CanonicalMessage {
            identity,
            public_key,
            operation,
            operand,
        }
    }

    /// The exact string that gets digested and signed.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CanonicalMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}{sep}{}",
            self.identity,
            self.public_key,
            self.operation,
            self.operand,
            sep = FIELD_SEPARATOR
        )
    }
}

impl FromStr for CanonicalMessage {
    type Err = MalformedLine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(FIELD_SEPARATOR).collect();
        if fields.len() != 4 {
            return Err(MalformedLine::FieldCount(fields.len()));
        }
        Ok(CanonicalMessage {
            identity: fields[0].parse()?,
            public_key: fields[1].parse()?,
            operation: fields[2].parse()?,
            operand: parse_operand(fields[3])?,
        })
    }
}

/// A request as carried on one wire line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedRequest {
    pub message: CanonicalMessage,
    pub signature: Signature,
}

impl SignedRequest {
    pub fn to_line(&self) -> String {
        format!("{}{}{}", self.message, SIGNATURE_SEPARATOR, self.signature)
    }
}

impl FromStr for SignedRequest {
    type Err = MalformedLine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_line(s)
    }
}

/// Splits a wire line into its fields. A trailing `\n` or `\r\n` is ignored.
pub fn parse_line(line: &str) -> Result<SignedRequest, MalformedLine> {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut parts = line.split(SIGNATURE_SEPARATOR);
    let (message, signature) = match (parts.next(), parts.next(), parts.next()) {
        (Some(message), Some(signature), None) => (message, signature),
        _ => return Err(MalformedLine::MissingSignature),
    };
    Ok(SignedRequest {
        message: message.parse()?,
        signature: signature.parse()?,
    })
}

/// Builds and signs a request line (without the trailing newline).
pub fn build_signed_line(
    identity: &Identity,
    public_key: &PublicKeyEncoding,
    operation: Operation,
    operand: i64,
    keys: &KeyPair,
) -> String {
    let message = CanonicalMessage::new(identity.clone(), public_key.clone(), operation, operand);
    let signature = sign(&message.render(), keys);
    SignedRequest { message, signature }.to_line()
}

fn parse_operand(text: &str) -> Result<i64, MalformedLine> {
    let value: i64 = text
        .parse()
        .map_err(|e: std::num::ParseIntError| MalformedLine::invalid("operand", e.to_string()))?;
    // rejects `+5`, `05`, `-0`: the text must be what `value` prints as
    if value.to_string() != text {
        return Err(MalformedLine::invalid("operand", "not in canonical decimal form"));
    }
    Ok(value)
}
