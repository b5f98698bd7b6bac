//! Self-describing hash records in bcrypt's modular crypt format. The record
//! carries everything later verification needs, so nothing besides the string
//! itself has to be stored.

use std::fmt;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use thiserror::Error;

/// Salt and digest lengths fixed by the bcrypt format: a 16 byte salt encodes
/// to 22 radix-64 characters, and 23 of the 24 digest bytes encode to 31.
pub const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 23;
const SALT_CHARS: usize = 22;
const DIGEST_CHARS: usize = 31;

/// bcrypt's radix-64 alphabet, unpadded. The final salt character carries
/// four trailing bits, which implementations do not always zero.
pub(crate) const BCRYPT_B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::BCRYPT,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record is not a modular crypt string")]
    NotModularCrypt,
    #[error("unknown bcrypt version tag: {0}")]
    UnknownVersion(String),
    #[error("unreadable cost field: {0}")]
    BadCost(String),
    #[error("payload must be 53 characters, got {0}")]
    PayloadLength(usize),
    #[error("salt decoding failed: {0}")]
    SaltDecodeFailed(String),
    #[error("digest decoding failed: {0}")]
    DigestDecodeFailed(String),
}

/// A validated `$<version>$<cost>$<salt><digest>` string. Only the hashing
/// operation constructs records, so holding one implies the text already
/// passed shape validation and the salt decoded to its fixed length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashRecord {
    encoded: String,
    cost: u32,
    salt: [u8; SALT_LEN],
    salt_start: usize,
}

impl HashRecord {
    /// Validates an encoded record and decodes its salt once up front.
    pub(crate) fn from_encoded(encoded: String) -> Result<Self, RecordError> {
        if !encoded.is_ascii() {
            return Err(RecordError::NotModularCrypt);
        }
        let body = encoded
            .strip_prefix('$')
            .ok_or(RecordError::NotModularCrypt)?;

        let mut fields = body.split('$');
        let (version, cost_text, payload) =
            match (fields.next(), fields.next(), fields.next(), fields.next()) {
                (Some(version), Some(cost), Some(payload), None) => (version, cost, payload),
                _ => return Err(RecordError::NotModularCrypt),
            };

        if !matches!(version, "2a" | "2b" | "2x" | "2y") {
            return Err(RecordError::UnknownVersion(version.to_string()));
        }
        let cost: u32 = cost_text
            .parse()
            .map_err(|_| RecordError::BadCost(cost_text.to_string()))?;
        if payload.len() != SALT_CHARS + DIGEST_CHARS {
            return Err(RecordError::PayloadLength(payload.len()));
        }

        let (salt_text, digest_text) = payload.split_at(SALT_CHARS);
        let salt_bytes = BCRYPT_B64
            .decode(salt_text)
            .map_err(|e| RecordError::SaltDecodeFailed(format!("{e}")))?;
        let salt: [u8; SALT_LEN] = salt_bytes
            .as_slice()
            .try_into()
            .map_err(|_| RecordError::SaltDecodeFailed("decoded salt is not 16 bytes".to_string()))?;
        let digest = BCRYPT_B64
            .decode(digest_text)
            .map_err(|e| RecordError::DigestDecodeFailed(format!("{e}")))?;
        if digest.len() != DIGEST_LEN {
            return Err(RecordError::DigestDecodeFailed(format!(
                "decoded digest is {} bytes",
                digest.len()
            )));
        }

        let salt_start = 1 + version.len() + 1 + cost_text.len() + 1;
        Ok(Self {
            encoded,
            cost,
            salt,
            salt_start,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// Algorithm version tag, e.g. `2b`.
    pub fn version(&self) -> &str {
        &self.encoded[1..3]
    }

    /// Work factor the digest was computed with.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// The 22-character salt exactly as it appears in the record.
    pub fn salt_text(&self) -> &str {
        &self.encoded[self.salt_start..self.salt_start + SALT_CHARS]
    }

    /// The 31-character digest tail of the record.
    pub fn digest(&self) -> &str {
        &self.encoded[self.salt_start + SALT_CHARS..]
    }

    /// The raw salt the record embeds.
    pub fn salt_bytes(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }
}

impl fmt::Display for HashRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}
