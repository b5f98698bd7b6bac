//! Credential hashing built around bcrypt. The configuration is centralized
//! so that every provisioned credential uses the same work factor and salt
//! parameters.

use bcrypt::Version;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

use crate::crypto::record::{HashRecord, RecordError, SALT_LEN};

/// Work factor applied when provisioning has no deployment-specific tuning.
/// 2^12 expansion rounds lands around a quarter second on current server
/// hardware, slow enough to blunt offline guessing while remaining usable
/// at an interactive prompt.
pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

/// Cost bounds accepted by the bcrypt key schedule.
pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

/// bcrypt reads at most this many credential bytes; the primitive would
/// silently truncate longer input, so it is rejected up front instead.
pub const MAX_CREDENTIAL_BYTES: usize = 72;

#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("credential must not be empty")]
    EmptyCredential,
    #[error("credential is {0} bytes; bcrypt reads at most {max}", max = MAX_CREDENTIAL_BYTES)]
    CredentialTooLong(usize),
    #[error("cost factor {0} is outside the supported range {min}..={max}", min = MIN_COST, max = MAX_COST)]
    CostOutOfRange(u32),
    #[error("hash record malformed: {0}")]
    Record(#[from] RecordError),
    #[error("bcrypt failure: {0}")]
    Primitive(#[from] bcrypt::BcryptError),
}

/// Hashes a credential with a fresh random salt and returns the encoded
/// record. The record embeds the salt and cost, so it can be verified later
/// with no side channel beyond the string itself.
pub fn hash_credential(credential: &[u8], cost: u32) -> Result<HashRecord, PasswordHashError> {
    validate(credential, cost)?;
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    hash_with_salt(credential, cost, salt)
}

fn hash_with_salt(
    credential: &[u8],
    cost: u32,
    salt: [u8; SALT_LEN],
) -> Result<HashRecord, PasswordHashError> {
    let parts = bcrypt::hash_with_salt(credential, cost, salt)?;
    Ok(HashRecord::from_encoded(
        parts.format_for_version(Version::TwoB),
    )?)
}

fn validate(credential: &[u8], cost: u32) -> Result<(), PasswordHashError> {
    if credential.is_empty() {
        return Err(PasswordHashError::EmptyCredential);
    }
    if credential.len() > MAX_CREDENTIAL_BYTES {
        return Err(PasswordHashError::CredentialTooLong(credential.len()));
    }
    if !(MIN_COST..=MAX_COST).contains(&cost) {
        return Err(PasswordHashError::CostOutOfRange(cost));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        hash_credential, hash_with_salt, PasswordHashError, MAX_CREDENTIAL_BYTES, MAX_COST,
        MIN_COST,
    };
    use crate::crypto::record::SALT_LEN;

    // The minimum cost keeps the suite fast; the work factor only scales the
    // key schedule, not the record shape or the verification contract.
    const TEST_COST: u32 = MIN_COST;

    #[test]
    fn hashes_and_verifies_credentials() {
        let record = hash_credential(b"correct horse battery", TEST_COST)
            .expect("hashing should succeed");
        assert!(bcrypt::verify(b"correct horse battery", record.as_str())
            .expect("record should be readable"));
        assert!(!bcrypt::verify(b"wrong horse", record.as_str())
            .expect("record should be readable"));
    }

    #[test]
    fn fresh_salts_make_records_differ() {
        let first = hash_credential(b"same credential", TEST_COST).expect("hashing should succeed");
        let second =
            hash_credential(b"same credential", TEST_COST).expect("hashing should succeed");
        assert_ne!(first, second);
        assert_ne!(first.salt_text(), second.salt_text());
        assert!(bcrypt::verify(b"same credential", first.as_str()).expect("readable record"));
        assert!(bcrypt::verify(b"same credential", second.as_str()).expect("readable record"));
    }

    #[test]
    fn records_carry_their_parameters() {
        let record = hash_credential(b"Rodrigo123!", 12).expect("hashing should succeed");
        assert_eq!(record.as_str().len(), 60);
        assert!(record.as_str().starts_with("$2b$12$"));
        assert_eq!(record.version(), "2b");
        assert_eq!(record.cost(), 12);
        assert_eq!(record.salt_text().len(), 22);
        assert_eq!(record.digest().len(), 31);
    }

    #[test]
    fn fixed_salt_reproduces_the_record() {
        let salt = [7u8; SALT_LEN];
        let first = hash_with_salt(b"stable input", TEST_COST, salt).expect("hashing should succeed");
        let second =
            hash_with_salt(b"stable input", TEST_COST, salt).expect("hashing should succeed");
        assert_eq!(first, second);
        assert_eq!(first.salt_bytes(), &salt);
    }

    #[test]
    fn rejects_out_of_range_costs() {
        for cost in [0, MIN_COST - 1, MAX_COST + 1, 64] {
            let err = hash_credential(b"credential", cost).unwrap_err();
            assert!(matches!(err, PasswordHashError::CostOutOfRange(c) if c == cost));
        }
    }

    #[test]
    fn rejects_empty_credentials() {
        let err = hash_credential(b"", TEST_COST).unwrap_err();
        assert!(matches!(err, PasswordHashError::EmptyCredential));
    }

    #[test]
    fn enforces_the_byte_length_limit() {
        let exact = vec![b'a'; MAX_CREDENTIAL_BYTES];
        assert!(hash_credential(&exact, TEST_COST).is_ok());

        let over = vec![b'a'; MAX_CREDENTIAL_BYTES + 1];
        let err = hash_credential(&over, TEST_COST).unwrap_err();
        assert!(matches!(err, PasswordHashError::CredentialTooLong(len) if len == 73));
    }
}
