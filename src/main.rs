//! Reads one plaintext credential line from standard input, hashes it with a
//! fresh salt at the default work factor, and prints the resulting record.
//! Running with no arguments keeps the plaintext out of shell history and
//! process listings.

use std::io;

use thiserror::Error;
use zeroize::Zeroize;

use hashpass::crypto::passwords::{hash_credential, PasswordHashError, DEFAULT_COST};

#[derive(Debug, Error)]
enum AppError {
    #[error("could not read credential from stdin: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Hash(#[from] PasswordHashError),
}

fn main() -> Result<(), AppError> {
    let mut credential = String::new();
    io::stdin().read_line(&mut credential)?;
    while credential.ends_with('\n') || credential.ends_with('\r') {
        credential.pop();
    }

    // Wipe the plaintext before surfacing any hashing error.
    let outcome = hash_credential(credential.as_bytes(), DEFAULT_COST);
    credential.zeroize();

    println!("{}", outcome?);
    Ok(())
}
