//! Argon2id password hashing at a fixed work factor.
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::PasswordHash;
use argon2::PasswordHasher;
use argon2::PasswordVerifier;
use argon2::Version;
use argon2::password_hash::SaltString;

/// The stored digest could not be parsed. Callers treat this exactly like a
/// wrong password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashFormatError;

impl std::fmt::Display for HashFormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unrecognized password hash format")
    }
}

impl std::error::Error for HashFormatError {}

fn argon() -> Argon2<'static> {
    let params = Params::new(
        Params::DEFAULT_M_COST,
        hh_core::HASH_WORK_FACTOR,
        Params::DEFAULT_P_COST,
        None,
    )
    .unwrap_or_default();
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

fn salt() -> Result<SaltString, argon2::password_hash::Error> {
    use rand::Rng;
    let ref mut bytes = [0u8; 16];
    rand::rng().fill(bytes);
    SaltString::encode_b64(bytes)
}

pub fn hash(password: &str) -> Result<String, argon2::password_hash::Error> {
    argon()
        .hash_password(password.as_bytes(), &salt()?)
        .map(|h| h.to_string())
}

/// Constant-time check of `password` against a stored PHC digest.
pub fn verify(password: &str, hashword: &str) -> Result<bool, HashFormatError> {
    PasswordHash::new(hashword)
        .map_err(|_| HashFormatError)
        .map(|ref hash| argon().verify_password(password.as_bytes(), hash).is_ok())
}
