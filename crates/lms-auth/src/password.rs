//! Salted scrypt password hashes.
//!
//! Stored form is `<hex hash>.<hex salt>`: a 64-byte scrypt key (N = 2^14,
//! r = 8, p = 1) over a 16-byte random salt. Hashing is CPU bound, so the
//! async wrappers run it on the blocking pool.

use crate::error::AuthError;

const LOG_N: u8 = 14;
const R: u32 = 8;
const P: u32 = 1;
const KEY_LEN: usize = 64;
const SALT_LEN: usize = 16;

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn from_hex(s: &str) -> Result<Vec<u8>, AuthError> {
    if !s.is_ascii() || s.len() % 2 != 0 {
        return Err(AuthError::MalformedHash);
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|_| AuthError::MalformedHash))
        .collect()
}

/// Fill `len` bytes from the OS random source.
pub(crate) fn random_bytes(len: usize) -> Result<Vec<u8>, AuthError> {
    let mut bytes = vec![0u8; len];
    getrandom::fill(&mut bytes).map_err(|e| AuthError::Random(e.to_string()))?;
    Ok(bytes)
}

fn derive(password: &str, salt: &[u8]) -> Result<Vec<u8>, AuthError> {
    let params = scrypt::Params::new(LOG_N, R, P, KEY_LEN)
        .map_err(|e| AuthError::Hashing(e.to_string()))?;
    let mut key = vec![0u8; KEY_LEN];
    scrypt::scrypt(password.as_bytes(), salt, &params, &mut key)
        .map_err(|e| AuthError::Hashing(e.to_string()))?;
    Ok(key)
}

/// Equality that always inspects every byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Hash a password with a fresh salt.
///
/// # Errors
///
/// Returns `AuthError` if the random source or scrypt fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = to_hex(&random_bytes(SALT_LEN)?);
    let key = derive(password, salt.as_bytes())?;
    Ok(format!("{}.{salt}", to_hex(&key)))
}

/// Check a password against a stored `<hash>.<salt>` string.
///
/// # Errors
///
/// Returns `AuthError::MalformedHash` if `stored` is not in the expected form.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, AuthError> {
    let (hash, salt) = stored.split_once('.').ok_or(AuthError::MalformedHash)?;
    let expected = from_hex(hash)?;
    if expected.len() != KEY_LEN || salt.is_empty() {
        return Err(AuthError::MalformedHash);
    }
    let actual = derive(password, salt.as_bytes())?;
    Ok(constant_time_eq(&expected, &actual))
}

/// A random password of `bytes` random bytes, hex encoded. Used for
/// temporary passwords and for OAuth accounts that never log in locally.
///
/// # Errors
///
/// Returns `AuthError::Random` if the OS random source fails.
pub fn random_password(bytes: usize) -> Result<String, AuthError> {
    Ok(to_hex(&random_bytes(bytes)?))
}

/// [`hash_password`] on the blocking pool.
///
/// # Errors
///
/// Returns `AuthError` if hashing fails or the task is cancelled.
pub async fn hash_password_async(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::Hashing(format!("spawn_blocking join: {e}")))?
}

/// [`verify_password`] on the blocking pool.
///
/// # Errors
///
/// Returns `AuthError` if `stored` is malformed or the task is cancelled.
pub async fn verify_password_async(password: String, stored: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| AuthError::Hashing(format!("spawn_blocking join: {e}")))?
}
