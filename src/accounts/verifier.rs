//! Password verifiers.
//!
//! A verifier is an Argon2id hash in PHC string format. Salt and cost
//! parameters travel inside the string, so checking a password needs nothing
//! but the stored value.

use anyhow::{Result, anyhow};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use tracing::warn;

/// Stored, one-way representation of a password.
#[derive(Clone, PartialEq, Eq)]
pub struct Verifier(String);

impl Verifier {
    /// Wrap a PHC string loaded from a store.
    #[must_use]
    pub fn from_phc(phc: String) -> Self {
        Self(phc)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Verifier(***)")
    }
}

/// Derive a verifier from a plaintext password using a fresh random salt.
///
/// # Errors
/// Returns an error if Argon2 fails to hash the password.
pub fn derive(password: &SecretString) -> Result<Verifier> {
    let salt = SaltString::generate(&mut OsRng);

    let phc = Argon2::default()
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {e}"))?
        .to_string();

    Ok(Verifier(phc))
}

/// Check a plaintext password against a stored verifier.
///
/// The digest comparison inside `password-hash` is constant time. A verifier
/// that does not parse never matches.
#[must_use]
pub fn check(verifier: &Verifier, password: &SecretString) -> bool {
    let Ok(parsed) = PasswordHash::new(verifier.as_str()) else {
        warn!("Stored verifier is not a valid PHC string");
        return false;
    };

    Argon2::default()
        .verify_password(password.expose_secret().as_bytes(), &parsed)
        .is_ok()
}

/// Run [`derive`] on the blocking pool.
///
/// # Errors
/// Returns an error if hashing fails or the blocking task panics.
pub async fn derive_blocking(password: &SecretString) -> Result<Verifier> {
    let password = SecretString::from(password.expose_secret().to_owned());
    tokio::task::spawn_blocking(move || derive(&password))
        .await
        .map_err(|e| anyhow!("verifier task failed: {e}"))?
}

/// Run [`check`] on the blocking pool.
///
/// # Errors
/// Returns an error if the blocking task panics.
pub async fn check_blocking(verifier: Verifier, password: &SecretString) -> Result<bool> {
    let password = SecretString::from(password.expose_secret().to_owned());
    tokio::task::spawn_blocking(move || check(&verifier, &password))
        .await
        .map_err(|e| anyhow!("verifier task failed: {e}"))
}
