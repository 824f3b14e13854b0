//! Signup, login and delete-account policies.
//!
//! Each flow runs its checks in a fixed order and the first failing check
//! decides the rejection. Rejections never touch the store or the session.
//! Store and hashing failures are returned as `Err` and are fatal to the
//! request.

use super::{
    error::{DeleteError, LoginError, SignupError},
    locks::KeyedLocks,
    store::CredentialStore,
    verifier,
};
use crate::session::SessionIdentity;
use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub const MIN_USERNAME_LEN: usize = 2;
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum SignupOutcome {
    Created,
    Rejected(SignupError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum LoginOutcome {
    LoggedIn,
    Rejected(LoginError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum DeleteOutcome {
    Deleted,
    Rejected(DeleteError),
}

/// Length as browsers count it: UTF-16 code units.
fn text_len(value: &str) -> usize {
    value.encode_utf16().count()
}

/// Account operations over a credential store.
pub struct Accounts {
    store: Arc<dyn CredentialStore>,
    locks: KeyedLocks,
}

impl Accounts {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
        }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Create an account and authenticate the session as it.
    ///
    /// # Errors
    /// Returns an error if the store or the password hasher fails.
    #[instrument(skip(self, password1, password2, identity))]
    pub async fn signup(
        &self,
        username: &str,
        password1: &SecretString,
        password2: &SecretString,
        identity: &mut SessionIdentity,
    ) -> Result<SignupOutcome> {
        let _guard = self.locks.lock(username).await;

        if self.store.exists(username).await? {
            debug!("Username already taken");
            return Ok(SignupOutcome::Rejected(SignupError::UsernameTaken));
        }

        if text_len(username) < MIN_USERNAME_LEN {
            return Ok(SignupOutcome::Rejected(SignupError::UsernameTooShort));
        }

        // Not storable in a PostgreSQL TEXT column.
        if username.contains('\0') {
            return Ok(SignupOutcome::Rejected(SignupError::UsernameInvalid));
        }

        if text_len(password1.expose_secret()) < MIN_PASSWORD_LEN {
            return Ok(SignupOutcome::Rejected(SignupError::PasswordTooShort));
        }

        if password1.expose_secret() != password2.expose_secret() {
            return Ok(SignupOutcome::Rejected(SignupError::PasswordMismatch));
        }

        let verifier = verifier::derive_blocking(password1).await?;

        // Another process sharing the store may have won the name meanwhile.
        if !self.store.insert_new(username, &verifier).await? {
            debug!("Username taken by a concurrent signup");
            return Ok(SignupOutcome::Rejected(SignupError::UsernameTaken));
        }

        identity.set_user(username);
        info!("Account created");

        Ok(SignupOutcome::Created)
    }

    /// Authenticate the session if the password matches.
    ///
    /// # Errors
    /// Returns an error if the store fails.
    #[instrument(skip(self, password, identity))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
        identity: &mut SessionIdentity,
    ) -> Result<LoginOutcome> {
        let _guard = self.locks.lock(username).await;

        let Some(stored) = self.store.get(username).await? else {
            debug!("Unknown username");
            return Ok(LoginOutcome::Rejected(LoginError::UnknownUser));
        };

        if !verifier::check_blocking(stored, password).await? {
            debug!("Password mismatch");
            return Ok(LoginOutcome::Rejected(LoginError::WrongPassword));
        }

        identity.set_user(username);
        info!("Logged in");

        Ok(LoginOutcome::LoggedIn)
    }

    /// Delete the named account and clear the session.
    ///
    /// The name comes from the caller and need not match the session user.
    ///
    /// # Errors
    /// Returns an error if the store fails.
    #[instrument(skip(self, identity))]
    pub async fn delete(
        &self,
        username: &str,
        identity: &mut SessionIdentity,
    ) -> Result<DeleteOutcome> {
        let _guard = self.locks.lock(username).await;

        if !self.store.exists(username).await? {
            debug!("Unknown username");
            return Ok(DeleteOutcome::Rejected(DeleteError::UnknownUser));
        }

        self.store.delete(username).await?;
        identity.clear();
        info!("Account deleted");

        Ok(DeleteOutcome::Deleted)
    }

    /// Whether the account still exists; used to drop stale sessions.
    ///
    /// # Errors
    /// Returns an error if the store fails.
    pub async fn user_exists(&self, username: &str) -> Result<bool> {
        Ok(self.store.exists(username).await?)
    }
}
