//! Credential storage: username -> verifier.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use super::verifier::Verifier;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("schema migration failed: {0}")]
    Migration(String),
    #[error("username contains a NUL character")]
    NulInUsername,
}

/// Async key-value store mapping usernames to password verifiers.
///
/// Operations are individually atomic. Nothing here serializes a read followed
/// by a write; callers that need that take a [`super::locks::KeyedLocks`] guard
/// or use [`CredentialStore::insert_new`].
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// All stored usernames, in no particular order.
    ///
    /// Reads the whole key set, so it is not used on request paths.
    async fn list(&self) -> Result<Vec<String>, StoreError>;

    async fn exists(&self, username: &str) -> Result<bool, StoreError>;

    /// `Ok(None)` when the username is unknown.
    async fn get(&self, username: &str) -> Result<Option<Verifier>, StoreError>;

    /// Insert or overwrite.
    async fn set(&self, username: &str, verifier: &Verifier) -> Result<(), StoreError>;

    /// Insert only if the username is free. Returns `false` when it was taken.
    async fn insert_new(&self, username: &str, verifier: &Verifier) -> Result<bool, StoreError>;

    /// Remove the entry; removing an absent username succeeds.
    async fn delete(&self, username: &str) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    /// Short backend name for logs and `/health`.
    fn backend(&self) -> &'static str;
}
