use super::{CredentialStore, StoreError};
use crate::accounts::verifier::Verifier;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Verifier>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }

    async fn exists(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self.entries.read().await.contains_key(username))
    }

    async fn get(&self, username: &str) -> Result<Option<Verifier>, StoreError> {
        Ok(self.entries.read().await.get(username).cloned())
    }

    async fn set(&self, username: &str, verifier: &Verifier) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(username.to_string(), verifier.clone());
        Ok(())
    }

    async fn insert_new(&self, username: &str, verifier: &Verifier) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(username) {
            return Ok(false);
        }
        entries.insert(username.to_string(), verifier.clone());
        Ok(true)
    }

    async fn delete(&self, username: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(username);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn verifier(tag: &str) -> Verifier {
        Verifier::from_phc(format!("$argon2id$v=19$m=19456,t=2,p=1${tag}"))
    }

    #[tokio::test]
    async fn get_missing_is_none() {
        let store = MemoryStore::new();
        assert!(store.get("nobody").await.unwrap().is_none());
        assert!(!store.exists("nobody").await.unwrap());
    }

    #[tokio::test]
    async fn set_overwrites() {
        let store = MemoryStore::new();
        store.set("ab", &verifier("one")).await.unwrap();
        store.set("ab", &verifier("two")).await.unwrap();
        assert_eq!(store.get("ab").await.unwrap(), Some(verifier("two")));
        assert_eq!(store.list().await.unwrap(), vec!["ab".to_string()]);
    }

    #[tokio::test]
    async fn insert_new_keeps_first_writer() {
        let store = MemoryStore::new();
        assert!(store.insert_new("ab", &verifier("one")).await.unwrap());
        assert!(!store.insert_new("ab", &verifier("two")).await.unwrap());
        assert_eq!(store.get("ab").await.unwrap(), Some(verifier("one")));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        store.set("ab", &verifier("one")).await.unwrap();
        store.delete("ab").await.unwrap();
        store.delete("ab").await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn keys_are_case_and_whitespace_sensitive() {
        let store = MemoryStore::new();
        store.set("ab", &verifier("one")).await.unwrap();
        assert!(!store.exists("AB").await.unwrap());
        assert!(!store.exists(" ab").await.unwrap());
    }
}
