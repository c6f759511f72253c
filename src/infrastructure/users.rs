//! In-memory credential store.
//!
//! Process-lifetime only; nothing survives a restart. Registered as a
//! singleton so every request sees the same records.

use crate::infrastructure::entities::{User, UserRecord};
use crate::infrastructure::traits::{UserRepository, UserStoreError};
use async_trait::async_trait;
use chrono::Utc;
use di::inject;
use di::injectable;
use std::sync::Mutex;
use uuid::Uuid;

pub struct InMemoryUserStore {
    records: Mutex<Vec<UserRecord>>,
}

#[injectable(UserRepository)]
impl InMemoryUserStore {
    #[inject]
    pub fn create() -> InMemoryUserStore {
        InMemoryUserStore {
            records: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, UserStoreError> {
        // duplicate check and insert share one critical section
        let mut records = self.records.lock().expect("user store lock poisoned");
        if records.iter().any(|record| record.user.email == email) {
            return Err(UserStoreError::DuplicateEmail);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            email: email.to_owned(),
            created_at: Utc::now(),
        };
        records.push(UserRecord {
            user: user.clone(),
            password_hash: password_hash.to_owned(),
        });
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Option<UserRecord> {
        let records = self.records.lock().expect("user store lock poisoned");
        records
            .iter()
            .find(|record| record.user.email == email)
            .cloned()
    }

    async fn find_by_id(&self, id: Uuid) -> Option<User> {
        let records = self.records.lock().expect("user store lock poisoned");
        records
            .iter()
            .find(|record| record.user.id == id)
            .map(|record| record.user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_find() {
        let store = InMemoryUserStore::create();
        let user = store
            .create("Ada", "ada@example.com", "phc-hash")
            .await
            .unwrap();

        let record = store.find_by_email("ada@example.com").await.unwrap();
        assert_eq!(record.user.id, user.id);
        assert_eq!(record.password_hash, "phc-hash");

        let found = store.find_by_id(user.id).await.unwrap();
        assert_eq!(found.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let store = InMemoryUserStore::create();
        store
            .create("Ada", "ada@example.com", "hash-a")
            .await
            .unwrap();
        let err = store
            .create("Other Ada", "ada@example.com", "hash-b")
            .await
            .unwrap_err();
        assert_eq!(err, UserStoreError::DuplicateEmail);
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let store = InMemoryUserStore::create();
        store
            .create("Ada", "ada@example.com", "hash")
            .await
            .unwrap();
        assert!(store.find_by_email("Ada@Example.com").await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_lookups_return_none() {
        let store = InMemoryUserStore::create();
        assert!(store.find_by_email("nobody@example.com").await.is_none());
        assert!(store.find_by_id(Uuid::new_v4()).await.is_none());
    }
}
