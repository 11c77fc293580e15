// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User store collaborator.
//!
//! Authentication only reads user records; it never creates or mutates them.
//! The in-memory store is seeded at startup from a JSON file.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// A user as owned by the user store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Login identifier and subject
    pub id: String,
    /// PHC-encoded Argon2 hash
    pub password_hash: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("user store backend failed: {0}")]
    Backend(String),
    #[error("failed to read users file: {0}")]
    Io(#[from] std::io::Error),
    #[error("users file is invalid: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Lookup of user records by identifier.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn lookup(&self, identifier: &str) -> Result<Option<UserRecord>, UserStoreError>;
}

/// In-memory user store.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = UserRecord>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().map(|u| (u.id.clone(), u)).collect()),
        }
    }

    /// Load a JSON array of user records.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, UserStoreError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let users: Vec<UserRecord> = serde_json::from_str(&raw)?;
        Ok(Self::with_users(users))
    }

    pub async fn insert(&self, user: UserRecord) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn lookup(&self, identifier: &str) -> Result<Option<UserRecord>, UserStoreError> {
        // Clone out so the lock is released before any hashing happens
        Ok(self.users.read().await.get(identifier).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserRecord {
        UserRecord {
            id: id.to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            enabled: true,
            roles: BTreeSet::new(),
        }
    }

    #[tokio::test]
    async fn lookup_finds_inserted_user() {
        let store = InMemoryUserStore::new();
        store.insert(user("alice")).await;

        assert_eq!(store.lookup("alice").await.unwrap(), Some(user("alice")));
        assert_eq!(store.lookup("bob").await.unwrap(), None);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn loads_users_file_with_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(
            &path,
            r#"[
                {"id": "alice", "password_hash": "h1", "roles": ["ADMIN"]},
                {"id": "carol", "password_hash": "h2", "enabled": false}
            ]"#,
        )
        .unwrap();

        let store = InMemoryUserStore::from_json_file(&path).await.unwrap();
        let alice = store.lookup("alice").await.unwrap().unwrap();
        assert!(alice.enabled);
        assert!(alice.roles.contains("ADMIN"));

        let carol = store.lookup("carol").await.unwrap().unwrap();
        assert!(!carol.enabled);
        assert!(carol.roles.is_empty());
    }

    #[tokio::test]
    async fn invalid_users_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            InMemoryUserStore::from_json_file(&path).await,
            Err(UserStoreError::Parse(_))
        ));
    }
}
