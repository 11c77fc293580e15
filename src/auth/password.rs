// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password verification against the user store.
//!
//! Hashes are Argon2 PHC strings. Verification is CPU- and memory-hard, so it
//! runs on the blocking pool. A missing user is checked against a dummy hash
//! so the response time does not reveal which identifiers exist.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier as _, SaltString};
use argon2::Argon2;

use super::{AuthError, Identity, UserRecord, UserStore};

/// Hash `secret` into a PHC string with a random salt.
pub fn hash_password(secret: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(secret.as_bytes(), &salt)?
        .to_string())
}

fn secret_matches(secret: &str, phc: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => {
            tracing::error!("stored password hash is not a valid PHC string");
            false
        }
    }
}

/// Checks identifier/secret pairs.
pub struct PasswordVerifier {
    users: Arc<dyn UserStore>,
    dummy_hash: Arc<str>,
}

impl PasswordVerifier {
    pub fn new(users: Arc<dyn UserStore>) -> Result<Self, argon2::password_hash::Error> {
        let dummy_hash = hash_password("dummy password for missing users")?;
        Ok(Self {
            users,
            dummy_hash: dummy_hash.into(),
        })
    }

    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.users
    }

    /// Verify the pair and return the user's identity.
    pub async fn verify(&self, identifier: &str, secret: &str) -> Result<Identity, AuthError> {
        let user = self.users.lookup(identifier).await.map_err(|e| {
            tracing::warn!(error = %e, "user store lookup failed");
            AuthError::UserStoreUnavailable
        })?;

        let (hash, user) = match user {
            Some(user) => (Arc::<str>::from(user.password_hash.as_str()), Some(user)),
            None => (self.dummy_hash.clone(), None),
        };

        let secret = secret.to_string();
        let matches = tokio::task::spawn_blocking(move || secret_matches(&secret, &hash))
            .await
            .unwrap_or(false);

        check(user, matches)
    }
}

fn check(user: Option<UserRecord>, matches: bool) -> Result<Identity, AuthError> {
    let user = user.ok_or(AuthError::UserNotFound)?;
    if !user.enabled {
        return Err(AuthError::UserDisabled);
    }
    if !matches {
        return Err(AuthError::CredentialMismatch);
    }
    Ok(user.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::InMemoryUserStore;
    use std::collections::BTreeSet;

    async fn verifier() -> PasswordVerifier {
        let store = InMemoryUserStore::new();
        store
            .insert(UserRecord {
                id: "alice".to_string(),
                password_hash: hash_password("correct horse").unwrap(),
                enabled: true,
                roles: ["USER".to_string()].into_iter().collect(),
            })
            .await;
        store
            .insert(UserRecord {
                id: "carol".to_string(),
                password_hash: hash_password("carol pw").unwrap(),
                enabled: false,
                roles: BTreeSet::new(),
            })
            .await;
        PasswordVerifier::new(Arc::new(store)).unwrap()
    }

    #[tokio::test]
    async fn correct_password_yields_identity() {
        let identity = verifier().await.verify("alice", "correct horse").await.unwrap();
        assert_eq!(identity.subject, "alice");
        assert!(identity.has_role("USER"));
    }

    #[tokio::test]
    async fn failure_kinds() {
        let v = verifier().await;
        assert_eq!(
            v.verify("alice", "wrong").await,
            Err(AuthError::CredentialMismatch)
        );
        assert_eq!(v.verify("bob", "anything").await, Err(AuthError::UserNotFound));
        assert_eq!(v.verify("carol", "carol pw").await, Err(AuthError::UserDisabled));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
        assert!(secret_matches("same", &a));
        assert!(secret_matches("same", &b));
        assert!(!secret_matches("other", &a));
    }

    #[test]
    fn invalid_stored_hash_never_matches() {
        assert!(!secret_matches("x", "plaintext"));
    }
}
