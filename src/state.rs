// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::auth::{
    AuthorityClient, BasicAuth, BearerAuth, BearerOrBasic, DelegatedAuth, InMemoryUserStore,
    KeyStore, KeyStoreError, PasswordVerifier, TokenVerifier, UserStore, UserStoreError,
};
use crate::config::{Config, KeySource};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Keys(#[from] KeyStoreError),
    #[error("no trusted signing keys configured")]
    NoKeys,
    #[error(transparent)]
    Users(#[from] UserStoreError),
    #[error("failed to prepare password hashing: {0}")]
    Password(argon2::password_hash::Error),
    #[error("failed to build authority client: {0}")]
    Authority(#[from] reqwest::Error),
    #[error("failed to read {0}: {1}")]
    Io(String, std::io::Error),
}

/// Strategies wired into routes. Everything here is read-only once built.
#[derive(Clone)]
pub struct AppState {
    pub bearer: Arc<BearerAuth>,
    pub basic: Arc<BasicAuth>,
    pub either: Arc<BearerOrBasic>,
    pub delegated: Option<Arc<DelegatedAuth>>,
}

impl AppState {
    pub fn new(
        tokens: TokenVerifier,
        users: Arc<dyn UserStore>,
        authority: Option<AuthorityClient>,
        bearer_check_user: bool,
    ) -> Result<Self, StartupError> {
        let mut bearer = BearerAuth::new(tokens);
        if bearer_check_user {
            bearer = bearer.with_user_check(users.clone());
        }
        let bearer = Arc::new(bearer);

        let passwords = PasswordVerifier::new(users).map_err(StartupError::Password)?;
        let basic = Arc::new(BasicAuth::new(passwords));
        let either = Arc::new(BearerOrBasic::new(bearer.clone(), basic.clone()));

        Ok(Self {
            bearer,
            basic,
            either,
            delegated: authority.map(|a| Arc::new(DelegatedAuth::new(a))),
        })
    }

    /// Build everything the configuration describes.
    pub async fn from_config(
        config: &Config,
        shutdown: CancellationToken,
    ) -> Result<Self, StartupError> {
        let keys = match &config.keys {
            KeySource::PemDir(dir) => KeyStore::from_pem_dir(dir)?,
            KeySource::JwksFile(path) => {
                let json = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| StartupError::Io(path.display().to_string(), e))?;
                KeyStore::from_jwks_json(&json)?
            }
        };
        if keys.is_empty() {
            return Err(StartupError::NoKeys);
        }
        tracing::info!(keys = keys.len(), issuers = ?config.issuers, "trusted signing keys loaded");

        let tokens = TokenVerifier::new(Arc::new(keys), config.issuers.clone())
            .with_leeway(config.leeway_seconds);

        let users = match &config.users_file {
            Some(path) => InMemoryUserStore::from_json_file(path).await?,
            None => InMemoryUserStore::new(),
        };
        tracing::info!(users = users.len().await, "user store ready");

        let authority = match &config.authority {
            Some(authority) => {
                tracing::info!(
                    url = %authority.url,
                    timeout_ms = authority.timeout.as_millis() as u64,
                    "delegated authentication enabled"
                );
                Some(AuthorityClient::new(&authority.url, authority.timeout)?.with_shutdown(shutdown))
            }
            None => None,
        };

        Self::new(tokens, Arc::new(users), authority, config.bearer_check_user)
    }
}
