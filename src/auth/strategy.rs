// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verification strategies.
//!
//! Each route is wired with exactly one strategy at build time. The only
//! runtime choice is [`BearerOrBasic`], which follows the credential's scheme
//! tag.

use std::future::Future;
use std::sync::Arc;

use axum::http::HeaderValue;

use super::credential::{self, Credential};
use super::{AuthDecision, AuthError, AuthorityClient, Identity, PasswordVerifier, TokenVerifier, UserStore};

/// A way of turning a credential into an authentication decision.
pub trait Verify: Send + Sync + 'static {
    /// Route label used in logs.
    const NAME: &'static str;

    /// Parse the `Authorization` header into this strategy's credential.
    fn credential(&self, header: Option<&HeaderValue>) -> Result<Credential, AuthError> {
        credential::extract(header)
    }

    fn verify(&self, credential: Credential) -> impl Future<Output = AuthDecision> + Send;
}

/// Local bearer token verification.
pub struct BearerAuth {
    tokens: TokenVerifier,
    users: Option<Arc<dyn UserStore>>,
}

impl BearerAuth {
    pub fn new(tokens: TokenVerifier) -> Self {
        Self {
            tokens,
            users: None,
        }
    }

    /// Also require the token subject to be an enabled user.
    pub fn with_user_check(mut self, users: Arc<dyn UserStore>) -> Self {
        self.users = Some(users);
        self
    }

    pub fn tokens(&self) -> &TokenVerifier {
        &self.tokens
    }

    async fn identity(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = self.tokens.verify(token)?;

        if let Some(users) = &self.users {
            let user = users
                .lookup(&claims.sub)
                .await
                .map_err(|e| {
                    tracing::warn!(error = %e, "user store lookup failed");
                    AuthError::UserStoreUnavailable
                })?
                .ok_or(AuthError::UserNotFound)?;
            if !user.enabled {
                return Err(AuthError::UserDisabled);
            }
        }

        Ok(claims.into())
    }
}

impl Verify for BearerAuth {
    const NAME: &'static str = "bearer";

    async fn verify(&self, credential: Credential) -> AuthDecision {
        match credential {
            Credential::Bearer(token) => self.identity(&token).await.into(),
            _ => AuthDecision::Rejected(AuthError::MalformedCredential),
        }
    }
}

/// Identifier/secret verification against the user store.
pub struct BasicAuth {
    passwords: PasswordVerifier,
}

impl BasicAuth {
    pub fn new(passwords: PasswordVerifier) -> Self {
        Self { passwords }
    }
}

impl Verify for BasicAuth {
    const NAME: &'static str = "basic";

    async fn verify(&self, credential: Credential) -> AuthDecision {
        match credential {
            Credential::Basic(basic) => self.passwords.verify(&basic.id, &basic.secret).await.into(),
            _ => AuthDecision::Rejected(AuthError::MalformedCredential),
        }
    }
}

/// Verification delegated to a remote authority.
pub struct DelegatedAuth {
    authority: AuthorityClient,
}

impl DelegatedAuth {
    pub fn new(authority: AuthorityClient) -> Self {
        Self { authority }
    }

    pub fn authority(&self) -> &AuthorityClient {
        &self.authority
    }
}

impl Verify for DelegatedAuth {
    const NAME: &'static str = "delegated";

    fn credential(&self, header: Option<&HeaderValue>) -> Result<Credential, AuthError> {
        credential::extract_delegated(header)
    }

    async fn verify(&self, credential: Credential) -> AuthDecision {
        match credential {
            Credential::Delegated(raw) => self.authority.authenticate(&raw).await.into(),
            _ => AuthDecision::Rejected(AuthError::MalformedCredential),
        }
    }
}

/// Accepts either a bearer token or a basic pair.
pub struct BearerOrBasic {
    bearer: Arc<BearerAuth>,
    basic: Arc<BasicAuth>,
}

impl BearerOrBasic {
    pub fn new(bearer: Arc<BearerAuth>, basic: Arc<BasicAuth>) -> Self {
        Self { bearer, basic }
    }
}

impl Verify for BearerOrBasic {
    const NAME: &'static str = "bearer_or_basic";

    async fn verify(&self, credential: Credential) -> AuthDecision {
        match credential {
            Credential::Bearer(_) => self.bearer.verify(credential).await,
            Credential::Basic(_) => self.basic.verify(credential).await,
            Credential::Delegated(_) => AuthDecision::Rejected(AuthError::MalformedCredential),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testkeys::{self, sign, TRUSTED_ISSUER};
    use crate::auth::{hash_password, Claims, InMemoryUserStore, UserRecord};
    use chrono::Utc;
    use std::collections::BTreeSet;

    fn token_for(sub: &str) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: sub.to_string(),
            roles: ["ADMIN".to_string()].into_iter().collect(),
            iat: now,
            exp: now + 3600,
            iss: TRUSTED_ISSUER.to_string(),
            nbf: None,
        };
        sign(&claims, Some(testkeys::TRUSTED_KID))
    }

    fn tokens() -> TokenVerifier {
        TokenVerifier::new(
            Arc::new(testkeys::key_store()),
            vec![TRUSTED_ISSUER.to_string()],
        )
    }

    async fn users() -> Arc<InMemoryUserStore> {
        let store = InMemoryUserStore::new();
        store
            .insert(UserRecord {
                id: "alice".to_string(),
                password_hash: hash_password("pw").unwrap(),
                enabled: true,
                roles: BTreeSet::new(),
            })
            .await;
        store
            .insert(UserRecord {
                id: "carol".to_string(),
                password_hash: hash_password("pw").unwrap(),
                enabled: false,
                roles: BTreeSet::new(),
            })
            .await;
        Arc::new(store)
    }

    #[tokio::test]
    async fn bearer_rejects_basic_credential() {
        let bearer = BearerAuth::new(tokens());
        let decision = bearer
            .verify(Credential::Basic(credential::BasicCredential {
                id: "alice".to_string(),
                secret: "pw".to_string(),
            }))
            .await;
        assert_eq!(decision, AuthDecision::Rejected(AuthError::MalformedCredential));
    }

    #[tokio::test]
    async fn bearer_user_check() {
        let bearer = BearerAuth::new(tokens()).with_user_check(users().await);

        let decision = bearer.verify(Credential::Bearer(token_for("alice"))).await;
        assert!(matches!(decision, AuthDecision::Authenticated(ref id) if id.subject == "alice"));

        let decision = bearer.verify(Credential::Bearer(token_for("carol"))).await;
        assert_eq!(decision, AuthDecision::Rejected(AuthError::UserDisabled));

        let decision = bearer.verify(Credential::Bearer(token_for("ghost"))).await;
        assert_eq!(decision, AuthDecision::Rejected(AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn either_route_follows_scheme_tag() {
        let users = users().await;
        let either = BearerOrBasic::new(
            Arc::new(BearerAuth::new(tokens())),
            Arc::new(BasicAuth::new(PasswordVerifier::new(users).unwrap())),
        );

        let by_token = either.verify(Credential::Bearer(token_for("svc"))).await;
        assert!(matches!(by_token, AuthDecision::Authenticated(ref id) if id.subject == "svc"));

        let by_password = either
            .verify(Credential::Basic(credential::BasicCredential {
                id: "alice".to_string(),
                secret: "pw".to_string(),
            }))
            .await;
        assert!(matches!(by_password, AuthDecision::Authenticated(ref id) if id.subject == "alice"));
    }
}
