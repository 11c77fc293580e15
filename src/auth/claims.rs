// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims, the authenticated identity, and the decision every
//! verification strategy returns.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AuthError, UserRecord};

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Role or permission strings
    #[serde(default)]
    pub roles: BTreeSet<String>,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Not before timestamp (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
}

/// The authenticated caller.
///
/// This is the only thing downstream handlers learn about authentication.
/// It is also the wire format of the authority protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    /// Canonical subject identifier
    pub subject: String,

    /// Role or permission strings
    #[serde(default)]
    pub roles: BTreeSet<String>,

    /// Attributes asserted by a delegating authority (e.g. impersonation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,
}

impl Identity {
    pub fn new(subject: impl Into<String>, roles: BTreeSet<String>) -> Self {
        Self {
            subject: subject.into(),
            roles,
            attributes: None,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self::new(claims.sub, claims.roles)
    }
}

impl From<UserRecord> for Identity {
    fn from(user: UserRecord) -> Self {
        Self::new(user.id, user.roles)
    }
}

/// Outcome of one authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Authenticated(Identity),
    Rejected(AuthError),
}

impl From<Result<Identity, AuthError>> for AuthDecision {
    fn from(result: Result<Identity, AuthError>) -> Self {
        match result {
            Ok(identity) => AuthDecision::Authenticated(identity),
            Err(err) => AuthDecision::Rejected(err),
        }
    }
}
