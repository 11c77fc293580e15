// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! Every variant is an internal kind: it is logged with its code, but the
//! client only ever sees the same generic `401 Unauthenticated` response.

use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::error::ApiError;

/// Authentication failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No `Authorization` header on the request
    #[error("authorization header is missing")]
    MissingCredential,
    /// Unknown scheme, empty payload or undecodable credential
    #[error("authorization header is malformed")]
    MalformedCredential,
    /// Signature does not verify against any trusted key
    #[error("token signature is invalid")]
    SignatureInvalid,
    /// Token expiry is in the past
    #[error("token has expired")]
    Expired,
    /// Token issuer is not trusted
    #[error("token issuer is not trusted")]
    IssuerUntrusted,
    /// No user with the supplied identifier
    #[error("user not found")]
    UserNotFound,
    /// User exists but is disabled
    #[error("user is disabled")]
    UserDisabled,
    /// Secret does not match the stored hash
    #[error("credential mismatch")]
    CredentialMismatch,
    /// User store backend failed
    #[error("user store unavailable")]
    UserStoreUnavailable,
    /// Authority could not be reached or timed out
    #[error("authentication authority unreachable")]
    AuthorityUnreachable,
    /// Authority validated the credential and refused it
    #[error("authentication authority rejected the credential")]
    AuthorityRejected,
    /// Authority failed internally
    #[error("authentication authority failed")]
    AuthorityError,
}

impl AuthError {
    /// Stable code used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::MalformedCredential => "malformed_credential",
            AuthError::SignatureInvalid => "signature_invalid",
            AuthError::Expired => "expired",
            AuthError::IssuerUntrusted => "issuer_untrusted",
            AuthError::UserNotFound => "user_not_found",
            AuthError::UserDisabled => "user_disabled",
            AuthError::CredentialMismatch => "credential_mismatch",
            AuthError::UserStoreUnavailable => "user_store_unavailable",
            AuthError::AuthorityUnreachable => "authority_unreachable",
            AuthError::AuthorityRejected => "authority_rejected",
            AuthError::AuthorityError => "authority_error",
        }
    }

    /// True when the failure points at a dependency outage rather than a bad
    /// caller.
    pub fn is_dependency_failure(&self) -> bool {
        matches!(
            self,
            AuthError::AuthorityUnreachable
                | AuthError::AuthorityError
                | AuthError::UserStoreUnavailable
        )
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::unauthenticated().into_response()
    }
}
