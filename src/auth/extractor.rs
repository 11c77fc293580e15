// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the authenticated identity.
//!
//! ```rust,ignore
//! async fn my_handler(Authenticated(identity): Authenticated) -> impl IntoResponse {
//!     // identity.subject, identity.roles
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::Identity;
use crate::error::ApiError;

/// Identity placed on the request by the authentication middleware.
///
/// Using this on a route that was not wired with [`super::require`] is a
/// programming error: it is logged and answered with a 500, never treated
/// as an anonymous caller.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Identity>() {
            Some(identity) => Ok(Authenticated(identity.clone())),
            None => {
                tracing::error!(
                    path = %parts.uri.path(),
                    "identity missing: authentication middleware not configured for this route"
                );
                Err(ApiError::internal())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use std::collections::BTreeSet;

    #[tokio::test]
    async fn reads_identity_from_extensions() {
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        parts
            .extensions
            .insert(Identity::new("user_from_middleware", BTreeSet::new()));

        let Authenticated(identity) = Authenticated::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(identity.subject, "user_from_middleware");
    }

    #[tokio::test]
    async fn fails_loudly_without_middleware() {
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let err = Authenticated::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
