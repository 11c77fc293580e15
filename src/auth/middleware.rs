// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Every request on a wired route goes through
//! `Start → Extracted → Verifying → {Authenticated, Rejected}` exactly once:
//!
//! - header parse failure is an immediate rejection, no verifier runs;
//! - the route's strategy verifies the credential;
//! - on success the [`Identity`] goes into the request extensions and the
//!   next handler runs;
//! - on failure the chain stops with the generic 401. The failure kind is
//!   logged, never returned.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let bearer = Arc::new(BearerAuth::new(tokens));
//!
//! let protected = Router::new().route("/protected", get(protected_handler));
//! let app = auth::require(protected, bearer);
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::{from_fn_with_state, Next},
    response::{IntoResponse, Response},
    Router,
};
use tracing::Instrument;

use super::{AuthDecision, AuthError, Verify};

/// Run extraction and verification for one request.
pub async fn decide<V: Verify>(verifier: &V, headers: &HeaderMap) -> AuthDecision {
    let credential = match verifier.credential(headers.get(AUTHORIZATION)) {
        Ok(credential) => credential,
        Err(err) => return AuthDecision::Rejected(err),
    };

    tracing::debug!(scheme = %credential.scheme(), "credential extracted");

    verifier.verify(credential).await
}

/// Authentication middleware function.
pub async fn authenticate<V: Verify>(
    State(verifier): State<Arc<V>>,
    mut request: Request,
    next: Next,
) -> Response {
    let span = tracing::info_span!("authenticate", route = V::NAME);

    match decide(verifier.as_ref(), request.headers())
        .instrument(span.clone())
        .await
    {
        AuthDecision::Authenticated(identity) => {
            span.in_scope(|| tracing::debug!(subject = %identity.subject, "request authenticated"));
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        AuthDecision::Rejected(err) => {
            span.in_scope(|| log_rejection(err));
            err.into_response()
        }
    }
}

fn log_rejection(err: AuthError) {
    if err.is_dependency_failure() {
        tracing::warn!(kind = err.kind(), "authentication dependency failed");
    } else {
        tracing::info!(kind = err.kind(), "request rejected");
    }
}

/// Require authentication with `verifier` on every route of `router`.
///
/// Uses `route_layer`, so unmatched paths still return 404 instead of 401.
pub fn require<S, V>(router: Router<S>, verifier: Arc<V>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    V: Verify,
{
    router.route_layer(from_fn_with_state(verifier, authenticate::<V>))
}
