// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Delegated authentication against a remote authority.
//!
//! ## Protocol
//!
//! `POST <authority>/v1/authenticate` with the caller's `Authorization`
//! header forwarded verbatim. A `200` carries the [`Identity`] as JSON.
//!
//! | Outcome | Kind |
//! |---------|------|
//! | transport error or timeout | `AuthorityUnreachable` |
//! | `4xx` other than `408`/`429` | `AuthorityRejected` |
//! | `408`, `429`, `5xx`, undecodable body or empty subject | `AuthorityError` |
//!
//! Calls are never retried here. Dropping the future (client disconnect)
//! aborts the in-flight call, and so does the shutdown token.

use std::time::Duration;

use axum::http::header::AUTHORIZATION;
use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::{AuthError, Identity};

/// Default authority call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for the remote authentication authority.
#[derive(Debug, Clone)]
pub struct AuthorityClient {
    endpoint: Url,
    health: Url,
    timeout: Duration,
    client: reqwest::Client,
    shutdown: CancellationToken,
}

impl AuthorityClient {
    /// Create a client for the authority at `base_url`.
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            endpoint: join(base_url, "v1/authenticate"),
            health: join(base_url, "health/live"),
            timeout,
            client,
            shutdown: CancellationToken::new(),
        })
    }

    /// Cancel in-flight calls when `shutdown` fires.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ask the authority to authenticate the raw `Authorization` value.
    pub async fn authenticate(&self, authorization: &str) -> Result<Identity, AuthError> {
        tokio::select! {
            result = self.call(authorization) => result,
            _ = self.shutdown.cancelled() => {
                tracing::debug!("authority call cancelled by shutdown");
                Err(AuthError::AuthorityUnreachable)
            }
        }
    }

    async fn call(&self, authorization: &str) -> Result<Identity, AuthError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, timeout = e.is_timeout(), "authority request failed");
                AuthError::AuthorityUnreachable
            })?;

        let status = response.status();
        if status.is_client_error() && !is_overload(status) {
            return Err(AuthError::AuthorityRejected);
        }
        if status != StatusCode::OK {
            tracing::warn!(status = %status, "authority returned an error");
            return Err(AuthError::AuthorityError);
        }

        let identity = response.json::<Identity>().await.map_err(|e| {
            if e.is_timeout() {
                tracing::warn!(error = %e, "authority response timed out");
                AuthError::AuthorityUnreachable
            } else {
                tracing::warn!(error = %e, "authority response is not a valid identity");
                AuthError::AuthorityError
            }
        })?;

        if identity.subject.trim().is_empty() {
            tracing::warn!("authority returned an identity without subject");
            return Err(AuthError::AuthorityError);
        }

        Ok(identity)
    }

    /// Liveness probe of the authority, used by readiness checks.
    pub async fn probe(&self) -> bool {
        match self.client.get(self.health.clone()).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

/// 4xx statuses that describe the authority's own condition, not the caller.
fn is_overload(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::TOO_MANY_REQUESTS
}

fn join(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    let prefix = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{prefix}/{path}"));
    url
}
