// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::Json;

use crate::auth::{Authenticated, Identity};

/// Get the current authenticated user's information.
///
/// Mounted once per strategy; the handler is identical behind each.
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    security(("bearer" = []), ("basic" = [])),
    responses(
        (status = 200, description = "Caller identity", body = Identity),
        (status = 401, description = "Missing or invalid credential"),
    )
)]
pub async fn get_current_user(Authenticated(identity): Authenticated) -> Json<Identity> {
    Json(identity)
}

/// Authenticate the forwarded `Authorization` header.
///
/// This is the delegated-authentication protocol: another instance configured
/// with this server as its authority posts the caller's header here and
/// receives the identity back.
#[utoipa::path(
    post,
    path = "/v1/authenticate",
    tag = "Users",
    security(("bearer" = []), ("basic" = [])),
    responses(
        (status = 200, description = "Credential accepted", body = Identity),
        (status = 401, description = "Credential rejected"),
    )
)]
pub async fn authenticate(Authenticated(identity): Authenticated) -> Json<Identity> {
    tracing::debug!(subject = %identity.subject, "credential verified for remote caller");
    Json(identity)
}
