// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Service Auth - Request Authentication Gateway
//!
//! Authenticates inbound HTTP requests before any business handler runs and
//! hands handlers a verified [`auth::Identity`].
//!
//! ## Modules
//!
//! - `api` - HTTP routes, OpenAPI document and health probes (Axum)
//! - `auth` - Credential extraction, token/password/delegated verification
//! - `config` - Environment configuration
//! - `error` - API error responses
//! - `state` - Startup wiring of keys, users and authority

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;
