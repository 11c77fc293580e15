// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Decides, for every request on a protected route, who is calling.
//!
//! ## Auth Flow
//!
//! 1. The credential is read from `Authorization` (`Bearer <jwt>` or
//!    `Basic <base64(id:secret)>`)
//! 2. The strategy wired into the route verifies it:
//!    - [`BearerAuth`]: local signature, expiry and issuer checks
//!    - [`BasicAuth`]: user store lookup + Argon2 comparison
//!    - [`DelegatedAuth`]: remote authority call
//!    - [`BearerOrBasic`]: whichever the scheme tag names
//! 3. On success an [`Identity`] is placed in the request extensions and read
//!    by handlers through [`Authenticated`]
//!
//! ## Security
//!
//! - Every failure produces the same `401 {"error":"unauthenticated"}`
//! - Failure kinds are only logged
//! - Unknown users cost the same Argon2 work as known ones

pub mod claims;
pub mod credential;
pub mod delegated;
pub mod error;
pub mod extractor;
pub mod keys;
pub mod middleware;
pub mod password;
pub mod strategy;
pub mod token;
pub mod users;

#[cfg(test)]
pub(crate) mod testkeys;

pub use claims::{AuthDecision, Claims, Identity};
pub use credential::{BasicCredential, Credential, Scheme};
pub use delegated::AuthorityClient;
pub use error::AuthError;
pub use extractor::Authenticated;
pub use keys::{KeyStore, KeyStoreError, TrustedKey};
pub use middleware::{authenticate, decide, require};
pub use password::{hash_password, PasswordVerifier};
pub use strategy::{BasicAuth, BearerAuth, BearerOrBasic, DelegatedAuth, Verify};
pub use token::TokenVerifier;
pub use users::{InMemoryUserStore, UserRecord, UserStore, UserStoreError};
