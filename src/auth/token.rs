// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token verification.
//!
//! Pure computation over configured key material: no network or disk I/O.
//! Signature checks are done by `jsonwebtoken`, whose backends compare MACs
//! in constant time, and always run before any claim is looked at.

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Validation};

use super::{AuthError, Claims, KeyStore, TrustedKey};

/// Verifies compact signed tokens against trusted keys and issuers.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    keys: Arc<KeyStore>,
    issuers: Vec<String>,
    leeway: u64,
}

impl TokenVerifier {
    pub fn new(keys: Arc<KeyStore>, issuers: Vec<String>) -> Self {
        Self {
            keys,
            issuers,
            leeway: 0,
        }
    }

    /// Clock skew tolerance applied to `exp` and `nbf`.
    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.leeway = seconds;
        self
    }

    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }

    /// Verify the token and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::MalformedCredential)?;

        if let Some(kid) = &header.kid {
            let Some(key) = self.keys.get(kid) else {
                tracing::debug!(kid = %kid, "token signed with unknown kid");
                return Err(AuthError::SignatureInvalid);
            };
            if key.algorithm != header.alg {
                return Err(AuthError::SignatureInvalid);
            }
            return self.decode_with(token, key);
        }

        // No kid: any trusted key of the header's algorithm may have signed it
        let mut result = Err(AuthError::SignatureInvalid);
        for key in self.keys.for_algorithm(header.alg) {
            result = self.decode_with(token, key);
            if result != Err(AuthError::SignatureInvalid) {
                break;
            }
        }
        result
    }

    fn decode_with(&self, token: &str, key: &TrustedKey) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(key.algorithm);
        validation.set_issuer(self.issuers.as_slice());
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.validate_aud = false;
        validation.validate_nbf = true;
        validation.leeway = self.leeway;

        let data = decode::<Claims>(token, &key.key, &validation).map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                AuthError::SignatureInvalid
            }
            ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => AuthError::Expired,
            ErrorKind::InvalidIssuer => AuthError::IssuerUntrusted,
            _ => AuthError::MalformedCredential,
        })?;

        if data.claims.sub.trim().is_empty() {
            return Err(AuthError::MalformedCredential);
        }

        Ok(data.claims)
    }
}
