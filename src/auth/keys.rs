// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Trusted signing keys.
//!
//! Keys are configuration: loaded once at startup from a directory of
//! public-key PEM files (the file stem is the `kid`) or from a JWKS document,
//! then shared read-only. No rotation protocol is assumed; restart or rebuild
//! the store to change keys.

use std::collections::HashMap;
use std::path::Path;

use base64ct::{Base64, Encoding};
use jsonwebtoken::jwk::{AlgorithmParameters, EllipticCurve, Jwk, JwkSet, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyStoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported or invalid key {kid}")]
    InvalidKey { kid: String },
    #[error("JWKS document is invalid: {0}")]
    InvalidJwks(#[from] serde_json::Error),
    #[error("JWKS key without kid")]
    MissingKid,
}

/// One trusted verification key.
#[derive(Clone)]
pub struct TrustedKey {
    pub algorithm: Algorithm,
    pub key: DecodingKey,
}

/// Trusted keys by `kid`.
///
/// `Debug` prints kids only.
#[derive(Clone, Default)]
pub struct KeyStore {
    keys: HashMap<String, TrustedKey>,
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kids: Vec<_> = self.keys.keys().collect();
        kids.sort();
        f.debug_struct("KeyStore").field("kids", &kids).finish()
    }
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kid: impl Into<String>, algorithm: Algorithm, key: DecodingKey) {
        self.keys.insert(kid.into(), TrustedKey { algorithm, key });
    }

    /// Add a PEM public key, detecting RSA, EC or Ed25519.
    ///
    /// RSA keys are trusted for RS256 only; publish them through a JWKS
    /// document with an `alg` member to use RS384, RS512 or PSS. EC keys
    /// follow their named curve (P-256 or P-384).
    pub fn insert_pem(&mut self, kid: impl Into<String>, pem: &[u8]) -> Result<(), KeyStoreError> {
        let kid = kid.into();
        let (key, algorithm) = if let Ok(key) = DecodingKey::from_rsa_pem(pem) {
            (key, Algorithm::RS256)
        } else if let Ok(key) = DecodingKey::from_ec_pem(pem) {
            let Some(algorithm) = ec_pem_algorithm(pem) else {
                return Err(KeyStoreError::InvalidKey { kid });
            };
            (key, algorithm)
        } else if let Ok(key) = DecodingKey::from_ed_pem(pem) {
            (key, Algorithm::EdDSA)
        } else {
            return Err(KeyStoreError::InvalidKey { kid });
        };
        self.insert(kid, algorithm, key);
        Ok(())
    }

    /// Load every `*.pem` file in `dir`.
    pub fn from_pem_dir(dir: impl AsRef<Path>) -> Result<Self, KeyStoreError> {
        let dir = dir.as_ref();
        let io_err = |source| KeyStoreError::Io {
            path: dir.display().to_string(),
            source,
        };

        let mut store = Self::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("pem") {
                continue;
            }
            let Some(kid) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let pem = std::fs::read(&path).map_err(|source| KeyStoreError::Io {
                path: path.display().to_string(),
                source,
            })?;
            store.insert_pem(kid, &pem)?;
        }
        Ok(store)
    }

    /// Load keys from a JWKS JSON document. Every key must carry a `kid`.
    pub fn from_jwks_json(json: &str) -> Result<Self, KeyStoreError> {
        let jwks: JwkSet = serde_json::from_str(json)?;
        let mut store = Self::new();
        for jwk in &jwks.keys {
            let kid = jwk.common.key_id.clone().ok_or(KeyStoreError::MissingKid)?;
            let (key, algorithm) =
                jwk_to_decoding_key(jwk).ok_or_else(|| KeyStoreError::InvalidKey { kid: kid.clone() })?;
            store.insert(kid, algorithm, key);
        }
        Ok(store)
    }

    pub fn get(&self, kid: &str) -> Option<&TrustedKey> {
        self.keys.get(kid)
    }

    /// Keys usable with `algorithm`, for tokens that carry no `kid`.
    pub fn for_algorithm(&self, algorithm: Algorithm) -> impl Iterator<Item = &TrustedKey> {
        self.keys.values().filter(move |k| k.algorithm == algorithm)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Convert a JWK to a DecodingKey.
fn jwk_to_decoding_key(jwk: &Jwk) -> Option<(DecodingKey, Algorithm)> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => {
            let key = DecodingKey::from_rsa_components(&rsa.n, &rsa.e).ok()?;
            let alg = match &jwk.common.key_algorithm {
                Some(KeyAlgorithm::RS384) => Algorithm::RS384,
                Some(KeyAlgorithm::RS512) => Algorithm::RS512,
                Some(KeyAlgorithm::PS256) => Algorithm::PS256,
                Some(KeyAlgorithm::PS384) => Algorithm::PS384,
                Some(KeyAlgorithm::PS512) => Algorithm::PS512,
                _ => Algorithm::RS256,
            };
            Some((key, alg))
        }
        AlgorithmParameters::EllipticCurve(ec) => {
            let key = DecodingKey::from_ec_components(&ec.x, &ec.y).ok()?;
            // The curve fixes the algorithm; `alg` is advisory
            let alg = match ec.curve {
                EllipticCurve::P256 => Algorithm::ES256,
                EllipticCurve::P384 => Algorithm::ES384,
                _ => return None,
            };
            Some((key, alg))
        }
        AlgorithmParameters::OctetKeyPair(okp) => {
            let key = DecodingKey::from_ed_components(&okp.x).ok()?;
            Some((key, Algorithm::EdDSA))
        }
        _ => None,
    }
}

/// DER encodings of the named-curve OIDs in an EC `SubjectPublicKeyInfo`.
const P256_OID: &[u8] = &[0x06, 0x08, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07];
const P384_OID: &[u8] = &[0x06, 0x05, 0x2b, 0x81, 0x04, 0x00, 0x22];

/// Signing algorithm of an EC public key PEM, from its named curve.
fn ec_pem_algorithm(pem: &[u8]) -> Option<Algorithm> {
    let text = std::str::from_utf8(pem).ok()?;
    let body: String = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with("-----"))
        .collect();
    let der = Base64::decode_vec(&body).ok()?;

    let has = |oid: &[u8]| der.windows(oid.len()).any(|w| w == oid);
    if has(P384_OID) {
        Some(Algorithm::ES384)
    } else if has(P256_OID) {
        Some(Algorithm::ES256)
    } else {
        None
    }
}
