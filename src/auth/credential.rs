// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `Authorization` header parsing.

use std::fmt;

use axum::http::HeaderValue;
use base64ct::{Base64, Encoding};

use super::AuthError;

/// Credential scheme discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Bearer,
    Basic,
    Delegated,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Bearer => write!(f, "bearer"),
            Scheme::Basic => write!(f, "basic"),
            Scheme::Delegated => write!(f, "delegated"),
        }
    }
}

/// Identifier/secret pair from a `Basic` header.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredential {
    pub id: String,
    pub secret: String,
}

impl fmt::Debug for BasicCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the secret
        f.debug_struct("BasicCredential")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// A credential taken from one request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Compact signed token
    Bearer(String),
    /// Decoded identifier and secret
    Basic(BasicCredential),
    /// Raw header value, forwarded verbatim to the authority
    Delegated(String),
}

impl Credential {
    pub fn scheme(&self) -> Scheme {
        match self {
            Credential::Bearer(_) => Scheme::Bearer,
            Credential::Basic(_) => Scheme::Basic,
            Credential::Delegated(_) => Scheme::Delegated,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Bearer(_) => f.write_str("Bearer(<redacted>)"),
            Credential::Basic(basic) => f.debug_tuple("Basic").field(basic).finish(),
            Credential::Delegated(_) => f.write_str("Delegated(<redacted>)"),
        }
    }
}

/// Parse the `Authorization` header into a `Bearer` or `Basic` credential.
pub fn extract(header: Option<&HeaderValue>) -> Result<Credential, AuthError> {
    let value = header_str(header)?;
    let (scheme, payload) = split_scheme(value)?;

    if scheme.eq_ignore_ascii_case("bearer") {
        Ok(Credential::Bearer(payload.to_string()))
    } else if scheme.eq_ignore_ascii_case("basic") {
        decode_basic(payload).map(Credential::Basic)
    } else {
        Err(AuthError::MalformedCredential)
    }
}

/// Validate the header like [`extract`], then keep the raw value for
/// forwarding.
pub fn extract_delegated(header: Option<&HeaderValue>) -> Result<Credential, AuthError> {
    extract(header)?;
    let raw = header_str(header)?;
    Ok(Credential::Delegated(raw.to_string()))
}

fn header_str(header: Option<&HeaderValue>) -> Result<&str, AuthError> {
    header
        .ok_or(AuthError::MissingCredential)?
        .to_str()
        .map_err(|_| AuthError::MalformedCredential)
}

fn split_scheme(value: &str) -> Result<(&str, &str), AuthError> {
    let (scheme, payload) = value
        .split_once(' ')
        .ok_or(AuthError::MalformedCredential)?;

    if payload.is_empty() || payload.contains(' ') {
        return Err(AuthError::MalformedCredential);
    }

    Ok((scheme, payload))
}

fn decode_basic(payload: &str) -> Result<BasicCredential, AuthError> {
    let decoded = Base64::decode_vec(payload).map_err(|_| AuthError::MalformedCredential)?;
    let pair = String::from_utf8(decoded).map_err(|_| AuthError::MalformedCredential)?;

    let (id, secret) = pair
        .split_once(':')
        .ok_or(AuthError::MalformedCredential)?;

    if id.is_empty() {
        return Err(AuthError::MalformedCredential);
    }

    Ok(BasicCredential {
        id: id.to_string(),
        secret: secret.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(value: &str) -> HeaderValue {
        HeaderValue::from_str(value).unwrap()
    }

    fn basic(pair: &str) -> HeaderValue {
        header(&format!("Basic {}", Base64::encode_string(pair.as_bytes())))
    }

    #[test]
    fn missing_header() {
        assert_eq!(extract(None), Err(AuthError::MissingCredential));
    }

    #[test]
    fn bearer_token() {
        let cred = extract(Some(&header("Bearer abc.def.ghi"))).unwrap();
        assert_eq!(cred, Credential::Bearer("abc.def.ghi".to_string()));
        assert_eq!(cred.scheme(), Scheme::Bearer);
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let cred = extract(Some(&header("bearer tok"))).unwrap();
        assert_eq!(cred, Credential::Bearer("tok".to_string()));

        let cred = extract(Some(&header(&format!(
            "BASIC {}",
            Base64::encode_string(b"alice:pw")
        ))))
        .unwrap();
        assert_eq!(cred.scheme(), Scheme::Basic);
    }

    #[test]
    fn basic_pair_splits_on_first_colon() {
        let cred = extract(Some(&basic("alice:pa:ss"))).unwrap();
        assert_eq!(
            cred,
            Credential::Basic(BasicCredential {
                id: "alice".to_string(),
                secret: "pa:ss".to_string(),
            })
        );
    }

    #[test]
    fn malformed_headers() {
        for value in [
            "Bearer",
            "Bearer ",
            "Bearer a b",
            "Token abc",
            "abc",
            "Basic !!!notbase64",
        ] {
            assert_eq!(
                extract(Some(&header(value))),
                Err(AuthError::MalformedCredential),
                "{value}"
            );
        }
        assert_eq!(
            extract(Some(&basic("no-colon"))),
            Err(AuthError::MalformedCredential)
        );
        assert_eq!(
            extract(Some(&basic(":secret"))),
            Err(AuthError::MalformedCredential)
        );
    }

    #[test]
    fn non_ascii_header_is_malformed() {
        let value = HeaderValue::from_bytes(b"Bearer \xfftoken").unwrap();
        assert_eq!(extract(Some(&value)), Err(AuthError::MalformedCredential));
    }

    #[test]
    fn delegated_keeps_raw_value() {
        let cred = extract_delegated(Some(&header("Bearer abc"))).unwrap();
        assert_eq!(cred, Credential::Delegated("Bearer abc".to_string()));
        assert_eq!(
            extract_delegated(Some(&header("Digest x"))),
            Err(AuthError::MalformedCredential)
        );
    }

    #[test]
    fn debug_hides_secrets() {
        let cred = extract(Some(&basic("alice:hunter2"))).unwrap();
        let printed = format!("{cred:?}");
        assert!(printed.contains("alice"));
        assert!(!printed.contains("hunter2"));
    }
}
