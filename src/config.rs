// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `AUTH_ISSUERS` | Comma-separated trusted token issuers | Required |
//! | `AUTH_KEYS_DIR` | Directory of public-key PEM files (`kid` = file stem) | One of keys dir / JWKS file |
//! | `AUTH_JWKS_FILE` | JWKS document with trusted keys | One of keys dir / JWKS file |
//! | `AUTH_LEEWAY_SECONDS` | Clock skew tolerance for `exp`/`nbf` | `0` |
//! | `AUTH_BEARER_CHECK_USER` | Bearer tokens must name an enabled user | `false` |
//! | `USERS_FILE` | JSON array of user records | Empty store |
//! | `AUTHORITY_URL` | Remote authentication authority base URL | Delegated routes off |
//! | `AUTHORITY_TIMEOUT_MS` | Authority call timeout | `5000` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM certificate chain and key | Plain HTTP |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const AUTH_ISSUERS_ENV: &str = "AUTH_ISSUERS";
pub const AUTH_KEYS_DIR_ENV: &str = "AUTH_KEYS_DIR";
pub const AUTH_JWKS_FILE_ENV: &str = "AUTH_JWKS_FILE";
pub const AUTH_LEEWAY_ENV: &str = "AUTH_LEEWAY_SECONDS";
pub const AUTH_BEARER_CHECK_USER_ENV: &str = "AUTH_BEARER_CHECK_USER";
pub const USERS_FILE_ENV: &str = "USERS_FILE";
pub const AUTHORITY_URL_ENV: &str = "AUTHORITY_URL";
pub const AUTHORITY_TIMEOUT_ENV: &str = "AUTHORITY_TIMEOUT_MS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_AUTHORITY_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Where trusted signing keys come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    PemDir(PathBuf),
    JwksFile(PathBuf),
}

/// Remote authority settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityConfig {
    pub url: Url,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub addr: SocketAddr,
    pub issuers: Vec<String>,
    pub keys: KeySource,
    pub leeway_seconds: u64,
    pub bearer_check_user: bool,
    pub users_file: Option<PathBuf>,
    pub authority: Option<AuthorityConfig>,
    pub tls: Option<TlsConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = get(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match get(PORT_ENV) {
            Some(p) => p.parse::<u16>().map_err(|_| ConfigError::Invalid(PORT_ENV))?,
            None => DEFAULT_PORT,
        };
        let addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|_| ConfigError::Invalid(HOST_ENV))?;

        let issuers = get(AUTH_ISSUERS_ENV)
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();
        if issuers.is_empty() {
            return Err(ConfigError::Missing(AUTH_ISSUERS_ENV));
        }

        let keys = match (get(AUTH_KEYS_DIR_ENV), get(AUTH_JWKS_FILE_ENV)) {
            (Some(dir), None) => KeySource::PemDir(dir.into()),
            (None, Some(file)) => KeySource::JwksFile(file.into()),
            (Some(_), Some(_)) => return Err(ConfigError::Invalid(AUTH_JWKS_FILE_ENV)),
            (None, None) => return Err(ConfigError::Missing(AUTH_KEYS_DIR_ENV)),
        };

        let leeway_seconds = match get(AUTH_LEEWAY_ENV) {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid(AUTH_LEEWAY_ENV))?,
            None => 0,
        };

        let bearer_check_user = match get(AUTH_BEARER_CHECK_USER_ENV).as_deref() {
            None | Some("") | Some("false") | Some("0") => false,
            Some("true") | Some("1") => true,
            Some(_) => return Err(ConfigError::Invalid(AUTH_BEARER_CHECK_USER_ENV)),
        };

        let authority = match get(AUTHORITY_URL_ENV) {
            Some(raw) => {
                let url = Url::parse(&raw).map_err(|_| ConfigError::Invalid(AUTHORITY_URL_ENV))?;
                let timeout_ms = match get(AUTHORITY_TIMEOUT_ENV) {
                    Some(v) => v
                        .parse::<u64>()
                        .ok()
                        .filter(|ms| *ms > 0)
                        .ok_or(ConfigError::Invalid(AUTHORITY_TIMEOUT_ENV))?,
                    None => DEFAULT_AUTHORITY_TIMEOUT_MS,
                };
                Some(AuthorityConfig {
                    url,
                    timeout: Duration::from_millis(timeout_ms),
                })
            }
            None => None,
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsConfig {
                cert_path: cert.into(),
                key_path: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        Ok(Self {
            addr,
            issuers,
            keys,
            leeway_seconds,
            bearer_check_user,
            users_file: get(USERS_FILE_ENV).map(PathBuf::from),
            authority,
            tls,
        })
    }
}
