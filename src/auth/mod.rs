//! Credential loading from the Granola desktop app's cached session.
//!
//! The desktop app keeps a `supabase.json` file whose `cognito_tokens` field
//! is a JSON-encoded string holding the actual tokens. This module only ever
//! reads that file; refreshing it is the desktop app's job.

use crate::global;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("credential file not found at {path} (is the Granola desktop app installed and signed in?)")]
    NotFound { path: PathBuf },
    #[error("failed to read credential file at {path}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("credential file at {path} is malformed: {reason}")]
    Malformed { path: PathBuf, reason: String },
    #[error("credential file at {path} contains no access token")]
    MissingToken { path: PathBuf },
    #[error("unable to locate the Granola application data directory")]
    NoCredentialDir,
}

#[derive(Debug, Deserialize)]
struct CredentialFile {
    cognito_tokens: String,
}

#[derive(Debug, Deserialize)]
struct CognitoTokens {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Unix timestamp (seconds) at which the access token expires.
    #[serde(default)]
    expires_at: Option<i64>,
}

/// Bearer credentials for the Granola API.
#[derive(Debug, Clone)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Load credentials from the platform-specific location.
    pub fn load() -> Result<Self, AuthError> {
        let path = global::credential_file().map_err(|_| AuthError::NoCredentialDir)?;
        Self::load_from(&path)
    }

    /// Load credentials from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, AuthError> {
        if !path.exists() {
            return Err(AuthError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|source| AuthError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let file: CredentialFile =
            serde_json::from_str(&content).map_err(|err| AuthError::Malformed {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;

        // cognito_tokens is itself a JSON document stored as a string
        let tokens: CognitoTokens =
            serde_json::from_str(&file.cognito_tokens).map_err(|err| AuthError::Malformed {
                path: path.to_path_buf(),
                reason: format!("invalid cognito_tokens payload: {}", err),
            })?;

        let access_token = match tokens.access_token {
            Some(token) if !token.trim().is_empty() => token,
            _ => {
                return Err(AuthError::MissingToken {
                    path: path.to_path_buf(),
                })
            }
        };

        let expires_at = tokens
            .expires_at
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .or_else(|| jwt_expiry(&access_token));

        if let Some(expiry) = expires_at {
            if expiry <= Utc::now() {
                warn!(
                    "Cached access token appears to have expired at {}; open the Granola app to refresh it",
                    expiry.to_rfc3339()
                );
            } else {
                debug!("Access token valid until {}", expiry.to_rfc3339());
            }
        }

        debug!("Loaded credentials from {}", path.display());

        Ok(Self {
            access_token,
            refresh_token: tokens.refresh_token,
            expires_at,
        })
    }
}

/// Best-effort expiry from the JWT `exp` claim. The token is not verified;
/// this only feeds the expired-token warning.
fn jwt_expiry(token: &str) -> Option<DateTime<Utc>> {
    #[derive(Deserialize)]
    struct Claims {
        exp: i64,
    }

    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    Utc.timestamp_opt(claims.exp, 0).single()
}
