//! Error types shared across the crate.
//!
//! Authorization and track-fetch failures are fatal to the running operation
//! and reach the user. Genre batch failures are only logged; the session keeps
//! whatever enrichment succeeded.

use reqwest::StatusCode;
use thiserror::Error;

/// Failures of the local key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store contents are not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Failures of a single Spotify Web API request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The access token was rejected (expired, revoked or invalid).
    #[error("authorization rejected by Spotify ({0})")]
    Unauthorized(StatusCode),
    #[error("Spotify responded with {0}")]
    Status(StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// The token endpoint failed or answered without an access token.
    #[error("token exchange failed: {0}")]
    Exchange(String),
    /// No PKCE verifier is stored, so there is nothing to complete.
    #[error("no authorization in progress, run `campspot auth` first")]
    MissingInput,
    #[error("no authorization code found in the given input")]
    EmptyCode,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A saved-tracks page request failed; the whole fetch is aborted.
#[derive(Debug, Error)]
#[error("failed to fetch saved tracks at offset {offset}: {source}")]
pub struct FetchError {
    pub offset: u32,
    #[source]
    pub source: ApiError,
}

impl FetchError {
    pub fn is_unauthorized(&self) -> bool {
        self.source.is_unauthorized()
    }
}

/// A genre lookup batch failed; enrichment stopped at `batch`.
#[derive(Debug, Error)]
#[error("genre batch {batch} ({size} artists) failed: {source}")]
pub struct GenreBatchError {
    pub batch: usize,
    pub size: usize,
    #[source]
    pub source: ApiError,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cached artists are corrupt: {0}")]
    Cache(#[from] serde_json::Error),
    #[error("not allowed while {0}")]
    InvalidState(String),
}
