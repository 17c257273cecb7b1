//! Configuration management for campspot.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory:
//! - Linux: `~/.local/share/campspot/.env`
//! - macOS: `~/Library/Application Support/campspot/.env`
//! - Windows: `%LOCALAPPDATA%/campspot/.env`
//!
//! Everything except the client id has a default. The resulting [`Config`] is
//! passed explicitly to every component that talks to Spotify.

use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use reqwest::Url;

use crate::error::ConfigError;

pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SCOPE: &str = "user-top-read user-library-read";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
pub const DEFAULT_CALLBACK_PATH: &str = "/callback";
/// Served by the callback listener next to the redirect path.
pub const HEALTH_PATH: &str = "/health";

/// Saved tracks requested per page.
pub const PAGE_SIZE: u32 = 50;
/// Artist ids per genre lookup.
pub const GENRE_BATCH_SIZE: usize = 50;
/// Minimum spacing between genre lookups.
pub const GENRE_BATCH_INTERVAL: Duration = Duration::from_millis(100);

/// Loads environment variables from the `.env` file in the local data
/// directory, creating the directory if needed. A missing file is fine;
/// the process environment is used as is.
pub async fn load_env() -> Result<(), String> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(format!("{}: {}", path.display(), e)),
    }
}

pub fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("campspot/.env");
    path
}

#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    /// Where the local callback listener binds.
    pub server_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let client_id = env::var("SPOTIFY_API_AUTH_CLIENT_ID")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("SPOTIFY_API_AUTH_CLIENT_ID"))?;

        let server_addr = var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS);
        let server_addr =
            SocketAddr::from_str(&server_addr).map_err(|e| ConfigError::Invalid {
                name: "SERVER_ADDRESS",
                reason: e.to_string(),
            })?;

        let redirect_uri = var_or("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI);
        Url::parse(&redirect_uri).map_err(|e| ConfigError::Invalid {
            name: "SPOTIFY_API_REDIRECT_URI",
            reason: e.to_string(),
        })?;

        Ok(Self {
            client_id,
            redirect_uri,
            scope: var_or("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE),
            auth_url: var_or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL),
            token_url: var_or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL),
            api_url: var_or("SPOTIFY_API_URL", DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            server_addr,
        })
    }

    /// Config pointing at the public Spotify endpoints.
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scope: DEFAULT_SCOPE.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            server_addr: SocketAddr::from(([127, 0, 0, 1], 8888)),
        }
    }

    /// Whether the redirect lands on this machine, where the callback
    /// listener can pick up the code. Otherwise the user has to paste it.
    ///
    /// The listener serves [`Config::callback_path`], so any plain path
    /// works except the one taken by the health endpoint. Paths with router
    /// wildcard characters are left to manual entry.
    pub fn captures_redirect(&self) -> bool {
        let Ok(url) = Url::parse(&self.redirect_uri) else {
            return false;
        };
        if url.path() == HEALTH_PATH || url.path().contains([':', '*']) {
            return false;
        }
        let loopback = match url.host_str() {
            Some("localhost") => true,
            Some(host) => host
                .trim_start_matches('[')
                .trim_end_matches(']')
                .parse::<std::net::IpAddr>()
                .is_ok_and(|ip| ip.is_loopback()),
            None => false,
        };
        loopback && url.port_or_known_default() == Some(self.server_addr.port())
    }

    /// Path of the redirect URI, where the callback listener expects
    /// Spotify's redirect. Falls back to `/callback` for an unparsable URI.
    pub fn callback_path(&self) -> String {
        Url::parse(&self.redirect_uri)
            .map(|url| url.path().to_string())
            .unwrap_or_else(|_| DEFAULT_CALLBACK_PATH.to_string())
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
