use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;

use crate::{
    config::Config,
    error::{AuthError, ConfigError},
    utils,
};

/// Everything needed to send the user to Spotify's consent page.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub code_verifier: String,
    pub state: String,
    /// The redirect cannot be captured locally; the user has to paste the
    /// code or the URL they were redirected to.
    pub manual_code_required: bool,
}

/// Generates a fresh PKCE verifier, challenge and state for `config`.
///
/// Nothing is persisted here; the session stores the verifier before the
/// browser is opened.
pub fn build_authorization(config: &Config) -> Result<AuthorizationRequest, ConfigError> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let state = utils::generate_state();

    let url = authorization_url(config, &code_challenge, &state)?;

    Ok(AuthorizationRequest {
        url,
        code_verifier,
        state,
        manual_code_required: !config.captures_redirect(),
    })
}

pub fn authorization_url(
    config: &Config,
    code_challenge: &str,
    state: &str,
) -> Result<String, ConfigError> {
    let url = Url::parse_with_params(
        &config.auth_url,
        &[
            ("client_id", config.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("scope", config.scope.as_str()),
            ("code_challenge_method", "S256"),
            ("code_challenge", code_challenge),
            ("state", state),
        ],
    )
    .map_err(|e| ConfigError::Invalid {
        name: "SPOTIFY_API_AUTH_URL",
        reason: e.to_string(),
    })?;

    Ok(url.to_string())
}

/// Trades an authorization code for an access token.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn exchange_code(&self, code: &str, verifier: &str) -> Result<String, AuthError>;
}

/// Token exchange against Spotify's accounts service.
pub struct SpotifyAuthClient {
    http: Client,
    config: Config,
}

impl SpotifyAuthClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::new(),
            config: config.clone(),
        }
    }
}

#[async_trait]
impl TokenExchange for SpotifyAuthClient {
    /// Single form-encoded request, never retried. A response without an
    /// `access_token` field is a failure regardless of its status code.
    async fn exchange_code(&self, code: &str, verifier: &str) -> Result<String, AuthError> {
        let res = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("code_verifier", verifier),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Exchange(e.to_string()))?;

        let status = res.status();
        let json: Value = res
            .json()
            .await
            .map_err(|e| AuthError::Exchange(format!("{} ({})", e, status)))?;

        access_token_from_response(&json)
    }
}

/// Reads the access token out of a token endpoint response body.
pub fn access_token_from_response(json: &Value) -> Result<String, AuthError> {
    if let Some(token) = json["access_token"].as_str().filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }

    let reason = json["error_description"]
        .as_str()
        .or_else(|| json["error"].as_str())
        .unwrap_or("response did not contain an access token");
    Err(AuthError::Exchange(reason.to_string()))
}
