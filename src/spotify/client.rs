use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::{
    config::Config,
    error::ApiError,
    types::{Artist, SavedTracksPage, SeveralArtistsResponse},
};

/// The two library endpoints the aggregation pipeline reads from.
#[async_trait]
pub trait LibraryApi: Send + Sync {
    /// One page of the user's saved tracks.
    async fn saved_tracks(&self, limit: u32, offset: u32) -> Result<SavedTracksPage, ApiError>;

    /// Full artist objects for up to 50 ids, in request order. Unknown ids
    /// come back as `None`.
    async fn artists(&self, ids: &[String]) -> Result<Vec<Option<Artist>>, ApiError>;
}

/// Spotify Web API client bound to one access token.
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    token: String,
}

impl SpotifyClient {
    pub fn new(config: &Config, token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: config.api_url.clone(),
            token: token.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, api_url: &str) -> Result<T, ApiError> {
        tracing::debug!(url = api_url, "spotify request");
        let response = self
            .http
            .get(api_url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        Ok(check_status(response)?.json::<T>().await?)
    }
}

#[async_trait]
impl LibraryApi for SpotifyClient {
    async fn saved_tracks(&self, limit: u32, offset: u32) -> Result<SavedTracksPage, ApiError> {
        let api_url = format!(
            "{uri}/me/tracks?limit={limit}&offset={offset}",
            uri = self.api_url,
            limit = limit,
            offset = offset
        );
        self.get_json(&api_url).await
    }

    async fn artists(&self, ids: &[String]) -> Result<Vec<Option<Artist>>, ApiError> {
        let api_url = format!(
            "{uri}/artists?ids={ids}",
            uri = self.api_url,
            ids = ids.join(",")
        );
        let res: SeveralArtistsResponse = self.get_json(&api_url).await?;
        Ok(res.artists)
    }
}

fn check_status(response: Response) -> Result<Response, ApiError> {
    match response.status() {
        StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized(StatusCode::UNAUTHORIZED)),
        status if !status.is_success() => Err(ApiError::Status(status)),
        _ => Ok(response),
    }
}
