#![allow(dead_code)]

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use campspot::{
    error::{ApiError, AuthError, StoreError},
    management::{KeyValueStore, MemoryStore},
    spotify::{LibraryApi, TokenExchange},
    types::{Artist, SavedTrack, SavedTracksPage, Track, TrackArtist},
};
use reqwest::StatusCode;
use tokio::time::Instant;

/// Helper function to create a saved track crediting `artists` as (id, name).
pub fn saved_track(artists: &[(&str, &str)]) -> SavedTrack {
    SavedTrack {
        track: Some(Track {
            id: Some(format!("track-{}", artists.first().map_or("none", |a| a.0))),
            name: "Some Track".to_string(),
            artists: artists
                .iter()
                .map(|(id, name)| TrackArtist {
                    id: Some(id.to_string()),
                    name: name.to_string(),
                })
                .collect(),
        }),
    }
}

pub fn artist_id(index: usize) -> String {
    format!("artist-{:03}", index)
}

pub fn artist_name(index: usize) -> String {
    format!("Artist {}", index)
}

/// 120 tracks over 40 artists. Every artist is the main credit on three
/// tracks; artist 0 is also featured on 58 more, which makes 178 credits.
pub fn skewed_library() -> Vec<SavedTrack> {
    (0..120)
        .map(|i| {
            let main = i % 40;
            let (main_id, main_name) = (artist_id(main), artist_name(main));
            if i < 60 && main != 0 {
                let (feat_id, feat_name) = (artist_id(0), artist_name(0));
                saved_track(&[(&main_id, &main_name), (&feat_id, &feat_name)])
            } else {
                saved_track(&[(&main_id, &main_name)])
            }
        })
        .collect()
}

/// `count` tracks, each crediting its own artist.
pub fn one_artist_per_track(count: usize) -> Vec<SavedTrack> {
    (0..count)
        .map(|i| saved_track(&[(&artist_id(i), &artist_name(i))]))
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub enum PageFailure {
    Unauthorized,
    ServerError,
}

/// Scripted stand-in for the Spotify library endpoints.
pub struct FakeLibrary {
    pub tracks: Vec<SavedTrack>,
    pub reported_total: u32,
    pub genres: HashMap<String, Vec<String>>,
    pub fail_page_at: Option<(u32, PageFailure)>,
    pub fail_genre_batch: Option<usize>,
    pub page_requests: Mutex<Vec<u32>>,
    pub artist_requests: Mutex<Vec<Vec<String>>>,
    pub artist_request_times: Mutex<Vec<Instant>>,
}

impl FakeLibrary {
    pub fn new(tracks: Vec<SavedTrack>) -> Self {
        let reported_total = tracks.len() as u32;
        Self {
            tracks,
            reported_total,
            genres: HashMap::new(),
            fail_page_at: None,
            fail_genre_batch: None,
            page_requests: Mutex::new(Vec::new()),
            artist_requests: Mutex::new(Vec::new()),
            artist_request_times: Mutex::new(Vec::new()),
        }
    }

    /// Every artist id known to the library gets `["genre-<id>"]`.
    pub fn with_genres_for_all(mut self) -> Self {
        for track in self.tracks.iter().filter_map(|t| t.track.as_ref()) {
            for artist in &track.artists {
                if let Some(id) = &artist.id {
                    self.genres.insert(id.clone(), vec![format!("genre-{}", id)]);
                }
            }
        }
        self
    }

    pub fn page_requests(&self) -> Vec<u32> {
        self.page_requests.lock().unwrap().clone()
    }

    pub fn artist_requests(&self) -> Vec<Vec<String>> {
        self.artist_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LibraryApi for FakeLibrary {
    async fn saved_tracks(&self, limit: u32, offset: u32) -> Result<SavedTracksPage, ApiError> {
        self.page_requests.lock().unwrap().push(offset);

        if let Some((fail_offset, failure)) = self.fail_page_at {
            if fail_offset == offset {
                return Err(match failure {
                    PageFailure::Unauthorized => ApiError::Unauthorized(StatusCode::UNAUTHORIZED),
                    PageFailure::ServerError => ApiError::Status(StatusCode::INTERNAL_SERVER_ERROR),
                });
            }
        }

        let start = (offset as usize).min(self.tracks.len());
        let end = (start + limit as usize).min(self.tracks.len());
        Ok(SavedTracksPage {
            total: self.reported_total,
            items: self.tracks[start..end].to_vec(),
        })
    }

    async fn artists(&self, ids: &[String]) -> Result<Vec<Option<Artist>>, ApiError> {
        let batch = {
            let mut requests = self.artist_requests.lock().unwrap();
            requests.push(ids.to_vec());
            requests.len() - 1
        };
        self.artist_request_times.lock().unwrap().push(Instant::now());

        if self.fail_genre_batch == Some(batch) {
            return Err(ApiError::Status(StatusCode::TOO_MANY_REQUESTS));
        }

        Ok(ids
            .iter()
            .map(|id| {
                self.genres.get(id).map(|genres| Artist {
                    id: id.clone(),
                    name: format!("name of {}", id),
                    genres: Some(genres.clone()),
                })
            })
            .collect())
    }
}

/// Token endpoint double recording every (code, verifier) it receives.
pub struct FakeExchanger {
    pub token: Option<String>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl FakeExchanger {
    pub fn granting(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers like a token endpoint whose response lacks `access_token`.
    pub fn without_token() -> Self {
        Self {
            token: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenExchange for FakeExchanger {
    async fn exchange_code(&self, code: &str, verifier: &str) -> Result<String, AuthError> {
        self.calls
            .lock()
            .unwrap()
            .push((code.to_string(), verifier.to_string()));
        match &self.token {
            Some(token) => Ok(token.clone()),
            None => Err(AuthError::Exchange(
                "response did not contain an access token".to_string(),
            )),
        }
    }
}

/// Memory store whose removals fail, like a read-only disk would.
#[derive(Clone, Default)]
pub struct RemoveFailingStore {
    pub inner: MemoryStore,
}

#[async_trait]
impl KeyValueStore for RemoveFailingStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only store",
        )))
    }
}
