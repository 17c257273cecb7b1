use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Authorization started by `campspot auth`, shared with the callback
/// listener until Spotify redirects back.
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    pub state: String,
    pub code: Option<String>,
    /// Set when Spotify redirected with an `error` instead of a code.
    pub error: Option<String>,
}

impl PendingAuthorization {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            code: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTracksPage {
    pub total: u32,
    #[serde(default)]
    pub items: Vec<SavedTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTrack {
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
}

/// Artist credit on a track. Local files carry credits without an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackArtist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveralArtistsResponse {
    pub artists: Vec<Option<Artist>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
}

/// One distinct artist behind the saved tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistAggregate {
    pub id: String,
    pub name: String,
    pub saved_count: u32,
    /// `None` until a genre lookup has run for this artist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
}

impl ArtistAggregate {
    pub fn needs_genres(&self) -> bool {
        self.genres.as_ref().is_none_or(|g| g.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchingTracks,
    FetchingGenres,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressState {
    pub current: u32,
    pub total: u32,
    pub stage: Stage,
}

#[derive(Tabled)]
pub struct ArtistTableRow {
    #[tabled(rename = "Artist")]
    pub name: String,
    #[tabled(rename = "# Saved Tracks")]
    pub saved_count: u32,
    #[tabled(rename = "Genres")]
    pub genres: String,
    #[tabled(rename = "Bandcamp")]
    pub bandcamp: String,
}
