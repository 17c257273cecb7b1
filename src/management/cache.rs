use chrono::{DateTime, Utc};

use crate::{
    error::SessionError,
    management::store::{KeyValueStore, keys},
    types::ArtistAggregate,
};

/// The persisted artist aggregate and the time it was refreshed.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheRecord {
    pub artists: Vec<ArtistAggregate>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl CacheRecord {
    pub fn new(artists: Vec<ArtistAggregate>, refreshed_at: DateTime<Utc>) -> Self {
        Self {
            artists,
            refreshed_at: Some(refreshed_at),
        }
    }

    /// Returns `None` when nothing is cached.
    pub async fn load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Option<Self>, SessionError> {
        let Some(json) = store.get(keys::ARTIST_CACHE).await? else {
            return Ok(None);
        };
        let artists: Vec<ArtistAggregate> = serde_json::from_str(&json)?;

        // an unreadable timestamp only loses the "last refreshed" hint
        let refreshed_at = store
            .get(keys::ARTIST_CACHE_REFRESHED_AT)
            .await?
            .and_then(|ts| DateTime::parse_from_rfc3339(&ts).ok())
            .map(|ts| ts.with_timezone(&Utc));

        Ok(Some(Self {
            artists,
            refreshed_at,
        }))
    }

    pub async fn persist<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<(), SessionError> {
        let json = serde_json::to_string(&self.artists)?;
        store.set(keys::ARTIST_CACHE, &json).await?;
        if let Some(refreshed_at) = self.refreshed_at {
            store
                .set(keys::ARTIST_CACHE_REFRESHED_AT, &refreshed_at.to_rfc3339())
                .await?;
        }
        Ok(())
    }

    pub async fn clear<S: KeyValueStore + ?Sized>(store: &S) -> Result<(), SessionError> {
        store.remove(keys::ARTIST_CACHE).await?;
        store.remove(keys::ARTIST_CACHE_REFRESHED_AT).await?;
        Ok(())
    }
}
