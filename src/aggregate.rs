//! Folding saved tracks into one entry per credited artist.

use std::collections::BTreeMap;

use crate::types::{ArtistAggregate, SavedTrack};

/// Artist aggregates keyed by Spotify artist id.
///
/// Iteration runs in id order, which keeps genre batches reproducible. The
/// presentation layer re-sorts by count or name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtistCollection {
    entries: BTreeMap<String, ArtistAggregate>,
}

impl ArtistCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ArtistAggregate> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArtistAggregate> {
        self.entries.values()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Counts one credit for `id`, creating the entry on first sight.
    pub fn credit(&mut self, id: &str, name: &str) {
        let entry = self
            .entries
            .entry(id.to_string())
            .or_insert_with(|| ArtistAggregate {
                id: id.to_string(),
                name: name.to_string(),
                saved_count: 0,
                genres: None,
            });
        entry.saved_count += 1;
    }

    /// Ids whose genres are unset or empty, in id order.
    pub fn ids_needing_genres(&self) -> Vec<String> {
        self.entries
            .values()
            .filter(|a| a.needs_genres())
            .map(|a| a.id.clone())
            .collect()
    }

    /// Returns false when `id` is unknown.
    pub fn set_genres(&mut self, id: &str, genres: Vec<String>) -> bool {
        match self.entries.get_mut(id) {
            Some(artist) => {
                artist.genres = Some(genres);
                true
            }
            None => false,
        }
    }

    pub fn total_credits(&self) -> u64 {
        self.entries.values().map(|a| a.saved_count as u64).sum()
    }

    pub fn to_vec(&self) -> Vec<ArtistAggregate> {
        self.entries.values().cloned().collect()
    }
}

impl FromIterator<ArtistAggregate> for ArtistCollection {
    fn from_iter<T: IntoIterator<Item = ArtistAggregate>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|a| (a.id.clone(), a)).collect(),
        }
    }
}

/// Tallies every artist credit across `tracks`.
pub fn aggregate(tracks: &[SavedTrack]) -> ArtistCollection {
    let mut collection = ArtistCollection::new();
    for track in tracks.iter().filter_map(|t| t.track.as_ref()) {
        for artist in &track.artists {
            if let Some(id) = artist.id.as_deref().filter(|id| !id.is_empty()) {
                collection.credit(id, &artist.name);
            }
        }
    }
    collection
}
