use std::collections::HashMap;

use crate::{
    aggregate::ArtistCollection,
    config::GENRE_BATCH_SIZE,
    error::GenreBatchError,
    pacing::Pacer,
    spotify::LibraryApi,
    types::{ProgressState, Stage},
};

/// Outcome of a genre enrichment pass.
#[derive(Debug, Default)]
pub struct EnrichmentReport {
    /// Artists that needed genres when the pass started.
    pub requested: usize,
    /// Artists covered by successful batches.
    pub enriched: usize,
    /// The batch that stopped the pass, if any.
    pub failure: Option<GenreBatchError>,
}

impl EnrichmentReport {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Fills in genres for every artist whose genres are unset or empty.
///
/// # Arguments
///
/// - `api` - Library endpoints used for the `/artists?ids=` lookups
/// - `artists` - Collection updated in place, by id
/// - `pacer` - Spaces consecutive batches
/// - `on_progress` - Called after every successful batch
///
/// # Behavior
///
/// - Lookups go out in batches of [`GENRE_BATCH_SIZE`] ids, in id order
/// - Response entries are matched by id; a missing or `null` entry leaves
///   the artist with an empty genre list
/// - Artists that already carry genres are never requested
/// - The first failing batch ends the pass and is returned in the report;
///   the remaining artists keep their genres unset
pub async fn enrich_genres<A, P>(
    api: &A,
    artists: &mut ArtistCollection,
    pacer: &mut Pacer,
    mut on_progress: P,
) -> EnrichmentReport
where
    A: LibraryApi + ?Sized,
    P: FnMut(ProgressState),
{
    let ids = artists.ids_needing_genres();
    let mut report = EnrichmentReport {
        requested: ids.len(),
        ..Default::default()
    };

    for (batch, chunk) in ids.chunks(GENRE_BATCH_SIZE).enumerate() {
        pacer.ready().await;

        let response = match api.artists(chunk).await {
            Ok(response) => response,
            Err(source) => {
                report.failure = Some(GenreBatchError {
                    batch,
                    size: chunk.len(),
                    source,
                });
                break;
            }
        };

        let mut genres_by_id: HashMap<String, Vec<String>> = response
            .into_iter()
            .flatten()
            .map(|artist| (artist.id, artist.genres.unwrap_or_default()))
            .collect();

        for id in chunk {
            let genres = genres_by_id.remove(id).unwrap_or_default();
            artists.set_genres(id, genres);
        }

        report.enriched += chunk.len();
        on_progress(ProgressState {
            current: report.enriched as u32,
            total: report.requested as u32,
            stage: Stage::FetchingGenres,
        });
    }

    report
}
