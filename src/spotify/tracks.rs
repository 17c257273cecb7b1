use crate::{
    config::PAGE_SIZE,
    error::FetchError,
    spotify::LibraryApi,
    types::{ProgressState, SavedTrack, Stage},
};

/// Retrieves every saved track, one page of [`PAGE_SIZE`] at a time.
///
/// # Arguments
///
/// - `api` - Library endpoints, usually a [`SpotifyClient`](crate::spotify::SpotifyClient)
/// - `on_progress` - Called after every page with the tracks retrieved so far
///   and the reported total
///
/// # Behavior
///
/// The total reported by the first page decides when to stop. An empty page
/// also ends the fetch, so an upstream total that shrinks between pages can
/// never cause an endless loop. A failing page aborts the whole fetch; nothing
/// is retried.
pub async fn fetch_all_saved_tracks<A, P>(
    api: &A,
    mut on_progress: P,
) -> Result<Vec<SavedTrack>, FetchError>
where
    A: LibraryApi + ?Sized,
    P: FnMut(ProgressState),
{
    let mut tracks: Vec<SavedTrack> = Vec::new();
    let mut total: Option<u32> = None;

    loop {
        let offset = tracks.len() as u32;
        if total.is_some_and(|total| offset >= total) {
            break;
        }

        let page = api
            .saved_tracks(PAGE_SIZE, offset)
            .await
            .map_err(|source| FetchError { offset, source })?;
        let total = *total.get_or_insert(page.total);
        let fetched = page.items.len();

        tracks.extend(page.items);
        tracing::debug!(offset, fetched, total, "saved tracks page");
        on_progress(ProgressState {
            current: tracks.len() as u32,
            total,
            stage: Stage::FetchingTracks,
        });

        if fetched == 0 {
            break;
        }
    }

    Ok(tracks)
}
