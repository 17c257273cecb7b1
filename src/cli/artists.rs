use tabled::Table;

use crate::{
    cli::{load_config, open_session, progress::PipelineProgress},
    error::SessionError,
    error, info,
    session::{RefreshOutcome, RefreshSummary},
    spotify::{SpotifyClient, genres::EnrichmentReport},
    success,
    types::{ArtistAggregate, ArtistTableRow},
    utils::{self, ArtistSort},
    warning,
};

/// Prints the cached artists as a table.
///
/// # Arguments
///
/// - `search` - Optional case-insensitive name filter
/// - `sort` - By saved track count (default) or by name
/// - `limit` - Show at most this many rows
///
/// Nothing is fetched from Spotify; an empty cache points the user to
/// `campspot artists update` or `campspot auth`.
pub async fn list_artists(search: Option<String>, sort: ArtistSort, limit: Option<usize>) {
    let session = open_session().await;
    if session.artists().is_empty() {
        if session.is_authenticated() {
            warning!("No cached artists. Run `campspot artists update`.");
        } else {
            warning!("Not authenticated. Please run `campspot auth`.");
        }
        return;
    }

    let mut artists = session.artists().to_vec();
    if let Some(search) = &search {
        utils::filter_artists(&mut artists, search);
    }
    utils::sort_artists(&mut artists, sort);
    if let Some(limit) = limit {
        artists.truncate(limit);
    }

    if artists.is_empty() {
        info!("No artists match your search.");
        return;
    }

    let table_rows: Vec<ArtistTableRow> = artists.into_iter().map(table_row).collect();
    println!("{}", Table::new(table_rows));
}

/// Refreshes the artists from Spotify.
///
/// With `genres_only` only cached artists without genres are looked up;
/// otherwise every saved track is fetched again and the cache rebuilt. A
/// rejected access token ends the session and asks for `campspot auth`.
pub async fn update_artists(genres_only: bool) {
    let config = load_config();
    let mut session = open_session().await;
    let Some(token) = session.token().map(str::to_string) else {
        error!("Not authenticated. Please run `campspot auth`.");
    };
    let api = SpotifyClient::new(&config, token);

    let progress = PipelineProgress::new();
    if genres_only {
        let result = session
            .enrich_missing_genres(&api, |p| progress.update(p))
            .await;
        progress.finish();
        match result {
            Ok(report) if report.requested == 0 => success!("All artists already have genres."),
            Ok(report) => report_enrichment(&report),
            Err(e) => error!("Cannot update genres. Err: {}", e),
        }
        return;
    }

    let result = session.refresh(&api, |p| progress.update(p)).await;
    progress.finish();
    match result {
        Ok(RefreshOutcome::Completed(summary)) => report_refresh(&summary),
        Ok(RefreshOutcome::AlreadyLoading) => warning!("An update is already running."),
        Err(SessionError::Fetch(e)) if e.is_unauthorized() => {
            error!("Spotify rejected the access token. Please run `campspot auth` again.")
        }
        Err(e) => error!("Cannot update artists. Err: {}", e),
    }
}

/// Opens the Bandcamp search for an artist in the browser.
///
/// `name` is matched against the cache, exact first and then as a
/// substring, so the search uses the artist's spelling on Spotify. Unknown
/// names are searched as typed. When no browser can be opened the URL is
/// printed instead.
pub async fn open_artist(name: String) {
    let session = open_session().await;
    let needle = name.trim().to_lowercase();

    // prefer the cached spelling so the quoted search matches exactly
    let display_name = session
        .artists()
        .iter()
        .find(|a| a.name.to_lowercase() == needle)
        .or_else(|| {
            session
                .artists()
                .iter()
                .find(|a| a.name.to_lowercase().contains(&needle))
        })
        .map(|a| a.name.clone())
        .unwrap_or_else(|| name.trim().to_string());

    let url = utils::bandcamp_search_url(&display_name);
    if webbrowser::open(&url).is_err() {
        warning!("Failed to open browser. Search manually:\n{}", url);
        return;
    }
    success!("Opened Bandcamp search for {}.", display_name);
}

pub(crate) fn report_refresh(summary: &RefreshSummary) {
    success!(
        "Found {} artists across {} saved tracks.",
        summary.artists,
        summary.tracks
    );
    report_enrichment(&summary.enrichment);
}

fn report_enrichment(report: &EnrichmentReport) {
    if report.is_complete() {
        if report.requested > 0 {
            success!("Loaded genres for {} artists.", report.enriched);
        }
        return;
    }

    info!(
        "Loaded genres for {} of {} artists. Run `campspot artists update --genres-only` for the rest.",
        report.enriched,
        report.requested
    );
}

fn table_row(artist: ArtistAggregate) -> ArtistTableRow {
    let genres = match &artist.genres {
        Some(genres) => genres.iter().take(3).cloned().collect::<Vec<_>>().join(", "),
        None => "-".to_string(),
    };

    ArtistTableRow {
        bandcamp: utils::bandcamp_search_url(&artist.name),
        name: artist.name,
        saved_count: artist.saved_count,
        genres,
    }
}
