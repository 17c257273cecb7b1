use crate::{cli::open_session, info, management::FileStore, warning};

/// Prints the session state and a summary of the cached artists.
pub async fn info() {
    let session = open_session().await;

    info!("Session: {}", session.state());
    info!("Store: {}", FileStore::default_path().display());

    if !session.is_authenticated() {
        return;
    }

    match session.refreshed_at() {
        Some(ts) => info!("Last refresh: {}", ts.format("%Y-%m-%d %H:%M:%S UTC")),
        None => warning!("Artists have not been loaded yet."),
    }

    let artists = session.artists();
    info!("Cached artists: {}", artists.len());
    info!("Saved track credits: {}", artists.total_credits());

    let missing = artists.ids_needing_genres().len();
    if missing > 0 && !artists.is_empty() {
        warning!(
            "{} artists have no genres. Run `campspot artists update --genres-only`.",
            missing
        );
    }
}
