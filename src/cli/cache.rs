use crate::{cli::open_session, error, success, warning};

/// Forgets the cached artists. The Spotify authorization stays valid.
pub async fn clear_cache() {
    let mut session = open_session().await;
    if !session.is_authenticated() {
        warning!("Not authenticated, nothing cached.");
        return;
    }

    let count = session.artists().len();
    match session.clear_cache().await {
        Ok(()) => success!("Cleared {} cached artists.", count),
        Err(e) => error!("Cannot clear cache. Err: {}", e),
    }
}
