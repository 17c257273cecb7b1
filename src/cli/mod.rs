//! # CLI Module
//!
//! User-facing commands. Each command mounts the [`Session`] from the local
//! store, does its work and reports through the crate's output macros.
//!
//! - [`auth`] - PKCE authorization, then the first artist load
//! - [`list_artists`] - cached artists as a table, filterable and sortable
//! - [`update_artists`] - refresh from Spotify, or only fill in missing genres
//! - [`open_artist`] - Bandcamp search for one artist in the browser
//! - [`clear_cache`] - forget the cached artists, keep the authorization
//! - [`info`] - session state and cache summary
//!
//! ```bash
//! campspot auth                         # authorize and load artists
//! campspot artists --search "sun"       # filter by name
//! campspot artists --sort name          # alphabetical instead of by count
//! campspot artists update               # refetch everything
//! campspot artists open "Sun Kil Moon"  # search on Bandcamp
//! campspot cache clear
//! ```

mod artists;
mod auth;
mod cache;
mod info;
mod progress;

pub use artists::list_artists;
pub use artists::open_artist;
pub use artists::update_artists;
pub use auth::auth;
pub use cache::clear_cache;
pub use info::info;

use crate::{
    config::{self, Config},
    error,
    management::FileStore,
    session::Session,
};

pub(crate) fn load_config() -> Config {
    match Config::from_env() {
        Ok(config) => config,
        Err(e) => error!(
            "Invalid configuration: {}\nSet it in {}",
            e,
            config::env_path().display()
        ),
    }
}

pub(crate) async fn open_session() -> Session<FileStore> {
    match Session::mount(FileStore::new(FileStore::default_path())).await {
        Ok(session) => session,
        Err(e) => error!("Cannot read local state. Err: {}", e),
    }
}
