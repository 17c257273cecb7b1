//! campspot library
//!
//! Collects the artists behind a user's Spotify saved tracks, tags them with
//! genres and keeps the result in a local cache so they can be looked up on
//! Bandcamp.
//!
//! # Modules
//!
//! - `aggregate` - Folding saved tracks into per-artist counts
//! - `api` - HTTP endpoints for the local OAuth callback listener
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration from environment variables and `.env`
//! - `error` - Typed errors for store, API, authorization and session
//! - `management` - Key-value store, credentials and artist cache
//! - `pacing` - Minimum-interval pacing for batched requests
//! - `server` - Local HTTP listener for OAuth callbacks
//! - `session` - Session state machine and cache controller
//! - `spotify` - Spotify Web API client, PKCE and pipeline stages
//! - `types` - Data structures and type definitions
//! - `utils` - PKCE helpers, code extraction and presentation helpers
//!
//! # Example
//!
//! ```
//! use campspot::{config::Config, management::FileStore, session::Session};
//!
//! #[tokio::main]
//! async fn main() -> campspot::Res<()> {
//!     campspot::config::load_env().await?;
//!     let config = Config::from_env()?;
//!     let session = Session::mount(FileStore::new(FileStore::default_path())).await?;
//!     println!("{} cached artists", session.artists().len());
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod pacing;
pub mod server;
pub mod session;
pub mod spotify;
pub mod types;
pub mod utils;

/// Result for command-level code where any error ends up printed to the user.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints a status line behind a blue `o`.
///
/// ```
/// info!("Cached artists: {}", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a line behind a green check mark once something finished.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints the message behind a red `!` and exits with status 1.
///
/// Only for failures that end the command. The expansion diverges, so it can
/// close a `let ... else` or a `match` arm of any type:
///
/// ```
/// let Some(token) = session.token() else {
///     error!("Not authenticated. Please run `campspot auth`.");
/// };
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints the message behind a yellow `!` and carries on.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
