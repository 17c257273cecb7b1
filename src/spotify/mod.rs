//! # Spotify Integration Module
//!
//! Everything that talks to Spotify: the PKCE authorization handshake, the
//! saved-tracks listing and the batched artist lookups used for genres.
//!
//! ```text
//! Session (state machine, cache)
//!          ↓
//! Spotify Integration Layer
//!     ├── auth     (PKCE URL, code exchange)
//!     ├── tracks   (offset pagination over /me/tracks)
//!     └── genres   (paced /artists?ids= batches)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! The network seams are the [`LibraryApi`] and [`TokenExchange`] traits, so
//! the pipeline runs the same against Spotify or a scripted test double.
//!
//! None of the calls here retry. A failing page aborts the track fetch, a
//! failing artist batch stops enrichment early, and a failed code exchange
//! sends the user back to `campspot auth`.

pub mod auth;
pub mod client;
pub mod genres;
pub mod tracks;

pub use auth::{SpotifyAuthClient, TokenExchange};
pub use client::{LibraryApi, SpotifyClient};
