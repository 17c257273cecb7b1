//! # API Module
//!
//! HTTP endpoints of the short-lived local listener that `campspot auth`
//! starts while the user grants access in the browser.
//!
//! - [`callback`] receives Spotify's redirect, checks the anti-replay `state`
//!   and hands the authorization code to the waiting command. The code
//!   exchange itself happens in the session, not here.
//! - [`health`] reports that the listener is up and still waiting for a code.
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use campspot::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::CallbackRejection;
pub use callback::SharedAuthorization;
pub use callback::accept_callback;
pub use callback::callback;
pub use health::health;
