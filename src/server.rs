use axum::{Extension, Router, routing::get};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::{
    api::{self, SharedAuthorization},
    config::HEALTH_PATH,
};

/// Routes the callback handler on `callback_path`, the path of the
/// configured redirect URI, so Spotify's redirect always reaches it.
pub fn router(state: SharedAuthorization, callback_path: &str) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(api::health))
        .route(callback_path, get(api::callback))
        .layer(Extension(state))
}

/// Binds the callback listener. Binding separately from serving lets the
/// caller fall back to manual code entry when the port is taken.
pub async fn bind(addr: SocketAddr) -> std::io::Result<TcpListener> {
    TcpListener::bind(addr).await
}

/// Serves the callback listener until the process exits.
///
/// # Arguments
///
/// - `listener` - Socket from [`bind`]
/// - `state` - Pending authorization the callback handler fills in
/// - `callback_path` - Path part of the redirect URI, e.g. `/callback` or `/`
pub async fn start_api_server(
    listener: TcpListener,
    state: SharedAuthorization,
    callback_path: &str,
) {
    if let Err(e) = axum::serve(listener, router(state, callback_path)).await {
        tracing::error!(error = %e, "callback listener stopped");
    }
}
