use axum::{Extension, response::Json};
use serde_json::{Value, json};

use crate::api::SharedAuthorization;

/// Liveness of the callback listener, and whether it still waits for a code.
pub async fn health(Extension(shared_state): Extension<SharedAuthorization>) -> Json<Value> {
    let awaiting_code = shared_state
        .lock()
        .await
        .as_ref()
        .is_some_and(|pending| pending.code.is_none() && pending.error.is_none());

    Json(json!({
        "service": "campspot-callback",
        "version": env!("CARGO_PKG_VERSION"),
        "awaiting_code": awaiting_code
    }))
}
