use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{types::PendingAuthorization, warning};

pub type SharedAuthorization = Arc<Mutex<Option<PendingAuthorization>>>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CallbackRejection {
    #[error("authorization denied: {0}")]
    Denied(String),
    #[error("state parameter does not match the pending authorization")]
    StateMismatch,
    #[error("callback carried no authorization code")]
    MissingCode,
}

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<SharedAuthorization>,
) -> Html<&'static str> {
    let mut lock = shared_state.lock().await;
    let Some(pending) = lock.as_mut() else {
        return Html("<h4>No authorization in progress.</h4>");
    };

    match accept_callback(pending, &params) {
        Ok(()) => Html("<h2>Authorization received.</h2><p>You can close this window.</p>"),
        Err(CallbackRejection::StateMismatch) => {
            warning!("Ignored a callback with an unexpected state parameter.");
            Html("<h4>Unexpected state parameter.</h4>")
        }
        Err(e) => {
            warning!("Authorization failed: {}", e);
            Html("<h4>Login failed.</h4>")
        }
    }
}

/// Validates the redirect parameters and records the outcome on `pending`.
///
/// A callback with a foreign `state` is dropped without touching `pending`.
pub fn accept_callback(
    pending: &mut PendingAuthorization,
    params: &HashMap<String, String>,
) -> Result<(), CallbackRejection> {
    if params.get("state") != Some(&pending.state) {
        return Err(CallbackRejection::StateMismatch);
    }

    if let Some(error) = params.get("error") {
        pending.error = Some(error.clone());
        return Err(CallbackRejection::Denied(error.clone()));
    }

    match params.get("code").map(|c| c.trim()).filter(|c| !c.is_empty()) {
        Some(code) => {
            pending.code = Some(code.to_string());
            Ok(())
        }
        None => {
            pending.error = Some("missing code".to_string());
            Err(CallbackRejection::MissingCode)
        }
    }
}
