use std::{sync::Arc, time::Duration};

use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::Mutex,
    time::Instant,
};

use crate::{
    Res,
    api::SharedAuthorization,
    cli::{artists, load_config, open_session, progress::PipelineProgress},
    config::Config,
    error, info,
    management::FileStore,
    server,
    session::{RefreshOutcome, Session},
    spotify::{SpotifyAuthClient, SpotifyClient, TokenExchange},
    success,
    types::PendingAuthorization,
    warning,
};

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

/// Authorizes campspot against the user's Spotify library.
///
/// Without `code` a new PKCE authorization starts: the consent page opens in
/// the browser and the code comes back through the local callback listener,
/// or is pasted by the user when the redirect URI points elsewhere. With
/// `code` a pending authorization is completed from a pasted code or
/// redirect URL.
///
/// The first successful authorization also loads the artists, unless a cache
/// already exists.
pub async fn auth(code: Option<String>) {
    let config = load_config();
    let mut session = open_session().await;
    let exchanger = SpotifyAuthClient::new(&config);

    let result: Res<()> = match code {
        Some(raw_input) => session
            .complete_manual_code(&exchanger, &raw_input)
            .await
            .map_err(Into::into),
        None => authorize(&config, &mut session, &exchanger).await,
    };

    if let Err(e) = result {
        error!("Authentication failed: {}", e);
    }
    success!("Authentication successful!");

    let Some(token) = session.token().map(str::to_string) else {
        error!("Authentication finished without an access token.");
    };
    let api = SpotifyClient::new(&config, token);
    let progress = PipelineProgress::new();
    let loaded = session
        .load_on_first_authentication(&api, |p| progress.update(p))
        .await;
    progress.finish();

    match loaded {
        Ok(Some(RefreshOutcome::Completed(summary))) => artists::report_refresh(&summary),
        Ok(_) => info!(
            "{} cached artists kept. Run `campspot artists update` to refresh.",
            session.artists().len()
        ),
        Err(e) => error!("Failed to load artists: {}", e),
    }
}

async fn authorize<X: TokenExchange>(
    config: &Config,
    session: &mut Session<FileStore>,
    exchanger: &X,
) -> Res<()> {
    let request = session.begin_authorization(config).await?;

    let listener = if request.manual_code_required {
        None
    } else {
        match server::bind(config.server_addr).await {
            Ok(listener) => Some(listener),
            Err(e) => {
                warning!(
                    "Cannot listen on {}: {}. Falling back to manual code entry.",
                    config.server_addr,
                    e
                );
                None
            }
        }
    };

    let shared_state: SharedAuthorization =
        Arc::new(Mutex::new(Some(PendingAuthorization::new(&request.state))));
    let capturing = listener.is_some();
    if let Some(listener) = listener {
        let server_state = Arc::clone(&shared_state);
        let callback_path = config.callback_path();
        tokio::spawn(async move {
            server::start_api_server(listener, server_state, &callback_path).await;
        });
    }

    if webbrowser::open(&request.url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            request.url
        )
    }

    if capturing {
        info!("Waiting for Spotify to redirect back...");
        let code = wait_for_code(shared_state).await?;
        session.complete_authorization(exchanger, &code).await?;
    } else {
        info!("After granting access, paste the URL you were redirected to (or just the code):");
        let raw_input = read_line().await?;
        session.complete_manual_code(exchanger, &raw_input).await?;
    }

    Ok(())
}

/// Polls the shared state until the callback recorded a code or an error.
async fn wait_for_code(shared_state: SharedAuthorization) -> Res<String> {
    let start = Instant::now();

    while start.elapsed() < CALLBACK_TIMEOUT {
        {
            let lock = shared_state.lock().await;
            if let Some(pending) = lock.as_ref() {
                if let Some(code) = &pending.code {
                    return Ok(code.clone());
                }
                if let Some(error) = &pending.error {
                    return Err(format!("Spotify redirected with an error: {}", error).into());
                }
            }
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    Err(format!(
        "timed out after {}s. Finish with `campspot auth --code <URL>`",
        CALLBACK_TIMEOUT.as_secs()
    )
    .into())
}

async fn read_line() -> Res<String> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    Ok(lines.next_line().await?.unwrap_or_default())
}
