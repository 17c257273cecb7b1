mod common;

use std::time::Duration;

use campspot::{
    config::Config,
    error::{AuthError, SessionError},
    management::{KeyValueStore, MemoryStore, keys},
    session::{Activity, RefreshOutcome, RefreshSummary, Session, SessionState},
};
use common::{
    FakeExchanger, FakeLibrary, PageFailure, RemoveFailingStore, artist_id, one_artist_per_track,
    skewed_library,
};
use reqwest::Url;

const LOOPBACK_REDIRECT: &str = "http://127.0.0.1:8888/callback";

fn config() -> Config {
    Config::new("test-client", LOOPBACK_REDIRECT)
}

async fn mount(store: &MemoryStore) -> Session<MemoryStore> {
    Session::mount(store.clone())
        .await
        .unwrap()
        .with_genre_interval(Duration::ZERO)
}

async fn authenticated(store: &MemoryStore) -> Session<MemoryStore> {
    store.set(keys::ACCESS_TOKEN, "stored-token").await.unwrap();
    mount(store).await
}

fn completed(outcome: RefreshOutcome) -> RefreshSummary {
    match outcome {
        RefreshOutcome::Completed(summary) => summary,
        RefreshOutcome::AlreadyLoading => panic!("expected a completed refresh"),
    }
}

#[tokio::test]
async fn test_mount_empty_store_is_unauthenticated() {
    let store = MemoryStore::new();
    let session = mount(&store).await;

    assert_eq!(session.state(), &SessionState::Unauthenticated);
    assert!(!session.is_authenticated());
    assert!(!session.has_cache());
}

#[tokio::test]
async fn test_mount_with_pending_authorization() {
    let store = MemoryStore::new();
    store.set(keys::CODE_VERIFIER, "verifier").await.unwrap();
    store.set(keys::AUTH_IN_PROGRESS, "true").await.unwrap();

    let session = mount(&store).await;
    assert_eq!(session.state(), &SessionState::Authenticating);

    // the marker alone is not enough to complete anything
    store.remove(keys::CODE_VERIFIER).await.unwrap();
    let session = mount(&store).await;
    assert_eq!(session.state(), &SessionState::Unauthenticated);
}

#[tokio::test]
async fn test_mount_ignores_corrupt_cache() {
    let store = MemoryStore::new();
    store.set(keys::ARTIST_CACHE, "{ broken").await.unwrap();

    let session = authenticated(&store).await;

    assert_eq!(session.state(), &SessionState::Authenticated(Activity::Idle));
    assert!(session.artists().is_empty());
    assert!(!session.has_cache());
}

#[tokio::test]
async fn test_begin_authorization_persists_before_redirect() {
    let store = MemoryStore::new();
    let mut session = mount(&store).await;

    let request = session.begin_authorization(&config()).await.unwrap();

    assert_eq!(session.state(), &SessionState::Authenticating);
    assert!(!request.manual_code_required);
    assert_eq!(
        store.get(keys::CODE_VERIFIER).await.unwrap(),
        Some(request.code_verifier.clone())
    );
    assert_eq!(
        session.pending_state().await.unwrap(),
        Some(request.state.clone())
    );
    assert!(store.contains(keys::AUTH_IN_PROGRESS));

    let url = Url::parse(&request.url).unwrap();
    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    };
    assert_eq!(param("client_id").as_deref(), Some("test-client"));
    assert_eq!(param("response_type").as_deref(), Some("code"));
    assert_eq!(param("redirect_uri").as_deref(), Some(LOOPBACK_REDIRECT));
    assert_eq!(param("code_challenge_method").as_deref(), Some("S256"));
    assert_eq!(
        param("code_challenge"),
        Some(campspot::utils::generate_code_challenge(&request.code_verifier))
    );
    assert_eq!(param("state"), Some(request.state.clone()));

    // a reload finds the authorization still pending
    let remounted = mount(&store).await;
    assert_eq!(remounted.state(), &SessionState::Authenticating);
}

#[tokio::test]
async fn test_begin_authorization_for_hosted_redirect() {
    let store = MemoryStore::new();
    let mut session = mount(&store).await;
    let config = Config::new("test-client", "https://listener.github.io/campspot/callback");

    let request = session.begin_authorization(&config).await.unwrap();

    assert!(request.manual_code_required);
}

#[tokio::test]
async fn test_complete_authorization_uses_stored_verifier() {
    let store = MemoryStore::new();
    let mut session = mount(&store).await;
    let request = session.begin_authorization(&config()).await.unwrap();
    let exchanger = FakeExchanger::granting("fresh-token");

    session
        .complete_authorization(&exchanger, "auth-code")
        .await
        .unwrap();

    assert_eq!(
        exchanger.calls(),
        vec![("auth-code".to_string(), request.code_verifier)]
    );
    assert_eq!(session.state(), &SessionState::Authenticated(Activity::Idle));
    assert_eq!(session.token(), Some("fresh-token"));
    assert_eq!(
        store.get(keys::ACCESS_TOKEN).await.unwrap().as_deref(),
        Some("fresh-token")
    );
    assert!(!store.contains(keys::CODE_VERIFIER));
    assert!(!store.contains(keys::AUTH_STATE));
    assert!(!store.contains(keys::AUTH_IN_PROGRESS));
}

#[tokio::test]
async fn test_failed_exchange_leaves_session_signed_out() {
    let store = MemoryStore::new();
    let mut session = mount(&store).await;
    session.begin_authorization(&config()).await.unwrap();
    let library = FakeLibrary::new(skewed_library());

    let result = session
        .complete_authorization(&FakeExchanger::without_token(), "auth-code")
        .await;

    assert!(matches!(
        result,
        Err(SessionError::Auth(AuthError::Exchange(_)))
    ));
    assert_eq!(session.state(), &SessionState::Unauthenticated);
    assert!(!store.contains(keys::ACCESS_TOKEN));
    assert!(!store.contains(keys::CODE_VERIFIER));

    let loaded = session
        .load_on_first_authentication(&library, |_| {})
        .await
        .unwrap();
    assert!(loaded.is_none());
    assert!(library.page_requests().is_empty());
}

#[tokio::test]
async fn test_failed_exchange_reported_even_when_cleanup_fails() {
    let store = RemoveFailingStore::default();
    let mut session = Session::mount(store.clone()).await.unwrap();
    session.begin_authorization(&config()).await.unwrap();

    let result = session
        .complete_authorization(&FakeExchanger::without_token(), "auth-code")
        .await;

    assert!(matches!(
        result,
        Err(SessionError::Auth(AuthError::Exchange(_)))
    ));
    assert_eq!(session.state(), &SessionState::Unauthenticated);
    assert!(!store.inner.contains(keys::ACCESS_TOKEN));
}

#[tokio::test]
async fn test_manual_code_from_redirect_url() {
    let store = MemoryStore::new();
    let mut session = mount(&store).await;
    session.begin_authorization(&config()).await.unwrap();
    let exchanger = FakeExchanger::granting("manual-token");

    session
        .complete_manual_code(
            &exchanger,
            "https://listener.github.io/campspot/callback?code=pasted-code&state=abc",
        )
        .await
        .unwrap();

    assert_eq!(exchanger.calls()[0].0, "pasted-code");
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn test_manual_code_without_pending_authorization() {
    let store = MemoryStore::new();
    let mut session = mount(&store).await;
    let exchanger = FakeExchanger::granting("never");

    let result = session.complete_manual_code(&exchanger, "some-code").await;

    assert!(matches!(
        result,
        Err(SessionError::Auth(AuthError::MissingInput))
    ));
    assert!(exchanger.calls().is_empty());
}

#[tokio::test]
async fn test_manual_code_blank_input_keeps_authorization_pending() {
    let store = MemoryStore::new();
    let mut session = mount(&store).await;
    session.begin_authorization(&config()).await.unwrap();
    let exchanger = FakeExchanger::granting("never");

    let result = session.complete_manual_code(&exchanger, "   ").await;

    assert!(matches!(
        result,
        Err(SessionError::Auth(AuthError::EmptyCode))
    ));
    assert_eq!(session.state(), &SessionState::Authenticating);
    assert!(store.contains(keys::CODE_VERIFIER));
    assert!(exchanger.calls().is_empty());
}

#[tokio::test]
async fn test_first_load_builds_and_persists_cache() {
    let store = MemoryStore::new();
    let mut session = mount(&store).await;
    session.begin_authorization(&config()).await.unwrap();
    session
        .complete_authorization(&FakeExchanger::granting("token"), "code")
        .await
        .unwrap();
    let library = FakeLibrary::new(skewed_library()).with_genres_for_all();

    let summary = completed(
        session
            .load_on_first_authentication(&library, |_| {})
            .await
            .unwrap()
            .unwrap(),
    );

    assert_eq!(summary.tracks, 120);
    assert_eq!(summary.artists, 40);
    assert!(summary.enrichment.is_complete());
    assert_eq!(session.artists().get(&artist_id(0)).unwrap().saved_count, 61);
    assert!(store.contains(keys::ARTIST_CACHE));
    assert!(session.refreshed_at().is_some());

    // a reload serves the cache without touching the network
    let mut remounted = mount(&store).await;
    assert_eq!(remounted.artists(), session.artists());
    assert_eq!(remounted.refreshed_at(), session.refreshed_at());

    let again = FakeLibrary::new(skewed_library());
    let loaded = remounted
        .load_on_first_authentication(&again, |_| {})
        .await
        .unwrap();
    assert!(loaded.is_none());
    assert!(again.page_requests().is_empty());
}

#[tokio::test]
async fn test_rejected_token_signs_out() {
    let store = MemoryStore::new();
    let mut session = authenticated(&store).await;
    let mut library = FakeLibrary::new(skewed_library());
    library.fail_page_at = Some((0, PageFailure::Unauthorized));

    let result = session.refresh(&library, |_| {}).await;

    assert!(matches!(result, Err(SessionError::Fetch(ref e)) if e.is_unauthorized()));
    assert_eq!(session.state(), &SessionState::Unauthenticated);
    assert_eq!(session.token(), None);
    assert!(!store.contains(keys::ACCESS_TOKEN));
}

#[tokio::test]
async fn test_failed_page_keeps_token_and_reports_error() {
    let store = MemoryStore::new();
    let mut session = authenticated(&store).await;
    let mut library = FakeLibrary::new(skewed_library());
    library.fail_page_at = Some((50, PageFailure::ServerError));

    let result = session.refresh(&library, |_| {}).await;

    assert!(matches!(result, Err(SessionError::Fetch(ref e)) if e.offset == 50));
    assert!(matches!(
        session.state(),
        SessionState::Authenticated(Activity::Error(_))
    ));
    assert!(store.contains(keys::ACCESS_TOKEN));
    assert!(!store.contains(keys::ARTIST_CACHE));

    // the next refresh may try again
    let healthy = FakeLibrary::new(skewed_library());
    completed(session.refresh(&healthy, |_| {}).await.unwrap());
    assert_eq!(session.state(), &SessionState::Authenticated(Activity::Idle));
}

#[tokio::test]
async fn test_genre_failure_still_completes_refresh() {
    let store = MemoryStore::new();
    let mut session = authenticated(&store).await;
    let mut library = FakeLibrary::new(one_artist_per_track(120)).with_genres_for_all();
    library.fail_genre_batch = Some(1);

    let summary = completed(session.refresh(&library, |_| {}).await.unwrap());

    assert_eq!(summary.artists, 120);
    assert_eq!(summary.enrichment.enriched, 50);
    assert!(summary.enrichment.failure.is_some());
    assert_eq!(session.state(), &SessionState::Authenticated(Activity::Idle));
    assert!(store.contains(keys::ARTIST_CACHE));
    assert_eq!(session.artists().ids_needing_genres().len(), 70);

    // a later pass only asks for what is missing
    let refreshed_at = session.refreshed_at();
    let retry = FakeLibrary::new(one_artist_per_track(120)).with_genres_for_all();
    let report = session
        .enrich_missing_genres(&retry, |_| {})
        .await
        .unwrap();

    assert_eq!(report.requested, 70);
    assert_eq!(report.enriched, 70);
    assert!(retry.artist_requests().iter().all(|batch| {
        batch.iter().all(|id| id.as_str() >= artist_id(50).as_str())
    }));
    assert!(session.artists().ids_needing_genres().is_empty());
    assert_eq!(session.refreshed_at(), refreshed_at);

    let remounted = mount(&store).await;
    assert!(remounted.artists().ids_needing_genres().is_empty());
}

#[tokio::test]
async fn test_clear_cache_keeps_authorization() {
    let store = MemoryStore::new();
    let mut session = authenticated(&store).await;
    let library = FakeLibrary::new(skewed_library());
    completed(session.refresh(&library, |_| {}).await.unwrap());

    session.clear_cache().await.unwrap();

    assert!(session.artists().is_empty());
    assert!(!session.has_cache());
    assert!(!store.contains(keys::ARTIST_CACHE));
    assert!(store.contains(keys::ACCESS_TOKEN));
    assert!(session.is_authenticated());

    let summary = completed(session.refresh(&library, |_| {}).await.unwrap());
    assert_eq!(summary.artists, 40);
}

#[tokio::test]
async fn test_operations_require_authentication() {
    let store = MemoryStore::new();
    let mut session = mount(&store).await;
    let library = FakeLibrary::new(skewed_library());

    assert!(matches!(
        session.refresh(&library, |_| {}).await,
        Err(SessionError::InvalidState(_))
    ));
    assert!(matches!(
        session.enrich_missing_genres(&library, |_| {}).await,
        Err(SessionError::InvalidState(_))
    ));
    assert!(matches!(
        session.clear_cache().await,
        Err(SessionError::InvalidState(_))
    ));
    assert!(library.page_requests().is_empty());
    assert!(library.artist_requests().is_empty());
}

#[tokio::test]
async fn test_refresh_reports_progress_for_both_stages() {
    use campspot::types::Stage;

    let store = MemoryStore::new();
    let mut session = authenticated(&store).await;
    let library = FakeLibrary::new(skewed_library()).with_genres_for_all();
    let mut stages = Vec::new();

    completed(
        session
            .refresh(&library, |p| stages.push((p.stage, p.current, p.total)))
            .await
            .unwrap(),
    );

    assert_eq!(
        stages,
        vec![
            (Stage::FetchingTracks, 50, 120),
            (Stage::FetchingTracks, 100, 120),
            (Stage::FetchingTracks, 120, 120),
            (Stage::FetchingGenres, 40, 40),
        ]
    );
}
