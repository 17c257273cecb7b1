//! Session and cache controller.
//!
//! A [`Session`] owns the artist aggregate and decides when it comes from the
//! local cache and when the pipeline runs against Spotify:
//!
//! ```text
//! Unauthenticated ──begin_authorization──▶ Authenticating
//!        ▲                                      │ code exchanged
//!        │ 401 on track fetch                   ▼
//!        └────────────── Authenticated(Idle ⇄ Loading → Error)
//! ```
//!
//! Every operation takes `&mut self`, so one session never runs two pipelines
//! at the same time.

use std::{fmt, time::Duration};

use chrono::{DateTime, Utc};

use crate::{
    aggregate::{ArtistCollection, aggregate},
    config::{Config, GENRE_BATCH_INTERVAL},
    error::{AuthError, SessionError},
    management::{CacheRecord, CredentialManager, KeyValueStore},
    pacing::Pacer,
    spotify::{
        LibraryApi, TokenExchange,
        auth::{AuthorizationRequest, build_authorization},
        genres::{EnrichmentReport, enrich_genres},
        tracks::fetch_all_saved_tracks,
    },
    types::ProgressState,
    utils,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activity {
    Idle,
    Loading,
    /// The last refresh failed; the message is what the user saw.
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated(Activity),
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Unauthenticated => write!(f, "unauthenticated"),
            SessionState::Authenticating => write!(f, "waiting for authorization"),
            SessionState::Authenticated(Activity::Idle) => write!(f, "authenticated"),
            SessionState::Authenticated(Activity::Loading) => write!(f, "loading artists"),
            SessionState::Authenticated(Activity::Error(e)) => {
                write!(f, "authenticated (last refresh failed: {})", e)
            }
        }
    }
}

#[derive(Debug)]
pub struct RefreshSummary {
    pub tracks: usize,
    pub artists: usize,
    pub enrichment: EnrichmentReport,
}

#[derive(Debug)]
pub enum RefreshOutcome {
    Completed(RefreshSummary),
    /// A pipeline run was already in flight; nothing was started.
    AlreadyLoading,
}

pub struct Session<S: KeyValueStore> {
    store: S,
    state: SessionState,
    token: Option<String>,
    artists: ArtistCollection,
    refreshed_at: Option<DateTime<Utc>>,
    genre_interval: Duration,
}

impl<S: KeyValueStore> Session<S> {
    /// Restores the session from `store` without touching the network.
    ///
    /// A stored token means authenticated, and a cached aggregate is loaded
    /// as is. A stored verifier with the in-progress marker means an
    /// authorization is waiting for its code.
    pub async fn mount(store: S) -> Result<Self, SessionError> {
        let credentials = CredentialManager::new(&store);
        let token = credentials.access_token().await?;

        let state = if token.is_some() {
            SessionState::Authenticated(Activity::Idle)
        } else if credentials.in_progress().await? && credentials.verifier().await?.is_some() {
            SessionState::Authenticating
        } else {
            SessionState::Unauthenticated
        };

        let (artists, refreshed_at) = if token.is_some() {
            match CacheRecord::load(&store).await {
                Ok(Some(record)) => (record.artists.into_iter().collect(), record.refreshed_at),
                Ok(None) => (ArtistCollection::new(), None),
                Err(SessionError::Cache(e)) => {
                    tracing::warn!(error = %e, "ignoring unreadable artist cache");
                    (ArtistCollection::new(), None)
                }
                Err(e) => return Err(e),
            }
        } else {
            (ArtistCollection::new(), None)
        };

        Ok(Self {
            store,
            state,
            token,
            artists,
            refreshed_at,
            genre_interval: GENRE_BATCH_INTERVAL,
        })
    }

    /// Overrides the minimum spacing between genre lookups.
    pub fn with_genre_interval(mut self, interval: Duration) -> Self {
        self.genre_interval = interval;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn artists(&self) -> &ArtistCollection {
        &self.artists
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    pub fn has_cache(&self) -> bool {
        self.refreshed_at.is_some() || !self.artists.is_empty()
    }

    /// Starts a PKCE authorization. The verifier is persisted before the
    /// request is handed back, so the caller may navigate right away.
    pub async fn begin_authorization(
        &mut self,
        config: &Config,
    ) -> Result<AuthorizationRequest, SessionError> {
        self.ensure_not_loading()?;

        let request = build_authorization(config)?;
        CredentialManager::new(&self.store)
            .begin(&request.code_verifier, &request.state)
            .await?;

        self.state = SessionState::Authenticating;
        tracing::debug!(manual = request.manual_code_required, "authorization started");
        Ok(request)
    }

    /// The anti-replay state of the pending authorization, if any.
    pub async fn pending_state(&self) -> Result<Option<String>, SessionError> {
        Ok(CredentialManager::new(&self.store).state().await?)
    }

    /// Exchanges `code` with the stored verifier.
    ///
    /// On success the token is persisted and the verifier discarded. A failed
    /// exchange also discards the pending authorization and leaves the
    /// session unauthenticated; it is never retried.
    pub async fn complete_authorization<X>(
        &mut self,
        exchanger: &X,
        code: &str,
    ) -> Result<(), SessionError>
    where
        X: TokenExchange + ?Sized,
    {
        let verifier = self.stored_verifier().await?;
        let code = code.trim();
        if code.is_empty() {
            return Err(AuthError::EmptyCode.into());
        }

        let result = exchanger.exchange_code(code, &verifier).await;
        let credentials = CredentialManager::new(&self.store);
        match result {
            Ok(token) => {
                credentials.persist_access_token(&token).await?;
                credentials.finish().await?;
                self.token = Some(token);
                self.state = SessionState::Authenticated(Activity::Idle);
                Ok(())
            }
            Err(e) => {
                // cleanup failures are only logged
                if let Err(cleanup) = credentials.finish().await {
                    tracing::warn!(error = %cleanup, "failed to discard pending authorization");
                }
                self.state = if self.token.is_some() {
                    SessionState::Authenticated(Activity::Idle)
                } else {
                    SessionState::Unauthenticated
                };
                Err(e.into())
            }
        }
    }

    /// Completes authorization from pasted input: a bare code or the full
    /// redirect URL. Malformed input keeps the authorization pending.
    pub async fn complete_manual_code<X>(
        &mut self,
        exchanger: &X,
        raw_input: &str,
    ) -> Result<(), SessionError>
    where
        X: TokenExchange + ?Sized,
    {
        self.stored_verifier().await?;
        let code = utils::extract_authorization_code(raw_input).ok_or(AuthError::EmptyCode)?;
        self.complete_authorization(exchanger, &code).await
    }

    /// Runs the first load right after authorization, unless a cache exists.
    pub async fn load_on_first_authentication<A, P>(
        &mut self,
        api: &A,
        on_progress: P,
    ) -> Result<Option<RefreshOutcome>, SessionError>
    where
        A: LibraryApi + ?Sized,
        P: FnMut(ProgressState),
    {
        if self.state != SessionState::Authenticated(Activity::Idle) || self.has_cache() {
            return Ok(None);
        }
        self.refresh(api, on_progress).await.map(Some)
    }

    /// Fetches all saved tracks, rebuilds the aggregate, enriches genres and
    /// persists the result.
    ///
    /// A failed track fetch aborts the run. When Spotify rejected the token,
    /// the token is discarded and the session becomes unauthenticated. Genre
    /// failures only shorten the enrichment.
    pub async fn refresh<A, P>(
        &mut self,
        api: &A,
        mut on_progress: P,
    ) -> Result<RefreshOutcome, SessionError>
    where
        A: LibraryApi + ?Sized,
        P: FnMut(ProgressState),
    {
        match &self.state {
            SessionState::Authenticated(Activity::Loading) => {
                return Ok(RefreshOutcome::AlreadyLoading);
            }
            SessionState::Authenticated(_) => {}
            other => return Err(SessionError::InvalidState(other.to_string())),
        }
        self.state = SessionState::Authenticated(Activity::Loading);

        let tracks = match fetch_all_saved_tracks(api, &mut on_progress).await {
            Ok(tracks) => tracks,
            Err(e) if e.is_unauthorized() => {
                tracing::warn!(error = %e, "access token rejected, signing out");
                self.token = None;
                self.state = SessionState::Unauthenticated;
                CredentialManager::new(&self.store)
                    .forget_access_token()
                    .await?;
                return Err(e.into());
            }
            Err(e) => {
                self.state = SessionState::Authenticated(Activity::Error(e.to_string()));
                return Err(e.into());
            }
        };

        self.artists = aggregate(&tracks);
        let enrichment = self.run_enrichment(api, &mut on_progress).await;

        let refreshed_at = Utc::now();
        let record = CacheRecord::new(self.artists.to_vec(), refreshed_at);
        if let Err(e) = record.persist(&self.store).await {
            self.state = SessionState::Authenticated(Activity::Error(e.to_string()));
            return Err(e);
        }
        self.refreshed_at = Some(refreshed_at);
        self.state = SessionState::Authenticated(Activity::Idle);

        Ok(RefreshOutcome::Completed(RefreshSummary {
            tracks: tracks.len(),
            artists: self.artists.len(),
            enrichment,
        }))
    }

    /// Looks up genres only for cached artists that still lack them.
    pub async fn enrich_missing_genres<A, P>(
        &mut self,
        api: &A,
        mut on_progress: P,
    ) -> Result<EnrichmentReport, SessionError>
    where
        A: LibraryApi + ?Sized,
        P: FnMut(ProgressState),
    {
        self.ensure_idle()?;
        self.state = SessionState::Authenticated(Activity::Loading);

        let report = self.run_enrichment(api, &mut on_progress).await;

        let record = CacheRecord {
            artists: self.artists.to_vec(),
            refreshed_at: self.refreshed_at,
        };
        let persisted = record.persist(&self.store).await;
        self.state = SessionState::Authenticated(Activity::Idle);
        persisted.map(|_| report)
    }

    /// Drops the cached aggregate. The token is kept, so the next refresh
    /// does not need a new authorization.
    pub async fn clear_cache(&mut self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        CacheRecord::clear(&self.store).await?;
        self.artists.clear();
        self.refreshed_at = None;
        Ok(())
    }

    async fn run_enrichment<A, P>(&mut self, api: &A, on_progress: P) -> EnrichmentReport
    where
        A: LibraryApi + ?Sized,
        P: FnMut(ProgressState),
    {
        let mut pacer = Pacer::new(self.genre_interval);
        let report = enrich_genres(api, &mut self.artists, &mut pacer, on_progress).await;
        if let Some(failure) = &report.failure {
            tracing::warn!(
                error = %failure,
                enriched = report.enriched,
                requested = report.requested,
                "genre enrichment stopped early"
            );
        }
        report
    }

    async fn stored_verifier(&self) -> Result<String, SessionError> {
        CredentialManager::new(&self.store)
            .verifier()
            .await?
            .ok_or_else(|| AuthError::MissingInput.into())
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        match &self.state {
            SessionState::Authenticated(Activity::Idle) => Ok(()),
            other => Err(SessionError::InvalidState(other.to_string())),
        }
    }

    fn ensure_not_loading(&self) -> Result<(), SessionError> {
        match &self.state {
            SessionState::Authenticated(Activity::Loading) => {
                Err(SessionError::InvalidState(self.state.to_string()))
            }
            _ => Ok(()),
        }
    }
}
