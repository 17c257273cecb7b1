use crate::{
    error::StoreError,
    management::store::{KeyValueStore, keys},
};

/// Typed access to the authorization entries of a store.
pub struct CredentialManager<'s, S: KeyValueStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: KeyValueStore + ?Sized> CredentialManager<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    pub async fn access_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .store
            .get(keys::ACCESS_TOKEN)
            .await?
            .filter(|t| !t.is_empty()))
    }

    pub async fn persist_access_token(&self, token: &str) -> Result<(), StoreError> {
        self.store.set(keys::ACCESS_TOKEN, token).await
    }

    pub async fn forget_access_token(&self) -> Result<(), StoreError> {
        self.store.remove(keys::ACCESS_TOKEN).await
    }

    /// Records a started authorization. Must happen before the redirect.
    pub async fn begin(&self, verifier: &str, state: &str) -> Result<(), StoreError> {
        self.store.set(keys::CODE_VERIFIER, verifier).await?;
        self.store.set(keys::AUTH_STATE, state).await?;
        self.store.set(keys::AUTH_IN_PROGRESS, "true").await
    }

    pub async fn verifier(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .store
            .get(keys::CODE_VERIFIER)
            .await?
            .filter(|v| !v.is_empty()))
    }

    pub async fn state(&self) -> Result<Option<String>, StoreError> {
        self.store.get(keys::AUTH_STATE).await
    }

    pub async fn in_progress(&self) -> Result<bool, StoreError> {
        Ok(self.store.get(keys::AUTH_IN_PROGRESS).await?.as_deref() == Some("true"))
    }

    /// Drops the verifier, state and in-progress marker.
    pub async fn finish(&self) -> Result<(), StoreError> {
        self.store.remove(keys::AUTH_IN_PROGRESS).await?;
        self.store.remove(keys::CODE_VERIFIER).await?;
        self.store.remove(keys::AUTH_STATE).await
    }
}
