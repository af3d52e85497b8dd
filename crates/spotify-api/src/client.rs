//! Client facade and bootstrap

use std::sync::Arc;

use spotify_auth::{
    AUTHORIZE_ENDPOINT, ClientIdentity, Credential, CredentialStore, Scope, TOKEN_ENDPOINT,
    build_authorization_url, exchange_code, generate_state,
};
use spotify_dispatch::{Dispatcher, Result};
use tracing::info;
use transport::Transport;

/// An authorized Web API client. Cheap to share behind an `Arc`.
pub struct Spotify {
    dispatcher: Dispatcher,
}

impl Spotify {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Snapshot of the current credential, e.g. to persist a rotated
    /// refresh token.
    pub async fn credential(&self) -> Credential {
        self.dispatcher.credentials().snapshot().await
    }
}

/// Bootstraps a [`Spotify`] client for one registered application.
///
/// Each builder carries its own random `state`; the consent redirect must
/// echo it back before the code is exchanged.
pub struct SpotifyBuilder {
    client: ClientIdentity,
    redirect_uri: String,
    state: String,
    transport: Arc<dyn Transport>,
    api_base_url: Option<String>,
    token_endpoint: String,
    authorize_endpoint: String,
}

impl SpotifyBuilder {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            client: ClientIdentity::new(client_id, client_secret),
            redirect_uri: redirect_uri.into(),
            state: generate_state(),
            transport,
            api_base_url: None,
            token_endpoint: TOKEN_ENDPOINT.to_string(),
            authorize_endpoint: AUTHORIZE_ENDPOINT.to_string(),
        }
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn with_token_endpoint(mut self, url: impl Into<String>) -> Self {
        self.token_endpoint = url.into();
        self
    }

    pub fn with_authorize_endpoint(mut self, url: impl Into<String>) -> Self {
        self.authorize_endpoint = url.into();
        self
    }

    /// The `state` value embedded in [`authorization_url`](Self::authorization_url).
    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// URL the user opens to grant `scopes`.
    pub fn authorization_url(&self, scopes: &[Scope]) -> Result<String> {
        Ok(build_authorization_url(
            &self.authorize_endpoint,
            &self.client.id,
            &self.redirect_uri,
            scopes,
            &self.state,
        )?)
    }

    /// Exchange the authorization code from the consent redirect.
    pub async fn build(self, code: &str) -> Result<Spotify> {
        let response = exchange_code(
            self.transport.as_ref(),
            &self.token_endpoint,
            &self.client,
            code,
            &self.redirect_uri,
        )
        .await?;
        info!(client_id = %self.client.id, scope = %response.scope, "authorization code exchanged");
        let credential = Credential::from_token_response(self.client.clone(), response);
        Ok(self.finish(credential))
    }

    /// Resume from an existing credential, refreshing it first when expired.
    pub async fn from_credential(self, credential: Credential) -> Result<Spotify> {
        let store = self.store(credential);
        store.refresh().await?;
        Ok(self.finish_with_store(store))
    }

    /// Resume from a stored refresh token. Fetches an access token and the
    /// granted scopes before returning.
    pub async fn from_refresh_token(self, refresh_token: impl Into<String>) -> Result<Spotify> {
        let credential = Credential::from_refresh_token(self.client.clone(), refresh_token);
        self.from_credential(credential).await
    }

    fn store(&self, credential: Credential) -> CredentialStore {
        CredentialStore::new(credential, self.transport.clone())
            .with_token_endpoint(self.token_endpoint.clone())
    }

    fn finish(self, credential: Credential) -> Spotify {
        let store = self.store(credential);
        self.finish_with_store(store)
    }

    fn finish_with_store(self, store: CredentialStore) -> Spotify {
        let mut dispatcher = Dispatcher::new(self.transport, Arc::new(store));
        if let Some(url) = self.api_base_url {
            dispatcher = dispatcher.with_base_url(url);
        }
        Spotify::new(dispatcher)
    }
}
