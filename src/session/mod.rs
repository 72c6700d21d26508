pub mod store;

use std::sync::{Arc, PoisonError, RwLock};

use crate::alerts::Alert;
use crate::client::types::{TokenPair, UserProfile};
use crate::client::{BackendClient, TokenProvider};

pub use store::{FileSessionStore, MemorySessionStore, SessionState, SessionStore};

/// The analyst's authenticated session.
///
/// Holds the bearer credential and profile in memory and writes every change
/// through to its [`SessionStore`]. Shared as `Arc<Session>`; the backend
/// client reads the access token from it via [`TokenProvider`].
pub struct Session {
    store: Arc<dyn SessionStore>,
    state: RwLock<SessionState>,
}

impl Session {
    /// Restore the session persisted in `store`.
    pub fn init(store: Arc<dyn SessionStore>) -> eyre::Result<Self> {
        let state = store.load()?;
        if let Some(user) = &state.user {
            tracing::info!(username = %user.username, "Session restored");
        }
        Ok(Self {
            store,
            state: RwLock::new(state),
        })
    }

    /// Flush the in-memory state to the store.
    pub fn teardown(&self) -> eyre::Result<()> {
        self.store.save(&self.snapshot())
    }

    pub fn snapshot(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .access_token
            .is_some()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.snapshot().user
    }

    pub fn last_investigated(&self) -> Option<Alert> {
        self.snapshot().last_investigated_alert
    }

    fn update(&self, mutate: impl FnOnce(&mut SessionState)) -> eyre::Result<()> {
        let next = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            mutate(&mut state);
            state.clone()
        };
        self.store.save(&next)
    }

    fn establish(&self, tokens: TokenPair, user: UserProfile) -> eyre::Result<UserProfile> {
        let profile = user.clone();
        self.update(move |state| {
            state.access_token = Some(tokens.access);
            state.refresh_token = Some(tokens.refresh);
            state.user = Some(user);
        })?;
        tracing::info!(username = %profile.username, "Logged in");
        Ok(profile)
    }

    pub async fn login(
        &self,
        client: &BackendClient,
        username: &str,
        password: &str,
    ) -> eyre::Result<UserProfile> {
        let tokens = client.login(username, password).await?;
        self.establish(
            tokens,
            UserProfile {
                username: username.to_string(),
                email: None,
            },
        )
    }

    pub async fn signup(
        &self,
        client: &BackendClient,
        username: &str,
        password: &str,
        email: &str,
    ) -> eyre::Result<UserProfile> {
        let response = client.signup(username, password, email).await?;
        self.establish(response.tokens, response.user)
    }

    pub async fn google_login(
        &self,
        client: &BackendClient,
        id_token: &str,
    ) -> eyre::Result<UserProfile> {
        let response = client.google_login(id_token).await?;
        self.establish(response.tokens, response.user)
    }

    /// Exchange the stored refresh token for a new access token.
    pub async fn refresh(&self, client: &BackendClient) -> eyre::Result<()> {
        let refresh = self
            .snapshot()
            .refresh_token
            .ok_or_else(|| eyre::eyre!("No refresh token in session, please log in"))?;
        let token = client.refresh_access(&refresh).await?;
        self.update(|state| state.access_token = Some(token.access))?;
        tracing::debug!("Access token refreshed");
        Ok(())
    }

    /// Drop credentials and profile. The last investigated alert is kept.
    pub fn logout(&self) -> eyre::Result<()> {
        self.update(|state| {
            state.access_token = None;
            state.refresh_token = None;
            state.user = None;
        })?;
        tracing::info!("Logged out");
        Ok(())
    }

    pub fn remember_alert(&self, alert: &Alert) -> eyre::Result<()> {
        let alert = alert.clone();
        self.update(move |state| state.last_investigated_alert = Some(alert))
    }
}

impl TokenProvider for Session {
    fn access_token(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .access_token
            .clone()
    }
}
