//! Auth session: token lifecycle and the authenticated user.
//!
//! The bearer token is the session. It lives in the shared [`TokenStore`]
//! (read by the transport on every request) and is mirrored to durable
//! storage so the session survives restarts. Holding a token means
//! "authenticated"; the profile itself comes from the cached
//! `current_user` read.

use std::sync::Arc;

use secrecy::SecretString;
use thiserror::Error;
use tracing::{instrument, warn};

use clementine_core::{Credentials, NewUser, User, UserPatch};

use crate::api::cache::Resource;
use crate::api::{ApiError, StoreClient, TokenStore, Transport};
use crate::storage::{Storage, keys};

/// Errors from authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The server rejected the email/password pair.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Registration hit an existing account.
    #[error("an account with this email already exists")]
    AccountExists,

    /// The operation requires a logged-in session.
    #[error("not logged in")]
    NotAuthenticated,

    /// Any other API failure.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Owner of the session token and account operations.
pub struct AuthSession<T> {
    client: StoreClient<T>,
    tokens: TokenStore,
    storage: Arc<dyn Storage>,
}

impl<T: Transport> AuthSession<T> {
    /// Create a session, restoring a persisted token if one exists.
    ///
    /// A storage read failure degrades to an unauthenticated session.
    #[must_use]
    pub fn new(client: StoreClient<T>, tokens: TokenStore, storage: Arc<dyn Storage>) -> Self {
        match storage.get(keys::AUTH_TOKEN) {
            Ok(Some(token)) => tokens.set(SecretString::from(token)),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "could not read persisted auth token"),
        }
        Self {
            client,
            tokens,
            storage,
        }
    }

    /// Whether a session token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_authenticated()
    }

    /// Register a new account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AccountExists`] when the email is taken, or
    /// the underlying API error otherwise.
    #[instrument(skip(self, user))]
    pub async fn register(&self, user: &NewUser) -> Result<(), AuthError> {
        self.client.register(user).await.map_err(|e| match e {
            ApiError::Client { ref message, .. } if message.to_lowercase().contains("exists") => {
                AuthError::AccountExists
            }
            other => AuthError::Api(other),
        })
    }

    /// Exchange credentials for a session and return the profile.
    ///
    /// The token is kept in memory and mirrored to durable storage
    /// (best-effort). Any previously cached user data is invalidated
    /// before the profile is fetched.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] on rejection, or the
    /// underlying API error.
    #[instrument(skip(self, credentials))]
    pub async fn login(&self, credentials: &Credentials) -> Result<User, AuthError> {
        let response = self.client.login(credentials).await.map_err(|e| match e {
            ApiError::Unauthorized(_) | ApiError::Client { status: 400, .. } => {
                AuthError::InvalidCredentials
            }
            other => AuthError::Api(other),
        })?;

        self.tokens
            .set(SecretString::from(response.access_token.clone()));
        if let Err(e) = self.storage.set(keys::AUTH_TOKEN, &response.access_token) {
            warn!(error = %e, "skipping auth token persistence");
        }

        // A previous user's profile may still be cached.
        self.client.invalidate(Resource::Users).await;
        Ok(self.client.current_user().await?)
    }

    /// Drop the session: clear the token from memory and storage and
    /// sweep cached user data.
    pub async fn logout(&self) {
        self.tokens.clear();
        if let Err(e) = self.storage.remove(keys::AUTH_TOKEN) {
            warn!(error = %e, "could not erase persisted auth token");
        }
        self.client.invalidate(Resource::Users).await;
    }

    /// The authenticated user's profile (cached).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotAuthenticated`] without a session, or the
    /// underlying API error.
    pub async fn current_user(&self) -> Result<User, AuthError> {
        if !self.is_authenticated() {
            return Err(AuthError::NotAuthenticated);
        }
        Ok(self.client.current_user().await?)
    }

    /// Update the authenticated user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotAuthenticated`] without a session, or the
    /// underlying API error.
    #[instrument(skip(self, patch))]
    pub async fn update_profile(&self, patch: &UserPatch) -> Result<User, AuthError> {
        let user = self.current_user().await?;
        Ok(self.client.update_user(user.id, patch).await?)
    }

    /// Delete the authenticated user's account and end the session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotAuthenticated`] without a session, or the
    /// underlying API error.
    #[instrument(skip(self))]
    pub async fn delete_account(&self) -> Result<(), AuthError> {
        let user = self.current_user().await?;
        self.client.delete_user(user.id).await?;
        self.logout().await;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clementine_core::Email;

    use crate::api::testing::{MockTransport, login_json, test_config, user_json};
    use crate::storage::MemoryStorage;

    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            email: Email::parse("ada@example.com").unwrap(),
            password: "correct horse".to_owned(),
        }
    }

    fn session(
        responses: Vec<Result<serde_json::Value, ApiError>>,
        storage: Arc<MemoryStorage>,
    ) -> (AuthSession<MockTransport>, MockTransport, TokenStore) {
        let transport = MockTransport::new(responses);
        let tokens = TokenStore::new();
        let client = StoreClient::new(transport.clone(), &test_config());
        let session = AuthSession::new(client, tokens.clone(), storage as Arc<dyn Storage>);
        (session, transport, tokens)
    }

    #[tokio::test]
    async fn login_stores_and_persists_the_token() {
        let storage = Arc::new(MemoryStorage::new());
        let (session, _transport, tokens) = session(
            vec![Ok(login_json("tok-123")), Ok(user_json("Ada"))],
            Arc::clone(&storage),
        );
        assert!(!session.is_authenticated());

        let user = session.login(&credentials()).await.unwrap();
        assert_eq!(user.name, "Ada");
        assert!(session.is_authenticated());
        assert!(tokens.is_authenticated());
        assert_eq!(
            storage.get(keys::AUTH_TOKEN).unwrap().as_deref(),
            Some("tok-123")
        );
    }

    #[tokio::test]
    async fn rejected_credentials_map_to_invalid_credentials() {
        let storage = Arc::new(MemoryStorage::new());
        let (session, _transport, _tokens) = session(
            vec![Err(ApiError::from_status(
                401,
                "Invalid email or password".to_owned(),
            ))],
            storage,
        );

        let err = session.login(&credentials()).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn a_persisted_token_restores_the_session() {
        let storage = Arc::new(MemoryStorage::with_entries([(keys::AUTH_TOKEN, "tok-123")]));
        let (session, _transport, _tokens) = session(vec![], storage);
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn logout_erases_the_persisted_token() {
        let storage = Arc::new(MemoryStorage::with_entries([(keys::AUTH_TOKEN, "tok-123")]));
        let (initial, _transport, _tokens) = session(vec![], Arc::clone(&storage));

        initial.logout().await;
        assert!(!initial.is_authenticated());
        assert_eq!(storage.get(keys::AUTH_TOKEN).unwrap(), None);

        // A fresh session over the same storage is unauthenticated.
        let (fresh, _transport, _tokens) = session(vec![], storage);
        assert!(!fresh.is_authenticated());
    }

    #[tokio::test]
    async fn current_user_requires_a_session() {
        let storage = Arc::new(MemoryStorage::new());
        let (session, transport, _tokens) = session(vec![], storage);

        let err = session.current_user().await.unwrap_err();
        assert!(matches!(err, AuthError::NotAuthenticated));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn register_maps_existing_accounts() {
        let storage = Arc::new(MemoryStorage::new());
        let (session, _transport, _tokens) = session(
            vec![Err(ApiError::from_status(
                400,
                "User already exists".to_owned(),
            ))],
            storage,
        );

        let new_user = NewUser {
            name: "Ada".to_owned(),
            email: Email::parse("ada@example.com").unwrap(),
            password: "correct horse".to_owned(),
            address: "1 Loop Way".to_owned(),
        };
        let err = session.register(&new_user).await.unwrap_err();
        assert!(matches!(err, AuthError::AccountExists));
    }
}
