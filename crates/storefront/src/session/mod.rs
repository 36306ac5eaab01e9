//! Client-side authentication state.
//!
//! A [`Session`] holds the bearer token and the user it resolves to:
//!
//! ```text
//! Unverified --restore--> Verifying --ok--> Authenticated(user)
//!      |                      |                  |
//!      +--(no token)--+       +--(any failure)---+--logout--> Anonymous
//! ```
//!
//! `login` and `register` never raise. A refused call comes back as an
//! [`AuthFailure`] whose `reason` can be shown as-is, and the session keeps
//! whatever state it had before the call.

mod failure;
mod store;

pub use failure::{AuthFailure, AuthFailureKind, login_failure, register_failure};
pub use store::{FileTokenStore, MemoryTokenStore, StoreError, TokenStore};

use megacart_core::Email;
use secrecy::SecretString;
use tracing::instrument;

use crate::api::{AuthApi, AuthGrant, Registration, User};
use crate::error::{clear_sentry_user, set_sentry_user};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// Created, stored token not yet looked at
    #[default]
    Unverified,
    /// Stored token is being checked against the backend
    Verifying,
    /// Token verified; the user is known
    Authenticated(User),
    /// No usable token
    Anonymous,
}

/// Bearer token plus resolved user, backed by a durable [`TokenStore`].
///
/// Methods take `&mut self`, so calls on one session never overlap.
pub struct Session<A, S> {
    api: A,
    store: S,
    state: AuthState,
    token: Option<SecretString>,
}

impl<A: AuthApi, S: TokenStore> Session<A, S> {
    pub fn new(api: A, store: S) -> Self {
        Self {
            api,
            store,
            state: AuthState::Unverified,
            token: None,
        }
    }

    pub const fn state(&self) -> &AuthState {
        &self.state
    }

    /// The signed-in user, present only after a successful verification,
    /// login or registration.
    pub const fn user(&self) -> Option<&User> {
        match &self.state {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub const fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::Authenticated(_))
    }

    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// Verify the stored token, if any, and settle into `Authenticated` or
    /// `Anonymous`.
    ///
    /// Any failure discards the token both in memory and in the store.
    #[instrument(skip(self))]
    pub async fn restore(&mut self) -> &AuthState {
        let stored = match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored token");
                None
            }
        };

        let Some(token) = stored else {
            self.state = AuthState::Anonymous;
            return &self.state;
        };

        self.state = AuthState::Verifying;
        match self.api.current_user(&token).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Restored session");
                self.authenticate(token, user, false);
            }
            Err(e) => {
                tracing::info!(error = %e, "Stored token rejected, signing out");
                self.discard();
            }
        }
        &self.state
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthFailure`] describing why the backend refused. The
    /// session state is left untouched in that case.
    #[instrument(skip(self, password))]
    pub async fn login(
        &mut self,
        email: &Email,
        password: &SecretString,
    ) -> Result<User, AuthFailure> {
        match self.api.login(email, password).await {
            Ok(AuthGrant {
                token: Some(token),
                user,
            }) => {
                tracing::info!(user_id = %user.id, "Logged in");
                self.authenticate(token, user.clone(), true);
                Ok(user)
            }
            Ok(AuthGrant { token: None, .. }) => {
                tracing::warn!("Login response carried no access token");
                Err(AuthFailure::unexpected_login())
            }
            Err(e) => {
                tracing::info!(error = %e, "Login refused");
                Err(login_failure(&e))
            }
        }
    }

    /// Create an account.
    ///
    /// When the backend answers with a token the session becomes
    /// `Authenticated`. A bare user record means the account exists but the
    /// shopper still has to log in, so the session stays as it was.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthFailure`] describing why the backend refused.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&mut self, registration: &Registration) -> Result<User, AuthFailure> {
        match self.api.register(registration).await {
            Ok(AuthGrant {
                token: Some(token),
                user,
            }) => {
                tracing::info!(user_id = %user.id, "Registered and logged in");
                self.authenticate(token, user.clone(), true);
                Ok(user)
            }
            Ok(AuthGrant { token: None, user }) => {
                tracing::info!(user_id = %user.id, "Registered, login required");
                Ok(user)
            }
            Err(e) => {
                tracing::info!(error = %e, "Registration refused");
                Err(register_failure(&e))
            }
        }
    }

    /// Forget the token and user, here and in the store.
    pub fn logout(&mut self) {
        self.discard();
        tracing::info!("Logged out");
    }

    fn authenticate(&mut self, token: SecretString, user: User, persist: bool) {
        if persist && let Err(e) = self.store.save(&token) {
            tracing::warn!(error = %e, "Failed to persist token");
        }
        set_sentry_user(&user.id, Some(user.email.as_str()));
        self.token = Some(token);
        self.state = AuthState::Authenticated(user);
    }

    fn discard(&mut self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "Failed to clear stored token");
        }
        clear_sentry_user();
        self.token = None;
        self.state = AuthState::Anonymous;
    }
}

impl<A, S> std::fmt::Debug for Session<A, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}
