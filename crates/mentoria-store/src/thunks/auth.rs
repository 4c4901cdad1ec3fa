//! Session thunks: login, registration, restoration, logout, profile.

use mentoria_api::{ClientError, Credentials, ProfileUpdate, Registration, Result, User};
use tracing::{debug, info, warn};

use crate::events::Slice;
use crate::ops::OperationKey;
use crate::slices::AuthStatus;
use crate::store::Store;

impl Store {
    /// Logs in with email and password.
    ///
    /// On success the session is stored and the user returned. On failure the
    /// session is cleared and the error kept as the auth error.
    ///
    /// # Errors
    ///
    /// Returns the service error: `Validation` for blank credentials, `Auth`
    /// for rejected credentials, `Network`/`Api` otherwise.
    pub async fn login_user(&self, credentials: Credentials) -> Result<User> {
        let request = self.begin_auth(OperationKey::Login).await;
        match self.api().auth().login(&credentials).await {
            Ok(session) => {
                let user = session.user.clone();
                info!(email = %user.email, request = %request, "Login succeeded");
                self.dispatch(Slice::Auth, "login/fulfilled", |s| {
                    s.auth.login_fulfilled(request, session);
                })
                .await;
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, request = %request, "Login failed");
                let err = e.clone();
                self.dispatch(Slice::Auth, "login/rejected", |s| {
                    s.auth.login_rejected(request, err);
                })
                .await;
                Err(e)
            }
        }
    }

    /// Registers an account and logs it in.
    ///
    /// # Errors
    ///
    /// Returns the error of the registration or of the follow-up login.
    pub async fn register_user(&self, registration: Registration) -> Result<User> {
        let request = self.begin_auth(OperationKey::Register).await;
        match self.api().auth().register(&registration).await {
            Ok(session) => {
                let user = session.user.clone();
                info!(email = %user.email, "Registration succeeded");
                self.dispatch(Slice::Auth, "register/fulfilled", |s| {
                    s.auth.register_fulfilled(request, session);
                })
                .await;
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "Registration failed");
                let err = e.clone();
                self.dispatch(Slice::Auth, "register/rejected", |s| {
                    s.auth.register_rejected(request, err);
                })
                .await;
                Err(e)
            }
        }
    }

    /// Restores the session from the persisted token.
    ///
    /// The profile fetch is capped by `auth_init_timeout`. On timeout or any
    /// failure the persisted token is removed and the store stays anonymous.
    /// Never fails; returns the resulting auth status.
    pub async fn initialize_auth(&self) -> AuthStatus {
        let token = match self.api().auth().stored_token() {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("No persisted session");
                return self.select(|s| s.auth.status()).await;
            }
            Err(e) => {
                warn!(error = %e, "Persisted session unreadable, discarding it");
                self.discard_token(None);
                return self.select(|s| s.auth.status()).await;
            }
        };

        let request = self.begin_auth(OperationKey::InitializeAuth).await;
        let limit = self.config().auth_init_timeout();
        let outcome = tokio::time::timeout(limit, self.api().auth().get_profile()).await;

        match outcome {
            Ok(Ok(user)) => {
                info!(email = %user.email, "Session restored");
                self.dispatch(Slice::Auth, "initialize_auth/fulfilled", |s| {
                    s.auth.initialize_fulfilled(request, token, user)
                })
                .await;
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Session restoration failed");
                self.discard_token(Some(&token));
                self.dispatch(Slice::Auth, "initialize_auth/rejected", |s| {
                    s.auth.initialize_rejected(request)
                })
                .await;
            }
            Err(_) => {
                warn!(timeout_ms = limit.as_millis(), "Session restoration timed out");
                self.discard_token(Some(&token));
                self.dispatch(Slice::Auth, "initialize_auth/rejected", |s| {
                    s.auth.initialize_rejected(request)
                })
                .await;
            }
        }
        self.select(|s| s.auth.status()).await
    }

    /// Ends the session locally.
    ///
    /// The persisted token and every in-memory auth field are cleared, along
    /// with the mentors loaded for the session. No request is sent.
    pub async fn logout_user(&self) {
        if let Err(e) = self.api().auth().logout() {
            warn!(error = %e, "Failed to remove persisted token");
        }
        self.dispatch(Slice::Auth, "logout", |s| s.auth.logout())
            .await;
        self.dispatch(Slice::Mentors, "reset", |s| s.mentors.reset())
            .await;
        info!("Logged out");
    }

    /// Updates the user's profile settings.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty update, or the service error.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<()> {
        let request = self.begin_auth(OperationKey::UpdateProfile).await;
        let result = if update.is_empty() {
            Err(ClientError::validation("Nothing to update"))
        } else {
            self.api().auth().update_profile(&update).await
        };
        match result {
            Ok(response) => {
                self.dispatch(Slice::Auth, "update_profile/fulfilled", |s| {
                    s.auth.update_profile_fulfilled(request, &update, response);
                })
                .await;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Profile update failed");
                let err = e.clone();
                self.dispatch(Slice::Auth, "update_profile/rejected", |s| {
                    s.auth.update_profile_rejected(request, err);
                })
                .await;
                self.handle_session_expiry(&e).await;
                Err(e)
            }
        }
    }

    /// Removes the persisted token, but only if it is still `expected`.
    ///
    /// A token written by a login that raced with restoration is kept.
    fn discard_token(&self, expected: Option<&str>) {
        let tokens = self.api().tokens();
        if let Some(expected) = expected {
            match tokens.load() {
                Ok(Some(current)) if current != expected => return,
                Ok(None) => return,
                _ => {}
            }
        }
        if let Err(e) = tokens.clear() {
            warn!(error = %e, "Failed to remove persisted token");
        }
    }
}
