//! Auth slice: the current user, the session token, and auth operations.
//!
//! States: anonymous -> loading -> (authenticated | anonymous-with-error).
//! `is_authenticated` is derived from `user` and `token` and never stored.

use mentoria_api::{AuthSession, ClientError, ProfileUpdate, ProfileUpdateResponse, User};
use serde::{Deserialize, Serialize};

use crate::ops::{OperationKey, OperationStatus, Operations, RequestId};

/// Coarse authentication state derived from the slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    /// No session, no pending attempt, no error.
    Anonymous,
    /// An auth operation is in flight and there is no session yet.
    Loading,
    /// Both user and token are present.
    Authenticated,
    /// No session and the last attempt failed.
    AnonymousWithError,
}

impl AuthStatus {
    /// Returns `true` for `Authenticated`.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

impl std::fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => write!(f, "anonymous"),
            Self::Loading => write!(f, "loading"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::AnonymousWithError => write!(f, "anonymous (error)"),
        }
    }
}

/// State of the auth slice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    /// The logged-in user.
    pub user: Option<User>,
    /// The bearer token of the current session.
    pub token: Option<String>,
    /// Set after a successful registration until acknowledged.
    pub registration_success: bool,
    /// Operation tracking.
    pub ops: Operations,
}

impl AuthState {
    // ========================================================================
    // Derived values
    // ========================================================================

    /// `true` iff both a user and a token are present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    /// `true` while any auth operation is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.ops.any_pending()
    }

    /// The most recent auth error.
    #[must_use]
    pub fn error(&self) -> Option<&ClientError> {
        self.ops.latest_error()
    }

    /// Coarse state.
    #[must_use]
    pub fn status(&self) -> AuthStatus {
        if self.is_authenticated() {
            AuthStatus::Authenticated
        } else if self.is_loading() {
            AuthStatus::Loading
        } else if self.error().is_some() {
            AuthStatus::AnonymousWithError
        } else {
            AuthStatus::Anonymous
        }
    }

    /// Status of a single auth operation.
    #[must_use]
    pub fn operation(&self, key: &OperationKey) -> OperationStatus {
        self.ops.status(key)
    }

    // ========================================================================
    // Async reducers
    // ========================================================================

    /// Marks an auth operation as started.
    pub fn begin(&mut self, key: OperationKey, request: RequestId) {
        self.ops.begin(key, request);
    }

    /// Stores the session after a successful login.
    pub fn login_fulfilled(&mut self, request: RequestId, session: AuthSession) {
        self.ops.finish(&OperationKey::Login, request);
        self.user = Some(session.user);
        self.token = Some(session.token);
    }

    /// Records a failed login and drops any session.
    pub fn login_rejected(&mut self, request: RequestId, error: ClientError) {
        self.ops.fail(&OperationKey::Login, request, error);
        self.user = None;
        self.token = None;
    }

    /// Stores the session after registration and its automatic login.
    pub fn register_fulfilled(&mut self, request: RequestId, session: AuthSession) {
        self.ops.finish(&OperationKey::Register, request);
        self.user = Some(session.user);
        self.token = Some(session.token);
        self.registration_success = true;
    }

    /// Records a failed registration.
    pub fn register_rejected(&mut self, request: RequestId, error: ClientError) {
        self.ops.fail(&OperationKey::Register, request, error);
        self.user = None;
        self.token = None;
        self.registration_success = false;
    }

    /// Restores a persisted session. Ignored if a newer attempt superseded it.
    ///
    /// Returns `true` if the session was applied.
    pub fn initialize_fulfilled(&mut self, request: RequestId, token: String, user: User) -> bool {
        if !self.ops.finish(&OperationKey::InitializeAuth, request) {
            return false;
        }
        self.user = Some(user);
        self.token = Some(token);
        true
    }

    /// Ends a failed or timed-out restoration.
    ///
    /// Nothing is recorded as the slice error, and a session established by a
    /// concurrent login is left in place.
    pub fn initialize_rejected(&mut self, request: RequestId) -> bool {
        self.ops.fail_quietly(&OperationKey::InitializeAuth, request)
    }

    /// Applies a successful profile update.
    pub fn update_profile_fulfilled(
        &mut self,
        request: RequestId,
        update: &ProfileUpdate,
        response: ProfileUpdateResponse,
    ) {
        self.ops.finish(&OperationKey::UpdateProfile, request);
        match response.profile {
            Some(profile) => {
                if let Some(user) = self.user.as_mut() {
                    user.profile = Some(profile);
                }
            }
            None => self.update_user(update),
        }
    }

    /// Records a failed profile update. The session is kept.
    pub fn update_profile_rejected(&mut self, request: RequestId, error: ClientError) {
        self.ops.fail(&OperationKey::UpdateProfile, request, error);
    }

    // ========================================================================
    // Sync reducers
    // ========================================================================

    /// Drops the session and every auth field unconditionally.
    pub fn logout(&mut self) {
        self.user = None;
        self.token = None;
        self.registration_success = false;
        self.ops.clear();
    }

    /// Drops the session after the server rejected the token.
    ///
    /// Unlike [`logout`](Self::logout) the operation history is kept, so the
    /// failure that revealed the expiry stays visible.
    pub fn session_expired(&mut self) {
        self.user = None;
        self.token = None;
    }

    /// Clears the auth error.
    pub fn clear_error(&mut self) {
        self.ops.clear_errors();
    }

    /// Acknowledges a registration.
    pub fn reset_registration_success(&mut self) {
        self.registration_success = false;
    }

    /// Merges profile fields into the current user. No-op when logged out.
    pub fn update_user(&mut self, update: &ProfileUpdate) {
        if let Some(user) = self.user.as_mut() {
            let profile = user.profile.get_or_insert_with(Default::default);
            update.apply_to(profile);
        }
    }
}
