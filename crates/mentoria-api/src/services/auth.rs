//! Authentication and profile endpoints.

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::http::HttpClient;
use crate::models::{
    AuthSession, Credentials, ProfileResponse, ProfileUpdate, ProfileUpdateResponse,
    Registration, Token, User,
};

/// Login, registration, and the current user's profile.
#[derive(Debug, Clone)]
pub struct AuthService {
    http: HttpClient,
}

impl AuthService {
    /// Creates the service on top of a shared HTTP client.
    #[must_use]
    pub const fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Exchanges credentials for a token, persists it, and loads the user.
    ///
    /// If the user cannot be loaded after the token was issued, the token is
    /// removed again so no half-established session is left behind.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for blank credentials (no request is
    /// sent), `ClientError::Auth` for rejected credentials, and any transport
    /// or API error from either request.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthSession> {
        credentials.validate()?;
        debug!(email = %credentials.email, "Logging in");

        let token: Token = self
            .http
            .post_form(
                "/auth/login/token",
                &[
                    ("username", credentials.email.as_str()),
                    ("password", credentials.password.as_str()),
                ],
            )
            .await?;
        self.http.tokens().save(&token.access_token)?;

        match self.current_user().await {
            Ok(user) => {
                info!(user_id = %user.id, "Logged in");
                Ok(AuthSession {
                    token: token.access_token,
                    user,
                })
            }
            Err(e) => {
                warn!(error = %e, "Token issued but user lookup failed");
                if let Err(clear_err) = self.http.tokens().clear() {
                    warn!(error = %clear_err, "Failed to clear stored token");
                }
                Err(e)
            }
        }
    }

    /// Creates an account and logs in with the same credentials.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for blank credentials, the server's
    /// error if the account cannot be created, or any error from the login.
    pub async fn register(&self, registration: &Registration) -> Result<AuthSession> {
        let credentials = registration.credentials();
        credentials.validate()?;
        debug!(email = %registration.email, "Registering");

        let created: User = self.http.post_json("/auth/register", registration).await?;
        info!(user_id = %created.id, "Account created");

        self.login(&credentials).await
    }

    /// Ends the session locally by removing the persisted token.
    ///
    /// There is no server round trip.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the token cannot be removed.
    pub fn logout(&self) -> Result<()> {
        self.http.tokens().clear()?;
        info!("Logged out");
        Ok(())
    }

    /// `GET /auth/me`.
    pub async fn current_user(&self) -> Result<User> {
        self.http.get("/auth/me").await
    }

    /// `GET /users/me/profile`, with the profile folded into the user.
    pub async fn get_profile(&self) -> Result<User> {
        let response: ProfileResponse = self.http.get("/users/me/profile").await?;
        Ok(response.into_user())
    }

    /// `PATCH /users/me/profile`.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<ProfileUpdateResponse> {
        let response: ProfileUpdateResponse =
            self.http.patch_json("/users/me/profile", update).await?;
        debug!(message = %response.message, "Profile updated");
        Ok(response)
    }

    /// The persisted token, if any.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the token store cannot be read.
    pub fn stored_token(&self) -> Result<Option<String>> {
        self.http.tokens().load()
    }
}
