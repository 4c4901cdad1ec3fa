//! Typed request/response functions over the backend endpoints.

mod auth;
mod mentor;
mod resource;

use std::sync::Arc;

pub use auth::AuthService;
pub use mentor::MentorService;
pub use resource::ResourceService;

use crate::error::Result;
use crate::http::{ClientOptions, HttpClient};
use crate::token::TokenStore;

/// All domain services sharing one HTTP client and token store.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpClient,
    auth: AuthService,
    mentors: MentorService,
    resources: ResourceService,
}

impl ApiClient {
    /// Builds the services on a fresh HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(options: ClientOptions, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        Ok(Self::from_http(HttpClient::new(options, tokens)?))
    }

    /// Builds the services on an existing HTTP client.
    #[must_use]
    pub fn from_http(http: HttpClient) -> Self {
        Self {
            auth: AuthService::new(http.clone()),
            mentors: MentorService::new(http.clone()),
            resources: ResourceService::new(http.clone()),
            http,
        }
    }

    /// Overrides the client-side upload cap.
    #[must_use]
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: u64) -> Self {
        self.resources = self.resources.with_max_upload_bytes(max_upload_bytes);
        self
    }

    /// Authentication and profile endpoints.
    #[must_use]
    pub const fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// Mentor endpoints.
    #[must_use]
    pub const fn mentors(&self) -> &MentorService {
        &self.mentors
    }

    /// Resource endpoints.
    #[must_use]
    pub const fn resources(&self) -> &ResourceService {
        &self.resources
    }

    /// The shared token store.
    #[must_use]
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        self.http.tokens()
    }

    /// The underlying HTTP client.
    #[must_use]
    pub const fn http(&self) -> &HttpClient {
        &self.http
    }
}
