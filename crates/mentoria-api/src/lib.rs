//! MentorIA API Client
//!
//! HTTP wrapper, token persistence, domain models and typed services for the
//! MentorIA study-mentoring backend.

pub mod error;
pub mod http;
pub mod id;
pub mod models;
pub mod services;
pub mod token;
pub mod upload;

pub use error::{ClientError, ErrorKind, Result};
pub use http::{extract_error_message, ClientOptions, HttpClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use id::EntityId;
pub use models::{
    format_file_size, parse_timestamp, AuthSession, Credentials, Mentor, MentorUpdate, NewMentor,
    ProfileResponse, ProfileUpdate, ProfileUpdateResponse, Registration, Resource, ResourceStatus,
    ResourceType, Token, User, UserProfile,
};
pub use services::{ApiClient, AuthService, MentorService, ResourceService};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore, TOKEN_STORAGE_KEY};
pub use upload::{guess_mime, is_youtube_url, normalize_url, UploadFile, DEFAULT_MAX_UPLOAD_BYTES};
