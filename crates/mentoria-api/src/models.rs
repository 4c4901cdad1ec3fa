//! Domain models exchanged with the MentorIA backend.
//!
//! Field names follow the backend's snake_case JSON. A handful of aliases
//! (`title`, `subject`, `avatarUrl`, `uploadDate`, `size`) are accepted so that
//! payloads produced by older clients still decode.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::id::EntityId;

/// Default value for boolean fields that default to true.
const fn default_true() -> bool {
    true
}

/// Default subscription tier for new profiles.
fn default_subscription() -> String {
    "free".to_string()
}

// ============================================================================
// Users and sessions
// ============================================================================

/// An authenticated user as returned by `/auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned id.
    pub id: EntityId,
    /// Login email.
    pub email: String,
    /// Display name, if the user provided one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Whether the account is enabled.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Creation time.
    #[serde(
        default,
        deserialize_with = "lenient_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(
        default,
        deserialize_with = "lenient_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    /// Profile settings, once loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
}

impl User {
    /// Name shown in headers: the full name, or the email when none is set.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

/// Per-user profile settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Whether notifications are enabled.
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    /// Subscription tier (`free`, `premium`, ...).
    #[serde(default = "default_subscription")]
    pub subscription_status: String,
    /// Number of mentors owned by the user.
    #[serde(default)]
    pub mentor_count: u32,
    /// Total uploaded volume in megabytes.
    #[serde(default)]
    pub resource_upload_mb: f64,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            notifications_enabled: default_true(),
            subscription_status: default_subscription(),
            mentor_count: 0,
            resource_upload_mb: 0.0,
        }
    }
}

/// Response of `GET /users/me/profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileResponse {
    /// The user owning the profile.
    pub user: User,
    /// The profile settings.
    #[serde(default)]
    pub profile: UserProfile,
}

impl ProfileResponse {
    /// Folds the profile into the user.
    #[must_use]
    pub fn into_user(self) -> User {
        let mut user = self.user;
        user.profile = Some(self.profile);
        user
    }
}

/// Partial update for `PATCH /users/me/profile`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// New notifications setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
    /// New subscription tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_status: Option<String>,
}

impl ProfileUpdate {
    /// Returns `true` if no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.notifications_enabled.is_none() && self.subscription_status.is_none()
    }

    /// Applies the set fields onto a profile.
    pub fn apply_to(&self, profile: &mut UserProfile) {
        if let Some(enabled) = self.notifications_enabled {
            profile.notifications_enabled = enabled;
        }
        if let Some(status) = &self.subscription_status {
            profile.subscription_status.clone_from(status);
        }
    }
}

/// Response of `PATCH /users/me/profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdateResponse {
    /// Server confirmation message.
    #[serde(default)]
    pub message: String,
    /// The updated profile, when the server echoes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
}

/// Bearer token returned by `/auth/login/token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The opaque access token.
    pub access_token: String,
    /// Token scheme, normally `bearer`.
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Login credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

impl Credentials {
    /// Creates a new credential pair.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Checks that both fields are present.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if the email or password is blank.
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(ClientError::validation("Email and password are required"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Payload of `POST /auth/register`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl Registration {
    /// Creates a registration without a display name.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            full_name: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// The credentials used for the automatic login after registration.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.email.clone(), self.password.clone())
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("full_name", &self.full_name)
            .finish()
    }
}

/// A logged-in session.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    /// The bearer token.
    pub token: String,
    /// The user the token belongs to.
    pub user: User,
}

// ============================================================================
// Mentors
// ============================================================================

/// A subject-scoped study mentor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mentor {
    /// Server-assigned id.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Subject the mentor specializes in.
    #[serde(alias = "subject")]
    pub expertise: String,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Avatar image URL.
    #[serde(default, alias = "avatarUrl", skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Owning user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<EntityId>,
    /// Creation time.
    #[serde(
        default,
        deserialize_with = "lenient_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(
        default,
        deserialize_with = "lenient_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    /// Resources uploaded to this mentor, in upload order.
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl Mentor {
    /// Creates a mentor with only the required fields set.
    #[must_use]
    pub fn new(
        id: impl Into<EntityId>,
        name: impl Into<String>,
        expertise: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            expertise: expertise.into(),
            description: None,
            avatar_url: None,
            user_id: None,
            created_at: None,
            updated_at: None,
            resources: Vec::new(),
        }
    }

    /// Looks up a resource by id.
    #[must_use]
    pub fn resource(&self, id: &EntityId) -> Option<&Resource> {
        self.resources.iter().find(|r| &r.id == id)
    }

    /// Applies the set fields of an update in place.
    pub fn apply_update(&mut self, update: &MentorUpdate) {
        if let Some(name) = &update.name {
            self.name.clone_from(name);
        }
        if let Some(expertise) = &update.expertise {
            self.expertise.clone_from(expertise);
        }
        if let Some(description) = &update.description {
            self.description = Some(description.clone());
        }
        if let Some(avatar_url) = &update.avatar_url {
            self.avatar_url = Some(avatar_url.clone());
        }
    }
}

/// Payload of `POST /mentors/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMentor {
    /// Display name.
    pub name: String,
    /// Subject the mentor specializes in.
    pub expertise: String,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Avatar image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl NewMentor {
    /// Creates a mentor payload with only the required fields set.
    #[must_use]
    pub fn new(name: impl Into<String>, expertise: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expertise: expertise.into(),
            description: None,
            avatar_url: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the avatar URL.
    #[must_use]
    pub fn with_avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }

    /// Checks that the name and expertise are present.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` naming the first missing field.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ClientError::validation("Mentor name is required"));
        }
        if self.expertise.trim().is_empty() {
            return Err(ClientError::validation("Mentor expertise is required"));
        }
        Ok(())
    }
}

/// Partial update for `PUT /mentors/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentorUpdate {
    /// New display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expertise: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl MentorUpdate {
    /// Returns `true` if no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.expertise.is_none()
            && self.description.is_none()
            && self.avatar_url.is_none()
    }
}

// ============================================================================
// Resources
// ============================================================================

/// Kind of learning material attached to a mentor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// PDF document.
    Pdf,
    /// Image file.
    Image,
    /// Video file.
    Video,
    /// Audio file.
    Audio,
    /// Web link.
    Url,
    /// Plain text.
    Text,
    /// `YouTube` video link.
    YoutubeLink,
    /// Any type this client does not know about.
    #[default]
    Other,
}

impl ResourceType {
    /// Parses a type tag case-insensitively; unknown tags map to `Other`.
    #[must_use]
    pub fn from_tag(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "image" => Self::Image,
            "video" => Self::Video,
            "audio" => Self::Audio,
            "url" | "link" => Self::Url,
            "text" => Self::Text,
            "youtube_link" | "youtube" => Self::YoutubeLink,
            _ => Self::Other,
        }
    }

    /// Guesses the type from a MIME type.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.to_lowercase();
        if mime == "application/pdf" {
            Self::Pdf
        } else if mime.starts_with("image/") {
            Self::Image
        } else if mime.starts_with("video/") {
            Self::Video
        } else if mime.starts_with("audio/") {
            Self::Audio
        } else if mime.starts_with("text/") {
            Self::Text
        } else {
            Self::Other
        }
    }

    /// The wire tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Url => "url",
            Self::Text => "text",
            Self::YoutubeLink => "youtube_link",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ResourceType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&s))
    }
}

impl Serialize for ResourceType {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Server-side processing state of a resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResourceStatus {
    /// Uploaded, not yet picked up.
    #[default]
    Pending,
    /// Being analyzed.
    Processing,
    /// Ready for use.
    Analyzed,
    /// Analysis failed.
    Error,
}

impl ResourceStatus {
    /// Parses a status string, case-insensitively.
    fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "analyzed" | "completed" | "ready" => Some(Self::Analyzed),
            "error" | "failed" => Some(Self::Error),
            _ => None,
        }
    }

    /// The wire tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Analyzed => "analyzed",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ResourceStatus {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str_case_insensitive(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid resource status '{s}': expected one of 'pending', 'processing', 'analyzed', 'error'"
            ))
        })
    }
}

impl Serialize for ResourceStatus {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// A learning resource attached to exactly one mentor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Server-assigned id.
    pub id: EntityId,
    /// Display name.
    #[serde(alias = "title")]
    pub name: String,
    /// Kind of material.
    #[serde(rename = "type", default)]
    pub kind: ResourceType,
    /// Processing state.
    #[serde(default)]
    pub status: ResourceStatus,
    /// Owning mentor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentor_id: Option<EntityId>,
    /// Location of the stored file or the linked page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Size in bytes, when known.
    #[serde(default, alias = "size", skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// Upload time.
    #[serde(
        default,
        alias = "uploadDate",
        deserialize_with = "lenient_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    /// Preview image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl Resource {
    /// Creates a resource with only the required fields set.
    #[must_use]
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>, kind: ResourceType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            status: ResourceStatus::default(),
            mentor_id: None,
            url: None,
            size_bytes: None,
            created_at: None,
            thumbnail: None,
        }
    }

    /// Human-readable size, or `None` when the size is unknown.
    #[must_use]
    pub fn formatted_size(&self) -> Option<String> {
        self.size_bytes.map(format_file_size)
    }
}

/// Formats a byte count with binary units (`1.5 KB`, `2 MB`).
///
/// # Examples
///
/// ```
/// use mentoria_api::format_file_size;
///
/// assert_eq!(format_file_size(0), "0 Bytes");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut scaled = bytes as f64;
    let mut exp = 0;
    while scaled >= 1024.0 && exp < UNITS.len() - 1 {
        scaled /= 1024.0;
        exp += 1;
    }
    let rounded = (scaled * 100.0).round() / 100.0;
    let mut text = format!("{rounded:.2}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    format!("{text} {}", UNITS[exp])
}

// ============================================================================
// Timestamps
// ============================================================================

/// Parses a timestamp in RFC 3339, naive ISO-8601 or date-only form.
///
/// The backend emits naive datetimes (no offset), which are read as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn lenient_datetime<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}
