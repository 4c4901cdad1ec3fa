//! Upload payloads and client-side upload checks.

use std::path::Path;

use regex::Regex;

use crate::error::{ClientError, Result};
use crate::models::ResourceType;

/// Default client-side upload cap (50 MB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// A file ready to be sent as the `file` part of a multipart upload.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// File name sent to the server.
    pub file_name: String,
    /// MIME type of the content.
    pub content_type: String,
    /// Raw content.
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Creates an upload from in-memory content with an explicit MIME type.
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Creates an upload from in-memory content, guessing the MIME type from
    /// the file extension.
    #[must_use]
    pub fn from_bytes(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_mime(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk.
    ///
    /// The size is checked from metadata before the content is read, so an
    /// oversized file fails fast without being loaded.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NoFile` if the path does not exist or is not a
    /// regular file, `ClientError::FileTooLarge` if it exceeds `max_bytes`, and
    /// `ClientError::Storage` for other I/O failures.
    pub async fn from_path(path: impl AsRef<Path>, max_bytes: u64) -> Result<Self> {
        let path = path.as_ref();
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(ClientError::NoFile),
            Err(e) => {
                return Err(ClientError::storage(format!(
                    "cannot stat {}: {e}",
                    path.display()
                )));
            }
        };
        if !metadata.is_file() {
            return Err(ClientError::NoFile);
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        check_size(&file_name, metadata.len(), max_bytes)?;

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ClientError::storage(format!("cannot read {}: {e}", path.display()))
        })?;
        Ok(Self::from_bytes(file_name, bytes))
    }

    /// Size of the content in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Resource type implied by the MIME type.
    #[must_use]
    pub fn resource_type(&self) -> ResourceType {
        ResourceType::from_mime(&self.content_type)
    }

    /// Runs the client-side checks performed before any upload request.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NoFile` if the file has no name and
    /// `ClientError::FileTooLarge` if it exceeds `max_bytes`.
    pub fn validate(&self, max_bytes: u64) -> Result<()> {
        if self.file_name.trim().is_empty() {
            return Err(ClientError::NoFile);
        }
        check_size(&self.file_name, self.size(), max_bytes)
    }
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

fn check_size(file_name: &str, size: u64, max_bytes: u64) -> Result<()> {
    if size > max_bytes {
        return Err(ClientError::file_too_large(
            file_name,
            size,
            max_bytes / (1024 * 1024),
        ));
    }
    Ok(())
}

/// Guesses a MIME type from a file extension.
#[must_use]
pub fn guess_mime(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "avi" => "video/avi",
        "mp3" => "audio/mp3",
        "wav" => "audio/wav",
        "txt" | "md" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Validates a link for a URL resource and returns it with a scheme.
///
/// Links without a scheme get `https://` prepended.
///
/// # Errors
///
/// Returns `ClientError::Validation` if the text is not a plausible web URL.
pub fn normalize_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let Ok(re) = Regex::new(r"(?i)^(https?://)?([\da-z.-]+)\.([a-z.]{2,6})(:\d+)?([/?#]\S*)?$")
    else {
        return Err(ClientError::unknown("URL pattern failed to compile"));
    };
    if trimmed.is_empty() || !re.is_match(trimmed) {
        return Err(ClientError::validation(format!("Invalid URL: '{raw}'")));
    }
    let lower = trimmed.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("https://{trimmed}"))
    }
}

/// Returns `true` if the URL points at `YouTube`.
#[must_use]
pub fn is_youtube_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains("youtube.com/") || lower.contains("youtu.be/")
}
