//! Resource endpoints.

use reqwest::multipart::{Form, Part};
use tracing::{debug, info};

use crate::error::{ClientError, Result};
use crate::http::HttpClient;
use crate::id::EntityId;
use crate::models::Resource;
use crate::services::mentor::require_id;
use crate::upload::{normalize_url, UploadFile, DEFAULT_MAX_UPLOAD_BYTES};

/// Listing, uploading and deleting a mentor's resources.
#[derive(Debug, Clone)]
pub struct ResourceService {
    http: HttpClient,
    max_upload_bytes: u64,
}

impl ResourceService {
    /// Creates the service with the default 50 MB upload cap.
    #[must_use]
    pub const fn new(http: HttpClient) -> Self {
        Self {
            http,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Overrides the client-side upload cap.
    #[must_use]
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: u64) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// The client-side upload cap in bytes.
    #[must_use]
    pub const fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// `GET /resources/mentor/{mentor_id}`.
    pub async fn get_resources(&self, mentor_id: &EntityId) -> Result<Vec<Resource>> {
        require_id(mentor_id, "Mentor")?;
        let resources: Vec<Resource> = self
            .http
            .get(&format!("/resources/mentor/{mentor_id}"))
            .await?;
        debug!(mentor_id = %mentor_id, count = resources.len(), "Fetched resources");
        Ok(resources)
    }

    /// Uploads a file as multipart `file` + `mentor_id` to `/resources/upload`.
    ///
    /// # Errors
    ///
    /// Fails without sending a request with `ClientError::Validation` for a
    /// blank mentor id, `ClientError::NoFile` for a nameless file and
    /// `ClientError::FileTooLarge` above the upload cap.
    pub async fn upload_resource(&self, mentor_id: &EntityId, file: UploadFile) -> Result<Resource> {
        require_id(mentor_id, "Mentor")?;
        file.validate(self.max_upload_bytes)?;

        let size = file.size();
        let file_name = file.file_name.clone();
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)
            .map_err(|e| ClientError::validation(format!("invalid content type: {e}")))?;
        let form = Form::new()
            .part("file", part)
            .text("mentor_id", mentor_id.to_string());

        debug!(mentor_id = %mentor_id, file = %file_name, size, "Uploading resource");
        let mut resource: Resource = self.http.post_multipart("/resources/upload", form).await?;
        if resource.size_bytes.is_none() {
            resource.size_bytes = Some(size);
        }
        info!(mentor_id = %mentor_id, resource_id = %resource.id, "Resource uploaded");
        Ok(resource)
    }

    /// Attaches a web link as a resource via a form POST to `/resources/url`.
    ///
    /// The link gets `https://` when it has no scheme. Without a title the
    /// link itself is used as the name.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for a blank mentor id or a malformed
    /// URL; no request is sent in either case.
    pub async fn upload_resource_from_url(
        &self,
        mentor_id: &EntityId,
        url: &str,
        title: Option<&str>,
    ) -> Result<Resource> {
        require_id(mentor_id, "Mentor")?;
        let url = normalize_url(url)?;
        let name = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(url.as_str())
            .to_string();
        let mentor = mentor_id.to_string();

        let resource: Resource = self
            .http
            .post_form(
                "/resources/url",
                &[
                    ("url", url.as_str()),
                    ("name", name.as_str()),
                    ("mentor_id", mentor.as_str()),
                ],
            )
            .await?;
        info!(mentor_id = %mentor_id, resource_id = %resource.id, "Link resource added");
        Ok(resource)
    }

    /// `DELETE /resources/{resource_id}`.
    pub async fn delete_resource(&self, resource_id: &EntityId) -> Result<()> {
        require_id(resource_id, "Resource")?;
        self.http
            .delete(&format!("/resources/{resource_id}"))
            .await?;
        info!(resource_id = %resource_id, "Resource deleted");
        Ok(())
    }
}
