//! Mentor and resource thunks.
//!
//! Fetches only apply their result if no newer fetch for the same key started
//! meanwhile and no mutation of the same data landed first. Mutations always
//! apply the server's answer.

use mentoria_api::{EntityId, Mentor, MentorUpdate, NewMentor, Resource, Result, UploadFile};
use tracing::{debug, info, warn};

use crate::events::Slice;
use crate::ops::OperationKey;
use crate::slices::{LoadingFlag, Modal, NewNotification};
use crate::store::Store;

/// Description sent when a new mentor has none.
#[must_use]
pub fn default_description(expertise: &str) -> String {
    format!("Your mentor specialized in {expertise}")
}

impl Store {
    // ========================================================================
    // Mentors
    // ========================================================================

    /// Replaces the mentor list with the server's copy.
    ///
    /// Returns `Ok(false)` when the response was dropped because a newer fetch
    /// started, or a mentor was created, updated or deleted, before it settled.
    /// On failure the previous list is kept.
    ///
    /// # Errors
    ///
    /// Returns the service error, which is also stored as the mentors error.
    pub async fn fetch_mentors(&self) -> Result<bool> {
        let key = OperationKey::FetchMentors;
        let request = self.begin_mentors(key.clone()).await;
        match self.api().mentors().get_mentors().await {
            Ok(mentors) => {
                let count = mentors.len();
                let applied = self
                    .dispatch(Slice::Mentors, "fetch_mentors/fulfilled", |s| {
                        s.mentors.fetch_mentors_fulfilled(request, mentors)
                    })
                    .await;
                if applied {
                    info!(count, "Mentors loaded");
                } else {
                    debug!(request = %request, "Dropped stale mentor list");
                }
                Ok(applied)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load mentors");
                self.reject_mentors(key, request, &e).await;
                Err(e)
            }
        }
    }

    /// Creates a mentor and appends the server's copy.
    ///
    /// A blank description is replaced by a default derived from the
    /// expertise. On success the creation modal closes and a notification is
    /// pushed.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a missing name or expertise, or the service
    /// error.
    pub async fn create_mentor(&self, mut mentor: NewMentor) -> Result<Mentor> {
        if mentor
            .description
            .as_deref()
            .map_or(true, |d| d.trim().is_empty())
        {
            mentor.description = Some(default_description(&mentor.expertise));
        }

        let key = OperationKey::CreateMentor;
        self.set_loading(LoadingFlag::MentorCreation, true).await;
        let request = self.begin_mentors(key.clone()).await;
        let result = self.api().mentors().create_mentor(&mentor).await;
        self.set_loading(LoadingFlag::MentorCreation, false).await;

        match result {
            Ok(created) => {
                info!(mentor_id = %created.id, name = %created.name, "Mentor created");
                let stored = created.clone();
                self.dispatch(Slice::Mentors, "create_mentor/fulfilled", |s| {
                    s.mentors.create_mentor_fulfilled(request, stored);
                })
                .await;
                self.close_modal(Modal::MentorCreation).await;
                self.notify(NewNotification::success(
                    "Mentor created",
                    format!("{} is ready to help you study", created.name),
                ))
                .await;
                Ok(created)
            }
            Err(e) => {
                warn!(error = %e, "Failed to create mentor");
                self.reject_mentors(key, request, &e).await;
                self.notify_failure("Could not create mentor", &e).await;
                Err(e)
            }
        }
    }

    /// Updates a mentor and merges the server's copy.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty update, `MentorNotFound` if the
    /// server does not know the id, or the service error.
    pub async fn update_mentor(&self, id: impl Into<EntityId>, update: MentorUpdate) -> Result<Mentor> {
        let id = id.into();
        let key = OperationKey::UpdateMentor(id.clone());
        let request = self.begin_mentors(key.clone()).await;
        match self.api().mentors().update_mentor(&id, &update).await {
            Ok(updated) => {
                info!(mentor_id = %id, "Mentor updated");
                let stored = updated.clone();
                self.dispatch(Slice::Mentors, "update_mentor/fulfilled", |s| {
                    s.mentors.update_mentor_fulfilled(request, stored);
                })
                .await;
                self.notify(NewNotification::success(
                    "Mentor updated",
                    format!("{} was saved", updated.name),
                ))
                .await;
                Ok(updated)
            }
            Err(e) => {
                warn!(mentor_id = %id, error = %e, "Failed to update mentor");
                self.reject_mentors(key, request, &e).await;
                self.notify_failure("Could not update mentor", &e).await;
                Err(e)
            }
        }
    }

    /// Deletes a mentor and removes it locally.
    ///
    /// # Errors
    ///
    /// Returns the service error; the mentor is kept locally in that case.
    pub async fn delete_mentor(&self, id: impl Into<EntityId>) -> Result<()> {
        let id = id.into();
        let key = OperationKey::DeleteMentor(id.clone());
        let request = self.begin_mentors(key.clone()).await;
        match self.api().mentors().delete_mentor(&id).await {
            Ok(()) => {
                let removed = self
                    .dispatch(Slice::Mentors, "delete_mentor/fulfilled", |s| {
                        s.mentors.delete_mentor_fulfilled(request, &id)
                    })
                    .await;
                info!(mentor_id = %id, "Mentor deleted");
                let name = removed.map_or_else(|| format!("Mentor {id}"), |m| m.name);
                self.notify(NewNotification::success(
                    "Mentor deleted",
                    format!("{name} was removed"),
                ))
                .await;
                Ok(())
            }
            Err(e) => {
                warn!(mentor_id = %id, error = %e, "Failed to delete mentor");
                self.reject_mentors(key, request, &e).await;
                self.notify_failure("Could not delete mentor", &e).await;
                Err(e)
            }
        }
    }

    // ========================================================================
    // Resources
    // ========================================================================

    /// Replaces a mentor's resource list with the server's copy.
    ///
    /// Returns `Ok(false)` when the response was dropped because a newer fetch
    /// for the same mentor started, or one of its resources changed, meanwhile.
    ///
    /// # Errors
    ///
    /// Returns the service error, which is also stored as the mentors error.
    pub async fn fetch_resources_for_mentor(&self, mentor_id: impl Into<EntityId>) -> Result<bool> {
        let mentor_id = mentor_id.into();
        let key = OperationKey::FetchResources(mentor_id.clone());
        let request = self.begin_mentors(key.clone()).await;
        match self.api().resources().get_resources(&mentor_id).await {
            Ok(resources) => {
                let count = resources.len();
                let applied = self
                    .dispatch(Slice::Mentors, "fetch_resources/fulfilled", |s| {
                        s.mentors
                            .fetch_resources_fulfilled(request, &mentor_id, resources)
                    })
                    .await;
                if applied {
                    debug!(mentor_id = %mentor_id, count, "Resources loaded");
                } else {
                    debug!(mentor_id = %mentor_id, request = %request, "Dropped stale resource list");
                }
                Ok(applied)
            }
            Err(e) => {
                warn!(mentor_id = %mentor_id, error = %e, "Failed to load resources");
                self.reject_mentors(key, request, &e).await;
                Err(e)
            }
        }
    }

    /// Uploads a file to a mentor and appends the server's resource.
    ///
    /// On success the upload modal closes and a success notification is
    /// pushed; on failure an error notification is pushed.
    ///
    /// # Errors
    ///
    /// Returns `NoFile` or `FileTooLarge` before any request is sent, or the
    /// service error.
    pub async fn upload_resource(&self, mentor_id: impl Into<EntityId>, file: UploadFile) -> Result<Resource> {
        let mentor_id = mentor_id.into();
        let key = OperationKey::UploadResource(mentor_id.clone());
        let file_name = file.file_name.clone();

        let request = self.begin_mentors(key.clone()).await;
        self.sync_upload_flag().await;
        let result = self
            .api()
            .resources()
            .upload_resource(&mentor_id, file)
            .await;

        match result {
            Ok(resource) => {
                let stored = resource.clone();
                self.dispatch(Slice::Mentors, "upload_resource/fulfilled", |s| {
                    s.mentors
                        .upload_resource_fulfilled(request, &mentor_id, stored)
                })
                .await;
                self.sync_upload_flag().await;
                self.close_modal(Modal::ResourceUpload).await;
                self.notify(NewNotification::success(
                    "Resource uploaded",
                    format!("{} was added", resource.name),
                ))
                .await;
                Ok(resource)
            }
            Err(e) => {
                warn!(mentor_id = %mentor_id, file = %file_name, error = %e, "Upload failed");
                self.reject_mentors(key, request, &e).await;
                self.sync_upload_flag().await;
                self.notify_failure("Upload failed", &e).await;
                Err(e)
            }
        }
    }

    /// Adds a web link as a resource of a mentor.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a malformed URL, or the service error.
    pub async fn upload_resource_from_url(
        &self,
        mentor_id: impl Into<EntityId>,
        url: &str,
        title: Option<&str>,
    ) -> Result<Resource> {
        let mentor_id = mentor_id.into();
        let key = OperationKey::AddUrlResource(mentor_id.clone());

        let request = self.begin_mentors(key.clone()).await;
        self.sync_upload_flag().await;
        let result = self
            .api()
            .resources()
            .upload_resource_from_url(&mentor_id, url, title)
            .await;

        match result {
            Ok(resource) => {
                let stored = resource.clone();
                self.dispatch(Slice::Mentors, "upload_resource_from_url/fulfilled", |s| {
                    s.mentors
                        .add_url_resource_fulfilled(request, &mentor_id, stored)
                })
                .await;
                self.sync_upload_flag().await;
                self.close_modal(Modal::ResourceUpload).await;
                self.notify(NewNotification::success(
                    "Link added",
                    format!("{} was added", resource.name),
                ))
                .await;
                Ok(resource)
            }
            Err(e) => {
                warn!(mentor_id = %mentor_id, url, error = %e, "Adding link failed");
                self.reject_mentors(key, request, &e).await;
                self.sync_upload_flag().await;
                self.notify_failure("Could not add link", &e).await;
                Err(e)
            }
        }
    }

    /// Deletes a resource and removes it from its mentor.
    ///
    /// # Errors
    ///
    /// Returns the service error; the resource is kept locally in that case.
    pub async fn delete_resource(
        &self,
        mentor_id: impl Into<EntityId>,
        resource_id: impl Into<EntityId>,
    ) -> Result<()> {
        let mentor_id = mentor_id.into();
        let resource_id = resource_id.into();
        let key = OperationKey::DeleteResource(resource_id.clone());
        let request = self.begin_mentors(key.clone()).await;
        match self.api().resources().delete_resource(&resource_id).await {
            Ok(()) => {
                let removed = self
                    .dispatch(Slice::Mentors, "delete_resource/fulfilled", |s| {
                        s.mentors
                            .delete_resource_fulfilled(request, &mentor_id, &resource_id)
                    })
                    .await;
                info!(mentor_id = %mentor_id, resource_id = %resource_id, "Resource deleted");
                let name = removed.map_or_else(|| format!("Resource {resource_id}"), |r| r.name);
                self.notify(NewNotification::success(
                    "Resource deleted",
                    format!("{name} was removed"),
                ))
                .await;
                Ok(())
            }
            Err(e) => {
                warn!(resource_id = %resource_id, error = %e, "Failed to delete resource");
                self.reject_mentors(key, request, &e).await;
                self.notify_failure("Could not delete resource", &e).await;
                Err(e)
            }
        }
    }

    async fn set_loading(&self, flag: LoadingFlag, on: bool) {
        self.dispatch(Slice::Ui, "set_loading", |s| s.ui.set_loading(flag, on))
            .await;
    }

    /// Keeps the upload flag on while any upload or link addition is pending.
    async fn sync_upload_flag(&self) {
        self.dispatch(Slice::Ui, "set_loading", |s| {
            let uploading = s.mentors.is_uploading();
            s.ui.set_loading(LoadingFlag::ResourceUpload, uploading);
        })
        .await;
    }
}
