//! Mentor endpoints.

use tracing::{debug, info};

use crate::error::{ClientError, Result};
use crate::http::HttpClient;
use crate::id::EntityId;
use crate::models::{Mentor, MentorUpdate, NewMentor};

/// CRUD over the current user's mentors.
#[derive(Debug, Clone)]
pub struct MentorService {
    http: HttpClient,
}

/// Rejects blank ids before they turn into a request for `/mentors/`.
pub(crate) fn require_id(id: &EntityId, what: &str) -> Result<()> {
    if id.is_empty() {
        return Err(ClientError::validation(format!("{what} id is required")));
    }
    Ok(())
}

impl MentorService {
    /// Creates the service on top of a shared HTTP client.
    #[must_use]
    pub const fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// `GET /mentors/`.
    pub async fn get_mentors(&self) -> Result<Vec<Mentor>> {
        let mentors: Vec<Mentor> = self.http.get("/mentors/").await?;
        debug!(count = mentors.len(), "Fetched mentors");
        Ok(mentors)
    }

    /// `GET /mentors/{id}`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::MentorNotFound` when the server answers 404.
    pub async fn get_mentor(&self, id: &EntityId) -> Result<Mentor> {
        require_id(id, "Mentor")?;
        self.http
            .get(&format!("/mentors/{id}"))
            .await
            .map_err(|e| not_found_as_mentor(e, id))
    }

    /// `POST /mentors/`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if the name or expertise is blank; no
    /// request is sent in that case.
    pub async fn create_mentor(&self, mentor: &NewMentor) -> Result<Mentor> {
        mentor.validate()?;
        let created: Mentor = self.http.post_json("/mentors/", mentor).await?;
        info!(mentor_id = %created.id, name = %created.name, "Mentor created");
        Ok(created)
    }

    /// `PUT /mentors/{id}`.
    pub async fn update_mentor(&self, id: &EntityId, update: &MentorUpdate) -> Result<Mentor> {
        require_id(id, "Mentor")?;
        if update.is_empty() {
            return Err(ClientError::validation("Nothing to update"));
        }
        let updated: Mentor = self
            .http
            .put_json(&format!("/mentors/{id}"), update)
            .await
            .map_err(|e| not_found_as_mentor(e, id))?;
        info!(mentor_id = %updated.id, "Mentor updated");
        Ok(updated)
    }

    /// `DELETE /mentors/{id}`.
    pub async fn delete_mentor(&self, id: &EntityId) -> Result<()> {
        require_id(id, "Mentor")?;
        self.http
            .delete(&format!("/mentors/{id}"))
            .await
            .map_err(|e| not_found_as_mentor(e, id))?;
        info!(mentor_id = %id, "Mentor deleted");
        Ok(())
    }
}

fn not_found_as_mentor(err: ClientError, id: &EntityId) -> ClientError {
    match err {
        ClientError::Api { status: 404, .. } => ClientError::mentor_not_found(id),
        other => other,
    }
}
