//! Mentors slice: the mentor list, each mentor's resources, and the active
//! mentor.
//!
//! Mentors and resources are located by [`EntityId`] equality, so ids that
//! arrived as numbers and ids typed in as strings find the same entity.

use mentoria_api::{ClientError, EntityId, Mentor, MentorUpdate, Resource};

use crate::ops::{OperationKey, OperationStatus, Operations, RequestId};

/// State of the mentors slice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MentorsState {
    /// Mentors in server order.
    pub mentors: Vec<Mentor>,
    /// Selected mentor, if any. Always refers to a mentor in `mentors`.
    pub active_mentor_id: Option<EntityId>,
    /// Operation tracking.
    pub ops: Operations,
}

impl MentorsState {
    // ========================================================================
    // Lookups
    // ========================================================================

    /// Finds a mentor by id.
    #[must_use]
    pub fn find(&self, id: &EntityId) -> Option<&Mentor> {
        self.mentors.iter().find(|m| &m.id == id)
    }

    /// Finds a mentor by id, mutably.
    pub fn find_mut(&mut self, id: &EntityId) -> Option<&mut Mentor> {
        self.mentors.iter_mut().find(|m| &m.id == id)
    }

    /// `true` while any mentor operation is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.ops.any_pending()
    }

    /// The most recent mentor error.
    #[must_use]
    pub fn error(&self) -> Option<&ClientError> {
        self.ops.latest_error()
    }

    /// `true` while any file upload or link addition is in flight.
    #[must_use]
    pub fn is_uploading(&self) -> bool {
        self.ops.pending_keys().any(|key| {
            matches!(
                key,
                OperationKey::UploadResource(_) | OperationKey::AddUrlResource(_)
            )
        })
    }

    /// Status of a single mentor operation.
    #[must_use]
    pub fn operation(&self, key: &OperationKey) -> OperationStatus {
        self.ops.status(key)
    }

    // ========================================================================
    // Sync reducers
    // ========================================================================

    /// Replaces the whole list. Clears the active mentor if it disappeared.
    pub fn set_mentors(&mut self, mentors: Vec<Mentor>) {
        self.mentors = mentors;
        self.drop_dangling_active();
    }

    /// Appends a mentor, or replaces the entry with the same id.
    pub fn add_mentor(&mut self, mentor: Mentor) {
        match self.find_mut(&mentor.id) {
            Some(existing) => *existing = mentor,
            None => self.mentors.push(mentor),
        }
    }

    /// Applies a partial update. Returns `false` if the mentor is unknown.
    pub fn update_mentor(&mut self, id: &EntityId, update: &MentorUpdate) -> bool {
        match self.find_mut(id) {
            Some(mentor) => {
                mentor.apply_update(update);
                true
            }
            None => false,
        }
    }

    /// Removes a mentor and clears the active id if it pointed at it.
    pub fn delete_mentor(&mut self, id: &EntityId) -> Option<Mentor> {
        let index = self.mentors.iter().position(|m| &m.id == id)?;
        let removed = self.mentors.remove(index);
        if self.active_mentor_id.as_ref() == Some(id) {
            self.active_mentor_id = None;
        }
        Some(removed)
    }

    /// Selects a mentor. An unknown id selects nothing.
    ///
    /// Returns `true` if a mentor is now selected.
    pub fn set_active_mentor(&mut self, id: Option<EntityId>) -> bool {
        self.active_mentor_id = id.filter(|id| self.find(id).is_some());
        self.active_mentor_id.is_some()
    }

    /// Appends a resource to a mentor, or replaces the one with the same id.
    ///
    /// Returns `false` if the mentor is unknown.
    pub fn add_resource(&mut self, mentor_id: &EntityId, resource: Resource) -> bool {
        let Some(mentor) = self.find_mut(mentor_id) else {
            return false;
        };
        match mentor.resources.iter_mut().find(|r| r.id == resource.id) {
            Some(existing) => *existing = resource,
            None => mentor.resources.push(resource),
        }
        true
    }

    /// Removes a resource from a mentor.
    pub fn remove_resource(&mut self, mentor_id: &EntityId, resource_id: &EntityId) -> Option<Resource> {
        let mentor = self.find_mut(mentor_id)?;
        let index = mentor.resources.iter().position(|r| &r.id == resource_id)?;
        Some(mentor.resources.remove(index))
    }

    /// Replaces a mentor's resource list. Returns `false` if the mentor is unknown.
    pub fn set_resources(&mut self, mentor_id: &EntityId, resources: Vec<Resource>) -> bool {
        match self.find_mut(mentor_id) {
            Some(mentor) => {
                mentor.resources = resources;
                true
            }
            None => false,
        }
    }

    /// Clears all mentor errors.
    pub fn clear_error(&mut self) {
        self.ops.clear_errors();
    }

    /// Restores the initial state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn drop_dangling_active(&mut self) {
        if let Some(id) = &self.active_mentor_id {
            if self.find(id).is_none() {
                self.active_mentor_id = None;
            }
        }
    }

    // ========================================================================
    // Async reducers
    // ========================================================================

    /// Marks a mentor operation as started, clearing its previous error.
    pub fn begin(&mut self, key: OperationKey, request: RequestId) {
        self.ops.begin(key, request);
    }

    /// Records a failed operation. The mentor list is left untouched.
    ///
    /// Returns `true` if the failure belonged to the latest request.
    pub fn fail(&mut self, key: &OperationKey, request: RequestId, error: ClientError) -> bool {
        self.ops.fail(key, request, error)
    }

    /// Replaces the list with the server's copy, unless a newer fetch started.
    ///
    /// Resource lists loaded separately are kept for mentors the server
    /// returned without resources. Returns `true` if the list was applied.
    pub fn fetch_mentors_fulfilled(&mut self, request: RequestId, mentors: Vec<Mentor>) -> bool {
        if !self.ops.finish(&OperationKey::FetchMentors, request) {
            return false;
        }
        let merged = mentors
            .into_iter()
            .map(|mut mentor| {
                if mentor.resources.is_empty() {
                    if let Some(local) = self.find(&mentor.id) {
                        mentor.resources.clone_from(&local.resources);
                    }
                }
                mentor
            })
            .collect();
        self.set_mentors(merged);
        true
    }

    /// Appends the server-created mentor.
    ///
    /// Mentor-changing reducers invalidate in-flight list fetches, whose
    /// snapshots predate the change.
    pub fn create_mentor_fulfilled(&mut self, request: RequestId, mentor: Mentor) {
        self.ops.finish(&OperationKey::CreateMentor, request);
        self.ops.invalidate(&OperationKey::FetchMentors);
        self.add_mentor(mentor);
    }

    /// Merges the server's copy of an updated mentor, keeping local resources
    /// when the server omits them.
    pub fn update_mentor_fulfilled(&mut self, request: RequestId, mut mentor: Mentor) {
        self.ops
            .finish(&OperationKey::UpdateMentor(mentor.id.clone()), request);
        self.ops.invalidate(&OperationKey::FetchMentors);
        if let Some(existing) = self.find_mut(&mentor.id) {
            if mentor.resources.is_empty() {
                mentor.resources = std::mem::take(&mut existing.resources);
            }
            *existing = mentor;
        }
    }

    /// Removes a mentor after the server deleted it.
    pub fn delete_mentor_fulfilled(&mut self, request: RequestId, id: &EntityId) -> Option<Mentor> {
        self.ops
            .finish(&OperationKey::DeleteMentor(id.clone()), request);
        self.ops.invalidate(&OperationKey::FetchMentors);
        self.delete_mentor(id)
    }

    /// Replaces a mentor's resources, unless a newer fetch for the same mentor
    /// started. Returns `true` if the list was applied.
    pub fn fetch_resources_fulfilled(
        &mut self,
        request: RequestId,
        mentor_id: &EntityId,
        resources: Vec<Resource>,
    ) -> bool {
        if !self
            .ops
            .finish(&OperationKey::FetchResources(mentor_id.clone()), request)
        {
            return false;
        }
        self.set_resources(mentor_id, resources)
    }

    /// Appends an uploaded resource.
    ///
    /// Resource-changing reducers invalidate in-flight resource fetches for
    /// the same mentor.
    pub fn upload_resource_fulfilled(
        &mut self,
        request: RequestId,
        mentor_id: &EntityId,
        resource: Resource,
    ) -> bool {
        self.ops
            .finish(&OperationKey::UploadResource(mentor_id.clone()), request);
        self.invalidate_resource_fetch(mentor_id);
        self.add_resource(mentor_id, resource)
    }

    /// Appends a link resource.
    pub fn add_url_resource_fulfilled(
        &mut self,
        request: RequestId,
        mentor_id: &EntityId,
        resource: Resource,
    ) -> bool {
        self.ops
            .finish(&OperationKey::AddUrlResource(mentor_id.clone()), request);
        self.invalidate_resource_fetch(mentor_id);
        self.add_resource(mentor_id, resource)
    }

    /// Removes a resource after the server deleted it.
    pub fn delete_resource_fulfilled(
        &mut self,
        request: RequestId,
        mentor_id: &EntityId,
        resource_id: &EntityId,
    ) -> Option<Resource> {
        self.ops
            .finish(&OperationKey::DeleteResource(resource_id.clone()), request);
        self.invalidate_resource_fetch(mentor_id);
        self.remove_resource(mentor_id, resource_id)
    }

    fn invalidate_resource_fetch(&mut self, mentor_id: &EntityId) {
        self.ops
            .invalidate(&OperationKey::FetchResources(mentor_id.clone()));
    }
}
