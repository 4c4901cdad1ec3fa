//! Per-operation state machines.
//!
//! Every async operation is tracked under an [`OperationKey`] as a small state
//! machine:
//!
//! - `Idle` -> `Pending` on [`Operations::begin`]
//! - `Pending` -> `Succeeded` on [`Operations::finish`] of the latest request
//! - `Pending` -> `Failed` on [`Operations::fail`] of the latest request
//!
//! Overlapping requests of different kinds never clobber each other because
//! each key has its own entry. Requests of the same kind are ordered by their
//! [`RequestId`]: only the most recently started request may settle the
//! outcome, and callers use the returned flag to drop stale fetch results.
//! A mutation that lands while a fetch is in flight calls
//! [`Operations::invalidate`] on the fetch key, so the older snapshot cannot
//! overwrite it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use mentoria_api::{ClientError, EntityId};
use serde::{Deserialize, Serialize};

/// Store-wide, monotonically increasing request generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies one kind of async operation, scoped to an entity where needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "op", content = "id", rename_all = "snake_case")]
pub enum OperationKey {
    /// Credential login.
    Login,
    /// Account registration.
    Register,
    /// Session restoration from the persisted token.
    InitializeAuth,
    /// Profile settings update.
    UpdateProfile,
    /// Full mentor list fetch.
    FetchMentors,
    /// Mentor creation.
    CreateMentor,
    /// Update of one mentor.
    UpdateMentor(EntityId),
    /// Deletion of one mentor.
    DeleteMentor(EntityId),
    /// Resource list fetch for one mentor.
    FetchResources(EntityId),
    /// File upload to one mentor.
    UploadResource(EntityId),
    /// Link resource added to one mentor.
    AddUrlResource(EntityId),
    /// Deletion of one resource.
    DeleteResource(EntityId),
}

impl OperationKey {
    /// Short action name used in logs and store events.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::InitializeAuth => "initialize_auth",
            Self::UpdateProfile => "update_profile",
            Self::FetchMentors => "fetch_mentors",
            Self::CreateMentor => "create_mentor",
            Self::UpdateMentor(_) => "update_mentor",
            Self::DeleteMentor(_) => "delete_mentor",
            Self::FetchResources(_) => "fetch_resources",
            Self::UploadResource(_) => "upload_resource",
            Self::AddUrlResource(_) => "upload_resource_from_url",
            Self::DeleteResource(_) => "delete_resource",
        }
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpdateMentor(id)
            | Self::DeleteMentor(id)
            | Self::FetchResources(id)
            | Self::UploadResource(id)
            | Self::AddUrlResource(id)
            | Self::DeleteResource(id) => write!(f, "{}({id})", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

/// Observable state of one operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    /// Never started, or reset.
    #[default]
    Idle,
    /// At least one request is in flight.
    Pending,
    /// The latest request succeeded.
    Succeeded,
    /// The latest request failed.
    Failed,
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Pending => write!(f, "pending"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Tracking entry for a single key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Operation {
    latest: Option<RequestId>,
    in_flight: BTreeSet<RequestId>,
    outcome: OperationStatus,
    error: Option<ClientError>,
    seq: u64,
}

impl Operation {
    /// Current status; `Pending` whenever any request is in flight.
    #[must_use]
    pub fn status(&self) -> OperationStatus {
        if self.in_flight.is_empty() {
            self.outcome
        } else {
            OperationStatus::Pending
        }
    }

    /// Error of the latest settled request, if it failed.
    #[must_use]
    pub const fn error(&self) -> Option<&ClientError> {
        self.error.as_ref()
    }

    /// The most recently started request.
    #[must_use]
    pub const fn latest(&self) -> Option<RequestId> {
        self.latest
    }
}

/// The operations of one slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Operations {
    entries: BTreeMap<OperationKey, Operation>,
    seq: u64,
}

impl Operations {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `request` as started under `key` and clears the key's error.
    pub fn begin(&mut self, key: OperationKey, request: RequestId) {
        let entry = self.entries.entry(key).or_default();
        entry.latest = Some(request);
        entry.in_flight.insert(request);
        entry.error = None;
    }

    /// Settles `request` as successful.
    ///
    /// Returns `true` if `request` is still the latest for `key`; only then is
    /// the outcome recorded.
    pub fn finish(&mut self, key: &OperationKey, request: RequestId) -> bool {
        let Some(entry) = self.entries.get_mut(key) else {
            return false;
        };
        entry.in_flight.remove(&request);
        if entry.latest != Some(request) {
            return false;
        }
        entry.outcome = OperationStatus::Succeeded;
        entry.error = None;
        true
    }

    /// Settles `request` as failed.
    ///
    /// Returns `true` if `request` is still the latest for `key`; only then are
    /// the outcome and error recorded.
    pub fn fail(&mut self, key: &OperationKey, request: RequestId, error: ClientError) -> bool {
        self.seq += 1;
        let seq = self.seq;
        let Some(entry) = self.entries.get_mut(key) else {
            return false;
        };
        entry.in_flight.remove(&request);
        if entry.latest != Some(request) {
            return false;
        }
        entry.outcome = OperationStatus::Failed;
        entry.error = Some(error);
        entry.seq = seq;
        true
    }

    /// Settles `request` as failed without recording an error.
    ///
    /// Used for background operations whose failure is an expected outcome
    /// rather than something to show the user.
    pub fn fail_quietly(&mut self, key: &OperationKey, request: RequestId) -> bool {
        let Some(entry) = self.entries.get_mut(key) else {
            return false;
        };
        entry.in_flight.remove(&request);
        if entry.latest != Some(request) {
            return false;
        }
        entry.outcome = OperationStatus::Failed;
        entry.error = None;
        true
    }

    /// Returns `true` if `request` is the latest started under `key`.
    #[must_use]
    pub fn is_latest(&self, key: &OperationKey, request: RequestId) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| entry.latest == Some(request))
    }

    /// Status of `key`.
    #[must_use]
    pub fn status(&self, key: &OperationKey) -> OperationStatus {
        self.entries
            .get(key)
            .map_or(OperationStatus::Idle, Operation::status)
    }

    /// Returns `true` if `key` has a request in flight.
    #[must_use]
    pub fn is_pending(&self, key: &OperationKey) -> bool {
        self.status(key) == OperationStatus::Pending
    }

    /// Returns `true` if any operation has a request in flight.
    #[must_use]
    pub fn any_pending(&self) -> bool {
        self.entries.values().any(|e| !e.in_flight.is_empty())
    }

    /// Error recorded for `key`.
    #[must_use]
    pub fn error(&self, key: &OperationKey) -> Option<&ClientError> {
        self.entries.get(key).and_then(Operation::error)
    }

    /// The most recently recorded error across all keys.
    #[must_use]
    pub fn latest_error(&self) -> Option<&ClientError> {
        self.entries
            .values()
            .filter(|e| e.error.is_some())
            .max_by_key(|e| e.seq)
            .and_then(Operation::error)
    }

    /// Drops all recorded errors; failed operations return to `Idle`.
    pub fn clear_errors(&mut self) {
        for entry in self.entries.values_mut() {
            entry.error = None;
            if entry.outcome == OperationStatus::Failed {
                entry.outcome = OperationStatus::Idle;
            }
        }
    }

    /// Forgets every operation, including in-flight ones.
    ///
    /// Responses of requests started before the reset are then stale.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Makes every request started under `key` so far stale.
    ///
    /// The requests still leave the in-flight set when they settle, but their
    /// `finish` and `fail` return `false` and record nothing.
    pub fn invalidate(&mut self, key: &OperationKey) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.latest = None;
        }
    }

    /// Keys with at least one request in flight.
    pub fn pending_keys(&self) -> impl Iterator<Item = &OperationKey> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.in_flight.is_empty())
            .map(|(key, _)| key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let mut ops = Operations::new();
        let key = OperationKey::FetchMentors;
        assert_eq!(ops.status(&key), OperationStatus::Idle);

        ops.begin(key.clone(), RequestId(1));
        assert_eq!(ops.status(&key), OperationStatus::Pending);
        assert!(ops.any_pending());

        assert!(ops.finish(&key, RequestId(1)));
        assert_eq!(ops.status(&key), OperationStatus::Succeeded);
        assert!(!ops.any_pending());
    }

    #[test]
    fn test_failure_records_error_and_retry_clears_it() {
        let mut ops = Operations::new();
        let key = OperationKey::Login;

        ops.begin(key.clone(), RequestId(1));
        assert!(ops.fail(&key, RequestId(1), ClientError::auth("Incorrect email or password")));
        assert_eq!(ops.status(&key), OperationStatus::Failed);
        assert_eq!(ops.latest_error().unwrap().message(), "Incorrect email or password");

        ops.begin(key.clone(), RequestId(2));
        assert!(ops.error(&key).is_none());
        assert!(ops.latest_error().is_none());
    }

    #[test]
    fn test_stale_request_does_not_settle() {
        let mut ops = Operations::new();
        let key = OperationKey::FetchResources(EntityId::from(7_u64));

        ops.begin(key.clone(), RequestId(1));
        ops.begin(key.clone(), RequestId(2));
        assert!(!ops.is_latest(&key, RequestId(1)));

        assert!(ops.finish(&key, RequestId(2)));
        assert_eq!(ops.status(&key), OperationStatus::Pending);

        assert!(!ops.fail(&key, RequestId(1), ClientError::network("late")));
        assert_eq!(ops.status(&key), OperationStatus::Succeeded);
        assert!(ops.error(&key).is_none());
    }

    #[test]
    fn test_keys_do_not_clobber_each_other() {
        let mut ops = Operations::new();
        let a = OperationKey::FetchResources(EntityId::from("a"));
        let b = OperationKey::FetchResources(EntityId::from("b"));

        ops.begin(a.clone(), RequestId(1));
        ops.begin(b.clone(), RequestId(2));
        assert!(ops.finish(&a, RequestId(1)));
        assert!(ops.is_pending(&b));
        assert_eq!(ops.status(&a), OperationStatus::Succeeded);
    }

    #[test]
    fn test_latest_error_is_most_recent() {
        let mut ops = Operations::new();
        ops.begin(OperationKey::FetchMentors, RequestId(1));
        ops.begin(OperationKey::CreateMentor, RequestId(2));
        ops.fail(&OperationKey::CreateMentor, RequestId(2), ClientError::api(400, "first"));
        ops.fail(&OperationKey::FetchMentors, RequestId(1), ClientError::api(500, "second"));
        assert_eq!(ops.latest_error().unwrap().message(), "second");

        ops.clear_errors();
        assert!(ops.latest_error().is_none());
        assert_eq!(ops.status(&OperationKey::FetchMentors), OperationStatus::Idle);
    }

    #[test]
    fn test_clear_makes_in_flight_requests_stale() {
        let mut ops = Operations::new();
        ops.begin(OperationKey::FetchMentors, RequestId(1));
        ops.clear();
        assert!(!ops.any_pending());
        assert!(!ops.finish(&OperationKey::FetchMentors, RequestId(1)));
    }

    #[test]
    fn test_key_display() {
        assert_eq!(OperationKey::Login.to_string(), "login");
        assert_eq!(
            OperationKey::DeleteResource(EntityId::from(42_u64)).to_string(),
            "delete_resource(42)"
        );
    }

    #[test]
    fn test_invalidate_makes_in_flight_requests_stale() {
        let mut ops = Operations::new();
        let key = OperationKey::FetchResources(EntityId::from(7_u64));
        ops.begin(key.clone(), RequestId(1));
        ops.finish(&key, RequestId(1));
        ops.begin(key.clone(), RequestId(2));

        ops.invalidate(&key);
        assert!(!ops.is_latest(&key, RequestId(2)));
        assert!(!ops.finish(&key, RequestId(2)));
        assert_eq!(ops.status(&key), OperationStatus::Succeeded);

        // A request started afterwards settles normally.
        ops.begin(key.clone(), RequestId(3));
        assert!(ops.finish(&key, RequestId(3)));
    }

    #[test]
    fn test_pending_keys_lists_only_in_flight() {
        let mut ops = Operations::new();
        let upload = OperationKey::UploadResource(EntityId::from(7_u64));
        ops.begin(OperationKey::FetchMentors, RequestId(1));
        ops.begin(upload.clone(), RequestId(2));
        ops.finish(&OperationKey::FetchMentors, RequestId(1));

        let pending: Vec<_> = ops.pending_keys().collect();
        assert_eq!(pending, [&upload]);
    }
}
