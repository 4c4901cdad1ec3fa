//! Async flows that call the backend and apply reducer steps around the call.
//!
//! Every thunk follows the same shape:
//!
//! 1. take a [`RequestId`] and dispatch `<action>/pending`
//! 2. await the service call (the only suspension point)
//! 3. dispatch `<action>/fulfilled` or `<action>/rejected`
//!
//! Failures are stored in the slice and also returned to the caller, so a
//! retry is simply calling the thunk again. Thunks are inherent methods of
//! [`Store`]; see [`auth`] and [`mentors`].

pub mod auth;
pub mod mentors;

use mentoria_api::ClientError;

use crate::events::Slice;
use crate::ops::{OperationKey, RequestId};
use crate::slices::NewNotification;
use crate::store::Store;

impl Store {
    /// Starts an auth operation.
    pub(crate) async fn begin_auth(&self, key: OperationKey) -> RequestId {
        let request = self.next_request_id();
        let action = format!("{}/pending", key.name());
        self.dispatch(Slice::Auth, action, |s| s.auth.begin(key, request))
            .await;
        request
    }

    /// Starts a mentors operation.
    pub(crate) async fn begin_mentors(&self, key: OperationKey) -> RequestId {
        let request = self.next_request_id();
        let action = format!("{}/pending", key.name());
        self.dispatch(Slice::Mentors, action, |s| s.mentors.begin(key, request))
            .await;
        request
    }

    /// Records a failed mentors operation and drops the session if the token
    /// was rejected.
    pub(crate) async fn reject_mentors(
        &self,
        key: OperationKey,
        request: RequestId,
        error: &ClientError,
    ) {
        let action = format!("{}/rejected", key.name());
        let err = error.clone();
        self.dispatch(Slice::Mentors, action, |s| {
            s.mentors.fail(&key, request, err);
        })
        .await;
        self.handle_session_expiry(error).await;
    }

    /// Pushes an error notification for a failed user action.
    pub(crate) async fn notify_failure(&self, title: &str, error: &ClientError) {
        self.notify(NewNotification::error(title, error.message()))
            .await;
    }
}
