//! The application store.
//!
//! [`Store`] owns the [`RootState`] behind a lock, the API client, and the event
//! broadcaster. Reducer steps run through [`Store::dispatch`], one at a time;
//! async flows (thunks) live in [`crate::thunks`] as further methods on
//! `Store`.
//!
//! The store is an explicit context object: clone it to share it between
//! tasks, there is no global instance.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use mentoria_api::{ApiClient, ClientError, EntityId, TokenStore};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::Result;
use crate::events::{EventBroadcaster, Slice, StoreEvent};
use crate::ops::RequestId;
use crate::routes::{resolve, Resolution};
use crate::slices::{Modal, NewNotification, Tab};
use crate::state::RootState;

struct Inner {
    state: RwLock<RootState>,
    api: ApiClient,
    events: EventBroadcaster,
    next_request: AtomicU64,
    config: Config,
}

/// Shared handle to the application state and its services.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("api_base_url", &self.inner.api.http().base_url())
            .field("subscribers", &self.inner.events.receiver_count())
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Builds a store talking to the backend named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: Config, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        config.validate()?;
        let api = ApiClient::new(config.client_options(), tokens)?
            .with_max_upload_bytes(config.max_upload_bytes());
        Ok(Self::with_api(api, config))
    }

    /// Builds a store around an existing API client.
    #[must_use]
    pub fn with_api(api: ApiClient, config: Config) -> Self {
        let events = EventBroadcaster::new(config.event_capacity);
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(RootState::new()),
                api,
                events,
                next_request: AtomicU64::new(0),
                config,
            }),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// The configuration the store was built with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// A snapshot of the whole state.
    pub async fn state(&self) -> RootState {
        self.inner.state.read().await.clone()
    }

    /// Runs a selector under the read lock.
    pub async fn select<T>(&self, selector: impl FnOnce(&RootState) -> T) -> T {
        let state = self.inner.state.read().await;
        selector(&state)
    }

    /// Subscribes to change events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.events.subscribe()
    }

    /// Takes the next request id from the store-wide generation counter.
    #[must_use]
    pub fn next_request_id(&self) -> RequestId {
        RequestId(self.inner.next_request.fetch_add(1, Ordering::Relaxed) + 1)
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Applies one reducer step under the write lock and announces it.
    ///
    /// The lock is released before the event is broadcast, so subscribers can
    /// read the new state right away.
    pub async fn dispatch<T>(
        &self,
        slice: Slice,
        action: impl Into<String>,
        reducer: impl FnOnce(&mut RootState) -> T,
    ) -> T {
        let action = action.into();
        let result = {
            let mut state = self.inner.state.write().await;
            reducer(&mut state)
        };
        debug!(slice = %slice, action = %action, "Reducer applied");
        self.inner.events.send(StoreEvent::new(slice, action));
        result
    }

    // ========================================================================
    // Synchronous actions
    // ========================================================================

    /// Shows a modal.
    pub async fn open_modal(&self, modal: Modal) {
        self.dispatch(Slice::Ui, "open_modal", |s| s.ui.open_modal(modal))
            .await;
    }

    /// Hides a modal.
    pub async fn close_modal(&self, modal: Modal) {
        self.dispatch(Slice::Ui, "close_modal", |s| s.ui.close_modal(modal))
            .await;
    }

    /// Flips a modal.
    pub async fn toggle_modal(&self, modal: Modal) {
        self.dispatch(Slice::Ui, "toggle_modal", |s| s.ui.toggle_modal(modal))
            .await;
    }

    /// Flips the sidebar.
    pub async fn toggle_sidebar(&self) {
        self.dispatch(Slice::Ui, "toggle_sidebar", |s| s.ui.toggle_sidebar())
            .await;
    }

    /// Switches the dashboard tab.
    pub async fn set_active_tab(&self, tab: Tab) {
        self.dispatch(Slice::Ui, "set_active_tab", |s| s.ui.set_active_tab(tab))
            .await;
    }

    /// Appends a notification and returns its id.
    pub async fn notify(&self, notification: NewNotification) -> u64 {
        self.dispatch(Slice::Ui, "add_notification", |s| {
            s.ui.add_notification(notification)
        })
        .await
    }

    /// Removes a notification.
    pub async fn remove_notification(&self, id: u64) -> bool {
        self.dispatch(Slice::Ui, "remove_notification", |s| {
            s.ui.remove_notification(id)
        })
        .await
    }

    /// Empties the notification queue.
    pub async fn clear_notifications(&self) {
        self.dispatch(Slice::Ui, "clear_notifications", |s| {
            s.ui.clear_notifications();
        })
        .await;
    }

    /// Selects a mentor. Returns `false` if the id is unknown.
    pub async fn set_active_mentor(&self, id: Option<EntityId>) -> bool {
        self.dispatch(Slice::Mentors, "set_active_mentor", |s| {
            s.mentors.set_active_mentor(id)
        })
        .await
    }

    /// Clears the auth error.
    pub async fn clear_auth_error(&self) {
        self.dispatch(Slice::Auth, "clear_error", |s| s.auth.clear_error())
            .await;
    }

    /// Clears the mentors error.
    pub async fn clear_mentors_error(&self) {
        self.dispatch(Slice::Mentors, "clear_error", |s| s.mentors.clear_error())
            .await;
    }

    /// Acknowledges a registration.
    pub async fn reset_registration_success(&self) {
        self.dispatch(Slice::Auth, "reset_registration_success", |s| {
            s.auth.reset_registration_success();
        })
        .await;
    }

    /// Drops the in-memory session when `error` means the token was rejected.
    ///
    /// The HTTP layer has already removed the persisted token by then.
    /// Returns `true` if the session was dropped.
    pub async fn handle_session_expiry(&self, error: &ClientError) -> bool {
        if !error.forces_logout() {
            return false;
        }
        let was_authenticated = self.select(|s| s.auth.is_authenticated()).await;
        if was_authenticated {
            warn!(error = %error, "Session rejected by the server, logging out");
            self.dispatch(Slice::Auth, "session_expired", |s| s.auth.session_expired())
                .await;
            self.dispatch(Slice::Mentors, "reset", |s| s.mentors.reset())
                .await;
        }
        was_authenticated
    }

    // ========================================================================
    // Routing
    // ========================================================================

    /// Resolves a path against the current state.
    pub async fn navigate(&self, path: &str) -> Resolution {
        let resolution = self.select(|s| resolve(path, s)).await;
        debug!(path, resolution = ?resolution, "Route resolved");
        resolution
    }
}
