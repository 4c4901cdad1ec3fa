//! Store change notifications.
//!
//! Every reducer step applied through the [`Store`](crate::Store) broadcasts a
//! [`StoreEvent`] naming the slice and action, so views can re-read the state
//! they display. Events carry no state; subscribers call
//! [`Store::select`](crate::Store::select) to read it.
//!
//! # Example
//!
//! ```no_run
//! use mentoria_store::events::{EventBroadcaster, Slice, StoreEvent};
//!
//! # async fn example() {
//! let broadcaster = EventBroadcaster::new(16);
//! let mut receiver = broadcaster.subscribe();
//!
//! broadcaster.send(StoreEvent::new(Slice::Ui, "open_modal"));
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("{} changed: {}", event.slice, event.action);
//! }
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ============================================================================
// Events
// ============================================================================

/// State container touched by a reducer step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slice {
    /// Session and user.
    Auth,
    /// Mentors and resources.
    Mentors,
    /// Ephemeral view state.
    Ui,
}

impl std::fmt::Display for Slice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auth => write!(f, "auth"),
            Self::Mentors => write!(f, "mentors"),
            Self::Ui => write!(f, "ui"),
        }
    }
}

/// One applied reducer step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreEvent {
    /// Slice that changed.
    pub slice: Slice,
    /// Action name, e.g. `fetch_mentors/fulfilled` or `open_modal`.
    pub action: String,
    /// When the step was applied.
    pub timestamp: DateTime<Utc>,
}

impl StoreEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(slice: Slice, action: impl Into<String>) -> Self {
        Self {
            slice,
            action: action.into(),
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// Event Broadcaster
// ============================================================================

/// Broadcasts store events to every subscriber.
///
/// Events are not buffered for subscribers that join later. A subscriber that
/// falls more than `capacity` events behind receives `Lagged` and skips ahead.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<StoreEvent>,
}

impl EventBroadcaster {
    /// Creates a broadcaster with the given per-subscriber buffer.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Creates a new subscriber.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }

    /// Broadcasts an event. Returns the number of subscribers reached.
    pub fn send(&self, event: StoreEvent) -> usize {
        // send() only fails when nobody is listening
        self.sender.send(event).unwrap_or(0)
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(64)
    }
}
