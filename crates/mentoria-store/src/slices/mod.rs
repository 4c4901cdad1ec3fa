//! State containers.
//!
//! Each slice owns one bounded domain and exposes plain reducer methods. The
//! [`Store`](crate::Store) applies them under its lock, one step at a time.

pub mod auth;
pub mod mentors;
pub mod ui;

pub use auth::{AuthState, AuthStatus};
pub use mentors::MentorsState;
pub use ui::{LoadingFlag, Modal, NewNotification, Notification, NotificationKind, Tab, UiState};
