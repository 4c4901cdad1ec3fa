//! MentorIA Store
//!
//! Application state, async flows and route shell for the MentorIA client.

pub mod config;
pub mod error;
pub mod events;
pub mod ops;
pub mod routes;
pub mod selectors;
pub mod slices;
pub mod state;
pub mod store;
pub mod thunks;

pub use config::{Config, API_URL_ENV, CONFIG_FILE_NAME};
pub use error::{Result, StoreError};
pub use events::{EventBroadcaster, Slice, StoreEvent};
pub use ops::{Operation, OperationKey, OperationStatus, Operations, RequestId};
pub use routes::{resolve, Header, Layout, Page, RedirectReason, Resolution};
pub use slices::{
    AuthState, AuthStatus, LoadingFlag, MentorsState, Modal, NewNotification, Notification,
    NotificationKind, Tab, UiState,
};
pub use state::RootState;
pub use store::Store;
pub use thunks::mentors::default_description;
