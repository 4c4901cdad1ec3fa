//! The combined application state.

use crate::slices::{AuthState, MentorsState, UiState};

/// Every slice of the application state.
///
/// Cloning takes a snapshot; the live copy is only reachable through the
/// [`Store`](crate::Store).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootState {
    /// Session and user.
    pub auth: AuthState,
    /// Mentors and their resources.
    pub mentors: MentorsState,
    /// Ephemeral view state.
    pub ui: UiState,
}

impl RootState {
    /// Creates the initial state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
