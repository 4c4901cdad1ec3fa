//! Read-only views over [`RootState`].
//!
//! Selectors are plain functions of a state snapshot. Use them with
//! [`Store::select`](crate::Store::select) to read under the lock without
//! cloning the whole state.

use mentoria_api::{ClientError, EntityId, Mentor, Resource, User, UserProfile};

use crate::slices::{AuthStatus, LoadingFlag, Modal, Notification, Tab};
use crate::state::RootState;

// ============================================================================
// Auth
// ============================================================================

/// The logged-in user.
#[must_use]
pub fn select_user(state: &RootState) -> Option<&User> {
    state.auth.user.as_ref()
}

/// Whether a session is active.
#[must_use]
pub const fn select_is_authenticated(state: &RootState) -> bool {
    state.auth.is_authenticated()
}

/// Coarse auth state.
#[must_use]
pub fn select_auth_status(state: &RootState) -> AuthStatus {
    state.auth.status()
}

/// Whether an auth operation is in flight.
#[must_use]
pub fn select_auth_loading(state: &RootState) -> bool {
    state.auth.is_loading()
}

/// The most recent auth error.
#[must_use]
pub fn select_auth_error(state: &RootState) -> Option<&ClientError> {
    state.auth.error()
}

/// The session token.
#[must_use]
pub fn select_auth_token(state: &RootState) -> Option<&str> {
    state.auth.token.as_deref()
}

/// The user's profile settings, or defaults when none are loaded.
#[must_use]
pub fn select_user_profile(state: &RootState) -> UserProfile {
    state
        .auth
        .user
        .as_ref()
        .and_then(|u| u.profile.clone())
        .unwrap_or_default()
}

// ============================================================================
// Mentors
// ============================================================================

/// All mentors in server order.
#[must_use]
pub fn select_all_mentors(state: &RootState) -> &[Mentor] {
    &state.mentors.mentors
}

/// The selected mentor id.
#[must_use]
pub fn select_active_mentor_id(state: &RootState) -> Option<&EntityId> {
    state.mentors.active_mentor_id.as_ref()
}

/// The selected mentor.
#[must_use]
pub fn select_active_mentor(state: &RootState) -> Option<&Mentor> {
    state
        .mentors
        .active_mentor_id
        .as_ref()
        .and_then(|id| state.mentors.find(id))
}

/// Looks a mentor up by id, accepting numeric and string ids alike.
#[must_use]
pub fn select_mentor_by_id(state: &RootState, id: impl Into<EntityId>) -> Option<&Mentor> {
    state.mentors.find(&id.into())
}

/// Resources of one mentor. Empty when the mentor is unknown.
#[must_use]
pub fn select_resources_for_mentor(state: &RootState, id: impl Into<EntityId>) -> &[Resource] {
    state
        .mentors
        .find(&id.into())
        .map_or(&[], |m| m.resources.as_slice())
}

/// Whether a mentor operation is in flight.
#[must_use]
pub fn select_mentors_loading(state: &RootState) -> bool {
    state.mentors.is_loading()
}

/// The most recent mentor error.
#[must_use]
pub fn select_mentors_error(state: &RootState) -> Option<&ClientError> {
    state.mentors.error()
}

// ============================================================================
// UI
// ============================================================================

/// Whether a modal is shown.
#[must_use]
pub fn select_is_modal_open(state: &RootState, modal: Modal) -> bool {
    state.ui.is_modal_open(modal)
}

/// Whether the sidebar is shown.
#[must_use]
pub const fn select_is_sidebar_open(state: &RootState) -> bool {
    state.ui.sidebar_open
}

/// The active dashboard tab.
#[must_use]
pub const fn select_active_tab(state: &RootState) -> Tab {
    state.ui.active_tab
}

/// The notification queue, oldest first.
#[must_use]
pub fn select_notifications(state: &RootState) -> &[Notification] {
    &state.ui.notifications
}

/// Whether a feature spinner is active.
#[must_use]
pub fn select_loading(state: &RootState, flag: LoadingFlag) -> bool {
    state.ui.is_loading(flag)
}
