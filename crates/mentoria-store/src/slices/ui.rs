//! UI slice: modal flags, sidebar, active tab, notifications and per-feature
//! loading flags.
//!
//! Every reducer here is synchronous and replaces state directly.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Modals that can be shown over the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modal {
    /// New mentor form.
    MentorCreation,
    /// File or link upload form.
    ResourceUpload,
    /// Quiz generation dialog.
    QuizGeneration,
    /// Flashcard generation dialog.
    FlashcardGeneration,
}

/// Tabs of the mentor dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    /// Conversation with the mentor.
    #[default]
    Chat,
    /// Uploaded resources.
    Resources,
    /// Generated quizzes.
    Quiz,
    /// Generated flashcards.
    Flashcards,
    /// Mentor settings.
    Settings,
}

impl Tab {
    /// Returns the tab name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Resources => "resources",
            Self::Quiz => "quiz",
            Self::Flashcards => "flashcards",
            Self::Settings => "settings",
        }
    }
}

/// Features that show their own spinner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingFlag {
    /// Whole-page spinner.
    Global,
    /// Mentor creation in progress.
    MentorCreation,
    /// Resource upload in progress.
    ResourceUpload,
    /// Quiz generation in progress.
    QuizGeneration,
    /// Flashcard generation in progress.
    FlashcardGeneration,
}

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Error,
    /// Neutral information.
    Info,
    /// Something needs attention.
    Warning,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A notification waiting in the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Id assigned on append, unique for the lifetime of the slice.
    pub id: u64,
    /// Severity.
    pub kind: NotificationKind,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// When the notification was appended.
    pub timestamp: DateTime<Utc>,
}

/// A notification before it is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    /// Severity.
    pub kind: NotificationKind,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
}

impl NewNotification {
    /// Creates a notification of any kind.
    #[must_use]
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Creates a success notification.
    #[must_use]
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, title, message)
    }

    /// Creates an error notification.
    #[must_use]
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, title, message)
    }

    /// Creates an info notification.
    #[must_use]
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, title, message)
    }
}

/// State of the UI slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    /// Open modals.
    pub open_modals: BTreeSet<Modal>,
    /// Whether the sidebar is shown.
    pub sidebar_open: bool,
    /// Active dashboard tab.
    pub active_tab: Tab,
    /// Notification queue, oldest first.
    pub notifications: Vec<Notification>,
    /// Active per-feature spinners.
    pub loading: BTreeSet<LoadingFlag>,
    next_notification_id: u64,
}

impl UiState {
    // ========================================================================
    // Modals
    // ========================================================================

    /// Shows a modal.
    pub fn open_modal(&mut self, modal: Modal) {
        self.open_modals.insert(modal);
    }

    /// Hides a modal.
    pub fn close_modal(&mut self, modal: Modal) {
        self.open_modals.remove(&modal);
    }

    /// Flips a modal.
    pub fn toggle_modal(&mut self, modal: Modal) {
        if !self.open_modals.remove(&modal) {
            self.open_modals.insert(modal);
        }
    }

    /// Whether a modal is shown.
    #[must_use]
    pub fn is_modal_open(&self, modal: Modal) -> bool {
        self.open_modals.contains(&modal)
    }

    // ========================================================================
    // Sidebar and tabs
    // ========================================================================

    /// Shows the sidebar.
    pub fn open_sidebar(&mut self) {
        self.sidebar_open = true;
    }

    /// Hides the sidebar.
    pub fn close_sidebar(&mut self) {
        self.sidebar_open = false;
    }

    /// Flips the sidebar.
    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    /// Switches the dashboard tab.
    pub fn set_active_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Appends a notification and returns its id.
    pub fn add_notification(&mut self, notification: NewNotification) -> u64 {
        self.next_notification_id += 1;
        let id = self.next_notification_id;
        self.notifications.push(Notification {
            id,
            kind: notification.kind,
            title: notification.title,
            message: notification.message,
            timestamp: Utc::now(),
        });
        id
    }

    /// Removes a notification. Returns `false` if the id is unknown.
    pub fn remove_notification(&mut self, id: u64) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        self.notifications.len() != before
    }

    /// Empties the queue.
    pub fn clear_notifications(&mut self) {
        self.notifications.clear();
    }

    // ========================================================================
    // Loading flags
    // ========================================================================

    /// Sets or clears a spinner.
    pub fn set_loading(&mut self, flag: LoadingFlag, on: bool) {
        if on {
            self.loading.insert(flag);
        } else {
            self.loading.remove(&flag);
        }
    }

    /// Whether a spinner is active.
    #[must_use]
    pub fn is_loading(&self, flag: LoadingFlag) -> bool {
        self.loading.contains(&flag)
    }

    /// Restores the initial state. Notification ids keep increasing.
    pub fn reset(&mut self) {
        let next = self.next_notification_id;
        *self = Self::default();
        self.next_notification_id = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_then_close_restores_flag() {
        let mut ui = UiState::default();
        let before = ui.is_modal_open(Modal::MentorCreation);
        ui.open_modal(Modal::MentorCreation);
        assert!(ui.is_modal_open(Modal::MentorCreation));
        ui.close_modal(Modal::MentorCreation);
        assert_eq!(ui.is_modal_open(Modal::MentorCreation), before);
    }

    #[test]
    fn test_toggle_modal_is_independent() {
        let mut ui = UiState::default();
        ui.toggle_modal(Modal::QuizGeneration);
        assert!(ui.is_modal_open(Modal::QuizGeneration));
        assert!(!ui.is_modal_open(Modal::FlashcardGeneration));
        ui.toggle_modal(Modal::QuizGeneration);
        assert!(!ui.is_modal_open(Modal::QuizGeneration));
    }

    #[test]
    fn test_sidebar_and_tab() {
        let mut ui = UiState::default();
        ui.toggle_sidebar();
        assert!(ui.sidebar_open);
        ui.close_sidebar();
        assert!(!ui.sidebar_open);
        assert_eq!(ui.active_tab, Tab::Chat);
        ui.set_active_tab(Tab::Resources);
        assert_eq!(ui.active_tab.as_str(), "resources");
    }

    #[test]
    fn test_notification_queue() {
        let mut ui = UiState::default();
        let first = ui.add_notification(NewNotification::success("Saved", "Mentor created"));
        let second = ui.add_notification(NewNotification::error("Oops", "Upload failed"));
        assert_ne!(first, second);
        assert_eq!(ui.notifications.len(), 2);
        assert_eq!(ui.notifications[1].kind, NotificationKind::Error);

        assert!(ui.remove_notification(first));
        assert!(!ui.remove_notification(first));
        assert_eq!(ui.notifications.len(), 1);

        ui.clear_notifications();
        assert!(ui.notifications.is_empty());
    }

    #[test]
    fn test_reset_keeps_ids_unique() {
        let mut ui = UiState::default();
        let first = ui.add_notification(NewNotification::info("a", "b"));
        ui.open_modal(Modal::ResourceUpload);
        ui.set_loading(LoadingFlag::ResourceUpload, true);
        ui.reset();
        assert!(ui.open_modals.is_empty());
        assert!(!ui.is_loading(LoadingFlag::ResourceUpload));
        let second = ui.add_notification(NewNotification::info("c", "d"));
        assert!(second > first);
    }
}
