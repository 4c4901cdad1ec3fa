//! Plain-text rendering of store state for the terminal.

use std::fmt::Write;

use mentoria_api::{Mentor, Resource, User};
use mentoria_store::{Notification, RedirectReason, Resolution};

/// Renders the mentor list, one mentor per line.
pub fn mentor_list(mentors: &[Mentor]) -> String {
    if mentors.is_empty() {
        return "No mentors yet. Create one with `mentoria mentors create`.".to_string();
    }
    mentors
        .iter()
        .map(|m| {
            let count = m.resources.len();
            let noun = if count == 1 { "resource" } else { "resources" };
            format!("[{}] {} - {} ({count} {noun})", m.id, m.name, m.expertise)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders a single mentor with its details.
pub fn mentor_detail(mentor: &Mentor) -> String {
    let mut out = format!("{} [{}]\n  Expertise: {}", mentor.name, mentor.id, mentor.expertise);
    if let Some(description) = &mentor.description {
        let _ = write!(out, "\n  Description: {description}");
    }
    if let Some(avatar) = &mentor.avatar_url {
        let _ = write!(out, "\n  Avatar: {avatar}");
    }
    let _ = write!(out, "\n  Resources: {}", mentor.resources.len());
    out
}

/// Renders a resource list, one resource per line.
pub fn resource_list(resources: &[Resource]) -> String {
    if resources.is_empty() {
        return "No resources uploaded for this mentor.".to_string();
    }
    resources
        .iter()
        .map(resource_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders one resource.
pub fn resource_line(resource: &Resource) -> String {
    let size = resource.formatted_size().unwrap_or_else(|| "-".to_string());
    format!(
        "[{}] {} ({}, {size}, {})",
        resource.id, resource.name, resource.kind, resource.status
    )
}

/// Renders the logged-in user.
pub fn user(user: &User) -> String {
    let mut out = format!("{} <{}>", user.display_name(), user.email);
    if let Some(profile) = &user.profile {
        let notifications = if profile.notifications_enabled { "on" } else { "off" };
        let _ = write!(
            out,
            "\n  Plan: {}\n  Notifications: {notifications}\n  Mentors: {}",
            profile.subscription_status, profile.mentor_count
        );
    }
    out
}

/// Renders a notification as a single line.
pub fn notification(notification: &Notification) -> String {
    format!(
        "[{}] {}: {}",
        notification.kind, notification.title, notification.message
    )
}

/// Renders the outcome of resolving a path.
pub fn resolution(resolution: &Resolution) -> String {
    match resolution {
        Resolution::Redirect { to, reason } => {
            let why = match reason {
                RedirectReason::Root => "root path",
                RedirectReason::UnknownPath => "unknown path",
                RedirectReason::NotAuthenticated => "not authenticated",
                RedirectReason::AlreadyAuthenticated => "already authenticated",
            };
            format!("redirect -> {to} ({why})")
        }
        Resolution::Render { page, layout } => {
            let mut out = format!("page: {}", page.path());
            match layout {
                Some(layout) => {
                    let _ = write!(out, "\ntitle: {}", layout.header.title);
                    if let Some(subtitle) = &layout.header.subtitle {
                        let _ = write!(out, "\nsubtitle: {subtitle}");
                    }
                    let nav = if layout.show_bottom_nav { "shown" } else { "hidden" };
                    let _ = write!(out, "\nbottom nav: {nav}");
                }
                None => out.push_str("\nlayout: none"),
            }
            out
        }
    }
}
