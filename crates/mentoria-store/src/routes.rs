//! Route shell: maps a path to a page, applies the auth guard, and derives the
//! page header.
//!
//! | Path             | Page             | Guard     | Layout                   |
//! |------------------|------------------|-----------|--------------------------|
//! | `/auth`          | auth             | public    | none                     |
//! | `/onboarding`    | onboarding       | protected | none                     |
//! | `/`              | redirect `/auth` |           |                          |
//! | `/mentors`       | mentor hub       | protected | "My Mentors", no nav     |
//! | `/mentor/{id}`   | mentor dashboard | protected | header from the mentor   |
//! | `/profile`       | profile          | protected | "Profile", no nav        |
//! | anything else    | redirect `/mentors` |        |                          |
//!
//! An authenticated user opening `/auth` is sent to `/mentors`.

use mentoria_api::EntityId;
use serde::{Deserialize, Serialize};

use crate::state::RootState;

/// Title shown when a page has no header of its own.
pub const DEFAULT_TITLE: &str = "MentorIA";

/// Title used while the dashboard's mentor is not (yet) in state.
pub const FALLBACK_MENTOR_TITLE: &str = "Mentor";

/// Subtitle used while the dashboard's mentor is not (yet) in state.
pub const FALLBACK_MENTOR_SUBTITLE: &str = "Your study mentor";

/// Top-level pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum Page {
    /// Login and registration.
    Auth,
    /// First-run walkthrough.
    Onboarding,
    /// List of the user's mentors.
    MentorHub,
    /// One mentor's dashboard.
    MentorDashboard {
        /// Mentor named by the path.
        mentor_id: EntityId,
    },
    /// Account settings.
    Profile,
}

impl Page {
    /// Canonical path of the page.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Auth => "/auth".to_string(),
            Self::Onboarding => "/onboarding".to_string(),
            Self::MentorHub => "/mentors".to_string(),
            Self::MentorDashboard { mentor_id } => format!("/mentor/{mentor_id}"),
            Self::Profile => "/profile".to_string(),
        }
    }

    /// Whether the page requires a session.
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        !matches!(self, Self::Auth)
    }
}

/// Header above a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Main title.
    pub title: String,
    /// Secondary line, if any.
    pub subtitle: Option<String>,
}

impl Header {
    /// Creates a header with a title only.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
        }
    }

    /// Adds a subtitle.
    #[must_use]
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE)
    }
}

/// App frame around a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    /// Page header.
    pub header: Header,
    /// Whether the bottom tab bar is shown.
    pub show_bottom_nav: bool,
}

/// Why a path redirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    /// The root path always goes to `/auth`.
    Root,
    /// No route matched.
    UnknownPath,
    /// A protected page was requested without a session.
    NotAuthenticated,
    /// `/auth` was requested with a session.
    AlreadyAuthenticated,
}

/// Outcome of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// Render a page.
    Render {
        /// The page.
        page: Page,
        /// Its frame; `None` for full-screen pages.
        layout: Option<Layout>,
    },
    /// Go somewhere else.
    Redirect {
        /// Target path.
        to: String,
        /// Why.
        reason: RedirectReason,
    },
}

impl Resolution {
    /// The rendered page, if any.
    #[must_use]
    pub const fn page(&self) -> Option<&Page> {
        match self {
            Self::Render { page, .. } => Some(page),
            Self::Redirect { .. } => None,
        }
    }

    /// The frame of the rendered page, if any.
    #[must_use]
    pub const fn layout(&self) -> Option<&Layout> {
        match self {
            Self::Render { layout, .. } => layout.as_ref(),
            Self::Redirect { .. } => None,
        }
    }

    /// The redirect target, if any.
    #[must_use]
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Render { .. } => None,
            Self::Redirect { to, .. } => Some(to),
        }
    }
}

/// Matches a path to a page without looking at state.
///
/// Returns `Err` with the redirect for paths that never render.
///
/// # Errors
///
/// Returns the redirect for `/` and for unknown paths.
pub fn match_path(path: &str) -> Result<Page, Resolution> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [] => Err(redirect("/auth", RedirectReason::Root)),
        ["auth"] => Ok(Page::Auth),
        ["onboarding"] => Ok(Page::Onboarding),
        ["mentors"] => Ok(Page::MentorHub),
        ["mentor", id] if !id.trim().is_empty() => Ok(Page::MentorDashboard {
            mentor_id: EntityId::from(*id),
        }),
        ["profile"] => Ok(Page::Profile),
        _ => Err(redirect("/mentors", RedirectReason::UnknownPath)),
    }
}

/// Resolves a path against the current state.
#[must_use]
pub fn resolve(path: &str, state: &RootState) -> Resolution {
    let page = match match_path(path) {
        Ok(page) => page,
        Err(redirect) => return redirect,
    };

    let authenticated = state.auth.is_authenticated();
    if page.is_protected() && !authenticated {
        return redirect("/auth", RedirectReason::NotAuthenticated);
    }
    if page == Page::Auth && authenticated {
        return redirect("/mentors", RedirectReason::AlreadyAuthenticated);
    }

    let layout = layout_for(&page, state);
    Resolution::Render { page, layout }
}

/// Header of a mentor dashboard.
///
/// A mentor that is not in state yet gets a neutral placeholder header.
#[must_use]
pub fn mentor_header(state: &RootState, mentor_id: &EntityId) -> Header {
    state.mentors.find(mentor_id).map_or_else(
        || Header::new(FALLBACK_MENTOR_TITLE).with_subtitle(FALLBACK_MENTOR_SUBTITLE),
        |mentor| Header::new(mentor.name.clone()).with_subtitle(mentor.expertise.clone()),
    )
}

fn layout_for(page: &Page, state: &RootState) -> Option<Layout> {
    match page {
        Page::Auth | Page::Onboarding => None,
        Page::MentorHub => Some(Layout {
            header: Header::new("My Mentors"),
            show_bottom_nav: false,
        }),
        Page::MentorDashboard { mentor_id } => Some(Layout {
            header: mentor_header(state, mentor_id),
            show_bottom_nav: true,
        }),
        Page::Profile => Some(Layout {
            header: Header::new("Profile"),
            show_bottom_nav: false,
        }),
    }
}

fn redirect(to: &str, reason: RedirectReason) -> Resolution {
    Resolution::Redirect {
        to: to.to_string(),
        reason,
    }
}
