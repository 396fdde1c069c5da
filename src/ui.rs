// src/ui.rs
//! Seams between the components and whatever presents them

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Destructive,
}

/// A short-lived message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Destructive,
            title: title.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.kind {
            NoticeKind::Success => "✓",
            NoticeKind::Destructive => "✗",
        };
        if self.description.is_empty() {
            write!(f, "{} {}", marker, self.title)
        } else {
            write!(f, "{} {}: {}", marker, self.title, self.description)
        }
    }
}

/// Views the front end can move to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    MatchedJobs,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::MatchedJobs => "/matched-jobs",
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Prints notices to stdout.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        app_log!(debug, "Notice: {:?}", notification);
        println!("{}", notification);
    }
}
