//! Ephemeral notifications shown in the top-right corner after a write.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::style::{Color, Style};

/// Never show more than this many notifications at once.
const MAX_VISIBLE: usize = 3;

/// Severity, which only decides the colour.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    /// Green for success, red for errors.
    pub(crate) fn style(self) -> Style {
        match self {
            ToastKind::Success => Style::default().fg(Color::Green),
            ToastKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// A short-lived, non-modal notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    /// Second line; error toasts put the backend message here.
    pub description: Option<String>,
    pub kind: ToastKind,
}

impl Toast {
    /// Title-only notification, e.g. "Venue added.".
    pub fn success<S: Into<String>>(title: S) -> Self {
        Self {
            title: title.into(),
            description: None,
            kind: ToastKind::Success,
        }
    }

    /// Failure with the error text as description.
    pub fn error<T: Into<String>, D: Into<String>>(title: T, description: D) -> Self {
        Self {
            title: title.into(),
            description: Some(description.into()),
            kind: ToastKind::Error,
        }
    }
}

/// The stack of visible toasts, oldest first.
pub(crate) struct Toasts {
    /// Each toast with the moment it was shown.
    entries: VecDeque<(Toast, Instant)>,
    ttl: Duration,
}

impl Toasts {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            entries: VecDeque::new(),
            ttl,
        }
    }

    /// Show `toast`, dropping the oldest when the stack is full.
    pub(crate) fn push(&mut self, toast: Toast, now: Instant) {
        if self.entries.len() == MAX_VISIBLE {
            self.entries.pop_front();
        }
        self.entries.push_back((toast, now));
    }

    /// Drop everything older than the configured lifetime. Returns whether
    /// anything went away.
    pub(crate) fn expire(&mut self, now: Instant) -> bool {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries
            .retain(|(_, shown)| now.saturating_duration_since(*shown) < ttl);
        before != self.entries.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.entries.iter().map(|(toast, _)| toast)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
