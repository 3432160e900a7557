//! Transient error messages shown at the bottom of the window

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long a toast stays up
pub const LONG: Duration = Duration::from_millis(3500);

/// Older toasts are dropped past this many
const MAX_VISIBLE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct Toasts {
    items: VecDeque<Toast>,
}

impl Toasts {
    pub fn push(&mut self, message: impl Into<String>, now: Instant) {
        self.items.push_back(Toast {
            message: message.into(),
            expires_at: now + LONG,
        });
        while self.items.len() > MAX_VISIBLE {
            self.items.pop_front();
        }
    }

    /// Drop every toast whose time is up
    pub fn prune(&mut self, now: Instant) {
        self.items.retain(|toast| toast.expires_at > now);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
