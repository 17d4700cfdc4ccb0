//! Non-blocking toast notifications
//!
//! Toasts expire on their own; nothing waits on them.

use std::time::{Duration, Instant};

pub const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    pub created: Instant,
}

#[derive(Debug, Default)]
pub struct Notifications {
    toasts: Vec<Toast>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.push_at(level, message, Instant::now());
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Error, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Info, message);
    }

    fn push_at(&mut self, level: ToastLevel, message: impl Into<String>, created: Instant) {
        self.toasts.push(Toast {
            level,
            message: message.into(),
            created,
        });
    }

    /// Drop toasts older than [`TOAST_TTL`] as of `now`
    pub fn prune(&mut self, now: Instant) {
        self.toasts
            .retain(|toast| now.saturating_duration_since(toast.created) < TOAST_TTL);
    }

    /// Newest first
    pub fn active(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter().rev()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_drops_expired() {
        let start = Instant::now();
        let mut notifications = Notifications::new();
        notifications.push_at(ToastLevel::Success, "Code copied to clipboard", start);
        notifications.push_at(ToastLevel::Error, "Failed to copy", start + Duration::from_secs(3));

        notifications.prune(start + Duration::from_secs(5));

        let remaining: Vec<_> = notifications.active().map(|t| t.message.as_str()).collect();
        assert_eq!(remaining, vec!["Failed to copy"]);
    }

    #[test]
    fn test_active_is_newest_first() {
        let mut notifications = Notifications::new();
        notifications.info("one");
        notifications.error("two");
        let levels: Vec<_> = notifications.active().map(|t| t.level).collect();
        assert_eq!(levels, vec![ToastLevel::Error, ToastLevel::Info]);
    }
}
