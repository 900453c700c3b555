//! Transient toast notifications

use std::time::{Duration, Instant};

/// How long a toast stays on screen
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub level: Level,
    pub message: String,
    created: Instant,
}

impl Toast {
    fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.created) >= TOAST_DURATION
    }
}

/// Queue of toasts, oldest first
#[derive(Debug, Default)]
pub struct Notifications {
    toasts: Vec<Toast>,
}

impl Notifications {
    pub fn push(&mut self, level: Level, message: impl Into<String>) {
        self.push_at(level, message, Instant::now());
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Level::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Level::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Level::Error, message);
    }

    fn push_at(&mut self, level: Level, message: impl Into<String>, created: Instant) {
        self.toasts.push(Toast {
            level,
            message: message.into(),
            created,
        });
    }

    /// Drop toasts that have been visible for [`TOAST_DURATION`]
    pub fn prune(&mut self) {
        self.prune_at(Instant::now());
    }

    fn prune_at(&mut self, now: Instant) {
        self.toasts.retain(|toast| !toast.expired(now));
    }

    pub fn active(&self) -> &[Toast] {
        &self.toasts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_expire_after_duration() {
        let mut notifications = Notifications::default();
        let start = Instant::now();

        notifications.push_at(Level::Success, "Task added successfully!", start);
        notifications.push_at(Level::Error, "later", start + Duration::from_secs(2));

        notifications.prune_at(start + Duration::from_millis(2999));
        assert_eq!(notifications.active().len(), 2);

        notifications.prune_at(start + TOAST_DURATION);
        let remaining: Vec<&str> = notifications
            .active()
            .iter()
            .map(|toast| toast.message.as_str())
            .collect();
        assert_eq!(remaining, vec!["later"]);
    }

    #[test]
    fn helpers_set_level() {
        let mut notifications = Notifications::default();
        notifications.info("a");
        notifications.success("b");
        notifications.error("c");

        let levels: Vec<Level> = notifications.active().iter().map(|t| t.level).collect();
        assert_eq!(levels, vec![Level::Info, Level::Success, Level::Error]);
    }
}
