//! Footer alerts. Checkout failures, confirmations and gated-action warnings
//! all go through here; form validation stays inline on the form.

use std::time::{Duration, Instant};

/// An identical message inside this window is dropped.
const DEDUP_WINDOW: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationLevel {
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Info => "•",
            Self::Success => "✓",
            Self::Warning => "!",
            Self::Error => "✗",
        }
    }

    fn lifetime(&self) -> Duration {
        match self {
            Self::Info | Self::Success => Duration::from_secs(3),
            Self::Warning => Duration::from_secs(4),
            Self::Error => Duration::from_secs(6),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    /// Set when the notification becomes visible
    expires_at: Option<Instant>,
}

impl Notification {
    fn with_level(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
            expires_at: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Error, message)
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }

    fn shown(mut self, now: Instant) -> Self {
        self.expires_at = Some(now + self.level.lifetime());
        self
    }
}

/// The visible notification and a backlog ordered most severe first.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    visible: Option<Notification>,
    backlog: Vec<Notification>,
    seen: Vec<(String, Instant)>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A more severe notification takes over the footer immediately and the
    /// one it displaces is dropped.
    pub fn push(&mut self, notification: Notification) {
        let now = Instant::now();
        self.seen.retain(|(_, until)| *until > now);
        if self.seen.iter().any(|(message, _)| *message == notification.message) {
            return;
        }
        self.seen.push((notification.message.clone(), now + DEDUP_WINDOW));

        let outranks = self
            .visible
            .as_ref()
            .map_or(true, |visible| notification.level > visible.level);
        if outranks {
            self.visible = Some(notification.shown(now));
        } else {
            // stable: equal levels keep arrival order
            let at = self
                .backlog
                .partition_point(|queued| queued.level >= notification.level);
            self.backlog.insert(at, notification);
        }
    }

    pub fn current(&self) -> Option<&Notification> {
        self.visible.as_ref()
    }

    pub fn dismiss(&mut self) {
        self.visible = None;
        self.promote(Instant::now());
    }

    pub fn tick(&mut self, now: Instant) {
        if self.visible.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.visible = None;
            self.promote(now);
        }
    }

    fn promote(&mut self, now: Instant) {
        if self.visible.is_none() && !self.backlog.is_empty() {
            let next = self.backlog.remove(0);
            self.visible = Some(next.shown(now));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_none() && self.backlog.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_dismiss() {
        let mut alerts = NotificationQueue::new();
        assert!(alerts.is_empty());

        alerts.push(Notification::info("Task added"));
        assert_eq!(alerts.current().unwrap().message, "Task added");

        alerts.dismiss();
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_error_takes_over_footer() {
        let mut alerts = NotificationQueue::new();
        alerts.push(Notification::info("saved"));
        alerts.push(Notification::error("Checkout failed"));
        assert_eq!(alerts.current().unwrap().level, NotificationLevel::Error);
        alerts.dismiss();
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_backlog_most_severe_first() {
        let mut alerts = NotificationQueue::new();
        alerts.push(Notification::error("a"));
        alerts.push(Notification::info("b"));
        alerts.push(Notification::warning("c"));
        alerts.push(Notification::info("d"));
        alerts.dismiss();
        assert_eq!(alerts.current().unwrap().message, "c");
        alerts.dismiss();
        assert_eq!(alerts.current().unwrap().message, "b");
        alerts.dismiss();
        assert_eq!(alerts.current().unwrap().message, "d");
    }

    #[test]
    fn test_repeated_message_dropped() {
        let mut alerts = NotificationQueue::new();
        alerts.push(Notification::error("same"));
        alerts.push(Notification::error("same"));
        alerts.dismiss();
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_expired_notification_advances() {
        let mut alerts = NotificationQueue::new();
        alerts.push(Notification::info("one"));
        alerts.push(Notification::info("two"));
        alerts.tick(Instant::now() + Duration::from_secs(4));
        assert_eq!(alerts.current().unwrap().message, "two");
        assert!(!alerts.current().unwrap().is_expired(Instant::now()));
    }
}
