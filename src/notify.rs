// Transient user-facing notifications

use std::time::{Duration, Instant};

/// How long a notification stays visible
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub shown_at: Instant,
}

impl Notification {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= NOTIFICATION_TTL
    }
}

/// Holds at most one notification; a new one replaces whatever is showing
#[derive(Debug, Default)]
pub struct NotificationCenter {
    current: Option<Notification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, kind: NotificationKind, message: impl Into<String>, now: Instant) -> &Notification {
        self.current.insert(Notification {
            kind,
            message: message.into(),
            shown_at: now,
        })
    }

    pub fn success(&mut self, message: impl Into<String>) -> &Notification {
        self.show(NotificationKind::Success, message, Instant::now())
    }

    pub fn warning(&mut self, message: impl Into<String>) -> &Notification {
        self.show(NotificationKind::Warning, message, Instant::now())
    }

    pub fn error(&mut self, message: impl Into<String>) -> &Notification {
        self.show(NotificationKind::Error, message, Instant::now())
    }

    /// The visible notification, if it has not expired by `now`
    pub fn current(&self, now: Instant) -> Option<&Notification> {
        self.current.as_ref().filter(|n| !n.is_expired(now))
    }

    /// Take the visible notification, leaving nothing showing
    pub fn take(&mut self, now: Instant) -> Option<Notification> {
        self.current.take().filter(|n| !n.is_expired(now))
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_expires_after_ttl() {
        let mut center = NotificationCenter::new();
        let t0 = Instant::now();
        center.show(NotificationKind::Success, "Task added!", t0);

        assert!(center.current(t0 + Duration::from_millis(2999)).is_some());
        assert!(center.current(t0 + NOTIFICATION_TTL).is_none());
    }

    #[test]
    fn test_new_notification_replaces_current() {
        let mut center = NotificationCenter::new();
        let t0 = Instant::now();
        center.show(NotificationKind::Success, "first", t0);
        center.show(NotificationKind::Error, "second", t0 + Duration::from_secs(1));

        // The replacement gets its own full lifetime
        let shown = center.current(t0 + Duration::from_millis(3500)).unwrap();
        assert_eq!(shown.message, "second");
        assert_eq!(shown.kind, NotificationKind::Error);
    }

    #[test]
    fn test_dismiss_and_take() {
        let mut center = NotificationCenter::new();
        center.warning("careful");
        center.dismiss();
        assert!(center.current(Instant::now()).is_none());

        center.success("done");
        let taken = center.take(Instant::now()).unwrap();
        assert_eq!(taken.message, "done");
        assert!(center.current(Instant::now()).is_none());
    }
}
