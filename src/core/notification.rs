use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category tag carried by a notification row. Unknown tags are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationKind {
    NewContact,
    LeadUpdated,
    UrgentDemand,
    EventSoon,
    Other(String),
}

impl NotificationKind {
    pub fn as_tag(&self) -> &str {
        match self {
            Self::NewContact => "new-contact",
            Self::LeadUpdated => "lead-updated",
            Self::UrgentDemand => "urgent-demand",
            Self::EventSoon => "event-soon",
            Self::Other(tag) => tag,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::NewContact => Severity::Success,
            Self::LeadUpdated => Severity::Info,
            Self::UrgentDemand => Severity::Error,
            Self::EventSoon => Severity::Warning,
            Self::Other(_) => Severity::Info,
        }
    }
}

impl From<String> for NotificationKind {
    fn from(tag: String) -> Self {
        match tag.trim().replace('_', "-").to_ascii_lowercase().as_str() {
            "new-contact" => Self::NewContact,
            "lead-updated" => Self::LeadUpdated,
            "urgent-demand" => Self::UrgentDemand,
            "event-soon" => Self::EventSoon,
            _ => Self::Other(tag),
        }
    }
}

impl From<NotificationKind> for String {
    fn from(kind: NotificationKind) -> Self {
        kind.as_tag().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Where toasts end up. Fire-and-forget.
pub trait ToastSink {
    fn show(&self, title: &str, message: &str, severity: Severity);
}

/// Turns a notification feed into toasts, once per unread notification.
#[derive(Debug, Default)]
pub struct NotificationDispatcher {
    seen: HashSet<Uuid>,
}

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a toast for every unread notification not emitted before.
    /// Returns how many toasts were emitted.
    ///
    /// Only ids still present in `feed` are remembered afterwards, so a
    /// notification that drops out of the feed and comes back is shown again.
    pub fn observe<S: ToastSink + ?Sized>(&mut self, feed: &[Notification], sink: &S) -> usize {
        let current: HashSet<Uuid> = feed.iter().map(|n| n.id).collect();
        self.seen.retain(|id| current.contains(id));

        let mut emitted = 0;
        for notification in feed {
            if notification.read || self.seen.contains(&notification.id) {
                continue;
            }
            let severity = notification.kind.severity();
            log::debug!(
                "Toast {} ({}) for notification {}",
                severity.as_str(),
                notification.kind.as_tag(),
                notification.id
            );
            sink.show(&notification.title, &notification.message, severity);
            self.seen.insert(notification.id);
            emitted += 1;
        }
        emitted
    }

    pub fn has_seen(&self, id: &Uuid) -> bool {
        self.seen.contains(id)
    }

    /// Forget everything, e.g. after the user signs out.
    pub fn reset(&mut self) {
        self.seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        shown: RefCell<Vec<(String, Severity)>>,
    }

    impl ToastSink for Recorder {
        fn show(&self, title: &str, _message: &str, severity: Severity) {
            self.shown.borrow_mut().push((title.to_string(), severity));
        }
    }

    fn notification(kind: &str, read: bool) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            kind: NotificationKind::from(kind.to_string()),
            title: kind.to_string(),
            message: String::new(),
            read,
            created_at: Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn severity_table() {
        let cases = [
            ("new-contact", Severity::Success),
            ("lead-updated", Severity::Info),
            ("urgent-demand", Severity::Error),
            ("event-soon", Severity::Warning),
            ("urgent_demand", Severity::Error),
            ("something-else", Severity::Info),
        ];
        for (tag, expected) in cases {
            assert_eq!(NotificationKind::from(tag.to_string()).severity(), expected, "{tag}");
        }
    }

    #[test]
    fn unknown_tag_kept() {
        let kind = NotificationKind::from("payment-received".to_string());
        assert_eq!(kind, NotificationKind::Other("payment-received".into()));
        assert_eq!(kind.as_tag(), "payment-received");
    }

    #[test]
    fn emits_once_per_unread() {
        let sink = Recorder::default();
        let mut dispatcher = NotificationDispatcher::new();
        let feed = vec![
            notification("urgent-demand", false),
            notification("new-contact", true),
            notification("event-soon", false),
        ];

        assert_eq!(dispatcher.observe(&feed, &sink), 2);
        assert_eq!(dispatcher.observe(&feed, &sink), 0);

        let shown = sink.shown.borrow();
        assert_eq!(
            *shown,
            vec![
                ("urgent-demand".to_string(), Severity::Error),
                ("event-soon".to_string(), Severity::Warning),
            ]
        );
    }

    #[test]
    fn new_arrivals_after_first_pass() {
        let sink = Recorder::default();
        let mut dispatcher = NotificationDispatcher::new();
        let mut feed = vec![notification("lead-updated", false)];
        dispatcher.observe(&feed, &sink);

        feed.insert(0, notification("new-contact", false));
        assert_eq!(dispatcher.observe(&feed, &sink), 1);
        assert_eq!(sink.shown.borrow().len(), 2);
        assert!(dispatcher.has_seen(&feed[0].id));
    }

    #[test]
    fn forgets_ids_gone_from_feed() {
        let sink = Recorder::default();
        let mut dispatcher = NotificationDispatcher::new();
        let old = notification("lead-updated", false);
        let kept = notification("new-contact", false);
        dispatcher.observe(&[old.clone(), kept.clone()], &sink);
        assert!(dispatcher.has_seen(&old.id));

        assert_eq!(dispatcher.observe(&[kept.clone()], &sink), 0);
        assert!(!dispatcher.has_seen(&old.id));
        assert!(dispatcher.has_seen(&kept.id));
        assert_eq!(sink.shown.borrow().len(), 2);
    }

    #[test]
    fn decodes_type_column() {
        let row = serde_json::json!({
            "id": "5b0b6a52-4c1c-4d8e-9f55-1d0e8f7a9c01",
            "user_id": "0f4e2a1b-7c3d-4e5f-8a9b-0c1d2e3f4a5b",
            "type": "event_soon",
            "title": "Meeting in 15 min",
            "created_at": "2026-03-10T12:00:00Z"
        });
        let n: Notification = serde_json::from_value(row).unwrap();
        assert_eq!(n.kind, NotificationKind::EventSoon);
        assert!(!n.read);
        assert_eq!(serde_json::to_value(&n).unwrap()["type"], "event-soon");
    }
}
