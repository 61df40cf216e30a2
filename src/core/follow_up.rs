use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowUpKind {
    Call,
    Message,
    Meeting,
    Birthday,
}

impl FollowUpKind {
    pub const ALL: [FollowUpKind; 4] = [Self::Call, Self::Message, Self::Meeting, Self::Birthday];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Message => "message",
            Self::Meeting => "meeting",
            Self::Birthday => "birthday",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowUpStatus {
    Pending,
    Done,
    Canceled,
}

impl FollowUpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
            Self::Canceled => "canceled",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// A scheduled contact with a lead, as stored in the `follow_ups` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUp {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub lead_id: Option<Uuid>,
    #[serde(rename = "tipo", alias = "kind")]
    pub kind: FollowUpKind,
    #[serde(rename = "data_agendada", alias = "scheduled_at")]
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    pub status: FollowUpStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl FollowUp {
    pub fn new(user_id: Uuid, kind: FollowUpKind, scheduled_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            lead_id: None,
            kind,
            scheduled_at,
            description: String::new(),
            status: FollowUpStatus::Pending,
            notes: None,
            subject: None,
            content: None,
        }
    }

    pub fn complete(&mut self) {
        self.status = FollowUpStatus::Done;
    }

    pub fn cancel(&mut self) {
        self.status = FollowUpStatus::Canceled;
    }

    /// Move to a new slot. A rescheduled follow-up is pending again.
    pub fn reschedule(&mut self, at: DateTime<Utc>) {
        self.scheduled_at = at;
        self.status = FollowUpStatus::Pending;
    }

    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }
}
