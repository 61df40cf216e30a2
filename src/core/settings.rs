use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_LEAD_TIME_HOURS: u32 = 24;

fn default_true() -> bool {
    true
}

fn default_lead_time() -> u32 {
    DEFAULT_LEAD_TIME_HOURS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Per-user switches for follow-up alerts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "default_true")]
    pub follow_up_alerts: bool,
    #[serde(default = "default_lead_time")]
    pub lead_time_hours: u32,
    #[serde(default = "default_true")]
    pub email: bool,
    #[serde(default)]
    pub push: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            follow_up_alerts: true,
            lead_time_hours: DEFAULT_LEAD_TIME_HOURS,
            email: true,
            push: false,
        }
    }
}

/// A row of `user_settings`. Every field other than the owner is optional on
/// the wire and falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub user_id: Uuid,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub notifications: NotificationSettings,
}

impl UserSettings {
    pub fn default_for(user_id: Uuid) -> Self {
        Self {
            user_id,
            theme: Theme::default(),
            notifications: NotificationSettings::default(),
        }
    }

    /// Defaults with a different alert window, e.g. from local config.
    pub fn with_lead_time(mut self, hours: u32) -> Self {
        self.notifications.lead_time_hours = hours;
        self
    }
}
