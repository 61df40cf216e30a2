use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Onboarding walkthrough state, one row per user and tour in `user_tours`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourProgress {
    pub user_id: Uuid,
    pub tour: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TourProgress {
    pub fn new(user_id: Uuid, tour: impl Into<String>) -> Self {
        Self {
            user_id,
            tour: tour.into(),
            completed: false,
            completed_at: None,
        }
    }

    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.completed = true;
        self.completed_at = Some(at);
    }
}

/// Whether `tour` still has to be shown, given the user's recorded progress.
pub fn needs_tour(progress: &[TourProgress], tour: &str) -> bool {
    !progress.iter().any(|p| p.tour == tour && p.completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn pending_until_completed() {
        let user = Uuid::new_v4();
        let mut progress = vec![TourProgress::new(user, "dashboard")];
        assert!(needs_tour(&progress, "dashboard"));
        assert!(needs_tour(&progress, "leads"));

        progress[0].complete(Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap());
        assert!(!needs_tour(&progress, "dashboard"));
        assert!(needs_tour(&progress, "leads"));
    }
}
