use chrono::{DateTime, FixedOffset, TimeZone, Utc};

use super::follow_up::{FollowUp, FollowUpKind};
use super::settings::NotificationSettings;

/// Pending follow-ups split by how soon they are due.
///
/// A follow-up that is already past is only overdue. One later today is due
/// today, and also upcoming when it falls inside the lead window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FollowUpBuckets {
    pub overdue: Vec<FollowUp>,
    pub due_today: Vec<FollowUp>,
    pub upcoming: Vec<FollowUp>,
}

impl FollowUpBuckets {
    pub fn build<Tz: TimeZone>(
        follow_ups: &[FollowUp],
        lead_time_hours: u32,
        now: &DateTime<Tz>,
    ) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();
        let now_utc = now.with_timezone(&Utc);
        let window_secs = i64::from(lead_time_hours) * 3600;

        let mut buckets = Self::default();

        for follow_up in follow_ups {
            if !follow_up.is_pending() {
                continue;
            }
            if follow_up.scheduled_at < now_utc {
                buckets.overdue.push(follow_up.clone());
                continue;
            }
            if follow_up.scheduled_at.with_timezone(&tz).date_naive() == today {
                buckets.due_today.push(follow_up.clone());
            }
            let secs_until = (follow_up.scheduled_at - now_utc).num_seconds();
            if secs_until > 0 && secs_until <= window_secs {
                buckets.upcoming.push(follow_up.clone());
            }
        }

        buckets.overdue.sort_by_key(|f| f.scheduled_at);
        buckets.due_today.sort_by_key(|f| f.scheduled_at);
        buckets.upcoming.sort_by_key(|f| f.scheduled_at);

        buckets
    }

    /// Distinct follow-ups across the buckets; an item both due today and
    /// upcoming counts once.
    pub fn total_count(&self) -> usize {
        let upcoming_only = self
            .upcoming
            .iter()
            .filter(|u| !self.due_today.iter().any(|t| t.id == u.id))
            .count();
        self.overdue.len() + self.due_today.len() + upcoming_only
    }

    pub fn is_empty(&self) -> bool {
        self.overdue.is_empty() && self.due_today.is_empty() && self.upcoming.is_empty()
    }
}

/// Follow-ups that should raise an alert under the user's settings.
pub fn alerts_due<'a>(settings: &NotificationSettings, buckets: &'a FollowUpBuckets) -> &'a [FollowUp] {
    if settings.follow_up_alerts {
        &buckets.upcoming
    } else {
        &[]
    }
}

/// Dashboard counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaSummary {
    pub overdue: usize,
    pub due_today: usize,
    pub upcoming: usize,
    pub pending_by_kind: Vec<(FollowUpKind, usize)>,
}

impl AgendaSummary {
    pub fn new(records: &[FollowUp], buckets: &FollowUpBuckets) -> Self {
        let pending_by_kind = FollowUpKind::ALL
            .iter()
            .map(|kind| {
                let n = records
                    .iter()
                    .filter(|f| f.kind == *kind && f.is_pending())
                    .count();
                (*kind, n)
            })
            .collect();

        Self {
            overdue: buckets.overdue.len(),
            due_today: buckets.due_today.len(),
            upcoming: buckets.upcoming.len(),
            pending_by_kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BoardKey {
    revision: u64,
    lead_time_hours: u32,
    now: DateTime<FixedOffset>,
}

/// Holds the user's follow-ups and recomputes the buckets only when the
/// records, the threshold or the evaluation instant change.
#[derive(Debug, Default)]
pub struct FollowUpBoard {
    records: Vec<FollowUp>,
    lead_time_hours: u32,
    revision: u64,
    cached: Option<(BoardKey, FollowUpBuckets)>,
    computations: u64,
}

impl FollowUpBoard {
    pub fn new(records: Vec<FollowUp>, lead_time_hours: u32) -> Self {
        Self {
            records,
            lead_time_hours,
            ..Self::default()
        }
    }

    pub fn records(&self) -> &[FollowUp] {
        &self.records
    }

    pub fn lead_time_hours(&self) -> u32 {
        self.lead_time_hours
    }

    pub fn set_records(&mut self, records: Vec<FollowUp>) {
        self.records = records;
        self.revision += 1;
    }

    pub fn set_threshold(&mut self, lead_time_hours: u32) {
        self.lead_time_hours = lead_time_hours;
    }

    /// Replace one record in place (status change, reschedule) or append it.
    pub fn apply(&mut self, follow_up: FollowUp) {
        match self.records.iter_mut().find(|f| f.id == follow_up.id) {
            Some(existing) => *existing = follow_up,
            None => self.records.push(follow_up),
        }
        self.revision += 1;
    }

    /// Evaluate at `now`, reusing the last result when nothing changed.
    pub fn tick(&mut self, now: DateTime<FixedOffset>) -> &FollowUpBuckets {
        let key = BoardKey {
            revision: self.revision,
            lead_time_hours: self.lead_time_hours,
            now,
        };

        if !matches!(&self.cached, Some((k, _)) if *k == key) {
            self.cached = None;
        }

        let (_, buckets) = self.cached.get_or_insert_with(|| {
            self.computations += 1;
            (key, FollowUpBuckets::build(&self.records, self.lead_time_hours, &now))
        });
        buckets
    }

    /// Last computed buckets, if `tick` has run.
    pub fn buckets(&self) -> Option<&FollowUpBuckets> {
        self.cached.as_ref().map(|(_, b)| b)
    }

    pub fn summary(&mut self, now: DateTime<FixedOffset>) -> AgendaSummary {
        self.tick(now);
        let buckets = self.buckets().cloned().unwrap_or_default();
        AgendaSummary::new(&self.records, &buckets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::follow_up::FollowUpStatus;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn at(offset: Duration) -> FollowUp {
        FollowUp::new(Uuid::nil(), FollowUpKind::Call, now() + offset)
    }

    #[test]
    fn past_today_is_only_overdue() {
        let f = at(Duration::hours(-2));
        let b = FollowUpBuckets::build(&[f.clone()], 24, &now());
        assert_eq!(b.overdue, vec![f]);
        assert!(b.due_today.is_empty());
        assert!(b.upcoming.is_empty());
    }

    #[test]
    fn later_today_is_due_today_and_upcoming() {
        let f = at(Duration::hours(3));
        let b = FollowUpBuckets::build(&[f.clone()], 24, &now());
        assert!(b.overdue.is_empty());
        assert_eq!(b.due_today, vec![f.clone()]);
        assert_eq!(b.upcoming, vec![f]);
        assert_eq!(b.total_count(), 1);
    }

    #[test]
    fn later_today_outside_window_is_only_due_today() {
        let f = at(Duration::hours(3));
        let b = FollowUpBuckets::build(&[f.clone()], 2, &now());
        assert_eq!(b.due_today, vec![f]);
        assert!(b.upcoming.is_empty());
    }

    #[test]
    fn window_counts_from_early_morning() {
        // From 00:30 both T+23h and T+24h still fall on the same date.
        let early = Utc.with_ymd_and_hms(2026, 3, 10, 0, 30, 0).unwrap();
        let call = |offset: Duration| FollowUp::new(Uuid::nil(), FollowUpKind::Call, early + offset);
        let inside = call(Duration::hours(23));
        let edge = call(Duration::hours(23) + Duration::minutes(29));
        let outside = call(Duration::hours(25));

        let b = FollowUpBuckets::build(&[outside.clone(), edge.clone(), inside.clone()], 24, &early);
        assert_eq!(b.upcoming, vec![inside.clone(), edge.clone()]);
        assert_eq!(b.due_today, vec![inside, edge]);
        assert!(!b.due_today.contains(&outside));
        assert_eq!(alerts_due(&NotificationSettings::default(), &b).len(), 2);
    }

    #[test]
    fn meeting_minutes_away_alerts() {
        let mut meeting = at(Duration::minutes(30));
        meeting.kind = FollowUpKind::Meeting;
        let soon = at(Duration::minutes(5));
        let b = FollowUpBuckets::build(&[meeting.clone(), soon.clone()], 24, &now());

        assert_eq!(b.upcoming, vec![soon.clone(), meeting.clone()]);
        assert_eq!(alerts_due(&NotificationSettings::default(), &b), &[soon, meeting]);
    }

    #[test]
    fn lead_window_boundaries() {
        let inside = at(Duration::hours(23));
        let edge = at(Duration::hours(24));
        let outside = at(Duration::hours(25));
        let b = FollowUpBuckets::build(&[outside, edge.clone(), inside.clone()], 24, &now());
        assert_eq!(b.upcoming, vec![inside, edge]);
    }

    #[test]
    fn closed_items_never_bucketed() {
        let mut done = at(Duration::hours(-30));
        done.complete();
        let mut canceled = at(Duration::hours(1));
        canceled.status = FollowUpStatus::Canceled;
        let mut done_soon = at(Duration::hours(20));
        done_soon.complete();

        let b = FollowUpBuckets::build(&[done, canceled, done_soon], 24, &now());
        assert!(b.is_empty());
    }

    #[test]
    fn today_follows_caller_timezone() {
        // 23:30 UTC on the 10th is already the 11th in UTC+3.
        let f = FollowUp::new(
            Uuid::nil(),
            FollowUpKind::Meeting,
            Utc.with_ymd_and_hms(2026, 3, 10, 23, 30, 0).unwrap(),
        );
        let plus3 = FixedOffset::east_opt(3 * 3600).unwrap();
        let b = FollowUpBuckets::build(&[f.clone()], 24, &now().with_timezone(&plus3));
        assert!(b.due_today.is_empty());
        assert_eq!(b.upcoming, vec![f.clone()]);

        let b = FollowUpBuckets::build(&[f.clone()], 24, &now());
        assert_eq!(b.due_today, vec![f.clone()]);
        assert_eq!(b.upcoming, vec![f]);
    }

    #[test]
    fn buckets_sorted_by_schedule() {
        let a = at(Duration::hours(-1));
        let b_ = at(Duration::hours(-5));
        let b = FollowUpBuckets::build(&[a.clone(), b_.clone()], 24, &now());
        assert_eq!(b.overdue, vec![b_, a]);
    }

    #[test]
    fn alerts_respect_toggle() {
        let b = FollowUpBuckets::build(&[at(Duration::hours(20))], 24, &now());
        let mut settings = NotificationSettings::default();
        assert_eq!(alerts_due(&settings, &b).len(), 1);
        settings.follow_up_alerts = false;
        assert!(alerts_due(&settings, &b).is_empty());
    }

    #[test]
    fn board_memoizes_on_inputs() {
        let mut board = FollowUpBoard::new(vec![at(Duration::hours(20))], 24);
        let t = now().fixed_offset();

        assert_eq!(board.tick(t).upcoming.len(), 1);
        board.tick(t);
        assert_eq!(board.computations, 1);

        board.set_threshold(12);
        assert!(board.tick(t).upcoming.is_empty());
        assert_eq!(board.computations, 2);

        board.set_records(vec![at(Duration::hours(-1))]);
        assert_eq!(board.tick(t).overdue.len(), 1);
        assert_eq!(board.computations, 3);

        board.tick(t + Duration::minutes(1));
        assert_eq!(board.computations, 4);
    }

    #[test]
    fn board_apply_replaces_by_id() {
        let f = at(Duration::hours(-1));
        let mut board = FollowUpBoard::new(vec![f.clone()], 24);
        let t = now().fixed_offset();
        assert_eq!(board.tick(t).overdue.len(), 1);

        let mut done = f;
        done.complete();
        board.apply(done);
        assert_eq!(board.records().len(), 1);
        assert!(board.tick(t).is_empty());
    }

    #[test]
    fn summary_counts() {
        let mut meeting = at(Duration::hours(20));
        meeting.kind = FollowUpKind::Meeting;
        let mut closed = at(Duration::hours(2));
        closed.complete();
        let mut board = FollowUpBoard::new(vec![at(Duration::hours(-1)), meeting, closed], 24);

        let s = board.summary(now().fixed_offset());
        assert_eq!((s.overdue, s.due_today, s.upcoming), (1, 0, 1));
        assert!(s.pending_by_kind.contains(&(FollowUpKind::Call, 1)));
        assert!(s.pending_by_kind.contains(&(FollowUpKind::Meeting, 1)));
        assert!(s.pending_by_kind.contains(&(FollowUpKind::Birthday, 0)));
    }
}
