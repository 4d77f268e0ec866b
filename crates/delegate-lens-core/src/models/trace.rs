use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Counter resets regardless of date equality once the stored date is
/// further back than this.
pub const TRACE_STALENESS_DAYS: i64 = 7;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Daily counter of status updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceData {
    pub tasks_updated_today: u32,
    pub last_trace_date: String,
}

impl TraceData {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            tasks_updated_today: 0,
            last_trace_date: today.format(DATE_FORMAT).to_string(),
        }
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.last_trace_date, DATE_FORMAT).ok()
    }

    /// Whether the counter belongs to a different day than `today`, is past
    /// the staleness ceiling, or carries an unreadable date.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        match self.last_date() {
            Some(last) => last != today || (today - last).num_days() > TRACE_STALENESS_DAYS,
            None => true,
        }
    }

    /// Reset the counter when it is expired. Returns true if it was reset.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.is_expired(today) {
            *self = Self::new(today);
            true
        } else {
            false
        }
    }

    /// Count one status update, rolling over first.
    pub fn record_update(&mut self, today: NaiveDate) {
        self.roll_over(today);
        self.tasks_updated_today += 1;
    }
}

/// Derived usage metrics shown in the trace panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitiveTrace {
    pub average_switches: f64,
    pub focus_active_updates: usize,
    pub tasks_updated_today: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    #[test]
    fn test_same_day_accumulates() {
        let mut trace = TraceData::new(day(4));
        trace.record_update(day(4));
        trace.record_update(day(4));
        assert_eq!(trace.tasks_updated_today, 2);
        assert_eq!(trace.last_trace_date, "2026-05-04");
    }

    #[test]
    fn test_new_day_resets_before_counting() {
        let mut trace = TraceData::new(day(4));
        trace.record_update(day(4));
        trace.record_update(day(4));
        trace.record_update(day(5));
        assert_eq!(trace.tasks_updated_today, 1);
        assert_eq!(trace.last_trace_date, "2026-05-05");
    }

    #[test]
    fn test_stale_counter_resets() {
        let mut trace = TraceData {
            tasks_updated_today: 12,
            last_trace_date: "2026-04-01".into(),
        };
        assert!(trace.roll_over(day(20)));
        assert_eq!(trace.tasks_updated_today, 0);
    }

    #[test]
    fn test_unreadable_date_resets() {
        let mut trace = TraceData {
            tasks_updated_today: 3,
            last_trace_date: "Tue May 05 2026".into(),
        };
        assert!(trace.roll_over(day(5)));
        assert_eq!(trace.tasks_updated_today, 0);
    }

    #[test]
    fn test_current_counter_is_kept() {
        let mut trace = TraceData {
            tasks_updated_today: 3,
            last_trace_date: "2026-05-05".into(),
        };
        assert!(!trace.roll_over(day(5)));
        assert_eq!(trace.tasks_updated_today, 3);
    }
}
