use chrono::NaiveDate;

use crate::models::{CognitiveTrace, Task, TraceData};

/// Derive the cognitive trace metrics.
///
/// The daily counter reads as zero once its date has passed, even before
/// the next update rolls it over.
pub fn cognitive_trace(tasks: &[Task], trace: &TraceData, today: NaiveDate) -> CognitiveTrace {
    let total_switches: u64 = tasks
        .iter()
        .map(|task| u64::from(task.context_switch_count))
        .sum();
    let average_switches = if tasks.is_empty() {
        0.0
    } else {
        total_switches as f64 / tasks.len() as f64
    };

    CognitiveTrace {
        average_switches,
        focus_active_updates: tasks
            .iter()
            .filter(|task| task.focus_active_during_update == Some(true))
            .count(),
        tasks_updated_today: if trace.is_expired(today) {
            0
        } else {
            trace.tasks_updated_today
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignee, Priority, TaskStatus};
    use chrono::{TimeZone, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    fn task(switches: u32, focus: Option<bool>) -> Task {
        let mut task = Task::new(
            "t".into(),
            Assignee::Assistant,
            TaskStatus::Done,
            Priority::Normal,
            Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap(),
        );
        task.context_switch_count = switches;
        task.focus_active_during_update = focus;
        task
    }

    #[test]
    fn test_empty_trace() {
        let trace = cognitive_trace(&[], &TraceData::new(today()), today());
        assert_eq!(trace.average_switches, 0.0);
        assert_eq!(trace.focus_active_updates, 0);
        assert_eq!(trace.tasks_updated_today, 0);
    }

    #[test]
    fn test_average_and_focus_updates() {
        let tasks = vec![task(1, Some(true)), task(4, Some(false)), task(1, None)];
        let mut data = TraceData::new(today());
        data.record_update(today());

        let trace = cognitive_trace(&tasks, &data, today());
        assert_eq!(trace.average_switches, 2.0);
        assert_eq!(trace.focus_active_updates, 1);
        assert_eq!(trace.tasks_updated_today, 1);
    }

    #[test]
    fn test_yesterdays_counter_reads_zero() {
        let mut data = TraceData::new(today());
        data.record_update(today());
        let tomorrow = today().succ_opt().unwrap();
        assert_eq!(cognitive_trace(&[], &data, tomorrow).tasks_updated_today, 0);
    }
}
