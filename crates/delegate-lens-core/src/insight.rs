//! Insight snapshot generation.
//!
//! Pure computation over the task collection:
//! - top three tasks by context switches (ties keep collection order)
//! - most recently updated task (missing timestamps sort as the epoch)
//! - total context switches

use chrono::{DateTime, Utc};

use crate::models::{InsightData, Task, NO_TASK_TITLE};

/// Number of titles listed under "most switched".
pub const TOP_SWITCH_LIMIT: usize = 3;

pub fn generate_insight(tasks: &[Task], now: DateTime<Utc>) -> InsightData {
    let mut by_switches: Vec<&Task> = tasks.iter().collect();
    // sort_by is stable, so equal counts keep insertion order
    by_switches.sort_by(|a, b| b.context_switch_count.cmp(&a.context_switch_count));
    let top_switch_tasks = by_switches
        .into_iter()
        .take(TOP_SWITCH_LIMIT)
        .map(|task| task.title.clone())
        .collect();

    InsightData {
        top_switch_tasks,
        most_recent_task: most_recent_title(tasks).unwrap_or(NO_TASK_TITLE).to_string(),
        context_switch_total: tasks
            .iter()
            .map(|task| u64::from(task.context_switch_count))
            .sum(),
        generated_at: now,
    }
}

fn most_recent_title(tasks: &[Task]) -> Option<&str> {
    let mut by_recency: Vec<&Task> = tasks.iter().collect();
    by_recency.sort_by(|a, b| update_key(b).cmp(&update_key(a)));
    by_recency.first().map(|task| task.title.as_str())
}

fn update_key(task: &Task) -> DateTime<Utc> {
    task.last_updated.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
