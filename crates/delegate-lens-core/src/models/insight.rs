use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title shown when there is no task to report.
pub const NO_TASK_TITLE: &str = "None";

/// Cached activity summary. Overwritten on every regeneration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightData {
    pub top_switch_tasks: Vec<String>,
    pub most_recent_task: String,
    pub context_switch_total: u64,
    pub generated_at: DateTime<Utc>,
}
