use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Number of history entries shown per task card.
pub const VISIBLE_HISTORY_LEN: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
    Blocked,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [Self::InProgress, Self::Done, Self::Blocked];

    pub fn label(&self) -> &'static str {
        match self {
            Self::InProgress => "In Progress",
            Self::Done => "Done",
            Self::Blocked => "Blocked",
        }
    }

    /// Next status in the card's status cycle.
    pub fn cycle_next(&self) -> Self {
        match self {
            Self::InProgress => Self::Done,
            Self::Done => Self::Blocked,
            Self::Blocked => Self::InProgress,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.label() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Assignee {
    #[default]
    Executive,
    Assistant,
}

impl Assignee {
    pub const ALL: [Assignee; 2] = [Self::Executive, Self::Assistant];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Executive => "Executive",
            Self::Assistant => "Assistant",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Self::Executive => Self::Assistant,
            Self::Assistant => Self::Executive,
        }
    }
}

impl fmt::Display for Assignee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Assignee {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|assignee| assignee.label() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Normal,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Self::High, Self::Normal, Self::Low];

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Normal => "Normal",
            Self::Low => "Low",
        }
    }

    pub fn cycle_next(&self) -> Self {
        match self {
            Self::High => Self::Normal,
            Self::Normal => Self::Low,
            Self::Low => Self::High,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|priority| priority.label() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value: {0}")]
pub struct UnknownVariant(pub String);

/// One recorded status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub date: DateTime<Utc>,
    pub old_status: TaskStatus,
    pub new_status: TaskStatus,
}

/// A unit of delegated work.
///
/// Optional fields default when absent so snapshots written by older
/// revisions (no priority, no history) still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub assignee: Assignee,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub context_switch_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_active_during_update: Option<bool>,
    #[serde(default)]
    pub history: Vec<StatusChange>,
}

impl Task {
    pub fn new(
        title: String,
        assignee: Assignee,
        status: TaskStatus,
        priority: Priority,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            assignee,
            status,
            priority,
            last_updated: Some(now),
            context_switch_count: 0,
            focus_active_during_update: None,
            history: Vec::new(),
        }
    }

    /// Apply a status change. Always counts as a context switch, even when
    /// the new status equals the current one.
    pub fn record_status_change(
        &mut self,
        new_status: TaskStatus,
        focus_active: bool,
        now: DateTime<Utc>,
    ) {
        self.history.push(StatusChange {
            date: now,
            old_status: self.status,
            new_status,
        });
        self.status = new_status;
        self.last_updated = Some(now);
        self.context_switch_count += 1;
        self.focus_active_during_update = Some(focus_active);
    }

    /// The last few history entries, oldest first.
    pub fn recent_history(&self) -> &[StatusChange] {
        let start = self.history.len().saturating_sub(VISIBLE_HISTORY_LEN);
        &self.history[start..]
    }
}

/// Fields submitted from the task form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub assignee: Assignee,
    pub status: TaskStatus,
    pub priority: Priority,
}

impl NewTask {
    pub fn new(title: impl Into<String>, assignee: Assignee, status: TaskStatus) -> Self {
        Self {
            title: title.into(),
            assignee,
            status,
            priority: Priority::default(),
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// Replacement values for the optional edit capability. Status is not
/// editable here; it only changes through status updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub assignee: Option<Assignee>,
    pub priority: Option<Priority>,
}
