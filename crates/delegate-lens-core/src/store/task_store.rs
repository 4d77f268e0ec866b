use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::models::{NewTask, StatusFilter, Task, TaskEdit, TaskQuery, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Title is required")]
    EmptyTitle,
}

/// Per-status task counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCounts {
    pub total: usize,
    pub in_progress: usize,
    pub done: usize,
    pub blocked: usize,
}

impl TaskCounts {
    pub fn for_status(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Done => self.done,
            TaskStatus::Blocked => self.blocked,
        }
    }
}

/// Ordered in-memory task collection.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from previously persisted JSON records.
    ///
    /// Records that don't decode (missing id or title, unknown status) are
    /// dropped, as are repeated ids after their first occurrence.
    pub fn from_records(records: Vec<serde_json::Value>) -> Self {
        let mut seen = HashSet::new();
        let mut tasks = Vec::with_capacity(records.len());

        for record in records {
            match serde_json::from_value::<Task>(record) {
                Ok(task) if seen.insert(task.id.clone()) => tasks.push(task),
                Ok(task) => debug!(id = %task.id, "dropping task with duplicate id"),
                Err(e) => debug!(error = %e, "dropping malformed task record"),
            }
        }

        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn create_task(
        &mut self,
        new_task: NewTask,
        now: DateTime<Utc>,
    ) -> Result<&Task, ValidationError> {
        let title = new_task.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let task = Task::new(
            title.to_string(),
            new_task.assignee,
            new_task.status,
            new_task.priority,
            now,
        );
        self.tasks.push(task);
        let index = self.tasks.len() - 1;
        Ok(&self.tasks[index])
    }

    /// Change a task's status. Returns `None` without touching anything if
    /// the id is unknown.
    pub fn update_status(
        &mut self,
        id: &str,
        new_status: TaskStatus,
        focus_active: bool,
        now: DateTime<Utc>,
    ) -> Option<&Task> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        task.record_status_change(new_status, focus_active, now);
        Some(task)
    }

    pub fn filtered_view(&self, filter: StatusFilter) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| filter.matches(task.status))
            .collect()
    }

    pub fn filtered_view_by(&self, query: &TaskQuery) -> Vec<&Task> {
        self.tasks.iter().filter(|task| query.matches(task)).collect()
    }

    /// Full scan on every call.
    pub fn counts(&self) -> TaskCounts {
        let mut counts = TaskCounts {
            total: self.tasks.len(),
            ..Default::default()
        };
        for task in &self.tasks {
            match task.status {
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Done => counts.done += 1,
                TaskStatus::Blocked => counts.blocked += 1,
            }
        }
        counts
    }

    /// Replace title, assignee or priority. A blank replacement title is a
    /// validation error and leaves the task unchanged.
    pub fn edit_task(
        &mut self,
        id: &str,
        edit: TaskEdit,
    ) -> Result<Option<&Task>, ValidationError> {
        let title = match edit.title.as_deref().map(str::trim) {
            Some("") => return Err(ValidationError::EmptyTitle),
            Some(title) => Some(title.to_string()),
            None => None,
        };

        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return Ok(None);
        };
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(assignee) = edit.assignee {
            task.assignee = assignee;
        }
        if let Some(priority) = edit.priority {
            task.priority = priority;
        }
        Ok(Some(task))
    }

    /// Remove a task. Returns the removed task, if it existed.
    pub fn delete_task(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id == id)?;
        Some(self.tasks.remove(index))
    }
}
