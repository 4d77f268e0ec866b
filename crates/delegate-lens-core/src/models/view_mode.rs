use std::collections::HashMap;
use std::str::FromStr;

use super::task::{Assignee, Task, TaskStatus, UnknownVariant};

const ALL_LABEL: &str = "All";

/// Status filter selection. Persisted as its label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    pub fn label(&self) -> &'static str {
        match self {
            Self::All => ALL_LABEL,
            Self::Only(status) => status.label(),
        }
    }

    pub fn matches(&self, status: TaskStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
        }
    }

    pub fn cycle_next(&self) -> Self {
        match self {
            Self::All => Self::Only(TaskStatus::InProgress),
            Self::Only(TaskStatus::InProgress) => Self::Only(TaskStatus::Done),
            Self::Only(TaskStatus::Done) => Self::Only(TaskStatus::Blocked),
            Self::Only(TaskStatus::Blocked) => Self::All,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL_LABEL {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AssigneeFilter {
    #[default]
    All,
    Only(Assignee),
}

impl AssigneeFilter {
    pub fn label(&self) -> &'static str {
        match self {
            Self::All => ALL_LABEL,
            Self::Only(assignee) => assignee.label(),
        }
    }

    pub fn matches(&self, assignee: Assignee) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == assignee,
        }
    }

    pub fn cycle_next(&self) -> Self {
        match self {
            Self::All => Self::Only(Assignee::Executive),
            Self::Only(Assignee::Executive) => Self::Only(Assignee::Assistant),
            Self::Only(Assignee::Assistant) => Self::All,
        }
    }
}

impl FromStr for AssigneeFilter {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL_LABEL {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

/// Combined status + assignee filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub status: StatusFilter,
    pub assignee: AssigneeFilter,
}

impl TaskQuery {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.matches(task.status) && self.assignee.matches(task.assignee)
    }
}

/// Overlays closed by the dismiss signal, in closing priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overlay {
    Presentation,
    Insight,
    Trace,
}

/// Independently toggled view flags. Any combination may be set at once;
/// the couplings between them live in the dashboard operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewModes {
    pub filter: StatusFilter,
    pub assignee_filter: AssigneeFilter,
    pub focus_mode: bool,
    pub presentation_mode: bool,
    pub insight_visible: bool,
    pub trace_visible: bool,
    pub history_visible: HashMap<String, bool>,
}

impl ViewModes {
    pub fn query(&self) -> TaskQuery {
        TaskQuery {
            status: self.filter,
            assignee: self.assignee_filter,
        }
    }

    /// Presentation mode hides the focus banner even while focus mode is on.
    pub fn shows_focus_banner(&self) -> bool {
        self.focus_mode && !self.presentation_mode
    }

    /// Editing controls are hidden while presenting.
    pub fn shows_editing_controls(&self) -> bool {
        !self.presentation_mode
    }

    pub fn is_history_visible(&self, task_id: &str) -> bool {
        self.history_visible.get(task_id).copied().unwrap_or(false)
    }

    /// Topmost open overlay, if any.
    pub fn topmost_overlay(&self) -> Option<Overlay> {
        if self.presentation_mode {
            Some(Overlay::Presentation)
        } else if self.insight_visible {
            Some(Overlay::Insight)
        } else if self.trace_visible {
            Some(Overlay::Trace)
        } else {
            None
        }
    }
}
