pub mod insight;
pub mod plan;
pub mod task;
pub mod trace;
pub mod view_mode;

pub use insight::{InsightData, NO_TASK_TITLE};
pub use plan::Plan;
pub use task::{
    Assignee, NewTask, Priority, StatusChange, Task, TaskEdit, TaskStatus, UnknownVariant,
};
pub use trace::{CognitiveTrace, TraceData};
pub use view_mode::{AssigneeFilter, Overlay, StatusFilter, TaskQuery, ViewModes};
