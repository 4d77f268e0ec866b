//! Application-wide constants
//!
//! Centralized location for storage keys and default values that are used
//! across multiple modules.

use std::time::Duration;

/// Default base URL of the pricing/checkout server
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// Name of the data directory under the platform data dir
pub const DATA_DIR_NAME: &str = "delegate-lens";

/// Idle delay before staged state is written to storage
pub const PERSIST_DEBOUNCE: Duration = Duration::from_millis(300);

/// Persisted storage keys. Each key is read and written on its own.
pub mod keys {
    pub const TASKS: &str = "delegate-lens-tasks";
    pub const FOCUS_MODE: &str = "delegate-lens-focus-mode";
    pub const TRACE: &str = "delegate-lens-trace";
    pub const TRACE_VISIBLE: &str = "delegate-lens-trace-visible";
    pub const INSIGHT: &str = "delegate-lens-insight";
    pub const INSIGHT_VISIBLE: &str = "delegate-lens-insight-visible";
    pub const HISTORY_VISIBLE: &str = "delegate-lens-history-visible";
    pub const PRESENTATION_MODE: &str = "delegate-lens-presentation-mode";
    pub const FILTER: &str = "delegate-lens-filter";
    pub const ASSIGNEE_FILTER: &str = "delegate-lens-assignee-filter";
}
