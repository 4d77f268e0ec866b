use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{DATA_DIR_NAME, PERSIST_DEBOUNCE};

#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
}

impl CoreConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// Platform data directory, falling back to the working directory.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DATA_DIR_NAME)
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new(Self::default_data_dir())
    }
}

/// Behavior switches for the dashboard reducer.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Idle delay before staged writes are flushed.
    pub persist_debounce: Duration,
    /// Allow editing and deleting tasks. Off unless explicitly enabled.
    pub task_editing: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            persist_debounce: PERSIST_DEBOUNCE,
            task_editing: false,
        }
    }
}
