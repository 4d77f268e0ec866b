//! Dashboard reducer.
//!
//! Owns the task collection, the view flags, the daily trace counter and
//! the cached insight snapshot. Every mutation updates memory first and
//! then stages the touched storage keys for write-behind; memory stays
//! the source of truth between flushes.

use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::config::{CoreConfig, DashboardConfig};
use crate::constants::keys;
use crate::insight::generate_insight;
use crate::models::{
    AssigneeFilter, CognitiveTrace, InsightData, NewTask, Overlay, StatusFilter, Task, TaskEdit,
    TaskStatus, TraceData, ViewModes,
};
use crate::stats::cognitive_trace;
use crate::store::{FileStore, KeyValueStore, Persistence, TaskCounts, TaskStore, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Task editing is disabled")]
    EditingDisabled,
}

pub struct Dashboard<S: KeyValueStore = FileStore> {
    config: DashboardConfig,
    tasks: TaskStore,
    modes: ViewModes,
    trace: TraceData,
    insight: Option<InsightData>,
    persistence: Persistence<S>,
    clock: Box<dyn Clock + Send>,
}

impl Dashboard<FileStore> {
    /// Open the dashboard backed by files in the configured data directory.
    pub fn open(core: &CoreConfig, config: DashboardConfig) -> Self {
        info!(data_dir = %core.data_dir.display(), "opening dashboard");
        Self::load(FileStore::new(&core.data_dir), config, Box::new(SystemClock))
    }
}

impl<S: KeyValueStore> Dashboard<S> {
    /// Restore state from `store`. Anything missing or unreadable starts
    /// from its default.
    pub fn load(store: S, config: DashboardConfig, clock: Box<dyn Clock + Send>) -> Self {
        let persistence = Persistence::new(store, config.persist_debounce);

        let tasks = persistence
            .load_json::<Vec<serde_json::Value>>(keys::TASKS)
            .map(TaskStore::from_records)
            .unwrap_or_default();

        let modes = ViewModes {
            filter: persistence
                .load_string(keys::FILTER)
                .and_then(|label| label.trim().parse::<StatusFilter>().ok())
                .unwrap_or_default(),
            assignee_filter: persistence
                .load_string(keys::ASSIGNEE_FILTER)
                .and_then(|label| label.trim().parse::<AssigneeFilter>().ok())
                .unwrap_or_default(),
            focus_mode: persistence.load_bool(keys::FOCUS_MODE).unwrap_or(false),
            presentation_mode: persistence
                .load_bool(keys::PRESENTATION_MODE)
                .unwrap_or(false),
            insight_visible: persistence.load_bool(keys::INSIGHT_VISIBLE).unwrap_or(false),
            trace_visible: persistence.load_bool(keys::TRACE_VISIBLE).unwrap_or(false),
            history_visible: persistence
                .load_json::<HashMap<String, bool>>(keys::HISTORY_VISIBLE)
                .unwrap_or_default(),
        };

        let today = clock.today();
        let mut trace = persistence
            .load_json::<TraceData>(keys::TRACE)
            .unwrap_or_else(|| TraceData::new(today));
        trace.roll_over(today);

        let insight = persistence.load_json::<InsightData>(keys::INSIGHT);

        debug!(tasks = tasks.len(), "dashboard state loaded");

        Self {
            config,
            tasks,
            modes,
            trace,
            insight,
            persistence,
            clock,
        }
    }

    // ===== Reads =====

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.tasks()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn modes(&self) -> &ViewModes {
        &self.modes
    }

    pub fn trace_data(&self) -> &TraceData {
        &self.trace
    }

    pub fn insight(&self) -> Option<&InsightData> {
        self.insight.as_ref()
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    /// Tasks matching the active status and assignee filters.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.tasks.filtered_view_by(&self.modes.query())
    }

    pub fn filtered_view(&self, filter: StatusFilter) -> Vec<&Task> {
        self.tasks.filtered_view(filter)
    }

    pub fn counts(&self) -> TaskCounts {
        self.tasks.counts()
    }

    pub fn cognitive_trace(&self) -> CognitiveTrace {
        cognitive_trace(self.tasks.tasks(), &self.trace, self.clock.today())
    }

    // ===== Task mutations =====

    /// Create a task. Returns the new id.
    pub fn create_task(&mut self, new_task: NewTask) -> Result<String, DashboardError> {
        let now = self.clock.now();
        let id = self.tasks.create_task(new_task, now)?.id.clone();
        debug!(%id, "task created");
        self.stage_tasks();
        Ok(id)
    }

    /// Change a task's status. Unknown ids are ignored and return false.
    pub fn update_status(&mut self, id: &str, status: TaskStatus) -> bool {
        let now = self.clock.now();
        let focus_active = self.modes.focus_mode;
        if self.tasks.update_status(id, status, focus_active, now).is_none() {
            debug!(%id, "status update for unknown task ignored");
            return false;
        }

        self.trace.record_update(self.clock.today());
        self.stage_tasks();
        self.stage_trace();
        true
    }

    /// Advance a task to the next status in the cycle.
    pub fn cycle_status(&mut self, id: &str) -> bool {
        match self.tasks.get(id).map(|task| task.status.cycle_next()) {
            Some(next) => self.update_status(id, next),
            None => false,
        }
    }

    pub fn edit_task(&mut self, id: &str, edit: TaskEdit) -> Result<bool, DashboardError> {
        if !self.config.task_editing {
            return Err(DashboardError::EditingDisabled);
        }
        let found = self.tasks.edit_task(id, edit)?.is_some();
        if found {
            self.stage_tasks();
        }
        Ok(found)
    }

    pub fn delete_task(&mut self, id: &str) -> Result<bool, DashboardError> {
        if !self.config.task_editing {
            return Err(DashboardError::EditingDisabled);
        }
        if self.tasks.delete_task(id).is_none() {
            return Ok(false);
        }
        self.stage_tasks();
        if self.modes.history_visible.remove(id).is_some() {
            self.stage_history_visible();
        }
        Ok(true)
    }

    // ===== View modes =====

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.modes.filter = filter;
        let now = Instant::now();
        self.persistence.stage_string(keys::FILTER, filter.label(), now);
    }

    pub fn cycle_filter(&mut self) {
        self.set_filter(self.modes.filter.cycle_next());
    }

    pub fn set_assignee_filter(&mut self, filter: AssigneeFilter) {
        self.modes.assignee_filter = filter;
        let now = Instant::now();
        self.persistence.stage_string(keys::ASSIGNEE_FILTER, filter.label(), now);
    }

    pub fn cycle_assignee_filter(&mut self) {
        self.set_assignee_filter(self.modes.assignee_filter.cycle_next());
    }

    pub fn set_focus_mode(&mut self, on: bool) {
        self.modes.focus_mode = on;
        self.persistence.stage_bool(keys::FOCUS_MODE, on, Instant::now());
    }

    pub fn toggle_focus_mode(&mut self) {
        self.set_focus_mode(!self.modes.focus_mode);
    }

    /// Entering presentation forces the trace panel open and makes sure an
    /// insight snapshot exists. Leaving it changes nothing else.
    pub fn set_presentation_mode(&mut self, on: bool) {
        self.modes.presentation_mode = on;
        let now = Instant::now();
        self.persistence.stage_bool(keys::PRESENTATION_MODE, on, now);

        if on {
            self.set_trace_visible(true);
            if self.insight.is_none() {
                self.regenerate_insight();
            }
        }
    }

    pub fn toggle_presentation_mode(&mut self) {
        self.set_presentation_mode(!self.modes.presentation_mode);
    }

    /// Opening always recomputes the snapshot.
    pub fn open_insight(&mut self) {
        self.regenerate_insight();
        self.modes.insight_visible = true;
        self.persistence.stage_bool(keys::INSIGHT_VISIBLE, true, Instant::now());
    }

    /// Closing keeps the last snapshot cached.
    pub fn close_insight(&mut self) {
        self.modes.insight_visible = false;
        self.persistence.stage_bool(keys::INSIGHT_VISIBLE, false, Instant::now());
    }

    pub fn toggle_insight(&mut self) {
        if self.modes.insight_visible {
            self.close_insight();
        } else {
            self.open_insight();
        }
    }

    pub fn set_trace_visible(&mut self, visible: bool) {
        self.modes.trace_visible = visible;
        self.persistence.stage_bool(keys::TRACE_VISIBLE, visible, Instant::now());
    }

    pub fn toggle_trace(&mut self) {
        self.set_trace_visible(!self.modes.trace_visible);
    }

    /// Flip a task's history visibility. Returns the new value, or `None`
    /// for an unknown task.
    pub fn toggle_history(&mut self, id: &str) -> Option<bool> {
        self.tasks.get(id)?;
        let visible = !self.modes.is_history_visible(id);
        self.modes.history_visible.insert(id.to_string(), visible);
        self.stage_history_visible();
        Some(visible)
    }

    /// Close the topmost open overlay (presentation, then insight, then
    /// trace) and report which one closed.
    pub fn dismiss(&mut self) -> Option<Overlay> {
        let overlay = self.modes.topmost_overlay()?;
        match overlay {
            Overlay::Presentation => self.set_presentation_mode(false),
            Overlay::Insight => self.close_insight(),
            Overlay::Trace => self.set_trace_visible(false),
        }
        Some(overlay)
    }

    // ===== Persistence =====

    /// Flush staged writes whose idle delay has elapsed.
    pub fn tick(&mut self, now: Instant) -> usize {
        self.persistence.poll(now)
    }

    /// Write all staged values immediately.
    pub fn flush(&mut self) -> usize {
        self.persistence.flush()
    }

    fn regenerate_insight(&mut self) {
        let insight = generate_insight(self.tasks.tasks(), self.clock.now());
        self.persistence.stage_json(keys::INSIGHT, &insight, Instant::now());
        self.insight = Some(insight);
    }

    fn stage_tasks(&mut self) {
        self.persistence.stage_json(keys::TASKS, self.tasks.tasks(), Instant::now());
    }

    fn stage_trace(&mut self) {
        self.persistence.stage_json(keys::TRACE, &self.trace, Instant::now());
    }

    fn stage_history_visible(&mut self) {
        self.persistence.stage_json(
            keys::HISTORY_VISIBLE,
            &self.modes.history_visible,
            Instant::now(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{Assignee, Priority};
    use crate::store::MemoryStore;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 7, 10, 0, 0).unwrap()
    }

    fn dashboard_with(
        store: MemoryStore,
        config: DashboardConfig,
    ) -> (Dashboard<MemoryStore>, FixedClock) {
        let clock = FixedClock::new(start());
        let dashboard = Dashboard::load(store, config, Box::new(clock.clone()));
        (dashboard, clock)
    }

    fn dashboard() -> (Dashboard<MemoryStore>, FixedClock) {
        dashboard_with(MemoryStore::new(), DashboardConfig::default())
    }

    fn memo() -> NewTask {
        NewTask::new("Draft memo", Assignee::Assistant, TaskStatus::InProgress)
            .with_priority(Priority::Normal)
    }

    #[test]
    fn test_create_then_complete_scenario() {
        let (mut dash, clock) = dashboard();
        let id = dash.create_task(memo()).unwrap();
        assert_eq!(dash.tasks().len(), 1);
        assert_eq!(dash.task(&id).unwrap().context_switch_count, 0);

        clock.advance(Duration::minutes(5));
        assert!(dash.update_status(&id, TaskStatus::Done));

        let task = dash.task(&id).unwrap();
        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.context_switch_count, 1);
        assert_eq!(task.history.len(), 1);
        assert_eq!(task.history[0].old_status, TaskStatus::InProgress);
        assert_eq!(task.history[0].new_status, TaskStatus::Done);
        assert_eq!(dash.trace_data().tasks_updated_today, 1);
    }

    #[test]
    fn test_blank_title_is_rejected_without_mutation() {
        let (mut dash, _) = dashboard();
        let err = dash
            .create_task(NewTask::new("   ", Assignee::Executive, TaskStatus::Done))
            .unwrap_err();
        assert_eq!(err, DashboardError::Validation(ValidationError::EmptyTitle));
        assert!(dash.tasks().is_empty());
        assert!(!dash.persistence().has_pending());
    }

    #[test]
    fn test_update_records_focus_mode() {
        let (mut dash, _) = dashboard();
        let id = dash.create_task(memo()).unwrap();
        dash.set_focus_mode(true);
        dash.update_status(&id, TaskStatus::Blocked);
        assert_eq!(dash.task(&id).unwrap().focus_active_during_update, Some(true));
        assert_eq!(dash.cognitive_trace().focus_active_updates, 1);
    }

    #[test]
    fn test_unknown_id_does_not_touch_trace() {
        let (mut dash, _) = dashboard();
        assert!(!dash.update_status("nope", TaskStatus::Done));
        assert_eq!(dash.trace_data().tasks_updated_today, 0);
    }

    #[test]
    fn test_trace_counter_resets_on_new_day() {
        let (mut dash, clock) = dashboard();
        let id = dash.create_task(memo()).unwrap();
        dash.update_status(&id, TaskStatus::Done);
        dash.update_status(&id, TaskStatus::Blocked);
        assert_eq!(dash.trace_data().tasks_updated_today, 2);

        clock.advance(Duration::days(1));
        assert_eq!(dash.cognitive_trace().tasks_updated_today, 0);
        dash.update_status(&id, TaskStatus::Done);
        assert_eq!(dash.trace_data().tasks_updated_today, 1);
    }

    #[test]
    fn test_stale_trace_resets_on_load() {
        let stored = serde_json::json!({"tasksUpdatedToday": 9, "lastTraceDate": "2026-03-01"});
        let store = MemoryStore::new().with_value(keys::TRACE, stored.to_string());
        let (dash, _) = dashboard_with(store, DashboardConfig::default());
        assert_eq!(dash.trace_data().tasks_updated_today, 0);
        assert_eq!(dash.trace_data().last_trace_date, "2026-04-07");
    }

    #[test]
    fn test_presentation_forces_trace_one_way() {
        let (mut dash, _) = dashboard();
        dash.set_trace_visible(false);
        dash.set_presentation_mode(true);
        assert!(dash.modes().trace_visible);

        dash.set_presentation_mode(false);
        assert!(dash.modes().trace_visible);

        dash.set_trace_visible(false);
        dash.toggle_presentation_mode();
        dash.toggle_presentation_mode();
        assert!(dash.modes().trace_visible);
        dash.set_trace_visible(false);
        assert!(!dash.modes().trace_visible);
    }

    #[test]
    fn test_presentation_generates_missing_insight_only() {
        let (mut dash, clock) = dashboard();
        dash.create_task(memo()).unwrap();
        assert!(dash.insight().is_none());

        dash.set_presentation_mode(true);
        let first = dash.insight().unwrap().clone();
        assert_eq!(first.most_recent_task, "Draft memo");

        clock.advance(Duration::minutes(1));
        dash.set_presentation_mode(false);
        dash.set_presentation_mode(true);
        assert_eq!(dash.insight().unwrap(), &first);
    }

    #[test]
    fn test_open_insight_always_regenerates() {
        let (mut dash, clock) = dashboard();
        let id = dash.create_task(memo()).unwrap();
        dash.open_insight();
        assert_eq!(dash.insight().unwrap().context_switch_total, 0);
        dash.close_insight();
        assert!(!dash.modes().insight_visible);
        assert!(dash.insight().is_some());

        clock.advance(Duration::minutes(2));
        dash.update_status(&id, TaskStatus::Done);
        dash.open_insight();
        let insight = dash.insight().unwrap();
        assert_eq!(insight.context_switch_total, 1);
        assert_eq!(insight.generated_at, start() + Duration::minutes(2));
    }

    #[test]
    fn test_dismiss_priority_order() {
        let (mut dash, _) = dashboard();
        dash.set_focus_mode(true);
        dash.open_insight();
        dash.set_presentation_mode(true);

        assert_eq!(dash.dismiss(), Some(Overlay::Presentation));
        assert!(dash.modes().insight_visible);
        assert!(dash.modes().trace_visible);

        assert_eq!(dash.dismiss(), Some(Overlay::Insight));
        assert!(dash.modes().trace_visible);

        assert_eq!(dash.dismiss(), Some(Overlay::Trace));
        assert_eq!(dash.dismiss(), None);
        assert!(dash.modes().focus_mode);
    }

    #[test]
    fn test_toggle_history() {
        let (mut dash, _) = dashboard();
        let id = dash.create_task(memo()).unwrap();
        assert_eq!(dash.toggle_history(&id), Some(true));
        assert!(dash.modes().is_history_visible(&id));
        assert_eq!(dash.toggle_history(&id), Some(false));
        assert_eq!(dash.toggle_history("missing"), None);
    }

    #[test]
    fn test_visible_tasks_follow_filters() {
        let (mut dash, _) = dashboard();
        dash.create_task(NewTask::new("a", Assignee::Executive, TaskStatus::Done))
            .unwrap();
        dash.create_task(NewTask::new("b", Assignee::Assistant, TaskStatus::Done))
            .unwrap();
        dash.create_task(NewTask::new("c", Assignee::Assistant, TaskStatus::Blocked))
            .unwrap();

        dash.set_filter(StatusFilter::Only(TaskStatus::Done));
        assert_eq!(dash.visible_tasks().len(), 2);
        dash.set_assignee_filter(AssigneeFilter::Only(Assignee::Assistant));
        let titles: Vec<&str> = dash.visible_tasks().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["b"]);
        dash.cycle_filter();
        assert_eq!(dash.modes().filter, StatusFilter::Only(TaskStatus::Blocked));
    }

    #[test]
    fn test_editing_disabled_by_default() {
        let (mut dash, _) = dashboard();
        let id = dash.create_task(memo()).unwrap();
        assert_eq!(dash.delete_task(&id), Err(DashboardError::EditingDisabled));
        assert_eq!(dash.edit_task(&id, TaskEdit::default()), Err(DashboardError::EditingDisabled));
        assert_eq!(dash.tasks().len(), 1);
    }

    #[test]
    fn test_editing_when_enabled() {
        let config = DashboardConfig {
            task_editing: true,
            ..Default::default()
        };
        let (mut dash, _) = dashboard_with(MemoryStore::new(), config);
        let id = dash.create_task(memo()).unwrap();
        dash.toggle_history(&id);

        let edit = TaskEdit {
            assignee: Some(Assignee::Executive),
            ..Default::default()
        };
        assert_eq!(dash.edit_task(&id, edit), Ok(true));
        assert_eq!(dash.task(&id).unwrap().assignee, Assignee::Executive);

        assert_eq!(dash.delete_task(&id), Ok(true));
        assert!(dash.tasks().is_empty());
        assert!(dash.modes().history_visible.is_empty());
        assert_eq!(dash.delete_task(&id), Ok(false));
    }

    #[test]
    fn test_state_survives_reload() {
        let (mut dash, _) = dashboard();
        let id = dash.create_task(memo()).unwrap();
        dash.update_status(&id, TaskStatus::Blocked);
        dash.set_focus_mode(true);
        dash.set_filter(StatusFilter::Only(TaskStatus::Blocked));
        dash.toggle_history(&id);
        dash.set_presentation_mode(true);
        assert!(dash.flush() > 0);

        let store = dash.persistence().store().clone();
        assert_eq!(store.value(keys::FOCUS_MODE), Some("true"));
        assert_eq!(store.value(keys::FILTER), Some("Blocked"));

        let (reloaded, _) = dashboard_with(store, DashboardConfig::default());
        assert_eq!(reloaded.tasks(), dash.tasks());
        assert_eq!(reloaded.modes(), dash.modes());
        assert_eq!(reloaded.trace_data(), dash.trace_data());
        assert_eq!(reloaded.insight(), dash.insight());
    }

    #[test]
    fn test_malformed_stored_task_is_dropped() {
        let stored = serde_json::json!([
            {"title": "x"},
            {"id": "t1", "title": "Book flights", "assignee": "Assistant", "status": "In Progress"}
        ]);
        let store = MemoryStore::new().with_value(keys::TASKS, stored.to_string());
        let (dash, _) = dashboard_with(store, DashboardConfig::default());
        assert_eq!(dash.tasks().len(), 1);
        assert_eq!(dash.tasks()[0].id, "t1");
    }

    #[test]
    fn test_storage_failures_stay_invisible() {
        let (mut dash, _) =
            dashboard_with(MemoryStore::rejecting_writes(), DashboardConfig::default());
        let id = dash.create_task(memo()).unwrap();
        assert!(dash.update_status(&id, TaskStatus::Done));
        assert_eq!(dash.flush(), 0);
        assert_eq!(dash.task(&id).unwrap().status, TaskStatus::Done);
    }

    #[test]
    fn test_tick_flushes_after_idle_delay() {
        let (mut dash, _) = dashboard();
        dash.create_task(memo()).unwrap();
        assert_eq!(dash.tick(Instant::now()), 0);
        let later = Instant::now() + dash.config().persist_debounce;
        assert_eq!(dash.tick(later), 1);
        assert!(dash.persistence().store().value(keys::TASKS).is_some());
    }
}
