use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::debug;
use url::Url;

use delegate_lens_core::checkout::{CheckoutClient, CheckoutError, CheckoutState, Navigator};
use delegate_lens_core::models::{Plan, Task, TaskStatus};
use delegate_lens_core::store::{FileStore, KeyValueStore};
use delegate_lens_core::Dashboard;

use super::form::{FormSubmission, TaskForm};
use super::notifications::{Notification, NotificationQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Pricing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Result of a background checkout, sent back to the event loop.
#[derive(Debug)]
pub struct CheckoutOutcome {
    pub plan: Plan,
    pub result: Result<Url, CheckoutError>,
}

pub struct App<S: KeyValueStore = FileStore> {
    pub dashboard: Dashboard<S>,
    pub view: View,
    pub input_mode: InputMode,
    pub form: Option<TaskForm>,
    /// Index into the visible task list
    pub selected: usize,
    /// Index into `Plan::ALL` on the pricing view
    pub pricing_selected: usize,
    pub notifications: NotificationQueue,
    pub checkout: CheckoutState,
    checkout_client: CheckoutClient,
    navigator: Arc<dyn Navigator>,
    checkout_tx: mpsc::UnboundedSender<CheckoutOutcome>,
    pub running: bool,
    /// First Ctrl+C arms, second quits
    pub pending_quit: bool,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(
        dashboard: Dashboard<S>,
        checkout_client: CheckoutClient,
        navigator: Arc<dyn Navigator>,
        checkout_tx: mpsc::UnboundedSender<CheckoutOutcome>,
    ) -> Self {
        Self {
            dashboard,
            view: View::Dashboard,
            input_mode: InputMode::Normal,
            form: None,
            selected: 0,
            pricing_selected: 0,
            notifications: NotificationQueue::new(),
            checkout: CheckoutState::default(),
            checkout_client,
            navigator,
            checkout_tx,
            running: true,
            pending_quit: false,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    // ===== Selection =====

    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.dashboard.visible_tasks()
    }

    pub fn selected_task_id(&self) -> Option<String> {
        self.visible_tasks()
            .get(self.selected)
            .map(|task| task.id.clone())
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.visible_tasks().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = self.selected.saturating_add_signed(delta).min(len - 1);
    }

    /// Keep the selection inside the visible list after it shrinks.
    pub fn clamp_selection(&mut self) {
        let len = self.visible_tasks().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn select_task(&mut self, id: &str) {
        if let Some(index) = self.visible_tasks().iter().position(|task| task.id == id) {
            self.selected = index;
        }
    }

    // ===== Task form =====

    pub fn open_create_form(&mut self) {
        if self.editing_locked() {
            self.notify(Notification::info("Leave presentation mode to add tasks"));
            return;
        }
        self.form = Some(TaskForm::new());
        self.input_mode = InputMode::Editing;
    }

    pub fn open_edit_form(&mut self) {
        if !self.dashboard.config().task_editing {
            self.notify(Notification::warning("Task editing is disabled"));
            return;
        }
        if self.editing_locked() {
            return;
        }
        let Some(id) = self.selected_task_id() else {
            return;
        };
        if let Some(task) = self.dashboard.task(&id) {
            self.form = Some(TaskForm::for_task(task));
            self.input_mode = InputMode::Editing;
        }
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
        self.input_mode = InputMode::Normal;
    }

    /// Submit the open form. Validation errors stay inline on the form.
    pub fn submit_form(&mut self) {
        let Some(form) = self.form.as_ref() else {
            return;
        };

        match form.submission() {
            FormSubmission::Create(new_task) => match self.dashboard.create_task(new_task) {
                Ok(id) => {
                    self.cancel_form();
                    self.select_task(&id);
                    self.notify(Notification::success("Task added"));
                }
                Err(e) => self.set_form_error(e.to_string()),
            },
            FormSubmission::Edit { id, edit } => match self.dashboard.edit_task(&id, edit) {
                Ok(_) => {
                    self.cancel_form();
                    self.clamp_selection();
                    self.notify(Notification::success("Task updated"));
                }
                Err(e) => self.set_form_error(e.to_string()),
            },
        }
    }

    fn set_form_error(&mut self, message: String) {
        if let Some(form) = self.form.as_mut() {
            form.error = Some(message);
        }
    }

    // ===== Task actions =====

    /// Presentation mode hides task mutations.
    fn editing_locked(&self) -> bool {
        !self.dashboard.modes().shows_editing_controls()
    }

    pub fn set_selected_status(&mut self, status: TaskStatus) {
        if self.editing_locked() {
            return;
        }
        if let Some(id) = self.selected_task_id() {
            self.dashboard.update_status(&id, status);
            self.clamp_selection();
        }
    }

    pub fn cycle_selected_status(&mut self) {
        if self.editing_locked() {
            return;
        }
        if let Some(id) = self.selected_task_id() {
            self.dashboard.cycle_status(&id);
            self.clamp_selection();
        }
    }

    pub fn toggle_selected_history(&mut self) {
        if let Some(id) = self.selected_task_id() {
            self.dashboard.toggle_history(&id);
        }
    }

    pub fn delete_selected(&mut self) {
        if self.editing_locked() {
            return;
        }
        let Some(id) = self.selected_task_id() else {
            return;
        };
        match self.dashboard.delete_task(&id) {
            Ok(true) => {
                self.clamp_selection();
                self.notify(Notification::success("Task deleted"));
            }
            Ok(false) => {}
            Err(e) => self.notify(Notification::warning(e.to_string())),
        }
    }

    pub fn cycle_filter(&mut self) {
        self.dashboard.cycle_filter();
        self.clamp_selection();
    }

    pub fn cycle_assignee_filter(&mut self) {
        self.dashboard.cycle_assignee_filter();
        self.clamp_selection();
    }

    /// Escape: close the form, then leave pricing, then close the topmost
    /// dashboard overlay.
    pub fn dismiss(&mut self) {
        if self.form.is_some() {
            self.cancel_form();
        } else if self.view == View::Pricing {
            self.view = View::Dashboard;
        } else if let Some(overlay) = self.dashboard.dismiss() {
            debug!(?overlay, "overlay dismissed");
        }
    }

    // ===== Pricing =====

    pub fn open_pricing(&mut self) {
        self.view = View::Pricing;
    }

    pub fn selected_plan(&self) -> Plan {
        Plan::ALL[self.pricing_selected.min(Plan::ALL.len() - 1)]
    }

    pub fn move_plan_selection(&mut self, delta: isize) {
        self.pricing_selected = self
            .pricing_selected
            .saturating_add_signed(delta)
            .min(Plan::ALL.len() - 1);
    }

    /// Start a checkout in the background. Refused while one is in flight.
    pub fn start_checkout(&mut self, plan: Plan) {
        if let Err(e) = self.checkout.begin(plan) {
            self.notify(Notification::info(e.to_string()));
            return;
        }

        let client = self.checkout_client.clone();
        let navigator = self.navigator.clone();
        let tx = self.checkout_tx.clone();
        tokio::spawn(async move {
            let result = client.redirect(plan, navigator.as_ref()).await;
            let _ = tx.send(CheckoutOutcome { plan, result });
        });
    }

    pub fn finish_checkout(&mut self, outcome: CheckoutOutcome) {
        let plan = outcome.plan;
        if self.checkout.finish(outcome.result).is_some() {
            self.notify(Notification::success(format!(
                "Opened {} checkout in your browser",
                plan.display_name()
            )));
        } else if let Some(message) = self.checkout.last_error().map(str::to_string) {
            self.notify(Notification::error(message));
            self.checkout.clear_error();
        }
    }

    // ===== Lifecycle =====

    pub fn tick(&mut self, now: Instant) {
        self.dashboard.tick(now);
        self.notifications.tick(now);
    }

    /// Write everything still staged. Called on exit.
    pub fn shutdown(&mut self) {
        self.dashboard.flush();
    }
}
