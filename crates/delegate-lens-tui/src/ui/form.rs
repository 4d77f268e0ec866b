//! Task form state for create and edit operations

use delegate_lens_core::models::{Assignee, NewTask, Priority, Task, TaskEdit, TaskStatus};

/// Which field has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Assignee,
    Status,
    Priority,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Assignee => "Assignee",
            FormField::Status => "Status",
            FormField::Priority => "Priority",
        }
    }

    /// Status is fixed while editing; it only changes through updates.
    fn available(&self, editing: bool) -> bool {
        !(editing && *self == FormField::Status)
    }

    fn cycle(&self, forward: bool) -> Self {
        const ORDER: [FormField; 4] = [
            FormField::Title,
            FormField::Assignee,
            FormField::Status,
            FormField::Priority,
        ];
        let index = ORDER.iter().position(|field| field == self).unwrap_or(0);
        let len = ORDER.len();
        let next = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        ORDER[next]
    }
}

/// What submitting the form should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormSubmission {
    Create(NewTask),
    Edit { id: String, edit: TaskEdit },
}

#[derive(Debug, Clone)]
pub struct TaskForm {
    pub focus: FormField,
    pub title: String,
    pub assignee: Assignee,
    pub status: TaskStatus,
    pub priority: Priority,
    /// Id of the task being edited, `None` when creating
    pub editing: Option<String>,
    /// Inline validation message
    pub error: Option<String>,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            focus: FormField::Title,
            title: String::new(),
            assignee: Assignee::default(),
            status: TaskStatus::InProgress,
            priority: Priority::default(),
            editing: None,
            error: None,
        }
    }
}

impl TaskForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form prefilled from an existing task.
    pub fn for_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            assignee: task.assignee,
            status: task.status,
            priority: task.priority,
            editing: Some(task.id.clone()),
            ..Self::default()
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn next_field(&mut self) {
        self.move_focus(true);
    }

    pub fn prev_field(&mut self) {
        self.move_focus(false);
    }

    fn move_focus(&mut self, forward: bool) {
        let editing = self.is_editing();
        let mut field = self.focus.cycle(forward);
        while !field.available(editing) {
            field = field.cycle(forward);
        }
        self.focus = field;
    }

    pub fn insert_char(&mut self, c: char) {
        if self.focus == FormField::Title {
            self.title.push(c);
            self.error = None;
        }
    }

    pub fn backspace(&mut self) {
        if self.focus == FormField::Title {
            self.title.pop();
        }
    }

    /// Step the focused choice field to its next value.
    pub fn cycle_choice(&mut self) {
        match self.focus {
            FormField::Title => {}
            FormField::Assignee => self.assignee = self.assignee.toggle(),
            FormField::Status => self.status = self.status.cycle_next(),
            FormField::Priority => self.priority = self.priority.cycle_next(),
        }
    }

    /// Title validation happens in the store; the form passes it through.
    pub fn submission(&self) -> FormSubmission {
        match &self.editing {
            Some(id) => FormSubmission::Edit {
                id: id.clone(),
                edit: TaskEdit {
                    title: Some(self.title.clone()),
                    assignee: Some(self.assignee),
                    priority: Some(self.priority),
                },
            },
            None => FormSubmission::Create(
                NewTask::new(self.title.clone(), self.assignee, self.status)
                    .with_priority(self.priority),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_typing_only_affects_title() {
        let mut form = TaskForm::new();
        form.insert_char('h');
        form.insert_char('i');
        form.next_field();
        form.insert_char('x');
        assert_eq!(form.title, "hi");
        assert_eq!(form.focus, FormField::Assignee);
    }

    #[test]
    fn test_cycle_choices() {
        let mut form = TaskForm::new();
        form.next_field();
        form.cycle_choice();
        assert_eq!(form.assignee, Assignee::Assistant);
        form.next_field();
        form.cycle_choice();
        assert_eq!(form.status, TaskStatus::Done);
        form.next_field();
        form.cycle_choice();
        assert_eq!(form.priority, Priority::Low);
        form.next_field();
        assert_eq!(form.focus, FormField::Title);
    }

    #[test]
    fn test_edit_skips_status() {
        let task = Task::new(
            "Call vendor".into(),
            Assignee::Assistant,
            TaskStatus::Blocked,
            Priority::High,
            Utc::now(),
        );
        let mut form = TaskForm::for_task(&task);
        form.next_field();
        form.next_field();
        assert_eq!(form.focus, FormField::Priority);
        form.prev_field();
        assert_eq!(form.focus, FormField::Assignee);

        match form.submission() {
            FormSubmission::Edit { id, edit } => {
                assert_eq!(id, task.id);
                assert_eq!(edit.title.as_deref(), Some("Call vendor"));
                assert_eq!(edit.priority, Some(Priority::High));
            }
            other => panic!("unexpected submission: {other:?}"),
        }
    }

    #[test]
    fn test_create_submission() {
        let mut form = TaskForm::new();
        for c in "Book flights".chars() {
            form.insert_char(c);
        }
        assert_eq!(
            form.submission(),
            FormSubmission::Create(NewTask::new(
                "Book flights",
                Assignee::Executive,
                TaskStatus::InProgress,
            ))
        );
    }
}
