use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use delegate_lens_core::models::{Plan, TaskStatus};
use delegate_lens_core::store::KeyValueStore;

use crate::ui::form::FormField;
use crate::ui::{App, InputMode, View};

pub(crate) fn handle_key<S: KeyValueStore>(app: &mut App<S>, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.dismiss();
        return;
    }

    match app.input_mode {
        InputMode::Editing => handle_form_key(app, key),
        InputMode::Normal => match app.view {
            View::Dashboard => handle_dashboard_key(app, key),
            View::Pricing => handle_pricing_key(app, key),
        },
    }
}

fn handle_form_key<S: KeyValueStore>(app: &mut App<S>, key: KeyEvent) {
    if key.code == KeyCode::Enter {
        app.submit_form();
        return;
    }

    let Some(form) = app.form.as_mut() else {
        app.input_mode = InputMode::Normal;
        return;
    };

    match key.code {
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.prev_field(),
        KeyCode::Left | KeyCode::Right => form.cycle_choice(),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(' ') if form.focus != FormField::Title => form.cycle_choice(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => form.insert_char(c),
        _ => {}
    }
}

fn handle_dashboard_key<S: KeyValueStore>(app: &mut App<S>, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('j') | KeyCode::Down => app.move_selection(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_selection(-1),
        KeyCode::Char('n') => app.open_create_form(),
        KeyCode::Char('e') => app.open_edit_form(),
        KeyCode::Char('d') => app.delete_selected(),
        KeyCode::Enter | KeyCode::Char('s') => app.cycle_selected_status(),
        KeyCode::Char('1') => app.set_selected_status(TaskStatus::InProgress),
        KeyCode::Char('2') => app.set_selected_status(TaskStatus::Done),
        KeyCode::Char('3') => app.set_selected_status(TaskStatus::Blocked),
        KeyCode::Char('h') => app.toggle_selected_history(),
        KeyCode::Char('f') => app.cycle_filter(),
        KeyCode::Char('a') => app.cycle_assignee_filter(),
        KeyCode::Char('z') => app.dashboard.toggle_focus_mode(),
        KeyCode::Char('p') => app.dashboard.toggle_presentation_mode(),
        KeyCode::Char('i') => app.dashboard.toggle_insight(),
        KeyCode::Char('t') => app.dashboard.toggle_trace(),
        KeyCode::Char('$') => app.open_pricing(),
        _ => {}
    }
}

fn handle_pricing_key<S: KeyValueStore>(app: &mut App<S>, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Right => app.move_plan_selection(1),
        KeyCode::Char('k') | KeyCode::Up | KeyCode::Left => app.move_plan_selection(-1),
        KeyCode::Enter => app.start_checkout(app.selected_plan()),
        KeyCode::Char(c @ '1'..='3') => {
            let index = (c as usize) - ('1' as usize);
            app.pricing_selected = index;
            app.start_checkout(Plan::ALL[index]);
        }
        _ => {}
    }
}
