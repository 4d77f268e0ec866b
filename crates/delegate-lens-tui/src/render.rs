use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use delegate_lens_core::models::{Plan, Task, TaskStatus};
use delegate_lens_core::store::KeyValueStore;

use crate::ui::form::{FormField, TaskForm};
use crate::ui::notifications::NotificationLevel;
use crate::ui::theme;
use crate::ui::{App, View};

const FORM_WIDTH: u16 = 56;
const FORM_HEIGHT: u16 = 11;

pub(crate) fn render<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let bg_block = Block::default().style(Style::default().bg(theme::BG_APP));
    f.render_widget(bg_block, f.area());

    let banner_height =
        if app.view == View::Dashboard && app.dashboard.modes().shows_focus_banner() {
            1
        } else {
            0
        };

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(banner_height),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .split(f.area());

    render_header(f, app, chunks[0]);
    if banner_height > 0 {
        render_focus_banner(f, chunks[1]);
    }
    match app.view {
        View::Dashboard => render_dashboard(f, app, chunks[2]),
        View::Pricing => render_pricing(f, app, chunks[2]),
    }
    render_footer(f, app, chunks[3]);

    if let Some(form) = &app.form {
        render_form(f, form, f.area());
    }
}

fn render_header<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let counts = app.dashboard.counts();
    let modes = app.dashboard.modes();

    let mut spans = vec![
        Span::styled(" Delegate Lens ", theme::panel_title()),
        Span::styled(format!("{} tasks  ", counts.total), theme::text_muted()),
        Span::styled(format!("◐ {}  ", counts.in_progress), theme::status(TaskStatus::InProgress)),
        Span::styled(format!("✓ {}  ", counts.done), theme::status(TaskStatus::Done)),
        Span::styled(format!("✗ {}", counts.blocked), theme::status(TaskStatus::Blocked)),
    ];
    if app.view == View::Dashboard {
        spans.push(Span::styled(
            format!(
                "   showing {} · {}",
                modes.filter.label(),
                modes.assignee_filter.label()
            ),
            theme::hint(),
        ));
    }
    if modes.presentation_mode {
        spans.push(Span::styled("   PRESENTING", theme::key_hint()));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_focus_banner(f: &mut Frame, area: Rect) {
    let banner = Paragraph::new(" FOCUS MODE  Delegate what you can, keep only what needs you.")
        .style(theme::focus_banner());
    f.render_widget(banner, area);
}

// ===== Dashboard =====

#[derive(Clone, Copy)]
enum SidePanel {
    Trace,
    Insight,
    Presentation,
}

fn render_dashboard<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let modes = app.dashboard.modes();

    let panels: Vec<SidePanel> = if modes.presentation_mode {
        vec![SidePanel::Presentation]
    } else {
        let mut panels = Vec::new();
        if modes.trace_visible {
            panels.push(SidePanel::Trace);
        }
        if modes.insight_visible {
            panels.push(SidePanel::Insight);
        }
        panels
    };

    if panels.is_empty() {
        render_task_list(f, app, area);
        return;
    }

    let columns =
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).split(area);
    render_task_list(f, app, columns[0]);

    let rows = Layout::vertical(vec![Constraint::Ratio(1, panels.len() as u32); panels.len()])
        .split(columns[1]);
    for (panel, row) in panels.iter().zip(rows.iter()) {
        match panel {
            SidePanel::Trace => render_panel(f, "Cognitive Trace", trace_lines(app), *row),
            SidePanel::Insight => render_panel(f, "Insight", insight_lines(app), *row),
            SidePanel::Presentation => {
                let mut lines = trace_lines(app);
                lines.push(Line::default());
                lines.extend(insight_lines(app));
                render_panel(f, "Summary", lines, *row);
            }
        }
    }
}

fn render_task_list<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_active())
        .title(Span::styled(" Tasks ", theme::panel_title()));

    let tasks = app.visible_tasks();
    if tasks.is_empty() {
        let mut lines = vec![Line::styled("No tasks match this filter.", theme::text_muted())];
        if app.dashboard.modes().shows_editing_controls() {
            lines.push(Line::styled("Press n to add one.", theme::hint()));
        }
        f.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    let items: Vec<ListItem> = tasks
        .iter()
        .map(|task| task_item(task, app.dashboard.modes().is_history_visible(&task.id)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(theme::card_bg_selected())
        .highlight_symbol("▌");
    let mut state = ListState::default().with_selected(Some(app.selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn task_item(task: &Task, show_history: bool) -> ListItem<'static> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{} ", theme::status_icon(task.status)),
                theme::status(task.status),
            ),
            Span::styled(task.title.clone(), theme::text_bold()),
            Span::styled(format!("  {}", task.priority.label()), theme::priority(task.priority)),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(task.assignee.label(), theme::assignee(task.assignee)),
            Span::styled(
                format!(" · {} · {} switches", task.status.label(), task.context_switch_count),
                theme::text_muted(),
            ),
        ]),
    ];

    if show_history {
        if task.history.is_empty() {
            lines.push(Line::styled("    no status changes yet", theme::text_dim()));
        }
        for change in task.recent_history() {
            lines.push(Line::styled(
                format!(
                    "    {}  {} → {}",
                    change.date.format("%b %d %H:%M"),
                    change.old_status.label(),
                    change.new_status.label()
                ),
                theme::text_dim(),
            ));
        }
    }

    ListItem::new(lines)
}

fn trace_lines<S: KeyValueStore>(app: &App<S>) -> Vec<Line<'static>> {
    let trace = app.dashboard.cognitive_trace();
    vec![
        stat_line("Updated today", trace.tasks_updated_today.to_string()),
        stat_line("Avg switches / task", format!("{:.1}", trace.average_switches)),
        stat_line("Focus-mode updates", trace.focus_active_updates.to_string()),
    ]
}

fn insight_lines<S: KeyValueStore>(app: &App<S>) -> Vec<Line<'static>> {
    let Some(insight) = app.dashboard.insight() else {
        return vec![Line::styled("Press i to generate an insight.", theme::hint())];
    };

    let mut lines = vec![
        stat_line("Most recent", insight.most_recent_task.clone()),
        stat_line("Total switches", insight.context_switch_total.to_string()),
        Line::styled("Most switched", theme::text_muted()),
    ];
    if insight.top_switch_tasks.is_empty() {
        lines.push(Line::styled("  none yet", theme::text_dim()));
    }
    for (rank, title) in insight.top_switch_tasks.iter().enumerate() {
        lines.push(Line::styled(format!("  {}. {}", rank + 1, title), theme::text_primary()));
    }
    lines.push(Line::styled(
        format!("generated {}", insight.generated_at.format("%Y-%m-%d %H:%M")),
        theme::text_dim(),
    ));
    lines
}

fn stat_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<20}", label), theme::text_muted()),
        Span::styled(value, theme::text_bold()),
    ])
}

fn render_panel(f: &mut Frame, title: &str, lines: Vec<Line<'static>>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_inactive())
        .title(Span::styled(format!(" {} ", title), theme::panel_title()));
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

// ===== Pricing =====

fn price_label(plan: Plan) -> (&'static str, &'static str) {
    match plan {
        Plan::Standard => ("£35", "per month"),
        Plan::Pro => ("£59", "per month"),
        Plan::Lifetime => ("£349", "one-time payment"),
    }
}

fn render_pricing<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let columns = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(area);
    let pending = app.checkout.pending();

    for (index, (plan, column)) in Plan::ALL.iter().zip(columns.iter()).enumerate() {
        let selected = index == app.pricing_selected;
        let (price, cadence) = price_label(*plan);

        let action = if pending == Some(*plan) {
            Line::styled("Opening checkout…", theme::key_hint())
        } else if selected {
            Line::styled("Enter to check out", theme::key_hint())
        } else {
            Line::styled(format!("{} to select", index + 1), theme::hint())
        };

        let lines = vec![
            Line::default(),
            Line::styled(price, theme::text_bold().add_modifier(Modifier::UNDERLINED)),
            Line::styled(cadence, theme::text_muted()),
            Line::default(),
            action,
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if selected {
                theme::border_active()
            } else {
                theme::border_inactive()
            })
            .title(Span::styled(format!(" {} ", plan.display_name()), theme::panel_title()))
            .style(if selected {
                theme::card_bg_selected()
            } else {
                theme::card_bg()
            });
        f.render_widget(Paragraph::new(lines).block(block).centered(), *column);
    }
}

// ===== Form =====

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_form(f: &mut Frame, form: &TaskForm, area: Rect) {
    let area = centered(area, FORM_WIDTH, FORM_HEIGHT);
    f.render_widget(Clear, area);

    let title = if form.is_editing() { " Edit task " } else { " New task " };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_active())
        .title(Span::styled(title, theme::panel_title()))
        .style(Style::default().bg(theme::BG_MODAL));

    let field_line = |field: FormField, value: String| {
        let focused = form.focus == field;
        let style = if focused {
            theme::input_active()
        } else {
            theme::input_inactive()
        };
        let cursor = if focused && field == FormField::Title { "▏" } else { "" };
        Line::from(vec![
            Span::styled(format!("{:<10}", field.label()), theme::text_muted()),
            Span::styled(format!("{}{}", value, cursor), style),
        ])
    };

    let mut lines = vec![
        field_line(FormField::Title, form.title.clone()),
        field_line(FormField::Assignee, form.assignee.label().to_string()),
    ];
    if !form.is_editing() {
        lines.push(field_line(FormField::Status, form.status.label().to_string()));
    }
    lines.push(field_line(FormField::Priority, form.priority.label().to_string()));
    lines.push(Line::default());
    if let Some(error) = &form.error {
        lines.push(Line::styled(error.clone(), theme::error()));
    }
    lines.push(Line::styled(
        "tab next · space/←→ change · enter save · esc cancel",
        theme::hint(),
    ));

    f.render_widget(Paragraph::new(lines).block(block), area);
}

// ===== Footer =====

fn notification_style(level: NotificationLevel) -> Style {
    let color = match level {
        NotificationLevel::Info => theme::ACCENT_PRIMARY,
        NotificationLevel::Success => theme::ACCENT_SUCCESS,
        NotificationLevel::Warning => theme::ACCENT_WARNING,
        NotificationLevel::Error => theme::ACCENT_ERROR,
    };
    Style::default().fg(color)
}

fn key_hints(hints: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for (i, (key, action)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" · ", theme::text_dim()));
        }
        spans.push(Span::styled(*key, theme::key_hint()));
        spans.push(Span::styled(format!(" {}", action), theme::hint()));
    }
    Line::from(spans)
}

fn render_footer<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    if app.pending_quit {
        let warning = Paragraph::new(" Press Ctrl+C again to quit").style(theme::error());
        f.render_widget(warning, area);
        return;
    }

    if let Some(notification) = app.notifications.current() {
        let line = Line::styled(
            format!(" {} {}", notification.level.icon(), notification.message),
            notification_style(notification.level),
        );
        f.render_widget(Paragraph::new(line), area);
        return;
    }

    let line = match app.view {
        View::Pricing => key_hints(&[("←→", "choose"), ("enter", "check out"), ("esc", "back")]),
        View::Dashboard => {
            let mut hints = Vec::new();
            if app.dashboard.modes().shows_editing_controls() {
                hints.push(("n", "new"));
                if app.dashboard.config().task_editing {
                    hints.push(("e", "edit"));
                    hints.push(("d", "delete"));
                }
                hints.push(("enter", "status"));
            }
            hints.extend([
                ("f", "filter"),
                ("a", "assignee"),
                ("z", "focus"),
                ("p", "present"),
                ("i", "insight"),
                ("t", "trace"),
                ("$", "pricing"),
                ("q", "quit"),
            ]);
            key_hints(&hints)
        }
    };
    f.render_widget(Paragraph::new(line), area);
}
