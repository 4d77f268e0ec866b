// Dashboard palette and the styles built from it. Render code never
// constructs colors directly.

use ratatui::style::{Color, Modifier, Style, Stylize};

use delegate_lens_core::models::{Assignee, Priority, TaskStatus};

// ----- surfaces -----

pub const BG_APP: Color = Color::Rgb(12, 13, 16);
/// Task cards and pricing tiers
pub const BG_CARD: Color = Color::Rgb(22, 24, 29);
pub const BG_SELECTED: Color = Color::Rgb(36, 40, 48);
/// Task form
pub const BG_MODAL: Color = Color::Rgb(28, 31, 38);
pub const BG_FOCUS_BANNER: Color = Color::Rgb(48, 38, 20);

// ----- text -----

pub const TEXT_PRIMARY: Color = Color::Rgb(226, 228, 233);
pub const TEXT_MUTED: Color = Color::Rgb(140, 146, 158);
pub const TEXT_DIM: Color = Color::Rgb(88, 94, 106);

// ----- accents -----

pub const ACCENT_PRIMARY: Color = Color::Rgb(99, 155, 255);
pub const ACCENT_SUCCESS: Color = Color::Rgb(94, 186, 125);
pub const ACCENT_WARNING: Color = Color::Rgb(232, 170, 82);
pub const ACCENT_ERROR: Color = Color::Rgb(235, 100, 100);
/// Executive assignee and panel titles
pub const ACCENT_EXEC: Color = Color::Rgb(190, 150, 235);

pub const BORDER_ACTIVE: Color = Color::Rgb(92, 99, 112);
pub const BORDER_INACTIVE: Color = Color::Rgb(52, 56, 64);

fn fg(color: Color) -> Style {
    Style::new().fg(color)
}

pub fn text_primary() -> Style {
    fg(TEXT_PRIMARY)
}

pub fn text_muted() -> Style {
    fg(TEXT_MUTED)
}

pub fn text_dim() -> Style {
    fg(TEXT_DIM)
}

pub fn text_bold() -> Style {
    fg(TEXT_PRIMARY).bold()
}

pub fn border_active() -> Style {
    fg(BORDER_ACTIVE)
}

pub fn border_inactive() -> Style {
    fg(BORDER_INACTIVE)
}

pub fn card_bg() -> Style {
    Style::new().bg(BG_CARD)
}

pub fn card_bg_selected() -> Style {
    Style::new().bg(BG_SELECTED)
}

pub fn panel_title() -> Style {
    fg(ACCENT_EXEC).bold()
}

pub fn hint() -> Style {
    text_dim()
}

pub fn key_hint() -> Style {
    fg(ACCENT_PRIMARY)
}

pub fn focus_banner() -> Style {
    fg(ACCENT_WARNING).bg(BG_FOCUS_BANNER).bold()
}

pub fn input_active() -> Style {
    fg(TEXT_PRIMARY).bg(BG_SELECTED)
}

pub fn input_inactive() -> Style {
    text_muted()
}

pub fn error() -> Style {
    fg(ACCENT_ERROR)
}

// ----- task fields -----

pub fn status(status: TaskStatus) -> Style {
    match status {
        TaskStatus::InProgress => fg(ACCENT_PRIMARY),
        TaskStatus::Done => fg(ACCENT_SUCCESS),
        TaskStatus::Blocked => fg(ACCENT_ERROR),
    }
}

pub fn status_icon(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::InProgress => "◐",
        TaskStatus::Done => "✓",
        TaskStatus::Blocked => "✗",
    }
}

pub fn priority(priority: Priority) -> Style {
    match priority {
        Priority::High => fg(ACCENT_WARNING).add_modifier(Modifier::BOLD),
        Priority::Normal => text_muted(),
        Priority::Low => text_dim(),
    }
}

pub fn assignee(assignee: Assignee) -> Style {
    match assignee {
        Assignee::Executive => fg(ACCENT_EXEC),
        Assignee::Assistant => fg(ACCENT_PRIMARY),
    }
}
