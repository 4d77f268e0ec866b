pub mod app;
pub mod form;
pub mod notifications;
pub mod terminal;
pub mod theme;

pub use app::{App, CheckoutOutcome, InputMode, View};
pub use terminal::{init as init_terminal, restore as restore_terminal, Tui};
