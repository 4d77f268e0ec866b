pub mod config;
pub mod error;
pub mod http;
pub mod mailer;
pub mod provider;
pub mod webhook;

pub use config::ServerConfig;
pub use http::{router, run_server, AppState};
