mod input;
mod render;
mod runtime;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc;

use delegate_lens_core::checkout::{BrowserNavigator, CheckoutClient};
use delegate_lens_core::constants::DEFAULT_SERVER_URL;
use delegate_lens_core::tracing_setup::init_file_tracing;
use delegate_lens_core::{CoreConfig, Dashboard, DashboardConfig};

use crate::runtime::run_app;
use ui::App;

#[derive(Parser, Debug)]
#[command(name = "delegate-lens")]
#[command(about = "Terminal dashboard for delegating tasks between an executive and an assistant")]
struct Args {
    /// Directory holding the persisted dashboard state
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Base URL of the pricing/checkout server
    #[arg(long, default_value = DEFAULT_SERVER_URL)]
    server_url: String,

    /// Allow editing and deleting existing tasks
    #[arg(long)]
    enable_editing: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_file_tracing();

    let core_config = match args.data_dir {
        Some(dir) => CoreConfig::new(dir),
        None => CoreConfig::default(),
    };
    let dashboard_config = DashboardConfig {
        task_editing: args.enable_editing,
        ..Default::default()
    };

    let dashboard = Dashboard::open(&core_config, dashboard_config);
    let checkout_client = CheckoutClient::new(&args.server_url)?;
    let (checkout_tx, mut checkout_rx) = mpsc::unbounded_channel();
    let mut app = App::new(
        dashboard,
        checkout_client,
        Arc::new(BrowserNavigator),
        checkout_tx,
    );

    let mut terminal = ui::init_terminal()?;
    let result = run_app(&mut terminal, &mut app, &mut checkout_rx).await;

    app.shutdown();
    ui::restore_terminal()?;

    if let Err(err) = result {
        eprintln!("Error: {err}");
    }

    Ok(())
}
