use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use delegate_lens_core::tracing_setup::init_stderr_tracing;
use delegate_lens_server::{run_server, AppState, ServerConfig};

#[derive(Parser)]
#[command(name = "delegate-lens-server")]
#[command(about = "Pricing, checkout and webhook server for Delegate Lens")]
struct Cli {
    /// Path to JSON config file (keys, prices, public URL, mail API)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:5000")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_stderr_tracing("info,tower_http=debug");

    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    config.apply_env();

    run_server(&cli.bind, AppState::from_config(config)).await
}
