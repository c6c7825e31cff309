use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use cysim_web::WebConfig;

#[derive(Parser)]
#[command(name = "cysim-web")]
#[command(author, version, about = "Cypress simulator web console", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "cysim.toml")]
    config: PathBuf,

    /// Listen address
    #[arg(short, long)]
    listen: Option<String>,

    /// Delay before a run's outcome is shown, in milliseconds
    #[arg(long)]
    run_delay_ms: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // File, then environment, then flags
    let mut cfg = WebConfig::load(&cli.config)?;
    cfg.apply_env()?;
    if let Some(listen) = cli.listen {
        cfg.listen = listen;
    }
    if let Some(delay) = cli.run_delay_ms {
        cfg.run_delay_ms = delay;
    }

    info!(
        "Starting Cysim web console (run delay: {}ms, captcha required: {})",
        cfg.run_delay_ms, cfg.captcha.required
    );

    cysim_web::server::serve(cfg).await
}
