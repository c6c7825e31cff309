//! Cysim CLI - Main Entry Point
//!
//! Evaluate Cypress commands from the terminal.

use clap::{Parser, Subcommand};

use cysim_cli::commands::{commands, eval, repl};
use cysim_cli::output;

/// Cysim CLI - Cypress command simulator
#[derive(Parser)]
#[command(name = "cysim")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a single command
    Eval(eval::EvalArgs),

    /// Evaluate commands line by line
    Repl(repl::ReplArgs),

    /// List known commands
    Commands(commands::CommandsArgs),

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Eval(args) => match eval::execute(args, cli.format).await {
            Ok(0) => {}
            Ok(code) => std::process::exit(code),
            Err(e) => {
                output::print_error(&e.to_string());
                std::process::exit(1);
            }
        },
        Commands::Repl(args) => repl::execute(args, cli.format).await?,
        Commands::Commands(args) => commands::execute(args, cli.format).await?,
        Commands::Version => {
            println!("Cysim CLI v{}", env!("CARGO_PKG_VERSION"));
            output::print_info("Cypress command simulator");
        }
    }

    Ok(())
}
