mod cli;
mod commands;
mod state;

use anyhow::Result;
use clap::Parser;
use notam_config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    let config = Config::load()?;

    match cli.command {
        cli::Commands::Review(args) => commands::review::handle(args, &config).await,
        cli::Commands::Keys { briefing, digest } => commands::keys::handle(&briefing, digest),
        cli::Commands::Diff { previous, current } => commands::diff::handle(&previous, &current),
        cli::Commands::Mark(args) => commands::mark::handle(args, &config).await,
        cli::Commands::Config => commands::config::handle(&config),
    }
}
