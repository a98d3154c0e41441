mod cli;

use anyhow::Result;
use clap::Parser;

use crate::cli::{AppContext, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let ctx = AppContext::from_cli(&cli);
    tracing::debug!("Using data directory {}", ctx.data_dir.display());

    let output = cli::run(cli.command, &ctx)?;
    println!("{output}");
    Ok(())
}
