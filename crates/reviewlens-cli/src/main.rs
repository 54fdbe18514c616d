mod cli;
mod commands;
mod display;
mod import;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::Context;

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run().await {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    tracing::debug!("reviewlens v{}", env!("CARGO_PKG_VERSION"));
    let ctx = Context::open(&cli.db, cli.vocabulary.as_deref())?;

    match &cli.command {
        Commands::Import(args) => commands::import(&ctx, args).await,
        Commands::Analyze(args) => commands::analyze(&ctx, args).await,
        Commands::Compare(args) => commands::compare(&ctx, args).await,
        Commands::Hybrid(args) => commands::hybrid(&ctx, args).await,
        Commands::Show(args) => commands::show(&ctx, args).await,
        Commands::Status => commands::status(&ctx).await,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
