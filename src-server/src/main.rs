use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;

use kanban_reorder_lib::config::Config;
use kanban_reorder_lib::{transport, AppState};

/// Kanban reorder service over JSON lines on stdin/stdout
#[derive(Debug, Parser)]
#[command(name = "kanban-reorder", version)]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database path, overriding config and environment
    #[arg(long)]
    db: Option<PathBuf>,

    /// Create the demo board if the database is empty
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (mut config, warnings) = Config::load(args.config.as_deref()).context("loading config")?;
    if let Some(db) = args.db {
        config.database.path = db;
    }
    if args.seed {
        config.seed_demo = true;
    }

    rolling_logger::init_logger_with(
        config.logging.dir.clone(),
        "kanban-reorder",
        &config.logging.to_logger_config(),
    )
    .context("initializing logger")?;
    for warning in &warnings {
        log::warn!("{}", warning);
    }

    let state = AppState::open(&config)
        .await
        .with_context(|| format!("opening {}", config.database.path.display()))?;
    log::info!("serving {} on stdin", state.db_path.display());

    transport::serve_lines(
        Arc::new(state),
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
    .context("transport failed")?;
    Ok(())
}
