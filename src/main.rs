mod config;
mod db;
mod export;
mod models;
mod run;
mod state;
mod util;


use anyhow::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();
    let config = config::Config::from_env()?;
    tracing::debug!(db = %config.db_path.display(), policy = %config.delete_policy, "starting");
    let db = db::Database::open(&config.db_path)?;
    run::as_cli(&args, &db, &config)
}

/// Log to stderr so command output on stdout stays clean. `RUST_LOG`
/// overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("budgeter=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
