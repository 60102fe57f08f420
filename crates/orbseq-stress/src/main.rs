mod config;
mod run;
mod telemetry;

use clap::Parser;
use config::{CliArgs, StressConfig};
use telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = StressConfig::try_from(args)?;

    init_telemetry()?;
    log_startup_info(&config);

    let report = run::run(&config)?;
    report.log();
    report.ensure_unique()
}

fn log_startup_info(config: &StressConfig) {
    tracing::info!(
        sequences = ?config.sequences,
        threads = config.threads,
        ids_per_thread = config.ids_per_thread,
        block_size = config.sequence.block_size,
        upper_bound = ?config.upper_bound,
        "starting stress run"
    );
}
