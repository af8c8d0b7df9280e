use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use timesort_rs::config::{Cli, RunConfig};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = RunConfig::try_from(&cli).context("invalid arguments")?;

    let summary = timesort_rs::run(&config)
        .with_context(|| format!("failed to process {}", config.input.display()))?;

    let unreachable = summary.report.unreachable_count();
    if unreachable > 0 {
        warn!(
            "{} of {} thresholds exceed what the run contains; their files hold every read",
            unreachable,
            summary.outputs.len()
        );
    }
    info!(
        "done: {} snapshot(s) in {}",
        summary.outputs.len(),
        config.out_dir.display()
    );
    Ok(())
}
