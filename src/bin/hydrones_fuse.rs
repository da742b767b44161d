use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hydrones::config::Config;
use hydrones::dronelog::read_log_directory;
use hydrones::editing::{TableOperator, ZeroesToNan};
use hydrones::schema::TmField;
use hydrones::telemetry::tm_reader::read_tm_directory;
use hydrones::{fuse, FusionError, TimeIndex};

fn main() -> ExitCode {
    let config = Config::parse();
    init_logging(config.verbose);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), FusionError> {
    let params = config.fusion_params()?;

    let (raw, tm_files) = read_tm_directory(&config.tm_dir, &config.tm_pattern, params.capture_mode)?;
    info!(files = tm_files.len(), "telemetry loaded");

    let log = match &config.log_dir {
        Some(dir) => {
            let (log, log_files) = read_log_directory(dir, &config.log_pattern)?;
            info!(files = log_files.len(), rows = log.len(), "autopilot logs loaded");
            Some(log)
        }
        None => None,
    };

    let index = TimeIndex::build(&raw, &params)?;
    info!(origin = %index.origin(), rows = index.len(), "master time index built");

    let mut table = fuse(&raw, log.as_ref(), Some(&index))?;
    if config.drop_missing_range {
        ZeroesToNan::new(TmField::LeddarRange.as_str())
            .drop_na(true)
            .apply_inplace(&mut table)?;
    }

    table.write_csv(&config.output)?;
    info!(file = %config.output, rows = table.len(), "fused table written");
    if let Some(path) = &config.summary {
        table.write_summary_csv(path)?;
    }

    println!("{table}");
    Ok(())
}

/// Initialize logging subsystem, `RUST_LOG` overrides the verbosity flag
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(filter)
        .init();
}
