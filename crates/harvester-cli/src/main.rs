mod logging;

use std::path::PathBuf;
use std::time::Instant;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use harvester_core::{HarvestOptions, DEFAULT_FILENAME, DEFAULT_PATTERN};

use crate::logging::LogLevel;

#[derive(Parser)]
#[command(name = "harvester", version, about = "Harvest metadata from NAME_CINE_TIMESTAMP_TAG file names into a CSV")]
struct Cli {
    /// Directory to scan for files
    #[arg(short, long, default_value = "./")]
    directory: PathBuf,

    /// Output directory for the CSV file
    #[arg(short, long, default_value = "./")]
    output: PathBuf,

    /// Output CSV filename
    #[arg(short, long, default_value = DEFAULT_FILENAME)]
    filename: String,

    /// Glob matched against file names
    #[arg(short, long, default_value = DEFAULT_PATTERN)]
    pattern: String,

    /// Only scan the top level of --directory
    #[arg(long)]
    no_recursive: bool,

    /// Derive dates in UTC instead of the local time zone
    #[arg(long)]
    utc: bool,

    /// Print a JSON summary on stdout
    #[arg(long)]
    json: bool,

    /// Log verbosity (RUST_LOG overrides)
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level)?;
    let t_total = Instant::now();

    let options = HarvestOptions {
        directory: cli.directory,
        output: cli.output,
        filename: cli.filename,
        pattern: cli.pattern,
        recursive: !cli.no_recursive,
        utc: cli.utc,
    };

    let outcome = harvester_core::harvest(&options, &|stage, current, total, message| {
        tracing::debug!("[{}] {}/{} {}", stage, current + 1, total, message);
    });

    let result = match outcome {
        Ok(result) => result,
        Err(err) if err.is_usage() => Cli::command().error(ErrorKind::ValueValidation, err).exit(),
        Err(err) => return Err(err.into()),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    tracing::info!(
        "Done! {} candidate(s), {} record(s) written, {} skipped ({:.2}s)",
        result.candidates,
        result.records_written,
        result.files_skipped,
        t_total.elapsed().as_secs_f64()
    );

    Ok(())
}
