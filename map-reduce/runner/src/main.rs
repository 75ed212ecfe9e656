// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use clap::Parser;
use map_reduce_core::{run_job, JobConfig, JobError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run the airport flights MapReduce job", long_about = None)]
struct Cli {
    /// JSON job configuration; flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input file (repeatable)
    #[arg(short, long = "input")]
    inputs: Vec<PathBuf>,

    /// Output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of non-blank records per map task
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Worker pool size (defaults to available parallelism)
    #[arg(long)]
    workers: Option<usize>,

    /// Run every task on the calling thread
    #[arg(long)]
    sequential: bool,

    /// Job name used in logs
    #[arg(long)]
    job_name: Option<String>,

    /// Print the job report as JSON on completion
    #[arg(long)]
    report: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!(?cli, "parsed command line");

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid job configuration");
            return ExitCode::FAILURE;
        }
    };

    match run_job(config, map_reduce_airport_flights::definition()).await {
        Ok(report) => {
            for failure in &report.failures {
                warn!(%failure, "task failed");
            }
            if cli.report {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => error!(error = %e, "failed to serialize job report"),
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "job failed");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose >= 1)
        .with_thread_ids(verbose >= 2)
        .init();
}

fn build_config(cli: &Cli) -> Result<JobConfig, JobError> {
    let mut config = match &cli.config {
        Some(path) => JobConfig::load(path)?,
        None => JobConfig::new(
            "airport-flights",
            Vec::new(),
            PathBuf::from("airport-flights.out"),
        ),
    };

    if !cli.inputs.is_empty() {
        config.input_paths = cli.inputs.clone();
    }
    if let Some(output) = &cli.output {
        config.output_path = output.clone();
    }
    if let Some(chunk_size) = cli.chunk_size {
        config.chunk_size = chunk_size;
    }
    if let Some(workers) = cli.workers {
        config.num_workers = Some(workers);
    }
    if cli.sequential {
        config.multi_threaded = false;
    }
    if let Some(job_name) = &cli.job_name {
        config.job_name = job_name.clone();
    }

    config.validate()?;
    Ok(config)
}
