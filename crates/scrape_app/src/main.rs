mod cli;
mod config;
mod input;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use engine_logging::{engine_error, engine_info, engine_warn, LogDestination};
use scrape_engine::{LogProgressSink, NewsScraper, Orchestrator, RunSummary};

use crate::cli::Cli;
use crate::config::ScrapeConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            engine_error!("{:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<RunSummary> {
    let config = ScrapeConfig::resolve(cli)?;
    let destination = match &config.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    engine_logging::initialize(destination, engine_logging::level_for(config.verbose));

    let jobs = input::load_jobs(&cli.input)?;
    engine_info!(
        "Loaded {} jobs from {:?}; {} shards, {} workers, output {:?}",
        jobs.len(),
        cli.input,
        config.shard_count,
        config.worker_count,
        config.output_dir
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.worker_count)
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let scraper = Arc::new(NewsScraper::with_reqwest(
        config.fetch_settings(),
        config.extract_settings(),
        config.scraper_settings(),
    ));
    let orchestrator = Orchestrator::new(scraper, config.output_dir.clone(), config.run_settings());
    let summary = runtime.block_on(orchestrator.run(jobs, Arc::new(LogProgressSink)))?;

    report(&summary);
    Ok(summary)
}

fn report(summary: &RunSummary) {
    engine_info!(
        "{} jobs: {} articles, {} unavailable; {} shards written, {} skipped",
        summary.jobs,
        summary.articles,
        summary.unavailable,
        summary.written.len(),
        summary.skipped.len()
    );
    for failure in &summary.failures {
        engine_warn!("batch {} was not written: {}", failure.shard, failure.error);
        eprintln!("batch {} was not written: {}", failure.shard, failure.error);
    }
}
