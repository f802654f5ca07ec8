use std::path::PathBuf;

use clap::Parser;

/// Fetch news articles for a list of jobs and write them as sharded JSON batches.
#[derive(Debug, Parser)]
#[command(name = "scrape", version)]
pub struct Cli {
    /// Job list: a JSON array (or `.jsonl` file) of {"id", "url", "persons", "organizations"}.
    pub input: PathBuf,

    /// RON settings file; command line flags take precedence.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory receiving batch<N>.json files.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Number of output shards.
    #[arg(short, long)]
    pub shards: Option<usize>,

    /// Concurrent fetches per shard.
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Total per-request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Keep extracted text as-is instead of normalizing it to ASCII.
    #[arg(long)]
    pub no_clean: bool,

    /// Only log warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Leave shards already present in the output directory untouched.
    #[arg(long)]
    pub skip_existing: bool,

    /// Also write the log to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
