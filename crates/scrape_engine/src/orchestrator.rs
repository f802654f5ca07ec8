use std::path::PathBuf;
use std::sync::Arc;

use engine_logging::{engine_error, engine_info};
use scrape_core::{
    partition, validate_jobs, FetchJob, JobSetError, PartitionError, Shard, ShardDocument,
};

use crate::fetch::{settle, NewsScraper};
use crate::persist::{ensure_output_dir, PersistError, ShardWriter};
use crate::pool::map_ordered;
use crate::{EngineEvent, JobOutcome};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

/// Reports progress through the engine logger.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn emit(&self, event: EngineEvent) {
        match event {
            EngineEvent::ShardStarted { shard, jobs } => {
                engine_info!("Working on batch {} ({} jobs)", shard, jobs);
            }
            EngineEvent::JobFinished {
                shard,
                serial,
                job_id,
                outcome,
            } => {
                engine_info!(
                    "batch {} serial {} job {}: {}",
                    shard,
                    serial,
                    job_id,
                    outcome
                );
            }
            EngineEvent::ShardWritten { shard, path } => {
                engine_info!("batch {} written to {:?}", shard, path);
            }
            EngineEvent::ShardSkipped { shard, path } => {
                engine_info!("batch {} already present at {:?}, skipping", shard, path);
            }
            EngineEvent::ShardFailed { shard, error } => {
                engine_error!("batch {} could not be written: {}", shard, error);
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub shard_count: usize,
    pub worker_count: usize,
    /// Leave shards whose output file already exists untouched.
    pub skip_existing: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            shard_count: 30,
            worker_count: 4,
            skip_existing: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("worker count must be at least 1")]
    ZeroWorkers,
    #[error(transparent)]
    Partition(#[from] PartitionError),
    #[error(transparent)]
    Jobs(#[from] JobSetError),
    #[error("cannot prepare output directory: {0}")]
    Output(#[source] PersistError),
}

#[derive(Debug)]
pub struct ShardFailure {
    pub shard: usize,
    pub error: PersistError,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub jobs: usize,
    pub articles: usize,
    pub unavailable: usize,
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failures: Vec<ShardFailure>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Splits jobs into shards, fetches each shard concurrently and writes it
/// once every job in it has a result.
///
/// Shards run one after another. A shard that cannot be written is reported
/// and the run moves on; shards already on disk are unaffected.
pub struct Orchestrator {
    scraper: Arc<NewsScraper>,
    writer: ShardWriter,
    output_dir: PathBuf,
    settings: RunSettings,
}

impl Orchestrator {
    pub fn new(scraper: Arc<NewsScraper>, output_dir: PathBuf, settings: RunSettings) -> Self {
        Self {
            scraper,
            writer: ShardWriter::new(output_dir.clone()),
            output_dir,
            settings,
        }
    }

    pub async fn run(
        &self,
        jobs: Vec<FetchJob>,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<RunSummary, OrchestratorError> {
        if self.settings.worker_count == 0 {
            return Err(OrchestratorError::ZeroWorkers);
        }
        validate_jobs(&jobs)?;
        let shards = partition(jobs, self.settings.shard_count)?;
        ensure_output_dir(&self.output_dir).map_err(OrchestratorError::Output)?;

        let mut summary = RunSummary::default();
        for shard in shards {
            let path = self.writer.path_for(shard.number);
            if self.settings.skip_existing && path.exists() {
                sink.emit(EngineEvent::ShardSkipped {
                    shard: shard.number,
                    path: path.clone(),
                });
                summary.skipped.push(path);
                continue;
            }
            self.run_shard(shard, &sink, &mut summary).await;
        }
        Ok(summary)
    }

    async fn run_shard(&self, shard: Shard, sink: &Arc<dyn ProgressSink>, summary: &mut RunSummary) {
        let number = shard.number;
        sink.emit(EngineEvent::ShardStarted {
            shard: number,
            jobs: shard.jobs.len(),
        });

        let scraper = Arc::clone(&self.scraper);
        let task_sink = Arc::clone(sink);
        let indexed: Vec<(usize, FetchJob)> = shard.jobs.iter().cloned().enumerate().collect();
        let outcomes = map_ordered(indexed, self.settings.worker_count, move |(serial, job)| {
            let scraper = Arc::clone(&scraper);
            let sink = Arc::clone(&task_sink);
            async move {
                let result = scraper.fetch_one(&job).await;
                sink.emit(EngineEvent::JobFinished {
                    shard: number,
                    serial,
                    job_id: job.id.clone(),
                    outcome: JobOutcome::of(&result),
                });
                result
            }
        })
        .await;
        let results = settle(&shard.jobs, outcomes);

        summary.jobs += results.len();
        for result in &results {
            match JobOutcome::of(result) {
                JobOutcome::Article => summary.articles += 1,
                JobOutcome::Unavailable => summary.unavailable += 1,
                JobOutcome::NoArticle | JobOutcome::EmptyMarkup => {}
            }
        }

        match self.writer.write(&ShardDocument::new(number, results)) {
            Ok(path) => {
                sink.emit(EngineEvent::ShardWritten {
                    shard: number,
                    path: path.clone(),
                });
                summary.written.push(path);
            }
            Err(error) => {
                sink.emit(EngineEvent::ShardFailed {
                    shard: number,
                    error: error.to_string(),
                });
                summary.failures.push(ShardFailure {
                    shard: number,
                    error,
                });
            }
        }
    }
}
