//! Scrape engine: HTTP fetching, article extraction and sharded persistence.
mod decode;
mod extract;
mod fetch;
mod normalize;
mod orchestrator;
mod persist;
mod pool;
mod transport;
mod types;

pub use decode::{decode_body, DecodedBody};
pub use extract::{BoilerplateExtractor, ExtractSettings, Extractor};
pub use fetch::{fetch_batch, NewsScraper, ScraperSettings};
pub use normalize::normalize;
pub use orchestrator::{
    LogProgressSink, Orchestrator, OrchestratorError, ProgressSink, RunSettings, RunSummary,
    ShardFailure,
};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError, ShardWriter};
pub use pool::map_ordered;
pub use transport::{FetchSettings, ReqwestTransport, Transport, DEFAULT_USER_AGENT};
pub use types::{EngineEvent, FailureKind, FetchError, JobOutcome, RawResponse, TlsVerification};
