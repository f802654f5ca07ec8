//! Scrape core: job and result data model, failure policy and shard layout.
//!
//! Nothing here performs I/O; the engine crate drives these types.
mod job;
mod result;
mod shard;
mod status;

pub use job::{validate_jobs, FetchJob, JobId, JobSetError};
pub use result::{ArticleText, FetchResult, Markup, EMPTY_HTML, EMPTY_TEXT, NULL_TEXT};
pub use shard::{
    partition, shard_file_name, shard_ranges, PartitionError, Shard, ShardDocument,
};
pub use status::{RetryableStatusSet, DEFAULT_ERROR_STATUS_CODES};
